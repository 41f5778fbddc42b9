//! Route handlers.

pub mod analyze;
pub mod upload;
pub mod webhook;
