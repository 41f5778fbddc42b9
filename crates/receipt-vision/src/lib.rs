//! # Receipt Vision
//!
//! Hosted multimodal model clients for receipt analysis.

pub mod openai;

pub use openai::{OpenAiVisionClient, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_OPENAI_URL};
