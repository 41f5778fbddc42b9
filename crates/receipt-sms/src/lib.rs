//! # Receipt SMS
//!
//! Messaging provider client and inbound webhook payload for analyzing
//! receipts sent over SMS/MMS.

pub mod twilio;
pub mod webhook;

pub use twilio::{TwilioClient, TwilioConfig, DEFAULT_TWILIO_URL};
pub use webhook::{InboundMessage, FALLBACK_REPLY, NO_IMAGE_REPLY};
