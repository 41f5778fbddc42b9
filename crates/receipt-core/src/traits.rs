//! Seams to the hosted services.

use async_trait::async_trait;

use crate::error::{MessagingError, ModelError};
use crate::model::OutboundMessage;
use crate::prompt::VisionPrompt;

/// A hosted multimodal model that answers a prompt about one image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Whether the process-wide API credential is available.
    fn has_credential(&self) -> bool;

    /// Run one completion and return the model's text.
    async fn complete(&self, prompt: &VisionPrompt<'_>) -> Result<String, ModelError>;
}

/// An SMS/MMS provider that can deliver a reply.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MessagingError>;
}
