//! Inbound message webhook payload.

use serde::Deserialize;

/// Reply sent when a message arrives without an attachment.
pub const NO_IMAGE_REPLY: &str = "Please send an image of a receipt to analyze.";

/// Reply sent when the receipt could not be analyzed.
pub const FALLBACK_REPLY: &str = "Sorry, I could not analyze this receipt.";

/// Form fields posted by the provider for an incoming SMS/MMS.
///
/// Every field is optional at the wire level; accessors apply the
/// defaults the webhook expects.
#[derive(Debug, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "NumMedia")]
    pub num_media: Option<String>,
    #[serde(rename = "MediaUrl0")]
    pub media_url0: Option<String>,
    #[serde(rename = "MediaContentType0")]
    pub media_content_type0: Option<String>,
}

impl InboundMessage {
    /// Number of attachments; absent or unparseable counts as zero.
    pub fn media_count(&self) -> u32 {
        self.num_media
            .as_deref()
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }

    pub fn first_media_url(&self) -> Option<&str> {
        self.media_url0
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}
