//! Request and response records for a single analysis.

use serde::{Deserialize, Serialize};

/// An image to analyze: a `data:` URL or a URL the model provider can fetch.
#[derive(Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub image_ref: String,
}

impl AnalysisRequest {
    pub fn new(image_ref: impl Into<String>) -> Self {
        Self {
            image_ref: image_ref.into(),
        }
    }
}

// Data URLs can be tens of megabytes; never dump them into logs.
impl std::fmt::Debug for AnalysisRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("image_ref_len", &self.image_ref.len())
            .finish()
    }
}

/// Free-form text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
}

/// A reply to send through the messaging provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub body: String,
}

impl OutboundMessage {
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
        }
    }
}
