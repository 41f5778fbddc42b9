//! The fixed receipt prompt.
//!
//! The instruction text is the contract that keeps the model's free-text
//! answer in a displayable shape, so it is never templated per request.

/// Instruction sent alongside every receipt image.
pub const RECEIPT_PROMPT: &str = "Please analyze this receipt and provide the following information in a structured format:\n\nStore Name:\nDate:\nTotal Amount:\nItems Purchased:\nPayment Method:\nAdditional Details:";

/// Resolution hint for the image attachment.
pub const IMAGE_DETAIL: &str = "high";

/// One vision request: an instruction plus the image it refers to.
#[derive(Debug, Clone)]
pub struct VisionPrompt<'a> {
    pub instruction: &'static str,
    pub image_url: &'a str,
    pub detail: &'static str,
}

impl<'a> VisionPrompt<'a> {
    /// The receipt prompt with a high-detail image attachment.
    pub fn for_receipt(image_url: &'a str) -> Self {
        Self {
            instruction: RECEIPT_PROMPT,
            image_url,
            detail: IMAGE_DETAIL,
        }
    }
}
