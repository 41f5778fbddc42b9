//! Receipt Core Library
//!
//! Data model, error taxonomy and the request handler shared by every
//! transport (HTTP, messaging webhook, CLI).

pub mod analyzer;
pub mod error;
pub mod image;
pub mod model;
pub mod prompt;
pub mod secret;
pub mod traits;

pub use analyzer::{AnalyzerConfig, ReceiptAnalyzer, DEFAULT_TIMEOUT};
pub use error::{AnalysisError, ConfigError, ErrorKind, MessagingError, ModelError};
pub use image::{ImageRef, DEFAULT_MAX_IMAGE_BYTES};
pub use model::{AnalysisRequest, AnalysisResult, OutboundMessage};
pub use prompt::{VisionPrompt, IMAGE_DETAIL, RECEIPT_PROMPT};
pub use secret::SecretString;
pub use traits::{MessageSender, VisionModel};
