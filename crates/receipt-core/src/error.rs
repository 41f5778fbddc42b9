//! Centralized error types for receipt analysis.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Category of an analysis failure, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MalformedInput,
    ServerMisconfigured,
    PayloadTooLarge,
    Timeout,
    RateLimited,
    UpstreamError,
}

impl ErrorKind {
    /// HTTP status a transport adapter should report for this kind.
    pub fn http_status(self) -> u16 {
        match self {
            Self::MalformedInput => 400,
            Self::PayloadTooLarge => 413,
            Self::RateLimited => 429,
            Self::ServerMisconfigured | Self::UpstreamError => 500,
            Self::Timeout => 504,
        }
    }

    /// The caller sent something we refuse to process.
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::MalformedInput | Self::PayloadTooLarge)
    }

    /// The caller may reasonably re-submit the same request later.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimited)
    }
}

/// Terminal failure of a single analysis request.
///
/// The `Display` output is the user-facing message that transport
/// adapters put in their error bodies.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{0}")]
    MalformedInput(String),

    #[error("Server configuration error")]
    ServerMisconfigured { missing: &'static str },

    #[error("Image exceeds the {limit} byte limit ({size} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Request timed out")]
    Timeout { after: Duration },

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Failed to analyze receipt: {0}")]
    Upstream(String),
}

impl AnalysisError {
    /// Create a malformed input error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::ServerMisconfigured { .. } => ErrorKind::ServerMisconfigured,
            Self::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Upstream(_) => ErrorKind::UpstreamError,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }

    /// Upstream back-off hint, when the model provider sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<ModelError> for AnalysisError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::RateLimited { retry_after } => Self::RateLimited { retry_after },
            ModelError::MissingCredential => Self::ServerMisconfigured {
                missing: "model API credential",
            },
            other => Self::Upstream(other.to_string()),
        }
    }
}

/// Failure reported by a [`crate::VisionModel`] implementation.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("upstream rate limit reached")]
    RateLimited { retry_after: Option<Duration> },

    #[error("model API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("request to model API failed: {0}")]
    Transport(String),

    #[error("no text content in completion response")]
    MissingContent,

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("model API credential is not configured")]
    MissingCredential,
}

/// Failure reported by a [`crate::MessageSender`] implementation.
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("messaging API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("request to messaging API failed: {0}")]
    Transport(String),
}

/// Invalid process-wide configuration detected at start-up.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Incomplete messaging configuration: missing {0}")]
    IncompleteMessaging(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
