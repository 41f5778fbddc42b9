//! The receipt analysis request handler.
//!
//! Validates an [`AnalysisRequest`], dispatches exactly one call to the
//! injected [`VisionModel`] under a deadline, and normalizes the outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{AnalysisError, ModelError};
use crate::image::{ImageRef, DEFAULT_MAX_IMAGE_BYTES};
use crate::model::{AnalysisRequest, AnalysisResult};
use crate::prompt::VisionPrompt;
use crate::traits::VisionModel;

/// Default deadline for one model call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Limits applied to every request.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub timeout: Duration,
    pub max_image_bytes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Shared, cheaply cloneable request handler.
#[derive(Clone)]
pub struct ReceiptAnalyzer {
    model: Arc<dyn VisionModel>,
    config: AnalyzerConfig,
}

impl ReceiptAnalyzer {
    pub fn new(model: Arc<dyn VisionModel>, config: AnalyzerConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one receipt image.
    ///
    /// Validation order: image present, credential present, inline size.
    /// The model is only called once all three pass. When the deadline
    /// fires first the in-flight call is dropped, which cancels the
    /// underlying HTTP request; its result can never be observed.
    #[instrument(name = "analyze_receipt", skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let image_ref = request.image_ref.trim();

        info!(
            has_image = !image_ref.is_empty(),
            image_len = image_ref.len(),
            "Analysis request received"
        );

        let outcome = match self.validate(image_ref) {
            Ok(()) => self.dispatch(image_ref).await,
            Err(e) => Err(e),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(result) => {
                info!(elapsed_ms, chars = result.text.len(), "Receipt analyzed");
            }
            Err(e) if e.kind().is_client_error() => {
                warn!(elapsed_ms, kind = ?e.kind(), error = %e, "Analysis rejected");
            }
            Err(AnalysisError::ServerMisconfigured { missing }) => {
                error!(elapsed_ms, missing = *missing, "Analysis refused: server misconfigured");
            }
            Err(AnalysisError::Timeout { after }) => {
                error!(
                    elapsed_ms,
                    timeout_ms = after.as_millis() as u64,
                    "Analysis timed out"
                );
            }
            Err(e) => {
                error!(
                    elapsed_ms,
                    kind = ?e.kind(),
                    retryable = e.kind().is_retryable(),
                    error = %e,
                    "Analysis failed"
                );
            }
        }

        outcome
    }

    fn validate(&self, image_ref: &str) -> Result<(), AnalysisError> {
        if image_ref.is_empty() {
            return Err(AnalysisError::malformed("No image provided"));
        }

        if !self.model.has_credential() {
            return Err(AnalysisError::ServerMisconfigured {
                missing: "model API credential",
            });
        }

        let image = ImageRef::parse(image_ref)?;
        debug!(
            inline = image.is_inline(),
            decoded_len = ?image.decoded_len(),
            "Image reference accepted"
        );
        if let Some(size) = image.decoded_len() {
            if size > self.config.max_image_bytes {
                return Err(AnalysisError::PayloadTooLarge {
                    size,
                    limit: self.config.max_image_bytes,
                });
            }
        }

        Ok(())
    }

    async fn dispatch(&self, image_ref: &str) -> Result<AnalysisResult, AnalysisError> {
        let prompt = VisionPrompt::for_receipt(image_ref);

        debug!(
            timeout_ms = self.config.timeout.as_millis() as u64,
            "Dispatching to vision model"
        );

        let text = match tokio::time::timeout(self.config.timeout, self.model.complete(&prompt)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AnalysisError::Timeout {
                    after: self.config.timeout,
                })
            }
        };

        if text.trim().is_empty() {
            return Err(ModelError::MissingContent.into());
        }

        Ok(AnalysisResult { text })
    }
}
