//! Application state.

use std::sync::Arc;

use receipt_core::{MessageSender, ReceiptAnalyzer};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: ReceiptAnalyzer,
    /// `None` when no messaging provider is configured.
    pub messenger: Option<Arc<dyn MessageSender>>,
}

impl AppState {
    pub fn new(analyzer: ReceiptAnalyzer) -> Self {
        Self {
            analyzer,
            messenger: None,
        }
    }

    pub fn with_messenger(mut self, messenger: Arc<dyn MessageSender>) -> Self {
        self.messenger = Some(messenger);
        self
    }
}
