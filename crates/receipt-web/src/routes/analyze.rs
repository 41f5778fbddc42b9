//! Receipt analysis route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use receipt_core::AnalysisRequest;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeReceiptRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeReceiptResponse {
    pub text: String,
}

/// POST /analyze-receipt - Analyze a receipt image given as a data URL or URL.
pub async fn analyze_receipt(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeReceiptRequest>, JsonRejection>,
) -> Result<Json<AnalyzeReceiptResponse>, ApiError> {
    let Json(body) = body?;

    let request = AnalysisRequest::new(body.image.unwrap_or_default());
    let result = state.analyzer.analyze(request).await?;

    Ok(Json(AnalyzeReceiptResponse { text: result.text }))
}

/// OPTIONS /analyze-receipt - Empty 200; CORS headers come from the layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
