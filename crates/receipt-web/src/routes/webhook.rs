//! Messaging webhook: analyze receipts sent as MMS attachments.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    Form, Json,
};
use receipt_core::{AnalysisRequest, MessageSender, OutboundMessage};
use receipt_sms::{InboundMessage, FALLBACK_REPLY, NO_IMAGE_REPLY};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

const PROCESSING_FAILED: &str = "Failed to process image";

/// POST /api/twilio/webhook - Reply to an inbound message with the receipt analysis.
pub async fn twilio_webhook(
    State(state): State<AppState>,
    form: Result<Form<InboundMessage>, FormRejection>,
) -> Result<Json<Value>, ApiError> {
    let messenger = state
        .messenger
        .clone()
        .ok_or_else(|| ApiError::internal("Messaging is not configured"))?;

    let Form(message) = form?;
    let from = message
        .sender()
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Missing sender"))?;

    info!(
        message_sid = message.message_sid.as_deref().unwrap_or("-"),
        num_media = message.media_count(),
        body_chars = message.body.as_deref().map_or(0, |b| b.chars().count()),
        content_type = message.media_content_type0.as_deref().unwrap_or("-"),
        "Inbound message received"
    );

    if message.media_count() == 0 {
        reply(messenger.as_ref(), from, NO_IMAGE_REPLY).await?;
        return Ok(Json(json!({ "message": "No image received" })));
    }

    let image = message.first_media_url().unwrap_or_default();
    match state.analyzer.analyze(AnalysisRequest::new(image)).await {
        Ok(result) => {
            reply(messenger.as_ref(), from, &result.text).await?;
            Ok(Json(json!({ "success": true })))
        }
        Err(e) => {
            warn!(kind = ?e.kind(), error = %e, "Sending fallback reply");
            reply(messenger.as_ref(), from, FALLBACK_REPLY).await?;
            Ok(Json(json!({ "success": true })))
        }
    }
}

async fn reply(messenger: &dyn MessageSender, to: &str, body: &str) -> Result<(), ApiError> {
    messenger
        .send(&OutboundMessage::new(to, body))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to send reply");
            ApiError::internal(PROCESSING_FAILED)
        })
}
