//! Upload page route handler.
//!
//! Serves the embedded drag-and-drop receipt upload page.

use axum::response::{Html, IntoResponse};

const UPLOAD_HTML: &str = include_str!("../../../../assets/web/index.html");

/// GET / - Serve the receipt upload page.
pub async fn index() -> impl IntoResponse {
    Html(UPLOAD_HTML)
}
