//! Receipt Web Server
//!
//! Axum-based HTTP server: the upload page, the JSON analysis endpoint
//! and the messaging webhook.

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::ApiError;
pub use state::AppState;

/// Slack for the JSON envelope around a base64 image.
const BODY_OVERHEAD: usize = 1024 * 1024;

/// Largest request body that can still carry an image of `max_image_bytes`
/// once base64-encoded.
pub fn request_body_limit(max_image_bytes: usize) -> usize {
    max_image_bytes.div_ceil(3).saturating_mul(4).saturating_add(BODY_OVERHEAD)
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let body_limit = request_body_limit(state.analyzer.config().max_image_bytes);

    // Health and messaging webhook
    let api_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/twilio/webhook", post(routes::webhook::twilio_webhook));

    Router::new()
        // Upload page
        .route("/", get(routes::upload::index))
        // Analysis endpoint
        .route(
            "/analyze-receipt",
            post(routes::analyze::analyze_receipt).options(routes::analyze::preflight),
        )
        .nest("/api", api_routes)
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until Ctrl+C.
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down web server");
}
