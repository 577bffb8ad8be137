//! HTTP service exposing the conversion pipeline.
//!
//! ```text
//! POST /convert   {url, type?} → {markdown, fileType, conversionErrors}
//! GET  /health    → {"status":"healthy"}
//! ```
//!
//! Client mistakes (no URL, unsupported type, malformed Google link,
//! unparseable body) map to `400`; everything else, including download
//! failures, maps to `500`. Both carry `{"error": "..."}`.

mod handlers;

pub use handlers::{convert_handler, health_handler, ErrorResponse, HealthResponse};

use crate::convert::Converter;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// Default listen address for `doc2md --serve`.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Shared handler state. Cloned per request; the converter's
/// collaborators sit behind `Arc`s.
#[derive(Clone, Debug)]
pub struct AppState {
    pub converter: Converter,
}

impl AppState {
    pub fn new(converter: Converter) -> Self {
        Self { converter }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/convert", post(convert_handler))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await
}
