use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use super::handlers;
use crate::core_state::CoreState;

/// Build the application router. Every response carries
/// `Cache-Control: no-store`.
pub fn build_router(core: Arc<CoreState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/consent", post(handlers::consent))
        .route("/analyze", post(handlers::analyze))
        .route("/new-analysis", post(handlers::new_analysis))
        .route("/api/state", get(handlers::session_state))
        .route("/health", get(handlers::health))
        .with_state(core)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
