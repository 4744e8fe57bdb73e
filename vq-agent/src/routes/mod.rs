//! HTTP routes.

pub mod agent;
pub mod health;
pub mod memory;

use std::sync::Arc;

use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the service router.
///
/// CORS is wide open; the mobile app calls this service directly from the
/// device with its own auth headers.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ]);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(agent::router())
        .merge(memory::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
