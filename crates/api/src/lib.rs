//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for the banking and treasury services
//! - Error mapping onto JSON responses

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tally_core::Services;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Every domain service, over one set of repositories.
    pub services: Arc<Services>,
}

impl AppState {
    /// Wraps a service bundle.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self {
            services: Arc::new(services),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
