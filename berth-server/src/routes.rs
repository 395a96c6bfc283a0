use crate::health;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with the built-in endpoints
pub fn build_router(state: health::AppState) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        // Add shared state
        .with_state(state)
        // CORS middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
