//! HTTP API for the secrets engine

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        // Configuration
        .route(
            "/v1/config",
            post(handlers::write_config)
                .get(handlers::read_config)
                .delete(handlers::delete_config),
        )
        // Roles
        .route("/v1/roles", get(handlers::list_roles))
        .route(
            "/v1/roles/{name}",
            post(handlers::write_role)
                .get(handlers::read_role)
                .delete(handlers::delete_role),
        )
        // Credentials
        .route("/v1/creds/{name}", get(handlers::issue_creds))
        // Leases
        .route("/v1/leases/renew", post(handlers::renew_lease))
        .route("/v1/leases/revoke", post(handlers::revoke_lease))
        .route("/v1/leases/{lease_id}", get(handlers::lookup_lease))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
