use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::tokens::handlers;
use crate::features::tokens::services::TokenService;

/// Token usage routes, mounted under `/api/admin`
pub fn routes(service: Arc<TokenService>) -> Router {
    Router::new()
        .route("/tokens", get(handlers::list_usage))
        .route("/tokens/agents", get(handlers::list_agents))
        .route("/tokens/export", get(handlers::export_usage))
        .with_state(service)
}
