use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Category routes, mounted under `/api/admin`
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/{id}", delete(handlers::delete_category))
        .route(
            "/categories/{id}/move/{direction}",
            post(handlers::move_category),
        )
        .with_state(service)
}
