use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::files::handlers;
use crate::features::files::services::FileService;

/// File monitoring routes, mounted under `/api/admin`
pub fn routes(service: Arc<FileService>) -> Router {
    Router::new()
        .route("/files", get(handlers::list_files))
        .route("/files/users", get(handlers::list_uploaders))
        .route("/files/export", get(handlers::export_files))
        .with_state(service)
}
