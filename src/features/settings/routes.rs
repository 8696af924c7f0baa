use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::settings::handlers;
use crate::features::settings::services::SettingsService;

/// Settings routes, mounted under `/api/admin`
pub fn routes(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route("/settings", get(handlers::get_settings))
        .route("/settings/test", post(handlers::test_settings))
        .route("/settings/save", post(handlers::save_settings))
        .route("/settings/apply", post(handlers::apply_settings))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::MongoHandle;
    use crate::shared::test_helpers::with_admin_session;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_and_save_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db_config.json");
        let db = Arc::new(MongoHandle::disconnected(
            "mongodb://localhost:27017/",
            "LibreChat",
            Duration::from_millis(10),
        ));
        let service = Arc::new(SettingsService::new(db, path.clone()));
        let app = Router::new().nest("/api/admin", with_admin_session(routes(service)));
        let server = TestServer::new(app).unwrap();

        let body: Value = server.get("/api/admin/settings").await.json();
        assert_eq!(body["data"]["db"], "LibreChat");
        assert_eq!(body["data"]["connected"], false);

        server
            .post("/api/admin/settings/save")
            .json(&json!({ "uri": "mongodb://other:27017/", "db": "Other" }))
            .await
            .assert_status_ok();
        assert!(path.exists());

        server
            .post("/api/admin/settings/save")
            .json(&json!({ "uri": "redis://other", "db": "Other" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
