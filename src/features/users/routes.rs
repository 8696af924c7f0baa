use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

/// User routes, mounted under `/api/admin`
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/{id}/role", patch(handlers::update_role))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::MongoHandle;
    use crate::shared::test_helpers::with_admin_session;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::time::Duration;

    fn server() -> TestServer {
        let db = Arc::new(MongoHandle::disconnected(
            "mongodb://localhost:27017/",
            "LibreChat",
            Duration::from_millis(10),
        ));
        let service = Arc::new(UserService::new(db, "users"));
        let app = Router::new().nest("/api/admin", with_admin_session(routes(service)));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_list_reports_unavailable_database() {
        server()
            .get("/api/admin/users")
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_empty_role_is_rejected() {
        server()
            .patch("/api/admin/users/64b7f0c2a1b2c3d4e5f60718/role")
            .json(&json!({ "role": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
