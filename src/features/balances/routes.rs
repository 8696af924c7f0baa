use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::balances::handlers;
use crate::features::balances::services::BalanceService;

/// Balance routes, mounted under `/api/admin`
pub fn routes(service: Arc<BalanceService>) -> Router {
    Router::new()
        .route("/balances", get(handlers::list_balances))
        .route("/balances/refill-units", get(handlers::list_refill_units))
        .route("/balances/{id}", put(handlers::update_balance))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::MongoHandle;
    use crate::features::users::UserService;
    use crate::shared::test_helpers::with_admin_session;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn server() -> TestServer {
        let db = Arc::new(MongoHandle::disconnected(
            "mongodb://localhost:27017/",
            "LibreChat",
            Duration::from_millis(10),
        ));
        let users = Arc::new(UserService::new(db.clone(), "users"));
        let service = Arc::new(BalanceService::new(db, users));
        let app = Router::new().nest("/api/admin", with_admin_session(routes(service)));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_refill_units_need_no_database() {
        let response = server().get("/api/admin/balances/refill-units").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body["data"],
            json!(["seconds", "minutes", "hours", "days", "weeks", "months"])
        );
    }

    #[tokio::test]
    async fn test_negative_refill_amount_is_rejected() {
        server()
            .put("/api/admin/balances/64b7f0c2a1b2c3d4e5f60718")
            .json(&json!({ "refillAmount": -5 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        server()
            .put("/api/admin/balances/not-an-id")
            .json(&json!({ "tokenCredits": "100" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
