use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .with_state(service)
}

/// Protected auth routes (require a valid session)
pub fn protected_routes() -> Router {
    Router::new().route("/api/auth/me", get(handlers::get_me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::middleware::auth_middleware;
    use crate::features::auth::JwtValidator;
    use crate::shared::test_helpers::write_credentials_file;
    use axum::http::{header, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn server(credentials: std::path::PathBuf) -> TestServer {
        let validator = Arc::new(JwtValidator::new("test-secret", Duration::from_secs(600)));
        let service = Arc::new(AuthService::new(credentials, validator.clone(), false));

        let app = Router::new()
            .merge(public_routes(service))
            .merge(protected_routes().route_layer(axum::middleware::from_fn_with_state(
                validator,
                auth_middleware,
            )));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_login_then_me_with_bearer_token() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(write_credentials_file(dir.path(), "admin", "s3cret"));

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "s3cret" }))
            .await;
        response.assert_status_ok();
        let cookie = response.header(header::SET_COOKIE);
        assert!(cookie.to_str().unwrap().starts_with("admin_session="));
        let body: Value = response.json();
        let token = body["data"]["access_token"].as_str().unwrap().to_string();

        let me = server
            .get("/api/auth/me")
            .authorization_bearer(token)
            .await;
        me.assert_status_ok();
        let body: Value = me.json();
        assert_eq!(body["data"]["username"], "admin");
    }

    #[tokio::test]
    async fn test_me_without_session_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(write_credentials_file(dir.path(), "admin", "s3cret"));

        server
            .get("/api/auth/me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_password_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(write_credentials_file(dir.path(), "admin", "s3cret"));

        server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "wrong" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(write_credentials_file(dir.path(), "admin", "s3cret"));

        let response = server.post("/api/auth/logout").await;

        response.assert_status_ok();
        let cookie = response.header(header::SET_COOKIE);
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }
}
