#[cfg(test)]
use std::path::{Path, PathBuf};

/// Write a credentials file holding a bcrypt hash of `password`
#[cfg(test)]
pub fn write_credentials_file(dir: &Path, username: &str, password: &str) -> PathBuf {
    // Minimum cost keeps the test suite fast
    let hash = bcrypt::hash(password, 4).unwrap();
    let path = dir.join("credentials.json");
    let body = serde_json::json!({ "username": username, "password_hash": hash });
    std::fs::write(&path, body.to_string()).unwrap();
    path
}

#[cfg(test)]
use crate::features::auth::model::AdminSession;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn create_admin_session() -> AdminSession {
    AdminSession {
        username: "admin".to_string(),
        expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
    }
}

#[cfg(test)]
async fn inject_admin_session_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_session());
    next.run(request).await
}

/// Wrap a feature router so handlers see an authenticated session
#[cfg(test)]
pub fn with_admin_session(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_session_middleware))
}
