use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Authenticated admin session, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminSession {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Contents of the credentials file
#[derive(Debug, Clone, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    /// bcrypt hash of the admin password
    pub password_hash: String,
}

/// JWT claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub kind: String,
}

pub const SESSION_TOKEN_KIND: &str = "admin_session";
