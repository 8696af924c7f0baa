use std::path::PathBuf;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto};
use crate::features::auth::model::AdminCredentials;
use crate::features::auth::JwtValidator;

/// Service for the shared admin credential
pub struct AuthService {
    credentials_path: PathBuf,
    validator: Arc<JwtValidator>,
    cookie_secure: bool,
}

impl AuthService {
    pub fn new(credentials_path: PathBuf, validator: Arc<JwtValidator>, cookie_secure: bool) -> Self {
        Self {
            credentials_path,
            validator,
            cookie_secure,
        }
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Verify the submitted credential and issue a session token
    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let credentials = self.load_credentials().await?;
        let username = dto.username.trim().to_string();

        let hash = credentials.password_hash.clone();
        let password = dto.password;
        let password_ok = tokio::task::spawn_blocking(move || {
            bcrypt::verify(password, &hash).unwrap_or(false)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

        if username != credentials.username || !password_ok {
            tracing::warn!("Rejected admin login for '{}'", username);
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        let (access_token, session) = self.validator.issue(&username)?;
        tracing::info!("Admin '{}' logged in", session.username);

        Ok(LoginResponseDto {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.validator.session_ttl().as_secs(),
            username: session.username,
        })
    }

    async fn load_credentials(&self) -> Result<AdminCredentials> {
        let raw = tokio::fs::read_to_string(&self.credentials_path)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to read credentials file {}: {}",
                    self.credentials_path.display(),
                    e
                );
                AppError::ServiceUnavailable("Credentials are not configured".to_string())
            })?;

        let credentials: AdminCredentials = serde_json::from_str(&raw).map_err(|e| {
            tracing::error!(
                "Invalid credentials file {}: {}",
                self.credentials_path.display(),
                e
            );
            AppError::ServiceUnavailable("Credentials are not configured".to_string())
        })?;

        if credentials.username.is_empty() || credentials.password_hash.is_empty() {
            return Err(AppError::ServiceUnavailable(
                "Credentials are not configured".to_string(),
            ));
        }

        Ok(credentials)
    }
}
