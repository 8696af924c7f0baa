use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;

use super::model::{AdminSession, SessionClaims, SESSION_TOKEN_KIND};
use crate::core::error::AppError;

/// Issues and validates HS256 session tokens signed with `SECRET_KEY`
pub struct JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: Duration,
}

impl JwtValidator {
    pub fn new(secret: &str, session_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn issue(&self, username: &str) -> Result<(String, AdminSession), AppError> {
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(self.session_ttl)
                .map_err(|e| AppError::Internal(format!("Invalid session TTL: {}", e)))?;

        let claims = SessionClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            kind: SESSION_TOKEN_KIND.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode session token: {}", e)))?;

        Ok((
            token,
            AdminSession {
                username: username.to_string(),
                expires_at,
            },
        ))
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminSession, AppError> {
        let validation = Validation::new(Algorithm::HS256);

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))?
            .claims;

        if claims.kind != SESSION_TOKEN_KIND {
            return Err(AppError::Unauthorized(
                "Token is not an admin session".to_string(),
            ));
        }

        let expires_at: DateTime<Utc> = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| AppError::Unauthorized("Invalid session expiry".to_string()))?;

        Ok(AdminSession {
            username: claims.sub,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_validate() {
        let validator = JwtValidator::new("test-secret", Duration::from_secs(3600));

        let (token, issued) = validator.issue("admin").unwrap();
        let session = validator.validate_token(&token).unwrap();

        assert_eq!(session.username, "admin");
        assert_eq!(session.expires_at.timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = JwtValidator::new("secret-a", Duration::from_secs(3600));
        let validator = JwtValidator::new("secret-b", Duration::from_secs(3600));

        let (token, _) = issuer.issue("admin").unwrap();

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let validator = JwtValidator::new("test-secret", Duration::from_secs(3600));
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "admin".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            kind: SESSION_TOKEN_KIND.to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let validator = JwtValidator::new("test-secret", Duration::from_secs(3600));
        assert!(validator.validate_token("not-a-jwt").is_err());
    }
}
