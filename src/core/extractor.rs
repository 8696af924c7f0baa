use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AdminSession;

/// JSON body extractor whose failures render through the `ApiResponse` envelope
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(AppJsonRejection)
    }
}

pub struct AppJsonRejection(JsonRejection);

impl AppJsonRejection {
    fn message(&self) -> String {
        match &self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
            JsonRejection::JsonSyntaxError(err) => format!("Malformed JSON: {}", err.body_text()),
            JsonRejection::MissingJsonContentType(_) => {
                "Request body must be sent as application/json".to_string()
            }
            JsonRejection::BytesRejection(_) => "Could not read request body".to_string(),
            other => other.body_text(),
        }
    }
}

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        AppError::BadRequest(self.message()).into_response()
    }
}

/// Session placed in the request extensions by `auth_middleware`.
///
/// A session that expired while the request was queued is refused as well.
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<AdminSession>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Admin login required".to_string()))?;

        if session.expires_at <= Utc::now() {
            return Err(AppError::Unauthorized(
                "Admin session expired, log in again".to_string(),
            ));
        }
        Ok(session)
    }
}
