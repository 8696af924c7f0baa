use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::cookie::{build_clear_cookie, build_session_cookie};
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto, SessionResponseDto};
use crate::features::auth::model::AdminSession;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// Login with the shared admin credential
///
/// The session token is returned in the body and set as an `HttpOnly` cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Credentials are not configured")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Response> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let login = service.login(dto).await?;
    let cookie = build_session_cookie(&login.access_token, login.expires_in, service.cookie_secure());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::success(
            Some(login),
            Some("Logged in".to_string()),
            None,
        )),
    )
        .into_response())
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
    ),
    tag = "auth"
)]
pub async fn logout(State(service): State<Arc<AuthService>>) -> Response {
    (
        [(header::SET_COOKIE, build_clear_cookie(service.cookie_secure()))],
        Json(ApiResponse::<()>::success(
            None,
            Some("Logged out".to_string()),
            None,
        )),
    )
        .into_response()
}

/// Get the current admin session
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session", body = ApiResponse<SessionResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(session: AdminSession) -> Result<Json<ApiResponse<SessionResponseDto>>> {
    Ok(Json(ApiResponse::success(Some(session.into()), None, None)))
}
