use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::settings::dtos::{ConnectionTestDto, DbSettingsDto, DbSettingsResponseDto};
use crate::features::settings::services::SettingsService;
use crate::shared::types::ApiResponse;

/// Current connection target
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    responses(
        (status = 200, description = "Configured target", body = ApiResponse<DbSettingsResponseDto>),
    ),
    tag = "settings",
    security(("bearer_auth" = []))
)]
pub async fn get_settings(
    State(service): State<Arc<SettingsService>>,
) -> Json<ApiResponse<DbSettingsResponseDto>> {
    Json(ApiResponse::success(Some(service.current().await), None, None))
}

/// Test a connection without applying it
#[utoipa::path(
    post,
    path = "/api/admin/settings/test",
    request_body = DbSettingsDto,
    responses(
        (status = 200, description = "Test outcome; `ok` is false when the server cannot be used", body = ApiResponse<ConnectionTestDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "settings",
    security(("bearer_auth" = []))
)]
pub async fn test_settings(
    State(service): State<Arc<SettingsService>>,
    AppJson(dto): AppJson<DbSettingsDto>,
) -> Result<Json<ApiResponse<ConnectionTestDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = service.test_connection(dto).await?;
    Ok(Json(ApiResponse::success(Some(outcome), None, None)))
}

/// Save the connection target for the next start
#[utoipa::path(
    post,
    path = "/api/admin/settings/save",
    request_body = DbSettingsDto,
    responses(
        (status = 200, description = "Settings saved", body = ApiResponse<DbSettingsResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "settings",
    security(("bearer_auth" = []))
)]
pub async fn save_settings(
    State(service): State<Arc<SettingsService>>,
    AppJson(dto): AppJson<DbSettingsDto>,
) -> Result<Json<ApiResponse<DbSettingsResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let settings = service.save(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(settings),
        Some("Configuration saved".to_string()),
        None,
    )))
}

/// Save the connection target and reconnect
#[utoipa::path(
    post,
    path = "/api/admin/settings/apply",
    request_body = DbSettingsDto,
    responses(
        (status = 200, description = "Connection applied", body = ApiResponse<DbSettingsResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 503, description = "New target unreachable; previous connection kept")
    ),
    tag = "settings",
    security(("bearer_auth" = []))
)]
pub async fn apply_settings(
    State(service): State<Arc<SettingsService>>,
    AppJson(dto): AppJson<DbSettingsDto>,
) -> Result<Json<ApiResponse<DbSettingsResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let settings = service.apply(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(settings),
        Some("MongoDB connection applied".to_string()),
        None,
    )))
}
