use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::users::dtos::{ListUsersQuery, UpdateRoleDto, UserResponseDto};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Meta};

/// List users
///
/// Without `q` the first page holds 10 users; a search returns up to 50.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Database is not connected")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(service): State<Arc<UserService>>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (users, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(users),
        None,
        Some(Meta::paged(total, query.page(), query.limit())),
    )))
}

/// Change a user's role
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/role",
    params(
        ("id" = String, Path, description = "User id")
    ),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Invalid id or role"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(service): State<Arc<UserService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateRoleDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.update_role(&id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("Role updated".to_string()),
        None,
    )))
}
