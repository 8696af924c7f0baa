use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::models::MoveDirection;
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, Meta};

/// List categories by order
#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses(
        (status = 200, description = "Categories sorted by order", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Database is not connected")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list().await?;
    let total = categories.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta::total(total)),
    )))
}

/// Create a category
///
/// Slug, value and label are derived from the name; the value gets a numeric
/// suffix when it is already taken. The new category is placed last.
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created".to_string()),
            None,
        )),
    ))
}

/// Move a category one step up or down
#[utoipa::path(
    post,
    path = "/api/admin/categories/{id}/move/{direction}",
    params(
        ("id" = String, Path, description = "Category id"),
        ("direction" = String, Path, description = "`up` or `down`")
    ),
    responses(
        (status = 200, description = "Category moved; returns the renumbered list", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 400, description = "Already at the boundary, or invalid id/direction"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn move_category(
    State(service): State<Arc<CategoryService>>,
    Path((id, direction)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let direction: MoveDirection = direction.parse().map_err(AppError::Validation)?;

    let categories = service.move_category(&id, direction).await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        Some("Category moved".to_string()),
        None,
    )))
}

/// Delete a custom category
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = String, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 403, description = "Built-in category"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted".to_string()),
        None,
    )))
}
