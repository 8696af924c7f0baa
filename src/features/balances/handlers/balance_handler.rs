use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::balances::dtos::{BalanceRowDto, UpdateBalanceDto};
use crate::features::balances::models::REFILL_UNITS;
use crate::features::balances::services::BalanceService;
use crate::shared::types::{ApiResponse, Meta};

/// List balances, largest credit first
#[utoipa::path(
    get,
    path = "/api/admin/balances",
    responses(
        (status = 200, description = "All balances", body = ApiResponse<Vec<BalanceRowDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Database is not connected")
    ),
    tag = "balances",
    security(("bearer_auth" = []))
)]
pub async fn list_balances(
    State(service): State<Arc<BalanceService>>,
) -> Result<Json<ApiResponse<Vec<BalanceRowDto>>>> {
    let rows = service.list().await?;
    let total = rows.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(rows),
        None,
        Some(Meta::total(total)),
    )))
}

/// Accepted auto-refill interval units
#[utoipa::path(
    get,
    path = "/api/admin/balances/refill-units",
    responses(
        (status = 200, description = "Refill units", body = ApiResponse<Vec<String>>),
    ),
    tag = "balances",
    security(("bearer_auth" = []))
)]
pub async fn list_refill_units() -> Json<ApiResponse<Vec<&'static str>>> {
    Json(ApiResponse::success(Some(REFILL_UNITS.to_vec()), None, None))
}

/// Edit a balance
///
/// Sets `lastRefill` to now.
#[utoipa::path(
    put,
    path = "/api/admin/balances/{id}",
    params(
        ("id" = String, Path, description = "Balance id")
    ),
    request_body = UpdateBalanceDto,
    responses(
        (status = 200, description = "Balance updated", body = ApiResponse<BalanceRowDto>),
        (status = 400, description = "Invalid id, credits or refill unit"),
        (status = 404, description = "Balance not found")
    ),
    tag = "balances",
    security(("bearer_auth" = []))
)]
pub async fn update_balance(
    State(service): State<Arc<BalanceService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateBalanceDto>,
) -> Result<Json<ApiResponse<BalanceRowDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let row = service.update(&id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(row),
        Some("Balance updated".to_string()),
        None,
    )))
}
