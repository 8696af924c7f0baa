use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};

use crate::core::error::Result;
use crate::features::tokens::dtos::{AgentOptionDto, TokenUsageQuery, TokenUsageRowDto};
use crate::features::tokens::services::TokenService;
use crate::shared::spreadsheet::xlsx_attachment;
use crate::shared::types::{ApiResponse, Meta};

/// Daily token usage per user and model
#[utoipa::path(
    get,
    path = "/api/admin/tokens",
    params(TokenUsageQuery),
    responses(
        (status = 200, description = "Page of usage rows", body = ApiResponse<Vec<TokenUsageRowDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Database is not connected")
    ),
    tag = "tokens",
    security(("bearer_auth" = []))
)]
pub async fn list_usage(
    State(service): State<Arc<TokenService>>,
    Query(query): Query<TokenUsageQuery>,
) -> Result<Json<ApiResponse<Vec<TokenUsageRowDto>>>> {
    let (rows, total) = service.usage_page(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(rows),
        None,
        Some(Meta::paged(total, query.page(), query.per_page())),
    )))
}

/// Agents available as a model filter
#[utoipa::path(
    get,
    path = "/api/admin/tokens/agents",
    responses(
        (status = 200, description = "Agents sorted by name", body = ApiResponse<Vec<AgentOptionDto>>),
    ),
    tag = "tokens",
    security(("bearer_auth" = []))
)]
pub async fn list_agents(
    State(service): State<Arc<TokenService>>,
) -> Result<Json<ApiResponse<Vec<AgentOptionDto>>>> {
    let agents = service.agents().await?;
    Ok(Json(ApiResponse::success(Some(agents), None, None)))
}

/// Export the full usage report
#[utoipa::path(
    get,
    path = "/api/admin/tokens/export",
    params(TokenUsageQuery),
    responses(
        (status = 200, description = "XLSX workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ),
    tag = "tokens",
    security(("bearer_auth" = []))
)]
pub async fn export_usage(
    State(service): State<Arc<TokenService>>,
    Query(query): Query<TokenUsageQuery>,
) -> Result<Response> {
    let bytes = service.export(&query).await?;
    Ok(xlsx_attachment(&query.export_filename(), bytes))
}
