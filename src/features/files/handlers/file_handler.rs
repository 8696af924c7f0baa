use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};

use crate::core::error::Result;
use crate::features::files::dtos::{FileRowDto, FileUserOptionDto, ListFilesQuery};
use crate::features::files::services::FileService;
use crate::shared::spreadsheet::xlsx_attachment;
use crate::shared::types::{ApiResponse, Meta};

/// List uploaded files
#[utoipa::path(
    get,
    path = "/api/admin/files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Page of files", body = ApiResponse<Vec<FileRowDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Database is not connected")
    ),
    tag = "files",
    security(("bearer_auth" = []))
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileRowDto>>>> {
    let (rows, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(rows),
        None,
        Some(Meta::paged(total, query.page(), query.per_page())),
    )))
}

/// Users that uploaded at least one file
#[utoipa::path(
    get,
    path = "/api/admin/files/users",
    responses(
        (status = 200, description = "Uploaders sorted by name", body = ApiResponse<Vec<FileUserOptionDto>>),
    ),
    tag = "files",
    security(("bearer_auth" = []))
)]
pub async fn list_uploaders(
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<Vec<FileUserOptionDto>>>> {
    let uploaders = service.uploaders().await?;
    let total = uploaders.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(uploaders),
        None,
        Some(Meta::total(total)),
    )))
}

/// Export the filtered file list
///
/// Honors the filters and sort of the list endpoint; pagination is ignored.
#[utoipa::path(
    get,
    path = "/api/admin/files/export",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "XLSX workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ),
    tag = "files",
    security(("bearer_auth" = []))
)]
pub async fn export_files(
    State(service): State<Arc<FileService>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Response> {
    let bytes = service.export(&query).await?;
    Ok(xlsx_attachment(&query.export_filename(), bytes))
}
