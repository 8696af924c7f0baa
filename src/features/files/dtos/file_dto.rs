use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::format::parse_date;
use crate::shared::types::{page_offset, SortDirection};

pub const DEFAULT_FILES_PER_PAGE: i64 = 20;
pub const MIN_FILES_PER_PAGE: i64 = 5;
pub const MAX_FILES_PER_PAGE: i64 = 200;

/// Filters shared by the file list and its export
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListFilesQuery {
    /// Inclusive start date, `YYYY-MM-DD`
    pub start: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`
    pub end: Option<String>,
    /// Uploader id
    pub user: Option<String>,
    /// `createdAt` (default), `filename`, `type`, `bytes` or `user`
    pub sort: Option<String>,
    /// `desc` (default) or `asc`
    pub order: Option<String>,
    pub page: Option<i64>,
    /// Items per page, 5-200 (default 20)
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileSortKey {
    #[default]
    CreatedAt,
    Filename,
    Type,
    Bytes,
    /// Uploader display name, sorted after the name lookup
    User,
}

impl FileSortKey {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("filename") => FileSortKey::Filename,
            Some("type") => FileSortKey::Type,
            Some("bytes") => FileSortKey::Bytes,
            Some("user") => FileSortKey::User,
            _ => FileSortKey::CreatedAt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileSortKey::CreatedAt => "createdAt",
            FileSortKey::Filename => "filename",
            FileSortKey::Type => "type",
            FileSortKey::Bytes => "bytes",
            FileSortKey::User => "user",
        }
    }

    /// Field the database sorts on; `None` for the joined user name
    pub fn mongo_field(&self) -> Option<&'static str> {
        match self {
            FileSortKey::User => None,
            other => Some(other.as_str()),
        }
    }
}

impl ListFilesQuery {
    fn trimmed(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_date(self.start.as_deref())
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        parse_date(self.end.as_deref())
    }

    /// Uploader filter; an id that does not parse is ignored
    pub fn user_id(&self) -> Option<ObjectId> {
        Self::trimmed(&self.user).and_then(|u| ObjectId::parse_str(u).ok())
    }

    pub fn sort_key(&self) -> FileSortKey {
        FileSortKey::from_param(self.sort.as_deref())
    }

    pub fn direction(&self) -> SortDirection {
        match self.order.as_deref() {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(DEFAULT_FILES_PER_PAGE)
            .clamp(MIN_FILES_PER_PAGE, MAX_FILES_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        page_offset(self.page(), self.per_page())
    }

    /// `files_{start}_{end}_{user}_{sort}_{order}.xlsx`, with `all` for unset filters
    pub fn export_filename(&self) -> String {
        format!(
            "files_{}_{}_{}_{}_{}.xlsx",
            Self::trimmed(&self.start).unwrap_or("all"),
            Self::trimmed(&self.end).unwrap_or("all"),
            Self::trimmed(&self.user).unwrap_or("all"),
            self.sort_key().as_str(),
            self.direction().as_str(),
        )
    }
}

/// One row of the file listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRowDto {
    pub id: String,
    pub file_id: Option<String>,
    pub filename: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub bytes: Option<i64>,
    /// Human-readable size, e.g. `1.50 KB`
    pub size: String,
    /// Uploader name, or the uploader id when the user is gone
    pub user: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Entry of the uploader filter
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileUserOptionDto {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_page_is_clamped() {
        let mut q = ListFilesQuery::default();
        assert_eq!(q.per_page(), DEFAULT_FILES_PER_PAGE);
        q.per_page = Some(1);
        assert_eq!(q.per_page(), MIN_FILES_PER_PAGE);
        q.per_page = Some(10_000);
        assert_eq!(q.per_page(), MAX_FILES_PER_PAGE);
    }

    #[test]
    fn test_invalid_filters_are_ignored() {
        let q = ListFilesQuery {
            start: Some("yesterday".to_string()),
            user: Some("not-an-object-id".to_string()),
            page: Some(-3),
            ..Default::default()
        };

        assert_eq!(q.start_date(), None);
        assert_eq!(q.user_id(), None);
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn test_sort_defaults_to_newest_first() {
        let q = ListFilesQuery::default();
        assert_eq!(q.sort_key(), FileSortKey::CreatedAt);
        assert_eq!(q.direction(), SortDirection::Desc);
        assert_eq!(FileSortKey::User.mongo_field(), None);
        assert_eq!(FileSortKey::Bytes.mongo_field(), Some("bytes"));
    }

    #[test]
    fn test_export_filename() {
        let q = ListFilesQuery {
            start: Some("2025-01-01".to_string()),
            sort: Some("user".to_string()),
            order: Some("asc".to_string()),
            ..Default::default()
        };

        assert_eq!(q.export_filename(), "files_2025-01-01_all_all_user_asc.xlsx");
        assert_eq!(
            ListFilesQuery::default().export_filename(),
            "files_all_all_all_createdAt_desc.xlsx"
        );
    }

    #[test]
    fn test_offset_for_huge_page_does_not_overflow() {
        let q = ListFilesQuery {
            page: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(q.offset(), i64::MAX);

        let q = ListFilesQuery {
            page: Some(3),
            per_page: Some(50),
            ..Default::default()
        };
        assert_eq!(q.offset(), 100);
    }
}
