use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::users::models::User;
use crate::shared::constants::MAX_PAGE_SIZE;
use crate::shared::types::{page_offset, SortDirection};

/// Page size when browsing without a search term
pub const BROWSE_PAGE_SIZE: i64 = 10;
/// Page size when searching by email
pub const SEARCH_PAGE_SIZE: i64 = 50;

/// Query params for listing users
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Case-insensitive email substring
    pub q: Option<String>,
    /// Sort field: `email` (default), `name` or `role`
    pub sort: Option<String>,
    /// `asc` (default) or `desc`
    pub dir: Option<String>,
    /// Page number (1-indexed)
    pub page: Option<i64>,
    /// Items per page (default 10, or 50 when searching; max 100)
    pub page_size: Option<i64>,
}

/// Sortable user fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSortField {
    #[default]
    Email,
    Name,
    Role,
}

impl UserSortField {
    /// Unknown fields fall back to `email`
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => UserSortField::Name,
            Some("role") => UserSortField::Role,
            _ => UserSortField::Email,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserSortField::Email => "email",
            UserSortField::Name => "name",
            UserSortField::Role => "role",
        }
    }
}

impl ListUsersQuery {
    /// Trimmed search term, `None` when blank
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn sort_field(&self) -> UserSortField {
        UserSortField::from_param(self.sort.as_deref())
    }

    pub fn direction(&self) -> SortDirection {
        match self.dir.as_deref() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        let default = if self.search().is_some() {
            SEARCH_PAGE_SIZE
        } else {
            BROWSE_PAGE_SIZE
        };
        self.page_size.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        page_offset(self.page(), self.limit())
    }
}

/// Request DTO for changing a user's role
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleDto {
    #[validate(length(min = 1, max = 64, message = "Role must be 1-64 characters"))]
    pub role: String,
}

/// Response DTO for a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseDto {
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub provider: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_hex(),
            name: u.name,
            username: u.username,
            email: u.email,
            role: u.role,
            provider: u.provider,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}
