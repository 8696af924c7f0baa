use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::Category;

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Display name; slug, value and label are derived from it.
    /// At most 100 characters once surrounding whitespace is trimmed.
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    /// Document id (`_id`)
    pub id: String,
    pub name: String,
    pub slug: String,
    pub value: String,
    pub label: String,
    pub description: String,
    pub order: i32,
    pub is_active: bool,
    pub custom: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id.to_hex(),
            name: c.name,
            slug: c.slug,
            value: c.value,
            label: c.label,
            description: c.description,
            order: c.order,
            is_active: c.is_active,
            custom: c.custom,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
