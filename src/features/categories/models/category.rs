use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Agent category document as stored by LibreChat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// 32-hex-char identifier kept alongside `_id`
    #[serde(rename = "id", default)]
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_active: bool,
    /// Created through the admin API; LibreChat's built-in categories lack it
    #[serde(default)]
    pub custom: bool,
    #[serde(default, with = "crate::shared::bson_datetime::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::bson_datetime::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "__v", default)]
    pub version: i32,
}

/// Direction of a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl std::str::FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(format!("Invalid move direction '{}'", other)),
        }
    }
}

impl std::fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveDirection::Up => write!(f, "up"),
            MoveDirection::Down => write!(f, "down"),
        }
    }
}
