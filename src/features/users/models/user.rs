use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// LibreChat user document, reduced to the fields the admin reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, with = "crate::shared::bson_datetime::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::bson_datetime::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name for listings, falling back to the id when the user has none
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_hex())
    }
}
