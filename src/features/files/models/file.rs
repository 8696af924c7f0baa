use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Metadata document LibreChat writes for every upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "file_id", default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub bytes: Option<i64>,
    /// Uploader
    #[serde(default)]
    pub user: Option<ObjectId>,
    #[serde(default, with = "crate::shared::bson_datetime::option")]
    pub created_at: Option<DateTime<Utc>>,
}
