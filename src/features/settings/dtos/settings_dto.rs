use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Connection target submitted by the settings form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DbSettingsDto {
    #[validate(length(min = 1, message = "MongoDB URI is required"))]
    #[schema(example = "mongodb://localhost:27017/")]
    pub uri: String,
    #[validate(length(min = 1, max = 64, message = "Database name must be 1-64 characters"))]
    #[schema(example = "LibreChat")]
    pub db: String,
}

impl DbSettingsDto {
    pub fn trimmed(self) -> Self {
        Self {
            uri: self.uri.trim().to_string(),
            db: self.db.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DbSettingsResponseDto {
    pub uri: String,
    pub db: String,
    pub connected: bool,
}

/// Outcome of a connection test
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionTestDto {
    pub ok: bool,
    pub message: String,
    pub latency_ms: Option<u64>,
    pub collections: Option<usize>,
}
