use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mongodb::error::ErrorKind;

use crate::core::config::SavedDbConfig;
use crate::core::database::{self, redact_uri, MongoHandle};
use crate::core::error::{AppError, Result};
use crate::features::settings::dtos::{ConnectionTestDto, DbSettingsDto, DbSettingsResponseDto};
use crate::shared::validation::is_mongo_uri;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ERROR_CHARS: usize = 100;

pub struct SettingsService {
    db: Arc<MongoHandle>,
    config_path: PathBuf,
}

impl SettingsService {
    pub fn new(db: Arc<MongoHandle>, config_path: PathBuf) -> Self {
        Self { db, config_path }
    }

    pub async fn current(&self) -> DbSettingsResponseDto {
        let (uri, db) = self.db.target().await;
        DbSettingsResponseDto {
            uri,
            db,
            connected: self.db.is_connected().await,
        }
    }

    /// Connect to the submitted target with a throwaway client.
    ///
    /// An unreachable server is a failed test, not an error response.
    pub async fn test_connection(&self, dto: DbSettingsDto) -> Result<ConnectionTestDto> {
        let dto = checked(dto)?;
        tracing::info!("Testing MongoDB connection to {} (db: {})", redact_uri(&dto.uri), dto.db);

        let started = Instant::now();
        let (client, database) = match database::connect(&dto.uri, &dto.db, TEST_TIMEOUT).await {
            Ok(connection) => connection,
            Err(e) => return Ok(failed_test(&e)),
        };

        let outcome = async {
            let names = client.list_database_names(None, None).await?;
            if !names.iter().any(|n| n == &dto.db) {
                return Ok(ConnectionTestDto {
                    ok: false,
                    message: format!("Database '{}' does not exist on server", dto.db),
                    latency_ms: None,
                    collections: None,
                });
            }

            let collections = database.list_collection_names(None).await?.len();
            let latency_ms = started.elapsed().as_millis() as u64;
            Ok::<_, mongodb::error::Error>(ConnectionTestDto {
                ok: true,
                message: format!(
                    "Connection successful to {} ({}ms, {} collections)",
                    dto.db, latency_ms, collections
                ),
                latency_ms: Some(latency_ms),
                collections: Some(collections),
            })
        }
        .await;
        client.shutdown().await;

        Ok(outcome.unwrap_or_else(|e| failed_test(&e)))
    }

    /// Persist the target; it replaces `MONGO_URI`/`MONGO_DB` on the next start
    pub async fn save(&self, dto: DbSettingsDto) -> Result<DbSettingsResponseDto> {
        let dto = checked(dto)?;
        self.write_config(&dto).await?;
        tracing::info!("Saved database settings (db: {})", dto.db);

        Ok(DbSettingsResponseDto {
            uri: dto.uri,
            db: dto.db,
            connected: self.db.is_connected().await,
        })
    }

    /// Persist the target and switch the live connection to it
    pub async fn apply(&self, dto: DbSettingsDto) -> Result<DbSettingsResponseDto> {
        let dto = checked(dto)?;
        self.write_config(&dto).await?;

        self.db.reload(&dto.uri, &dto.db).await.map_err(|e| match e {
            AppError::Database(e) => {
                AppError::ServiceUnavailable(format!("Could not connect: {}", truncate(&e.to_string())))
            }
            other => other,
        })?;

        Ok(self.current().await)
    }

    async fn write_config(&self, dto: &DbSettingsDto) -> Result<()> {
        if let Some(dir) = self.config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::Internal(format!("Cannot create {}: {}", dir.display(), e))
            })?;
        }

        let saved = SavedDbConfig {
            uri: dto.uri.clone(),
            db: dto.db.clone(),
        };
        let body = serde_json::to_string_pretty(&saved)
            .map_err(|e| AppError::Internal(format!("Cannot encode settings: {}", e)))?;

        tokio::fs::write(&self.config_path, body).await.map_err(|e| {
            AppError::Internal(format!(
                "Cannot write {}: {}",
                self.config_path.display(),
                e
            ))
        })
    }
}

fn checked(dto: DbSettingsDto) -> Result<DbSettingsDto> {
    let dto = dto.trimmed();
    if dto.uri.is_empty() || dto.db.is_empty() {
        return Err(AppError::Validation(
            "MongoDB URI and database name are required".to_string(),
        ));
    }
    if !is_mongo_uri(&dto.uri) {
        return Err(AppError::Validation(
            "URI must start with mongodb:// or mongodb+srv://".to_string(),
        ));
    }
    Ok(dto)
}

fn failed_test(error: &mongodb::error::Error) -> ConnectionTestDto {
    tracing::warn!("MongoDB connection test failed: {}", error);
    let message = match *error.kind {
        ErrorKind::ServerSelection { .. } => "Connection timeout - server unreachable".to_string(),
        _ => format!("Connection failed: {}", truncate(&error.to_string())),
    };

    ConnectionTestDto {
        ok: false,
        message,
        latency_ms: None,
        collections: None,
    }
}

fn truncate(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::load_saved_db_config;

    fn service(path: PathBuf) -> SettingsService {
        let db = Arc::new(MongoHandle::disconnected(
            "mongodb://localhost:27017/",
            "LibreChat",
            Duration::from_millis(10),
        ));
        SettingsService::new(db, path)
    }

    fn dto(uri: &str, db: &str) -> DbSettingsDto {
        DbSettingsDto {
            uri: uri.to_string(),
            db: db.to_string(),
        }
    }

    #[tokio::test]
    async fn test_current_reports_disconnected_target() {
        let dir = tempfile::tempdir().unwrap();
        let current = service(dir.path().join("db_config.json")).current().await;

        assert_eq!(current.uri, "mongodb://localhost:27017/");
        assert_eq!(current.db, "LibreChat");
        assert!(!current.connected);
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("db_config.json");
        let service = service(path.clone());

        let saved = service
            .save(dto(" mongodb://db.internal:27017/ ", " Chat "))
            .await
            .unwrap();

        assert_eq!(saved.uri, "mongodb://db.internal:27017/");
        assert_eq!(
            load_saved_db_config(&path).unwrap(),
            Some(SavedDbConfig {
                uri: "mongodb://db.internal:27017/".to_string(),
                db: "Chat".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_scheme_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db_config.json");

        let result = service(path.clone())
            .save(dto("http://localhost:27017", "LibreChat"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_blank_database_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let result = service(dir.path().join("db_config.json"))
            .test_connection(dto("mongodb://localhost:27017/", "   "))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_truncate_limits_characters() {
        let long = "é".repeat(300);
        assert_eq!(truncate(&long).chars().count(), MAX_ERROR_CHARS);
        assert_eq!(truncate("short"), "short");
    }
}
