use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// MongoDB connection and collection naming
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub users_collection: String,
    pub categories_collection: String,
    pub server_selection_timeout: Duration,
    /// File written by the settings page; overrides `MONGO_URI`/`MONGO_DB` when present
    pub saved_config_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub credentials_path: PathBuf,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// On-disk shape of the saved connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDbConfig {
    #[serde(rename = "MONGO_URI")]
    pub uri: String,
    #[serde(rename = "MONGO_DB")]
    pub db: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub const DEFAULT_URI: &'static str = "mongodb://localhost:27017/";
    pub const DEFAULT_DB: &'static str = "LibreChat";
    const DEFAULT_SERVER_SELECTION_TIMEOUT_MS: u64 = 3000;
    const DEFAULT_SAVED_CONFIG_PATH: &'static str = "config/db_config.json";

    pub fn from_env() -> Result<Self, String> {
        let uri = env::var("MONGO_URI").unwrap_or_else(|_| Self::DEFAULT_URI.to_string());
        let name = env::var("MONGO_DB").unwrap_or_else(|_| Self::DEFAULT_DB.to_string());
        let users_collection = env::var("USERS_COL").unwrap_or_else(|_| "users".to_string());
        let categories_collection =
            env::var("CATS_COL").unwrap_or_else(|_| "agentcategories".to_string());

        let timeout_ms = env::var("MONGO_SERVER_SELECTION_TIMEOUT_MS")
            .unwrap_or_else(|_| Self::DEFAULT_SERVER_SELECTION_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "MONGO_SERVER_SELECTION_TIMEOUT_MS must be a valid number".to_string())?;

        let saved_config_path = env::var("DB_CONFIG_FILE")
            .unwrap_or_else(|_| Self::DEFAULT_SAVED_CONFIG_PATH.to_string())
            .into();

        let mut config = Self {
            uri,
            name,
            users_collection,
            categories_collection,
            server_selection_timeout: Duration::from_millis(timeout_ms),
            saved_config_path,
        };
        config.apply_saved_config();
        Ok(config)
    }

    /// Override the connection target with the file saved from the settings page.
    ///
    /// A missing or malformed file leaves the environment values in place.
    pub fn apply_saved_config(&mut self) {
        match load_saved_db_config(&self.saved_config_path) {
            Ok(Some(saved)) => {
                tracing::info!(
                    "Using saved database settings from {}",
                    self.saved_config_path.display()
                );
                self.uri = saved.uri;
                self.name = saved.db;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(
                "Ignoring saved database settings at {}: {}",
                self.saved_config_path.display(),
                e
            ),
        }
    }
}

/// Read the saved connection settings, `Ok(None)` when the file does not exist.
pub fn load_saved_db_config(path: &std::path::Path) -> Result<Option<SavedDbConfig>, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    let saved: SavedDbConfig = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    if saved.uri.trim().is_empty() || saved.db.trim().is_empty() {
        return Err("MONGO_URI and MONGO_DB must not be empty".to_string());
    }
    Ok(Some(saved))
}

impl AuthConfig {
    const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;

    pub fn from_env() -> Result<Self, String> {
        let secret_key = env::var("SECRET_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "SECRET_KEY environment variable is required".to_string())?;

        let credentials_path = env::var("CREDENTIALS_FILE")
            .unwrap_or_else(|_| "credentials.json".to_string())
            .into();

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SESSION_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_TTL_SECS must be a valid number".to_string())?;

        let cookie_secure = matches!(
            env::var("AUTH_COOKIE_SECURE")
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
                .as_str(),
            "1" | "true" | "yes" | "on"
        );

        Ok(Self {
            secret_key,
            credentials_path,
            session_ttl: Duration::from_secs(session_ttl_secs),
            cookie_secure,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "LibreChat Admin API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Administration API for a LibreChat MongoDB database".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
