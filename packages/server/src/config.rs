use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Secret used when none is configured. Only suitable for local development.
pub const DEFAULT_SECRET_KEY: &str = "your_default_secret_key";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Signs session cookies.
    pub secret_key: String,
    /// Session lifetime in hours.
    pub session_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding raw uploaded CSV files.
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: u64,
    /// Accepted file extensions, compared case-insensitively.
    pub allowed_extensions: Vec<String>,
}

impl StorageConfig {
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CSVLENS_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite://instance/site.db?mode=rwc")?
            .set_default("auth.secret_key", DEFAULT_SECRET_KEY)?
            .set_default("auth.session_hours", 24)?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.max_upload_size", 16 * 1024 * 1024)?
            .set_default("storage.allowed_extensions", vec!["csv"])?
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., CSVLENS__AUTH__SECRET_KEY)
            .add_source(
                Environment::with_prefix("CSVLENS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("storage.allowed_extensions")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn uses_default_secret(&self) -> bool {
        self.auth.secret_key == DEFAULT_SECRET_KEY
    }
}
