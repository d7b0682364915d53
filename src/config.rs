//! Configuration module for Dropshare.

use serde::Deserialize;
use std::path::Path;

use crate::file::DEFAULT_ALLOWED_MIME_TYPES;
use crate::{Result, ShareError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/dropshare.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Storage backend: "local" or "cloud".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Directory for locally stored uploads.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Accepted MIME types. An empty list accepts everything.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

fn default_backend() -> String {
    "local".to_string()
}

fn default_storage_path() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    100
}

fn default_allowed_mime_types() -> Vec<String> {
    DEFAULT_ALLOWED_MIME_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

/// Asset host (Cloudinary-compatible) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    /// Account cloud name.
    #[serde(default)]
    pub cloud_name: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret used to sign requests.
    #[serde(default)]
    pub api_secret: String,
    /// Remote folder uploads are placed in.
    #[serde(default = "default_cloud_folder")]
    pub folder: String,
    /// Base URL of the upload API.
    #[serde(default = "default_cloud_api_base")]
    pub api_base: String,
    /// Request timeout in seconds.
    #[serde(default = "default_cloud_timeout")]
    pub timeout_secs: u64,
}

fn default_cloud_folder() -> String {
    "file-sharing".to_string()
}

fn default_cloud_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_cloud_timeout() -> u64 {
    60
}

impl CloudConfig {
    /// Whether all credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_cloud_folder(),
            api_base: default_cloud_api_base(),
            timeout_secs: default_cloud_timeout(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Public base URL used when building share links (e.g. "https://share.example.com").
    /// When unset, links are built from the request Host header.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Whether to serve locally stored files under /uploads.
    #[serde(default = "default_serve_uploads")]
    pub serve_uploads: bool,
}

fn default_serve_uploads() -> bool {
    true
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            public_url: None,
            serve_uploads: default_serve_uploads(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/dropshare.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Asset host configuration.
    #[serde(default)]
    pub cloud: CloudConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShareError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShareError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DROPSHARE_DATABASE_PATH`: SQLite database path
    /// - `DROPSHARE_PORT`: HTTP port
    /// - `DROPSHARE_CLOUD_NAME`, `DROPSHARE_CLOUD_API_KEY`, `DROPSHARE_CLOUD_API_SECRET`:
    ///   asset host credentials
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = non_empty_env("DROPSHARE_DATABASE_PATH") {
            self.database.path = path;
        }

        if let Some(port) = non_empty_env("DROPSHARE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid DROPSHARE_PORT"),
            }
        }

        if let Some(name) = non_empty_env("DROPSHARE_CLOUD_NAME") {
            self.cloud.cloud_name = name;
        }
        if let Some(key) = non_empty_env("DROPSHARE_CLOUD_API_KEY") {
            self.cloud.api_key = key;
        }
        if let Some(secret) = non_empty_env("DROPSHARE_CLOUD_API_SECRET") {
            self.cloud.api_secret = secret;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The storage backend is neither "local" nor "cloud"
    /// - The cloud backend is selected without credentials
    /// - The upload size limit is zero
    /// - `web.public_url` is set but is not an http(s) URL
    pub fn validate(&self) -> Result<()> {
        match self.files.backend.as_str() {
            "local" => {}
            "cloud" => {
                if !self.cloud.has_credentials() {
                    return Err(ShareError::Config(
                        "Cloud storage is selected but cloud_name, api_key or api_secret is \
                         not set. Set them in config.toml or via DROPSHARE_CLOUD_* variables."
                            .to_string(),
                    ));
                }
            }
            other => {
                return Err(ShareError::Config(format!(
                    "unknown storage backend '{other}' (expected 'local' or 'cloud')"
                )));
            }
        }

        if self.files.max_upload_size_mb == 0 {
            return Err(ShareError::Config(
                "max_upload_size_mb must be greater than zero".to_string(),
            ));
        }

        if let Some(ref public_url) = self.web.public_url {
            let parsed = url::Url::parse(public_url).map_err(|e| {
                ShareError::Config(format!("invalid public_url '{public_url}': {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ShareError::Config(format!(
                    "public_url must be http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);

        assert_eq!(config.database.path, "data/dropshare.db");

        assert_eq!(config.files.backend, "local");
        assert_eq!(config.files.storage_path, "uploads");
        assert_eq!(config.files.max_upload_size_mb, 100);
        assert_eq!(config.files.max_upload_size_bytes(), 100 * 1024 * 1024);
        assert!(config
            .files
            .allowed_mime_types
            .contains(&"application/pdf".to_string()));

        assert!(config.cloud.cloud_name.is_empty());
        assert_eq!(config.cloud.folder, "file-sharing");
        assert_eq!(config.cloud.api_base, "https://api.cloudinary.com/v1_1");

        assert!(config.web.cors_origins.is_empty());
        assert!(config.web.public_url.is_none());
        assert!(config.web.serve_uploads);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/dropshare.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
path = "custom/db.sqlite"

[files]
backend = "cloud"
storage_path = "custom/uploads"
max_upload_size_mb = 20
allowed_mime_types = ["text/plain"]

[cloud]
cloud_name = "demo"
api_key = "key"
api_secret = "secret"
folder = "shared"
api_base = "http://localhost:9999/v1_1"
timeout_secs = 5

[web]
cors_origins = ["http://localhost:5173"]
public_url = "https://share.example.com"
serve_uploads = false

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "custom/db.sqlite");

        assert_eq!(config.files.backend, "cloud");
        assert_eq!(config.files.storage_path, "custom/uploads");
        assert_eq!(config.files.max_upload_size_mb, 20);
        assert_eq!(config.files.allowed_mime_types, vec!["text/plain"]);

        assert_eq!(config.cloud.cloud_name, "demo");
        assert_eq!(config.cloud.api_key, "key");
        assert_eq!(config.cloud.api_secret, "secret");
        assert_eq!(config.cloud.folder, "shared");
        assert_eq!(config.cloud.api_base, "http://localhost:9999/v1_1");
        assert_eq!(config.cloud.timeout_secs, 5);

        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(
            config.web.public_url.as_deref(),
            Some("https://share.example.com")
        );
        assert!(!config.web.serve_uploads);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 5000

[files]
max_upload_size_mb = 5
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.files.max_upload_size_mb, 5);

        // Defaults
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.files.backend, "local");
        assert!(!config.files.allowed_mime_types.is_empty());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "data/dropshare.db");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(ShareError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(matches!(result, Err(ShareError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides() {
        std::env::set_var("DROPSHARE_CLOUD_NAME", "env-cloud");
        std::env::set_var("DROPSHARE_CLOUD_API_KEY", "");

        let mut config = Config::default();
        config.cloud.api_key = "from-file".to_string();
        config.apply_env_overrides();

        assert_eq!(config.cloud.cloud_name, "env-cloud");
        // Empty values do not override
        assert_eq!(config.cloud.api_key, "from-file");

        std::env::remove_var("DROPSHARE_CLOUD_NAME");
        std::env::remove_var("DROPSHARE_CLOUD_API_KEY");
    }

    #[test]
    fn test_validate_default_is_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_cloud_without_credentials() {
        let mut config = Config::default();
        config.files.backend = "cloud".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(ShareError::Config(msg)) if msg.contains("api_secret")));
    }

    #[test]
    fn test_validate_unknown_backend() {
        let mut config = Config::default();
        config.files.backend = "s3".to_string();

        assert!(matches!(config.validate(), Err(ShareError::Config(_))));
    }

    #[test]
    fn test_validate_zero_size_limit() {
        let mut config = Config::default();
        config.files.max_upload_size_mb = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_public_url() {
        let mut config = Config::default();
        config.web.public_url = Some("https://files.example.com".to_string());
        assert!(config.validate().is_ok());

        config.web.public_url = Some("files.example.com".to_string());
        assert!(config.validate().is_err());

        config.web.public_url = Some("ftp://files.example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_upload_size_bytes() {
        let files = FilesConfig {
            max_upload_size_mb: 5,
            ..FilesConfig::default()
        };
        assert_eq!(files.max_upload_size_bytes(), 5 * 1024 * 1024);

        let files = FilesConfig {
            max_upload_size_mb: u64::MAX,
            ..FilesConfig::default()
        };
        assert_eq!(files.max_upload_size_bytes(), u64::MAX);
    }
}
