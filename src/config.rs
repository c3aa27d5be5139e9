//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `MAGLO_*` environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub appwrite: AppwriteSettings,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_ws_connections")]
    pub max_ws_connections: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_ws_connections() -> usize {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:8084".to_string(),
                "http://127.0.0.1:8084".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
            max_ws_connections: default_max_ws_connections(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which service backs accounts and invoices
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted Appwrite project
    Appwrite,
    /// Local SQLite stand-in
    #[default]
    Local,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "appwrite" => Ok(BackendKind::Appwrite),
            "local" => Ok(BackendKind::Local),
            other => Err(format!("unknown backend '{}': expected appwrite or local", other)),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Appwrite => write!(f, "appwrite"),
            BackendKind::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
}

/// Appwrite project settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    #[serde(default = "default_appwrite_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub database_id: String,

    #[serde(default)]
    pub invoices_collection_id: String,

    /// Server API key; keep it out of config files in production
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_appwrite_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_list_limit")]
    pub list_limit: u32,

    #[serde(default = "default_realtime_enabled")]
    pub realtime_enabled: bool,

    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

fn default_appwrite_endpoint() -> String {
    "https://cloud.appwrite.io/v1".to_string()
}

fn default_appwrite_timeout() -> u64 {
    10_000
}

fn default_list_limit() -> u32 {
    5000
}

fn default_realtime_enabled() -> bool {
    true
}

fn default_reconnect_delay() -> u64 {
    5
}

impl Default for AppwriteSettings {
    fn default() -> Self {
        Self {
            endpoint: default_appwrite_endpoint(),
            project_id: String::new(),
            database_id: String::new(),
            invoices_collection_id: String::new(),
            api_key: String::new(),
            request_timeout_ms: default_appwrite_timeout(),
            list_limit: default_list_limit(),
            realtime_enabled: default_realtime_enabled(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

impl AppwriteSettings {
    /// Names of required settings that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("endpoint", &self.endpoint),
            ("project_id", &self.project_id),
            ("database_id", &self.database_id),
            ("invoices_collection_id", &self.invoices_collection_id),
            ("api_key", &self.api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Local SQLite backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Keep everything in memory (lost on restart)
    #[serde(default)]
    pub in_memory: bool,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("maglo").to_string_lossy().to_string())
        .unwrap_or_else(|| "./maglo_data".to_string())
}

fn default_database_file() -> String {
    "maglo.db".to_string()
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            in_memory: false,
        }
    }
}

impl LocalConfig {
    /// Database file path, with a leading `~/` expanded
    pub fn database_path(&self) -> PathBuf {
        expand_home(&self.data_dir).join(&self.database_file)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Dashboard presentation settings
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_upcoming_window")]
    pub upcoming_window_days: i64,

    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_currency_symbol() -> String {
    "₦".to_string()
}

fn default_upcoming_window() -> i64 {
    crate::dashboard::DEFAULT_UPCOMING_WINDOW_DAYS
}

fn default_recent_limit() -> usize {
    crate::dashboard::DEFAULT_RECENT_LIMIT
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            upcoming_window_days: default_upcoming_window(),
            recent_limit: default_recent_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn env_string(var: &str, target: &mut String) {
    if let Ok(value) = std::env::var(var) {
        *target = value;
    }
}

fn env_parsed<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(value) = std::env::var(var) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(var = %var, value = %value, "Ignoring unparsable override"),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Default config file locations, most specific first
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("maglo").join("config.toml")),
            Some(PathBuf::from("/etc/maglo/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in Self::default_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply `MAGLO_*` environment variable overrides
    fn apply_env_overrides(&mut self) {
        env_parsed("MAGLO_BACKEND", &mut self.backend.kind);
        env_string("MAGLO_DATA_DIR", &mut self.local.data_dir);

        env_string("MAGLO_API_HOST", &mut self.api.host);
        env_parsed("MAGLO_API_PORT", &mut self.api.port);

        env_string("MAGLO_APPWRITE_ENDPOINT", &mut self.appwrite.endpoint);
        env_string("MAGLO_APPWRITE_PROJECT_ID", &mut self.appwrite.project_id);
        env_string("MAGLO_APPWRITE_DB_ID", &mut self.appwrite.database_id);
        env_string(
            "MAGLO_APPWRITE_INVOICES_COLLECTION_ID",
            &mut self.appwrite.invoices_collection_id,
        );
        env_string("MAGLO_APPWRITE_API_KEY", &mut self.appwrite.api_key);

        env_string("MAGLO_LOG_LEVEL", &mut self.logging.level);
        env_string("MAGLO_LOG_FORMAT", &mut self.logging.format);
    }

    /// Check settings the selected backend cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.kind == BackendKind::Appwrite {
            let missing = self.appwrite.missing_fields();
            if !missing.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "appwrite backend selected but [appwrite] is missing: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Maglo Configuration
#
# Environment variables override these settings:
# - MAGLO_BACKEND (appwrite | local)
# - MAGLO_DATA_DIR
# - MAGLO_API_HOST
# - MAGLO_API_PORT
# - MAGLO_APPWRITE_ENDPOINT
# - MAGLO_APPWRITE_PROJECT_ID
# - MAGLO_APPWRITE_DB_ID
# - MAGLO_APPWRITE_INVOICES_COLLECTION_ID
# - MAGLO_APPWRITE_API_KEY
# - MAGLO_LOG_LEVEL
# - MAGLO_LOG_FORMAT

[api]
host = "0.0.0.0"
port = 8082

# Allowed CORS origins (the UI dev server)
cors_origins = ["http://localhost:8084", "http://127.0.0.1:8084"]

# Request timeout in seconds
request_timeout_secs = 30

# Concurrent realtime connections
max_ws_connections = 1000

[backend]
# "appwrite" for the hosted project, "local" for the SQLite stand-in
kind = "local"

[appwrite]
endpoint = "https://cloud.appwrite.io/v1"
project_id = ""
database_id = ""
invoices_collection_id = ""

# Server API key (scopes: sessions.write, documents.read, documents.write).
# Prefer MAGLO_APPWRITE_API_KEY over writing it here.
api_key = ""

request_timeout_ms = 10000

# Maximum invoices fetched per list call
list_limit = 5000

# Listen on the collection's realtime channel
realtime_enabled = true
reconnect_delay_secs = 5

[local]
data_dir = "~/.local/share/maglo"
database_file = "maglo.db"

# Keep data in memory only
in_memory = false

[dashboard]
currency_symbol = "₦"

# Unpaid invoices due within this many days count as upcoming
upcoming_window_days = 7

# Rows in the recent invoices table
recent_limit = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.backend.kind, BackendKind::Local);
        assert_eq!(config.dashboard.currency_symbol, "₦");
        assert_eq!(config.dashboard.upcoming_window_days, 7);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse("[backend]\nkind = \"appwrite\"\n").unwrap();
        assert_eq!(config.backend.kind, BackendKind::Appwrite);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.appwrite.list_limit, 5000);
        assert!(config.appwrite.realtime_enabled);
    }

    #[test]
    fn test_validate_requires_appwrite_ids() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.backend.kind = BackendKind::Appwrite;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("project_id"));
        assert!(err.contains("api_key"));

        config.appwrite.project_id = "p".to_string();
        config.appwrite.database_id = "d".to_string();
        config.appwrite.invoices_collection_id = "c".to_string();
        config.appwrite.api_key = "k".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = 9000\n[local]\nin_memory = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.port, 9000);
        assert!(config.local.in_memory);

        std::fs::write(&path, "[api\nport = ").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_database_path() {
        let local = LocalConfig {
            data_dir: "/var/lib/maglo".to_string(),
            database_file: "maglo.db".to_string(),
            in_memory: false,
        };
        assert_eq!(local.database_path(), PathBuf::from("/var/lib/maglo/maglo.db"));
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("Appwrite".parse::<BackendKind>().unwrap(), BackendKind::Appwrite);
        assert!("mongo".parse::<BackendKind>().is_err());
    }
}
