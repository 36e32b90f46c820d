//! Configuration management
//!
//! This module handles loading and parsing configuration for the Brightfold
//! backend. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
    /// Email (SMTP) configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// AI provider configuration
    #[serde(default)]
    pub ai: AiConfig,
    /// Search-engine indexing notification configuration
    #[serde(default)]
    pub indexing: IndexingConfig,
    /// Console account seeding and session settings
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Public base URL of the marketing site (used for indexing pings)
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            public_url: default_public_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/brightfold.db".to_string()
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upload directory path
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Maximum file size in bytes (default: 10MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
        "image/svg+xml".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

/// Email (SMTP) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host; empty disables email sending
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password
    #[serde(default)]
    pub smtp_password: String,
    /// From address
    #[serde(default = "default_email_from")]
    pub from_address: String,
    /// From display name
    #[serde(default = "default_email_from_name")]
    pub from_name: String,
    /// Address that receives contact-form notifications
    #[serde(default)]
    pub notify_to: String,
    /// Max sends per recipient per minute
    #[serde(default = "default_sends_per_minute")]
    pub sends_per_minute: u32,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: default_email_from(),
            from_name: default_email_from_name(),
            notify_to: String::new(),
            sends_per_minute: default_sends_per_minute(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_email_from() -> String {
    "noreply@brightfold.local".to_string()
}

fn default_email_from_name() -> String {
    "Brightfold".to_string()
}

fn default_sends_per_minute() -> u32 {
    5
}

impl EmailConfig {
    /// Email sending is enabled once an SMTP host is configured
    pub fn is_enabled(&self) -> bool {
        !self.smtp_host.is_empty()
    }
}

/// AI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Provider API base URL
    #[serde(default = "default_ai_api_base")]
    pub api_base: String,
    /// Provider API key; empty disables AI generation endpoints
    #[serde(default)]
    pub api_key: String,
    /// Text generation model
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Image generation model
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Request timeout in seconds
    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: default_ai_api_base(),
            api_key: String::new(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            timeout_seconds: default_ai_timeout(),
        }
    }
}

fn default_ai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_ai_timeout() -> u64 {
    120
}

impl AiConfig {
    /// AI generation is enabled once an API key is configured
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Search-engine indexing notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Enable publish notifications
    #[serde(default)]
    pub enabled: bool,
    /// Notification endpoint
    #[serde(default = "default_ping_endpoint")]
    pub ping_endpoint: String,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ping_endpoint: default_ping_endpoint(),
        }
    }
}

fn default_ping_endpoint() -> String {
    "https://www.google.com/ping".to_string()
}

/// Console account seeding and session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Username for the seeded admin account
    #[serde(default = "default_admin_username")]
    pub username: String,
    /// Email for the seeded admin account
    #[serde(default = "default_admin_email")]
    pub email: String,
    /// Password for the seeded admin account; empty skips seeding
    #[serde(default)]
    pub password: String,
    /// Session lifetime in days
    #[serde(default = "default_session_days")]
    pub session_expiration_days: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            email: default_admin_email(),
            password: String::new(),
            session_expiration_days: default_session_days(),
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@brightfold.local".to_string()
}

fn default_session_days() -> i64 {
    7
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - BRIGHTFOLD_SERVER_HOST / BRIGHTFOLD_SERVER_PORT
    /// - BRIGHTFOLD_DATABASE_URL
    /// - BRIGHTFOLD_SMTP_HOST / BRIGHTFOLD_SMTP_USERNAME / ...
    /// - BRIGHTFOLD_AI_API_KEY / BRIGHTFOLD_AI_API_BASE
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("BRIGHTFOLD_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("BRIGHTFOLD_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(origin) = std::env::var("BRIGHTFOLD_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Ok(url) = std::env::var("BRIGHTFOLD_SERVER_PUBLIC_URL") {
            self.server.public_url = url;
        }

        if let Ok(url) = std::env::var("BRIGHTFOLD_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(path) = std::env::var("BRIGHTFOLD_UPLOAD_PATH") {
            self.upload.path = PathBuf::from(path);
        }

        if let Ok(host) = std::env::var("BRIGHTFOLD_SMTP_HOST") {
            self.email.smtp_host = host;
        }
        if let Ok(port) = std::env::var("BRIGHTFOLD_SMTP_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.email.smtp_port = port;
            }
        }
        if let Ok(username) = std::env::var("BRIGHTFOLD_SMTP_USERNAME") {
            self.email.smtp_username = username;
        }
        if let Ok(password) = std::env::var("BRIGHTFOLD_SMTP_PASSWORD") {
            self.email.smtp_password = password;
        }
        if let Ok(notify) = std::env::var("BRIGHTFOLD_EMAIL_NOTIFY_TO") {
            self.email.notify_to = notify;
        }

        if let Ok(key) = std::env::var("BRIGHTFOLD_AI_API_KEY") {
            self.ai.api_key = key;
        }
        if let Ok(base) = std::env::var("BRIGHTFOLD_AI_API_BASE") {
            self.ai.api_base = base;
        }

        if let Ok(enabled) = std::env::var("BRIGHTFOLD_INDEXING_ENABLED") {
            if let Ok(enabled) = enabled.parse::<bool>() {
                self.indexing.enabled = enabled;
            }
        }
        if let Ok(endpoint) = std::env::var("BRIGHTFOLD_INDEXING_PING_ENDPOINT") {
            self.indexing.ping_endpoint = endpoint;
        }

        if let Ok(username) = std::env::var("BRIGHTFOLD_ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Ok(email) = std::env::var("BRIGHTFOLD_ADMIN_EMAIL") {
            self.admin.email = email;
        }
        if let Ok(password) = std::env::var("BRIGHTFOLD_ADMIN_PASSWORD") {
            self.admin.password = password;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_host_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
                .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d)),
            Just("localhost".to_string()),
            Just("0.0.0.0".to_string()),
            "[a-z][a-z0-9]{0,10}",
        ]
    }

    fn valid_config_strategy() -> impl Strategy<Value = Config> {
        (
            valid_host_strategy(),
            1u16..=65535,
            "[a-z][a-z0-9_/]{0,20}\\.db",
            1u32..=60,
        )
            .prop_map(|(host, port, db_url, sends)| Config {
                server: ServerConfig {
                    host,
                    port,
                    ..ServerConfig::default()
                },
                database: DatabaseConfig { url: db_url },
                email: EmailConfig {
                    sends_per_minute: sends,
                    ..EmailConfig::default()
                },
                ..Config::default()
            })
    }

    fn partial_config_yaml_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (valid_host_strategy(), 1u16..=65535).prop_map(|(host, port)| format!(
                "server:\n  host: \"{}\"\n  port: {}\n",
                host, port
            )),
            Just("database:\n  url: \"test.db\"\n".to_string()),
            Just("email:\n  smtp_port: 465\n".to_string()),
            Just("ai:\n  text_model: \"gpt-4o\"\n".to_string()),
            Just("".to_string()),
            Just("   \n\n   ".to_string()),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Serializing a valid config to YAML and parsing it back yields an
        /// equivalent config.
        #[test]
        fn config_roundtrip(config in valid_config_strategy()) {
            let yaml = serde_yaml::to_string(&config).expect("Failed to serialize config");

            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "{}", yaml).expect("Failed to write config");

            let parsed = Config::load(file.path()).expect("Failed to parse config");

            prop_assert_eq!(config.server.host, parsed.server.host);
            prop_assert_eq!(config.server.port, parsed.server.port);
            prop_assert_eq!(config.database.url, parsed.database.url);
            prop_assert_eq!(config.email.sends_per_minute, parsed.email.sends_per_minute);
        }

        /// Partial config files fill missing sections with defaults.
        #[test]
        fn config_default_filling(yaml in partial_config_yaml_strategy()) {
            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "{}", yaml).expect("Failed to write config");

            let config = Config::load(file.path()).expect("Failed to parse config");

            prop_assert!(!config.server.host.is_empty());
            prop_assert!(config.server.port > 0);
            prop_assert!(!config.database.url.is_empty());
            prop_assert!(config.email.smtp_port > 0);

            if yaml.trim().is_empty() {
                prop_assert_eq!(config.server.host, "0.0.0.0");
                prop_assert_eq!(config.server.port, 8080);
                prop_assert_eq!(config.database.url, "data/brightfold.db");
            }
        }
    }
}
