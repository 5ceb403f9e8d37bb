//! Configuration settings structures for deposit-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "deposit-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keep_alive_timeout() -> u64 {
    75
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/deposit.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_assetstore_dir() -> String {
    "assetstore".to_string()
}

fn default_max_request_size() -> usize {
    512 * 1024 * 1024 // 512MB
}

fn default_required_files() -> Vec<String> {
    [
        "Application Form",
        "Essay",
        "Research Paper",
        "Bibliography",
        "Letter of Support",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_hidden_files() -> Vec<String> {
    ["Application Form", "Letter of Support"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_required_mime_type() -> String {
    "application/pdf".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_locale_attribute() -> String {
    "locale-attribute".to_string()
}

fn default_session_cookie() -> String {
    "deposit_session".to_string()
}

fn default_idle_timeout() -> u64 {
    1800
}

fn default_purge_interval() -> u64 {
    60
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub keep_alive_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            keep_alive_timeout: default_keep_alive_timeout(),
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// Diesel database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Whether to automatically run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout: default_connection_timeout(),
            auto_migrate: false,
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    /// Append to an existing file instead of truncating it
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime [`LoggerConfig`].
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger".to_string(), e.to_string()))
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.format.parse::<LogFormat>().map_err(|e| {
            ConfigError::validation("logger.file.format".to_string(), e.to_string())
        })?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format)
            .map_err(|e| ConfigError::validation("logger.file".to_string(), e.to_string()))
    }
}

// ============================================================================
// Storage Configuration
// ============================================================================

/// Content store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Postgres metadata plus the on-disk asset store
    #[default]
    Database,
    /// Process-local maps, nothing survives a restart
    Memory,
}

/// Bitstream storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory holding bitstream content, one file per internal id
    #[serde(default = "default_assetstore_dir")]
    pub assetstore_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            assetstore_dir: default_assetstore_dir(),
        }
    }
}

// ============================================================================
// Upload Configuration
// ============================================================================

/// Upload step policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted request body in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,

    /// File categories every submission must contain, in display order
    #[serde(default = "default_required_files")]
    pub required_files: Vec<String>,

    /// Categories stored in the PRESERVATION bundle
    #[serde(default = "default_hidden_files")]
    pub hidden_files: Vec<String>,

    #[serde(default = "default_required_mime_type")]
    pub required_mime_type: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_request_size: default_max_request_size(),
            required_files: default_required_files(),
            hidden_files: default_hidden_files(),
            required_mime_type: default_required_mime_type(),
        }
    }
}

// ============================================================================
// I18n Configuration
// ============================================================================

/// Locale resolution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Comma-separated allow-list. Unset accepts every well-formed locale.
    #[serde(default)]
    pub supported_locales: Option<String>,

    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Stands in for Accept-Language when a request carries none
    #[serde(default = "default_locale")]
    pub server_locale: String,

    /// Name of the session attribute and cookie holding a chosen locale
    #[serde(default = "default_locale_attribute")]
    pub attribute: String,

    #[serde(default)]
    pub pipeline_locale: Option<String>,

    #[serde(default)]
    pub store_in_session: bool,

    #[serde(default)]
    pub store_in_cookie: bool,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            supported_locales: None,
            default_locale: default_locale(),
            server_locale: default_locale(),
            attribute: default_locale_attribute(),
            pipeline_locale: None,
            store_in_session: false,
            store_in_cookie: false,
        }
    }
}

// ============================================================================
// Session Configuration
// ============================================================================

/// Server-side session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_cookie")]
    pub cookie_name: String,

    /// Seconds of inactivity before a session expires
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,

    /// Seconds between sweeps of expired sessions
    #[serde(default = "default_purge_interval")]
    pub purge_interval: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_session_cookie(),
            idle_timeout: default_idle_timeout(),
            purge_interval: default_purge_interval(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub i18n: I18nConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_server_config() -> impl Strategy<Value = ServerConfig> {
        (
            prop_oneof![
                Just("127.0.0.1".to_string()),
                Just("0.0.0.0".to_string()),
                Just("localhost".to_string()),
            ],
            1u16..=65535u16,
            1u64..=300u64,
            1u64..=300u64,
        )
            .prop_map(
                |(host, port, request_timeout, keep_alive_timeout)| ServerConfig {
                    host,
                    port,
                    request_timeout,
                    keep_alive_timeout,
                },
            )
    }

    fn arb_logger_settings() -> impl Strategy<Value = LoggerSettings> {
        (
            prop_oneof![
                Just("trace".to_string()),
                Just("debug".to_string()),
                Just("info".to_string()),
                Just("warn".to_string()),
                Just("error".to_string()),
            ],
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            prop_oneof![
                Just("json".to_string()),
                Just("full".to_string()),
                Just("compact".to_string()),
            ],
        )
            .prop_map(|(level, console_on, file_on, append, format)| LoggerSettings {
                level,
                console: ConsoleSettings {
                    enabled: console_on,
                    colored: !console_on,
                },
                file: FileSettings {
                    enabled: file_on,
                    path: "logs/test.log".to_string(),
                    append,
                    format,
                },
            })
    }

    fn arb_i18n_config() -> impl Strategy<Value = I18nConfig> {
        (
            proptest::option::of(Just("en,de,fr_CA".to_string())),
            prop_oneof![Just("en".to_string()), Just("de".to_string())],
            proptest::option::of("[a-z]{2}_[A-Z]{2}"),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(supported_locales, default_locale, pipeline_locale, in_session, in_cookie)| {
                    I18nConfig {
                        supported_locales,
                        server_locale: default_locale.clone(),
                        default_locale,
                        attribute: default_locale_attribute(),
                        pipeline_locale,
                        store_in_session: in_session,
                        store_in_cookie: in_cookie,
                    }
                },
            )
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            arb_server_config(),
            arb_logger_settings(),
            arb_i18n_config(),
            prop_oneof![Just(StorageBackend::Database), Just(StorageBackend::Memory)],
            1usize..=1_000_000_000usize,
            1u64..=86_400u64,
        )
            .prop_map(
                |(server, logger, i18n, backend, max_request_size, idle_timeout)| Settings {
                    server,
                    logger,
                    i18n,
                    storage: StorageConfig {
                        backend,
                        ..StorageConfig::default()
                    },
                    upload: UploadConfig {
                        max_request_size,
                        ..UploadConfig::default()
                    },
                    session: SessionConfig {
                        idle_timeout,
                        ..SessionConfig::default()
                    },
                    ..Settings::default()
                },
            )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing any settings to TOML and reading them back yields the same value.
        #[test]
        fn prop_settings_round_trip_serialization(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings)
                .expect("Settings should serialize to TOML");
            let deserialized: Settings = toml::from_str(&toml_str)
                .expect("TOML should deserialize back to Settings");
            prop_assert_eq!(settings, deserialized);
        }
    }

    #[test]
    fn test_application_config_defaults() {
        let config = ApplicationConfig::default();
        assert_eq!(config.name, "deposit-rs");
        assert_eq!(config.version, crate::pkg_version());
    }

    #[test]
    fn test_server_config_address() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_upload_config_defaults() {
        let config = UploadConfig::default();
        assert_eq!(
            config.required_files,
            vec![
                "Application Form",
                "Essay",
                "Research Paper",
                "Bibliography",
                "Letter of Support"
            ]
        );
        assert_eq!(config.hidden_files, vec!["Application Form", "Letter of Support"]);
        assert_eq!(config.required_mime_type, "application/pdf");
    }

    #[test]
    fn test_i18n_config_defaults() {
        let config = I18nConfig::default();
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.attribute, "locale-attribute");
        assert!(config.supported_locales.is_none());
        assert!(!config.store_in_session);
        assert!(!config.store_in_cookie);
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let toml_str = r#"
            [server]
            port = 8080

            [storage]
            backend = "memory"

            [i18n]
            supported_locales = "en,de"
        "#;

        let settings: Settings = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage.assetstore_dir, "assetstore");
        assert_eq!(settings.i18n.supported_locales.as_deref(), Some("en,de"));
        assert_eq!(settings.session.cookie_name, "deposit_session");
    }

    #[test]
    fn test_logger_settings_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            console: ConsoleSettings::default(),
            file: FileSettings {
                enabled: true,
                format: "compact".to_string(),
                ..FileSettings::default()
            },
        };

        let config = settings.into_logger_config().expect("valid logger settings");
        assert_eq!(config.level, "debug");
        assert!(config.file.enabled);
        assert_eq!(config.file.format, LogFormat::Compact);
    }

    #[test]
    fn test_logger_settings_invalid_format() {
        let settings = LoggerSettings {
            file: FileSettings {
                format: "xml".to_string(),
                ..FileSettings::default()
            },
            ..LoggerSettings::default()
        };

        match settings.into_logger_config() {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "logger.file.format")
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
