//! Configuration validation logic
//!
//! Every rule reports the dotted key it concerns so the message can be
//! traced back to a line in the TOML file or a `DEPOSIT_*` variable.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, I18nConfig, LoggerSettings, ServerConfig, SessionConfig,
    Settings, StorageBackend, UploadConfig,
};
use crate::i18n::{Locale, SupportedLocales};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must not be empty and must use a postgres scheme
    /// - Max and min connections must be greater than 0
    /// - Min connections must not exceed max connections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required when storage.backend is \"database\".",
            ));
        }

        if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()
    }
}

impl UploadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_request_size == 0 {
            return Err(ConfigError::validation(
                "upload.max_request_size",
                "Maximum request size must be greater than 0 bytes.",
            ));
        }

        if self.required_files.is_empty() {
            return Err(ConfigError::validation(
                "upload.required_files",
                "At least one required file category must be configured.",
            ));
        }

        if self.required_mime_type.trim().is_empty() {
            return Err(ConfigError::validation(
                "upload.required_mime_type",
                "Required MIME type cannot be empty.",
            ));
        }

        Ok(())
    }
}

impl I18nConfig {
    /// Validate locale settings
    ///
    /// # Validation Rules
    /// - Default, server and pipeline locales must be well-formed tags
    /// - The default locale must be in the allow-list when one is set
    /// - The attribute name must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let default_locale = parse_tag("i18n.default_locale", &self.default_locale)?;
        parse_tag("i18n.server_locale", &self.server_locale)?;
        if let Some(pipeline) = &self.pipeline_locale {
            parse_tag("i18n.pipeline_locale", pipeline)?;
        }

        if self.attribute.trim().is_empty() {
            return Err(ConfigError::validation(
                "i18n.attribute",
                "Locale attribute name cannot be empty.",
            ));
        }

        if let Some(list) = &self.supported_locales {
            let supported = SupportedLocales::parse(list);
            if supported.is_empty() {
                return Err(ConfigError::ValidationError {
                    field: "i18n.supported_locales".to_string(),
                    message: format!("No well-formed locale in '{}'.", list),
                });
            }
            if !supported.contains(&default_locale) {
                return Err(ConfigError::ValidationError {
                    field: "i18n.default_locale".to_string(),
                    message: format!(
                        "Default locale '{}' is not listed in i18n.supported_locales.",
                        default_locale
                    ),
                });
            }
        }

        Ok(())
    }
}

fn parse_tag(field: &str, tag: &str) -> Result<Locale, ConfigError> {
    tag.parse::<Locale>().map_err(|_| ConfigError::ValidationError {
        field: field.to_string(),
        message: format!("'{}' is not a valid locale tag.", tag),
    })
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie_name.trim().is_empty() {
            return Err(ConfigError::validation(
                "session.cookie_name",
                "Session cookie name cannot be empty.",
            ));
        }

        if self.idle_timeout == 0 {
            return Err(ConfigError::validation(
                "session.idle_timeout",
                "Session idle timeout must be greater than 0 seconds.",
            ));
        }

        if self.purge_interval == 0 {
            return Err(ConfigError::validation(
                "session.purge_interval",
                "Session purge interval must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings, returning the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        if self.storage.backend == StorageBackend::Database {
            self.database.validate()?;
        }
        if self.storage.assetstore_dir.trim().is_empty() {
            return Err(ConfigError::validation(
                "storage.assetstore_dir",
                "Asset store directory cannot be empty.",
            ));
        }
        self.logger.validate()?;
        self.upload.validate()?;
        self.i18n.validate()?;
        self.session.validate()?;
        Ok(())
    }
}
