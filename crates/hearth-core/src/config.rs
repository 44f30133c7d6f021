//! Configuration loading and typed config structures for Hearth.
//!
//! The canonical configuration lives in `hearth-config.yaml` in the working
//! directory. Every field has a default, so an empty or partial file is
//! valid and a missing file means "all defaults".

use std::path::Path;

use serde::Deserialize;

use crate::access::DEFAULT_PIN_ITERATIONS;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `hearth-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HearthConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// Event log and read model storage.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Pin credential settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Invite link settings.
    #[serde(default)]
    pub invites: InviteConfig,

    /// Activity query defaults.
    #[serde(default)]
    pub activity: ActivityConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HearthConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DATABASE_URL` overrides `database.url`
    /// - `HEARTH_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides are
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override settings with environment variables when set.
    ///
    /// An unparseable `HEARTH_PORT` is ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Some(val) = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()) {
            self.database.url = Some(val);
        }
        if let Ok(val) = std::env::var("HEARTH_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid HEARTH_PORT"),
            }
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL. Without one, the in-memory backends are
    /// used and all data is lost on restart.
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Pin credential configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecurityConfig {
    /// PBKDF2 iteration count. Changing it invalidates existing credentials.
    #[serde(default = "default_pin_iterations")]
    pub pin_iterations: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            pin_iterations: default_pin_iterations(),
        }
    }
}

/// Invite link configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InviteConfig {
    /// Base URL that invite links are built on.
    #[serde(default = "default_invite_base_url")]
    pub base_url: String,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            base_url: default_invite_base_url(),
        }
    }
}

/// Defaults applied to activity queries that leave `days` or `limit` unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActivityConfig {
    /// Window in days; `None` means unbounded.
    #[serde(default)]
    pub default_days: Option<u32>,

    /// Maximum entries returned; `None` means unbounded.
    #[serde(default)]
    pub default_limit: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_pin_iterations() -> u32 {
    DEFAULT_PIN_ITERATIONS
}

fn default_invite_base_url() -> String {
    String::from("http://localhost:8080/join")
}

fn default_log_level() -> String {
    String::from("info")
}
