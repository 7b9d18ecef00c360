//! Per-logger sink configuration
//!
//! `LoggerConfig` is what the registry uses to build a logger the first
//! time a name is requested. It can be assembled in code with the `with_*`
//! methods or deserialized from JSON (any serde format works).

use super::environment::Environment;
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::payload::RAW_JSON_FIELD;
use parking_lot::Mutex;
use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Default Logstash TCP input port
pub const DEFAULT_LOGSTASH_PORT: u16 = 5959;

/// Default capacity of the Logstash hand-off queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Writer shared between the caller and a console appender
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Sink configuration for one logger
///
/// # Example
///
/// ```
/// use elk_logger::{Environment, LogLevel, LoggerConfig};
///
/// let config = LoggerConfig::new()
///     .with_level(LogLevel::Debug)
///     .with_environment(Environment::Staging)
///     .with_logstash("logstash.internal", 5959)
///     .with_project_name("billing");
///
/// assert_eq!(config.logstash_port, 5959);
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub logstash_host: Option<String>,
    pub logstash_port: u16,
    pub enable_console: bool,
    pub enable_logstash: bool,
    pub environment: Environment,
    /// Message type and extra-field prefix of Logstash documents
    pub project_name: Option<String>,
    /// Attributes shown on the console; `None` means just `raw_json`
    pub console_extra_fields: Option<Vec<String>>,
    pub use_colors: bool,
    pub queue_capacity: usize,
    /// Console output target; stdout when unset
    #[serde(skip)]
    pub console_writer: Option<SharedWriter>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            logstash_host: None,
            logstash_port: DEFAULT_LOGSTASH_PORT,
            enable_console: true,
            enable_logstash: true,
            environment: Environment::Dev,
            project_name: None,
            console_extra_fields: None,
            use_colors: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            console_writer: None,
        }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("level", &self.level)
            .field("logstash_host", &self.logstash_host)
            .field("logstash_port", &self.logstash_port)
            .field("enable_console", &self.enable_console)
            .field("enable_logstash", &self.enable_logstash)
            .field("environment", &self.environment)
            .field("project_name", &self.project_name)
            .field("console_extra_fields", &self.console_extra_fields)
            .field("use_colors", &self.use_colors)
            .field("queue_capacity", &self.queue_capacity)
            .field("console_writer", &self.console_writer.as_ref().map(|_| "<writer>"))
            .finish()
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration; missing keys take their defaults
    ///
    /// ```
    /// use elk_logger::{Environment, LoggerConfig};
    ///
    /// let config = LoggerConfig::from_json(r#"{"environment": "prod", "level": "WARNING"}"#)?;
    /// assert_eq!(config.environment, Environment::Prod);
    /// # Ok::<(), elk_logger::LoggerError>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LoggerError::config("LoggerConfig", e.to_string()))
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the Logstash endpoint
    #[must_use]
    pub fn with_logstash(mut self, host: impl Into<String>, port: u16) -> Self {
        self.logstash_host = Some(host.into());
        self.logstash_port = port;
        self
    }

    #[must_use]
    pub fn with_logstash_host(mut self, host: impl Into<String>) -> Self {
        self.logstash_host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_logstash_port(mut self, port: u16) -> Self {
        self.logstash_port = port;
        self
    }

    #[must_use]
    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    #[must_use]
    pub fn with_logstash_enabled(mut self, enable: bool) -> Self {
        self.enable_logstash = enable;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_project_name(mut self, project: impl Into<String>) -> Self {
        self.project_name = Some(project.into());
        self
    }

    #[must_use]
    pub fn with_console_extra_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.console_extra_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Send console lines to `writer` instead of stdout
    #[must_use]
    pub fn with_console_writer(mut self, writer: SharedWriter) -> Self {
        self.console_writer = Some(writer);
        self
    }

    /// Console allow-list with the default applied
    pub fn console_fields(&self) -> Vec<String> {
        self.console_extra_fields
            .clone()
            .unwrap_or_else(|| vec![RAW_JSON_FIELD.to_string()])
    }

    /// Logstash endpoint, if shipping is enabled and a host is set
    pub fn logstash_endpoint(&self) -> Option<(&str, u16)> {
        if !self.enable_logstash {
            return None;
        }
        self.logstash_host
            .as_deref()
            .filter(|host| !host.is_empty())
            .map(|host| (host, self.logstash_port))
    }
}
