//! Logstash JSON event formatting
//!
//! Produces the `json_lines` document shape Logstash's TCP input expects:
//! the standard `@timestamp`/`@version` header, record metadata, and every
//! extra attribute nested under a configurable prefix.

use crate::core::{FieldValue, LogEntry, Result, TimestampFormat};
use serde_json::{Map, Value};

/// Message type used when no project name is configured
pub const DEFAULT_MESSAGE_TYPE: &str = "logstash";

/// Key of the nested extras object when no project name is configured
pub const DEFAULT_EXTRA_PREFIX: &str = "extra";

/// Builds Logstash documents from log records
///
/// # Example
///
/// ```
/// use elk_logger::appenders::LogstashFormatter;
/// use elk_logger::{LogEntry, LogLevel};
///
/// let formatter = LogstashFormatter::new()
///     .with_project("billing")
///     .with_extra("environment", "prod");
///
/// let entry = LogEntry::new(LogLevel::Info, "charged".to_string()).with_logger_name("svc");
/// let doc = formatter.document(&entry);
///
/// assert_eq!(doc["type"], "billing");
/// assert_eq!(doc["billing"]["environment"], "prod");
/// ```
#[derive(Debug, Clone)]
pub struct LogstashFormatter {
    message_type: String,
    extra_prefix: String,
    static_extras: Map<String, Value>,
    pid: u32,
}

impl LogstashFormatter {
    pub fn new() -> Self {
        Self {
            message_type: DEFAULT_MESSAGE_TYPE.to_string(),
            extra_prefix: DEFAULT_EXTRA_PREFIX.to_string(),
            static_extras: Map::new(),
            pid: std::process::id(),
        }
    }

    /// Use `project` as both the message type and the extras prefix
    #[must_use]
    pub fn with_project(mut self, project: &str) -> Self {
        self.message_type = project.to_string();
        self.extra_prefix = project.to_string();
        self
    }

    /// Attribute added to every document
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.static_extras
            .insert(key.into(), value.into().to_json_value());
        self
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn extra_prefix(&self) -> &str {
        &self.extra_prefix
    }

    /// Build the document for one record
    ///
    /// Record attributes override static extras of the same name.
    pub fn document(&self, entry: &LogEntry) -> Value {
        let mut extras = self.static_extras.clone();
        if let Some(environment) = &entry.environment {
            extras.insert("environment".to_string(), Value::String(environment.clone()));
        }
        extras.extend(entry.extra.to_json_map());

        let mut doc = Map::new();
        doc.insert(
            "@timestamp".to_string(),
            Value::String(TimestampFormat::Iso8601.format(&entry.timestamp)),
        );
        doc.insert("@version".to_string(), Value::String("1".to_string()));
        doc.insert("message".to_string(), Value::String(entry.message.clone()));
        doc.insert(
            "level".to_string(),
            Value::String(entry.level.to_str().to_string()),
        );
        doc.insert(
            "logger_name".to_string(),
            Value::String(entry.logger_name.clone()),
        );
        doc.insert("type".to_string(), Value::String(self.message_type.clone()));
        doc.insert("pid".to_string(), Value::from(self.pid));
        doc.insert(
            "thread_name".to_string(),
            Value::String(entry.thread_label().to_string()),
        );
        doc.insert(self.extra_prefix.clone(), Value::Object(extras));

        Value::Object(doc)
    }

    /// Single-line JSON text of [`document`](Self::document)
    pub fn format(&self, entry: &LogEntry) -> Result<String> {
        Ok(serde_json::to_string(&self.document(entry))?)
    }
}

impl Default for LogstashFormatter {
    fn default() -> Self {
        Self::new()
    }
}
