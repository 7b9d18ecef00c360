//! Named logger: level gate, filters, then fan-out to appenders

use super::{
    appender::Appender,
    config::LoggerConfig,
    error::Result,
    filter::{EnvironmentFilter, Filter},
    log_context::LogContext,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
};
use crate::appenders::{ConsoleAppender, LogstashAppender, LogstashFormatter};
use parking_lot::RwLock;
use std::any::Any;

/// A named logger handle
///
/// Loggers are assembled once with [`LoggerBuilder`] and never reconfigured;
/// every method takes `&self`, so a logger is shared as `Arc<Logger>`.
/// Records never propagate to any other logger.
pub struct Logger {
    name: String,
    min_level: LogLevel,
    filters: Vec<Box<dyn Filter>>,
    appenders: RwLock<Vec<Box<dyn Appender>>>,
    /// Delivery metrics (records written, records lost to failing appenders)
    metrics: LoggerMetrics,
}

impl Logger {
    /// Logger with no filters or appenders at level Info
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: LogLevel::Info,
            filters: Vec::new(),
            appenders: RwLock::new(Vec::new()),
            metrics: LoggerMetrics::new(),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use elk_logger::prelude::*;
    ///
    /// let logger = Logger::builder("worker")
    ///     .min_level(LogLevel::Debug)
    ///     .filter(EnvironmentFilter::new(Environment::Test))
    ///     .appender(ConsoleAppender::new())
    ///     .build();
    /// assert_eq!(logger.name(), "worker");
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    /// Build a logger wired as `config` describes
    ///
    /// Attaches the environment filter, a console appender when enabled, and
    /// a Logstash appender when enabled and a host is set. No connection is
    /// attempted here.
    pub fn from_config(name: &str, config: &LoggerConfig) -> Self {
        let mut builder = Logger::builder(name)
            .min_level(config.level)
            .filter(EnvironmentFilter::new(config.environment));

        if config.enable_console {
            let mut console = ConsoleAppender::with_colors(config.use_colors)
                .with_level(config.level)
                .with_extra_fields(config.console_fields());
            if let Some(writer) = &config.console_writer {
                console = console.with_writer(writer.clone());
            }
            builder = builder.appender(console);
        }

        if let Some((host, port)) = config.logstash_endpoint() {
            let mut formatter = LogstashFormatter::new()
                .with_extra("environment", config.environment.as_str());
            if let Some(project) = &config.project_name {
                formatter = formatter.with_project(project);
            }
            let logstash = LogstashAppender::with_capacity(host, port, config.queue_capacity)
                .with_formatter(formatter)
                .with_level(config.level);
            builder = builder.appender(logstash);
        }

        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    /// Records never bubble up to a parent logger
    pub fn propagate(&self) -> bool {
        false
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn filter_names(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.name().to_string()).collect()
    }

    pub fn appender_names(&self) -> Vec<String> {
        self.appenders
            .read()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    pub fn has_appender(&self, name: &str) -> bool {
        self.appenders.read().iter().any(|a| a.name() == name)
    }

    /// Get the logger metrics
    ///
    /// `total_logged` counts records every eligible appender accepted;
    /// `dropped_count` counts records at least one appender failed on.
    ///
    /// These are hand-off counts. A Logstash appender accepts a record by
    /// queueing it, so records it later drops on a full queue or fails to
    /// send still count as logged here; its own
    /// [`LogstashAppender::metrics`] tracks delivery.
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_with_context(level, message, LogContext::new());
    }

    /// Log with structured extra attributes
    pub fn log_with_context(&self, level: LogLevel, message: impl Into<String>, extra: LogContext) {
        if !self.is_enabled_for(level) {
            return;
        }

        let mut entry = LogEntry::new(level, message.into())
            .with_logger_name(&self.name)
            .with_extra(extra);

        for filter in &self.filters {
            if !filter.filter(&mut entry) {
                return;
            }
        }

        let mut appenders = self.appenders.write();
        Self::dispatch(&mut appenders, &entry, &self.metrics);
    }

    /// Hand `entry` to every appender whose level admits it
    ///
    /// Each appender runs under `catch_unwind`, so a failing or panicking
    /// appender does not keep the others from receiving the record.
    fn dispatch(appenders: &mut [Box<dyn Appender>], entry: &LogEntry, metrics: &LoggerMetrics) {
        let mut has_error = false;

        for appender in appenders.iter_mut() {
            if entry.level < appender.level() {
                continue;
            }

            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(entry)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", appender.name(), e);
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        appender.name(),
                        panic_message(&*panic_info)
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }
    }

    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }

    pub fn debug_with_context(&self, message: impl Into<String>, extra: LogContext) {
        self.log_with_context(LogLevel::Debug, message, extra);
    }

    /// Helper for structured info logging
    ///
    /// ```
    /// use elk_logger::{build_extra_default, Logger};
    /// use serde_json::json;
    ///
    /// let logger = Logger::new("api");
    /// logger.info_with_context("request done", build_extra_default(&json!({"status": 200})));
    /// ```
    pub fn info_with_context(&self, message: impl Into<String>, extra: LogContext) {
        self.log_with_context(LogLevel::Info, message, extra);
    }

    pub fn warning_with_context(&self, message: impl Into<String>, extra: LogContext) {
        self.log_with_context(LogLevel::Warning, message, extra);
    }

    /// Helper for structured error logging
    pub fn error_with_context(&self, message: impl Into<String>, extra: LogContext) {
        self.log_with_context(LogLevel::Error, message, extra);
    }

    pub fn critical_with_context(&self, message: impl Into<String>, extra: LogContext) {
        self.log_with_context(LogLevel::Critical, message, extra);
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!(
                "[LOGGER ERROR] Failed to flush logger '{}' during shutdown: {}",
                self.name, e
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
pub struct LoggerBuilder {
    name: String,
    min_level: LogLevel,
    filters: Vec<Box<dyn Filter>>,
    appenders: Vec<Box<dyn Appender>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: LogLevel::Info,
            filters: Vec::new(),
            appenders: Vec::new(),
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Add a filter; filters run in the order they are added
    #[must_use = "builder methods return a new value"]
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger {
            name: self.name,
            min_level: self.min_level,
            filters: self.filters,
            appenders: RwLock::new(self.appenders),
            metrics: LoggerMetrics::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Environment, LoggerError};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct MemoryAppender {
        entries: Arc<Mutex<Vec<LogEntry>>>,
        level: LogLevel,
    }

    impl MemoryAppender {
        fn at(level: LogLevel) -> Self {
            Self {
                entries: Arc::default(),
                level,
            }
        }

        fn messages(&self) -> Vec<String> {
            self.entries.lock().iter().map(|e| e.message.clone()).collect()
        }
    }

    impl Appender for MemoryAppender {
        fn append(&mut self, entry: &LogEntry) -> Result<()> {
            self.entries.lock().push(entry.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }

        fn level(&self) -> LogLevel {
            self.level
        }
    }

    struct FailingAppender;

    impl Appender for FailingAppender {
        fn append(&mut self, _entry: &LogEntry) -> Result<()> {
            Err(LoggerError::writer("sink unavailable"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn append(&mut self, _entry: &LogEntry) -> Result<()> {
            panic!("appender bug");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    struct DropDebugFilter;

    impl Filter for DropDebugFilter {
        fn filter(&self, entry: &mut LogEntry) -> bool {
            entry.level > LogLevel::Debug
        }

        fn name(&self) -> &str {
            "drop-debug"
        }
    }

    #[test]
    fn test_builder_basic() {
        let logger = Logger::builder("basic").min_level(LogLevel::Debug).build();

        assert_eq!(logger.name(), "basic");
        assert_eq!(logger.level(), LogLevel::Debug);
        assert!(!logger.propagate());
        assert!(logger.appender_names().is_empty());
    }

    #[test]
    fn test_logger_level_gate() {
        let memory = MemoryAppender::default();
        let logger = Logger::builder("gate")
            .min_level(LogLevel::Warning)
            .appender(memory.clone())
            .build();

        logger.info("hidden");
        logger.warning("shown");
        logger.critical("shown too");

        assert_eq!(memory.messages(), vec!["shown", "shown too"]);
    }

    #[test]
    fn test_appender_level_gate() {
        let all = MemoryAppender::at(LogLevel::Debug);
        let errors_only = MemoryAppender::at(LogLevel::Error);
        let logger = Logger::builder("per-sink")
            .min_level(LogLevel::Debug)
            .appender(all.clone())
            .appender(errors_only.clone())
            .build();

        logger.debug("d");
        logger.error("e");

        assert_eq!(all.messages(), vec!["d", "e"]);
        assert_eq!(errors_only.messages(), vec!["e"]);
    }

    #[test]
    fn test_environment_filter_applied_before_appenders() {
        let memory = MemoryAppender::default();
        let logger = Logger::builder("env")
            .filter(EnvironmentFilter::new(Environment::Prod))
            .appender(memory.clone())
            .build();

        logger.info("tagged");

        let entries = memory.entries.lock();
        assert_eq!(entries[0].environment.as_deref(), Some("prod"));
        assert_eq!(entries[0].logger_name, "env");
    }

    #[test]
    fn test_filter_can_drop() {
        let memory = MemoryAppender::at(LogLevel::Debug);
        let logger = Logger::builder("dropper")
            .min_level(LogLevel::Debug)
            .filter(DropDebugFilter)
            .appender(memory.clone())
            .build();

        logger.debug("dropped");
        logger.info("kept");

        assert_eq!(memory.messages(), vec!["kept"]);
    }

    #[test]
    fn test_failing_appender_isolated() {
        let memory = MemoryAppender::default();
        let logger = Logger::builder("isolated")
            .appender(FailingAppender)
            .appender(PanickingAppender)
            .appender(memory.clone())
            .build();

        logger.error("still delivered");

        assert_eq!(memory.messages(), vec!["still delivered"]);
        assert_eq!(logger.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_extra_reaches_appenders() {
        let memory = MemoryAppender::default();
        let logger = Logger::builder("extra").appender(memory.clone()).build();

        logger.info_with_context("with extra", LogContext::new().with_field("id", 7));

        let entries = memory.entries.lock();
        assert_eq!(entries[0].extra.len(), 1);
    }

    #[test]
    fn test_from_config_without_host_skips_logstash() {
        let config = LoggerConfig::new().with_environment(Environment::Test);
        let logger = Logger::from_config("no-host", &config);

        assert_eq!(logger.appender_names(), vec!["console"]);
        assert_eq!(logger.filter_names(), vec!["environment"]);
    }

    #[test]
    fn test_from_config_sinks_disabled() {
        let config = LoggerConfig::new()
            .with_console(false)
            .with_logstash("127.0.0.1", 5959)
            .with_logstash_enabled(false);
        let logger = Logger::from_config("silent", &config);

        assert!(logger.appender_names().is_empty());
    }
}
