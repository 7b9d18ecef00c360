//! Console appender implementation

use crate::core::{
    Appender, LogEntry, LogLevel, LoggerError, Result, SharedWriter, TimestampFormat,
    RAW_JSON_FIELD,
};
use std::io::Write;

/// Renders `[timestamp][logger][LEVEL][environment] message` lines
///
/// Extra attributes are shown only when their name is on the allow-list
/// (by default just `raw_json`), as `name=value` pairs after ` | `.
pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    level: LogLevel,
    extra_fields: Vec<String>,
    writer: Option<SharedWriter>,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            timestamp_format: TimestampFormat::default(),
            level: LogLevel::Debug,
            extra_fields: vec![RAW_JSON_FIELD.to_string()],
            writer: None,
        }
    }

    /// Set the timestamp format for this appender
    ///
    /// # Examples
    ///
    /// ```
    /// use elk_logger::appenders::ConsoleAppender;
    /// use elk_logger::TimestampFormat;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Replace the attribute allow-list
    #[must_use]
    pub fn with_extra_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Write to `writer` instead of stdout
    #[must_use]
    pub fn with_writer(mut self, writer: SharedWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Render one record as a console line (without trailing newline)
    pub fn format_line(&self, entry: &LogEntry) -> String {
        let level_str = if self.use_colors {
            entry.level.paint(entry.level.to_str()).to_string()
        } else {
            entry.level.to_str().to_string()
        };

        let mut line = format!(
            "[{}][{}][{}][{}] {}",
            self.timestamp_format.format(&entry.timestamp),
            entry.logger_name,
            level_str,
            entry.environment.as_deref().unwrap_or("-"),
            entry.message
        );

        let extras: Vec<String> = self
            .extra_fields
            .iter()
            .filter_map(|field| {
                entry
                    .extra
                    .get(field)
                    .map(|value| format!("{}={}", field, value))
            })
            .collect();

        if !extras.is_empty() {
            line.push_str(" | ");
            line.push_str(&extras.join(" "));
        }

        line
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let line = self.format_line(entry);

        let written = match &self.writer {
            Some(writer) => writeln!(writer.lock(), "{}", line),
            None => writeln!(std::io::stdout().lock(), "{}", line),
        };
        written.map_err(|e| LoggerError::io_operation("writing console line", e.to_string(), e))
    }

    fn flush(&mut self) -> Result<()> {
        match &self.writer {
            Some(writer) => writer.lock().flush()?,
            None => std::io::stdout().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }

    fn level(&self) -> LogLevel {
        self.level
    }
}
