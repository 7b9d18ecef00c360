//! Appender implementations

pub mod console;
pub mod logstash;
pub mod logstash_formatter;

pub use console::ConsoleAppender;
pub use logstash::{LogstashAppender, DEFAULT_SHUTDOWN_TIMEOUT};
pub use logstash_formatter::{LogstashFormatter, DEFAULT_EXTRA_PREFIX, DEFAULT_MESSAGE_TYPE};

pub use crate::core::Appender;
