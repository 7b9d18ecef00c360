//! # ELK Logger
//!
//! Named loggers that write human-readable lines to the console and ship
//! JSON documents to Logstash.
//!
//! ## Features
//!
//! - **Registry**: one logger per name, configured by its first caller
//! - **Environment tagging**: every record carries `dev`, `staging`, `prod` or `test`
//! - **Logstash shipping**: non-blocking, over TCP, silently skipped without a host
//! - **Payload helpers**: [`truncate`] and [`build_extra`] keep structured extras bounded
//!
//! ```
//! use elk_logger::{build_extra_default, setup_logger, Environment, LoggerConfig};
//! use serde_json::json;
//!
//! let logger = setup_logger(
//!     "checkout",
//!     LoggerConfig::new().with_environment(Environment::Staging),
//! );
//! logger.info_with_context("order placed", build_extra_default(&json!({"order_id": 42})));
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, LogstashAppender, LogstashFormatter};
    pub use crate::core::{
        build_extra, build_extra_default, flush_all, get_logger, setup_logger, truncate, Appender,
        Environment, EnvironmentFilter, FieldValue, Filter, LogContext, LogEntry, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, Result,
    };
}

pub use appenders::{
    ConsoleAppender, LogstashAppender, LogstashFormatter, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use core::{
    build_extra, build_extra_default, flush_all, get_logger, non_serializable, setup_logger,
    truncate, Appender, Environment, EnvironmentFilter, FieldValue, Filter, LogContext, LogEntry,
    LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, LoggerRegistry,
    OpaqueValue, Result, SharedWriter, TimestampFormat, DEFAULT_LOGSTASH_PORT, DEFAULT_MAX_LENGTH,
    DEFAULT_QUEUE_CAPACITY, RAW_JSON_FIELD,
};
