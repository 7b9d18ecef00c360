//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod environment;
pub mod error;
pub mod filter;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod payload;
pub mod registry;
pub mod timestamp;

pub use appender::Appender;
pub use config::{LoggerConfig, SharedWriter, DEFAULT_LOGSTASH_PORT, DEFAULT_QUEUE_CAPACITY};
pub use environment::Environment;
pub use error::{LoggerError, Result};
pub use filter::{EnvironmentFilter, Filter};
pub use log_context::{non_serializable, FieldValue, LogContext, OpaqueValue};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use payload::{build_extra, build_extra_default, truncate, DEFAULT_MAX_LENGTH, RAW_JSON_FIELD};
pub use registry::{flush_all, get_logger, setup_logger, LoggerRegistry};
pub use timestamp::TimestampFormat;
