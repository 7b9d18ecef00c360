//! Process-wide logger registry
//!
//! One name maps to one logger for the lifetime of the registry. The first
//! call for a name decides its configuration; later calls with a different
//! `LoggerConfig` get the existing logger back and their configuration is
//! ignored.
//!
//! The global registry lives in a static and is never dropped, so its
//! loggers never run their shutdown. Call [`flush_all`] (or `flush` on each
//! logger) before the process exits to deliver queued Logstash documents.

use super::config::LoggerConfig;
use super::error::Result;
use super::logger::Logger;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

static GLOBAL_REGISTRY: Lazy<LoggerRegistry> = Lazy::new(LoggerRegistry::new);

/// Name-to-logger mapping with first-writer-wins construction
///
/// # Example
///
/// ```
/// use elk_logger::{Environment, LoggerConfig, LoggerRegistry};
/// use std::sync::Arc;
///
/// let registry = LoggerRegistry::new();
/// let prod = LoggerConfig::new().with_environment(Environment::Prod);
/// let first = registry.get_or_create("svc", &prod);
/// let second = registry.get_or_create("svc", &LoggerConfig::new().with_console(false));
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert!(second.has_appender("console"));
/// ```
#[derive(Default)]
pub struct LoggerRegistry {
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self {
            loggers: Mutex::new(HashMap::new()),
        }
    }

    /// The registry behind [`setup_logger`] and [`get_logger`]
    pub fn global() -> &'static LoggerRegistry {
        &GLOBAL_REGISTRY
    }

    /// Return the logger for `name`, building it from `config` on first use
    ///
    /// `config` is ignored when `name` is already registered.
    pub fn get_or_create(&self, name: &str, config: &LoggerConfig) -> Arc<Logger> {
        self.get_or_create_with(name, || Logger::from_config(name, config))
    }

    /// Return the logger for `name`, calling `build` only if it is missing
    ///
    /// The lookup, the call to `build` and the insert happen under one lock,
    /// so concurrent callers for the same name run `build` at most once and
    /// all receive the same `Arc`.
    pub fn get_or_create_with<F>(&self, name: &str, build: F) -> Arc<Logger>
    where
        F: FnOnce() -> Logger,
    {
        let mut loggers = self.loggers.lock();
        if let Some(logger) = loggers.get(name) {
            return Arc::clone(logger);
        }

        let logger = Arc::new(build());
        loggers.insert(name.to_string(), Arc::clone(&logger));
        logger
    }

    /// Existing logger for `name`, or a new one with the default config
    pub fn get(&self, name: &str) -> Arc<Logger> {
        self.get_or_create(name, &LoggerConfig::default())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.loggers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.lock().is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Flush every registered logger
    ///
    /// Each logger is flushed even if an earlier one fails; the first error
    /// is returned. The registry lock is not held while flushing.
    pub fn flush_all(&self) -> Result<()> {
        let loggers: Vec<Arc<Logger>> = self.loggers.lock().values().cloned().collect();

        let mut first_error = None;
        for logger in loggers {
            if let Err(e) = logger.flush() {
                eprintln!(
                    "[LOGGER ERROR] Failed to flush logger '{}': {}",
                    logger.name(),
                    e
                );
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Configure (once) and return the process-wide logger named `name`
///
/// ```
/// use elk_logger::{setup_logger, Environment, LoggerConfig};
///
/// let logger = setup_logger(
///     "payments",
///     LoggerConfig::new().with_environment(Environment::Staging),
/// );
/// logger.info("payment service ready");
/// ```
pub fn setup_logger(name: &str, config: LoggerConfig) -> Arc<Logger> {
    GLOBAL_REGISTRY.get_or_create(name, &config)
}

/// Process-wide logger named `name`, created with defaults if missing
pub fn get_logger(name: &str) -> Arc<Logger> {
    GLOBAL_REGISTRY.get(name)
}

/// Drain every process-wide logger; call before exiting
pub fn flush_all() -> Result<()> {
    GLOBAL_REGISTRY.flush_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Environment, LogLevel};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    fn quiet() -> LoggerConfig {
        LoggerConfig::new().with_console(false)
    }

    #[test]
    fn test_same_name_same_handle() {
        let registry = LoggerRegistry::new();
        let a = registry.get_or_create("svc", &quiet());
        let b = registry.get_or_create("svc", &quiet());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_config_wins() {
        let registry = LoggerRegistry::new();
        let first = registry.get_or_create("svc", &quiet().with_level(LogLevel::Error));
        let second = registry.get_or_create(
            "svc",
            &LoggerConfig::new()
                .with_level(LogLevel::Debug)
                .with_environment(Environment::Prod),
        );

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.level(), LogLevel::Error);
        assert!(second.appender_names().is_empty());
    }

    #[test]
    fn test_distinct_names() {
        let registry = LoggerRegistry::new();
        let a = registry.get_or_create("a", &quiet());
        let b = registry.get_or_create("b", &quiet());

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_get_creates_with_defaults() {
        let registry = LoggerRegistry::new();
        assert!(registry.is_empty());

        let logger = registry.get("lazy");
        assert!(registry.contains("lazy"));
        assert_eq!(logger.level(), LogLevel::Info);
        assert_eq!(logger.appender_names(), vec!["console"]);
        assert!(Arc::ptr_eq(&logger, &registry.get("lazy")));
    }

    #[test]
    fn test_get_returns_configured_logger() {
        let registry = LoggerRegistry::new();
        let configured = registry.get_or_create("cfg", &quiet().with_level(LogLevel::Warning));

        let looked_up = registry.get("cfg");
        assert!(Arc::ptr_eq(&configured, &looked_up));
        assert_eq!(looked_up.level(), LogLevel::Warning);
    }

    #[test]
    fn test_concurrent_construction_builds_once() {
        const THREADS: usize = 16;

        let registry = Arc::new(LoggerRegistry::new());
        let builds = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let builds = Arc::clone(&builds);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_or_create_with("race", || {
                        builds.fetch_add(1, Ordering::SeqCst);
                        Logger::from_config("race", &quiet())
                    })
                })
            })
            .collect();

        let loggers: Vec<Arc<Logger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(loggers.len(), THREADS);
        assert!(loggers.iter().all(|l| Arc::ptr_eq(l, &loggers[0])));
        // registry copy plus one per thread
        assert_eq!(Arc::strong_count(&loggers[0]), THREADS + 1);
    }

    #[test]
    fn test_flush_all_reaches_every_logger() {
        use crate::core::{Appender, LogEntry, LoggerError};

        struct FlushCounter(Arc<AtomicUsize>);

        impl Appender for FlushCounter {
            fn append(&mut self, _entry: &LogEntry) -> crate::core::Result<()> {
                Ok(())
            }

            fn flush(&mut self) -> crate::core::Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(LoggerError::writer("flush refused"))
            }

            fn name(&self) -> &str {
                "flush-counter"
            }
        }

        let registry = LoggerRegistry::new();
        let flushes = Arc::new(AtomicUsize::new(0));
        for name in ["a", "b", "c"] {
            let counter = FlushCounter(Arc::clone(&flushes));
            registry.get_or_create_with(name, || Logger::builder(name).appender(counter).build());
        }

        assert!(registry.flush_all().is_err());
        assert_eq!(flushes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = setup_logger("registry-tests-global", quiet());
        let b = get_logger("registry-tests-global");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(LoggerRegistry::global().contains("registry-tests-global"));
    }
}
