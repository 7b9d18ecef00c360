//! Record filters run by a logger before any appender sees the record

use super::environment::Environment;
use super::log_entry::LogEntry;

/// Inspects, and may modify, every record a logger produces
///
/// Returning `false` drops the record for all appenders.
pub trait Filter: Send + Sync {
    fn filter(&self, entry: &mut LogEntry) -> bool;
    fn name(&self) -> &str;
}

/// Stamps a fixed environment label onto every record
///
/// Never drops anything.
#[derive(Debug, Clone)]
pub struct EnvironmentFilter {
    environment: Environment,
}

impl EnvironmentFilter {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

impl Filter for EnvironmentFilter {
    fn filter(&self, entry: &mut LogEntry) -> bool {
        entry.environment = Some(self.environment.as_str().to_string());
        true
    }

    fn name(&self) -> &str {
        "environment"
    }
}
