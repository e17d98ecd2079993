//! Database configuration

use std::time::Duration;

/// Path that opens a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// File path, or `:memory:`
    pub path: String,
    /// How long a writer waits for the database lock
    pub busy_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: IN_MEMORY.to_string(),
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }
}
