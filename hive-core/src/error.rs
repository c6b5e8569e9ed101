//! # Hive Error Types
//!
//! Centralized error handling for the Hive core library.

use thiserror::Error;

/// Result type alias for Hive operations
pub type Result<T> = std::result::Result<T, HiveError>;

/// Core error types for Hive
#[derive(Error, Debug)]
pub enum HiveError {
    /// Knowledge persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource fetch errors (only surfaced by the transport layer)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(String),

    /// Task execution exceeded its time budget
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Task addressed to an agent that is not registered
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// The scheduler inbox has been closed
    #[error("Task queue closed")]
    QueueClosed,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl HiveError {
    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new execution error
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new unknown agent error
    pub fn unknown_agent(id: impl Into<String>) -> Self {
        Self::UnknownAgent(id.into())
    }

    /// Create a new configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new generic/other error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable short name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage",
            Self::Fetch(_) => "fetch",
            Self::Execution(_) => "execution",
            Self::Timeout(_) => "timeout",
            Self::InvalidInput(_) => "invalid_input",
            Self::UnknownAgent(_) => "unknown_agent",
            Self::QueueClosed => "queue_closed",
            Self::Configuration(_) => "configuration",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

impl From<toml::de::Error> for HiveError {
    fn from(e: toml::de::Error) -> Self {
        Self::Configuration(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            HiveError::unknown_agent("ghost").to_string(),
            "Unknown agent: ghost"
        );
        assert_eq!(HiveError::Timeout(30).to_string(), "Timed out after 30s");
        assert_eq!(HiveError::QueueClosed.kind(), "queue_closed");
    }
}
