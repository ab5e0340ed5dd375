use std::path::PathBuf;
use thiserror::Error;

/// Main error type for alertwatch
#[derive(Debug, Error)]
pub enum AlertWatchError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Missing required configuration field: {0}")]
    MissingConfigField(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // Filesystem errors
    #[error("Failed to scan watch directory {}: {source}", path.display())]
    WatchDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read log file {}: {source}", path.display())]
    LogFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Delivery errors
    #[error("Failed to deliver alerts: {0}")]
    NotifyError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for alertwatch operations
pub type Result<T> = std::result::Result<T, AlertWatchError>;
