//! Core error types for dawnchorus-core.
//!
//! Errors are grouped by the layer that raises them: configuration,
//! validation of alarms and window parameters, and the platform notifier.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dawnchorus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Alarm time outside 00:00..=23:59
    #[error("Invalid alarm time {hour:02}:{minute:02}: hour must be 0-23 and minute 0-59")]
    InvalidAlarmTime { hour: u8, minute: u8 },

    /// Phrase list does not cover every event of the window
    #[error("Phrase list has {actual} entries but the window produces {expected} events")]
    PhraseCountMismatch { expected: usize, actual: usize },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors reported by a platform notifier.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum NotifierError {
    /// The user has not granted notification permission
    #[error("Notification permission denied: {0}")]
    PermissionDenied(String),

    /// The platform API rejected the request
    #[error("{platform} notification API error: {message}")]
    Platform { platform: String, message: String },

    /// The notification service cannot be reached
    #[error("Notification service unavailable: {0}")]
    Unavailable(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
