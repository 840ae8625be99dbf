//! Core error types for pomodoro-core.
//!
//! This module defines the error hierarchy using thiserror. Timer
//! operations return [`TimerError`]; configuration I/O returns
//! [`ConfigError`]; [`CoreError`] wraps both for callers that mix them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomodoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer session errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the timer session controller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimerError {
    /// Duration was zero, negative, NaN or infinite.
    #[error("Invalid duration: {minutes} minutes (must be a finite positive number)")]
    InvalidDuration { minutes: f64 },

    /// Operation is only allowed while no countdown is running.
    #[error("A countdown is already running")]
    SessionActive,

    /// `resolve_alert` was called without an expiry to respond to.
    #[error("No expiry alert is pending")]
    NoPendingAlert,
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
