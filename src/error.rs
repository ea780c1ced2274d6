//! Error types and handling for the `FoodMap` search pipeline

use serde::Serialize;
use thiserror::Error;

/// Stable tag identifying the kind of failure surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InterpretationError,
    GeocodingError,
    StoreUnavailable,
    ValidationError,
    ConfigError,
    IoError,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InterpretationError => "interpretation_error",
            ErrorCode::GeocodingError => "geocoding_error",
            ErrorCode::StoreUnavailable => "store_unavailable",
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::ConfigError => "config_error",
            ErrorCode::IoError => "io_error",
        }
    }
}

/// Main error type for the `FoodMap` application
#[derive(Error, Debug)]
pub enum FoodMapError {
    /// Text-understanding provider unreachable, timed out or returned malformed output
    #[error("Interpretation error: {message}")]
    Interpretation { message: String },

    /// Geocoding provider unreachable or timed out
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// Resource store could not be reached
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl FoodMapError {
    /// Create a new interpretation error
    pub fn interpretation<S: Into<String>>(message: S) -> Self {
        Self::Interpretation {
            message: message.into(),
        }
    }

    /// Create a new geocoding error
    pub fn geocoding<S: Into<String>>(message: S) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    /// Create a new store unavailable error
    pub fn store_unavailable<S: Into<String>>(message: S) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            FoodMapError::Interpretation { .. } => ErrorCode::InterpretationError,
            FoodMapError::Geocoding { .. } => ErrorCode::GeocodingError,
            FoodMapError::StoreUnavailable { .. } => ErrorCode::StoreUnavailable,
            FoodMapError::Validation { .. } => ErrorCode::ValidationError,
            FoodMapError::Config { .. } => ErrorCode::ConfigError,
            FoodMapError::Io { .. } => ErrorCode::IoError,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FoodMapError::Interpretation { .. } => {
                "We could not understand the search right now. Please try again or rephrase it."
                    .to_string()
            }
            FoodMapError::Geocoding { .. } => {
                "The location service is unavailable, so the place could not be shown on the map."
                    .to_string()
            }
            FoodMapError::StoreUnavailable { .. } => {
                "Food resources are temporarily unavailable. Please try again later.".to_string()
            }
            FoodMapError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            FoodMapError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            FoodMapError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
