//! Custom error types for locbook
//!
//! Library code returns these structured errors; the binary and the TUI wrap
//! them in `anyhow` at the edges.

use thiserror::Error;

/// Main error type for locbook
#[derive(Error, Debug)]
pub enum LocbookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Location or preference store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the {0} directory")]
    NoProjectDirectory(&'static str),

    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration file: {0}")]
    SaveFailed(String),
}

/// Errors raised by the persistence collaborators
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Failed to read store {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Failed to write store {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Store file is corrupt: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Geocoding/positioning errors
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Address lookup request failed: {0}")]
    RequestFailed(String),

    #[error("No results for address: {0}")]
    NoResults(String),

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Validation errors
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid rate: {0}. Must be between 1 and 5")]
    InvalidRate(i64),

    #[error("Invalid coordinates: {lat}, {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Invalid position '{0}'. Expected LAT,LNG")]
    InvalidPosition(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Invalid share URL base: {0}")]
    InvalidShareBase(String),
}

/// Result type alias for locbook
pub type Result<T> = std::result::Result<T, LocbookError>;
