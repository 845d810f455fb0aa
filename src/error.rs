//! # Error Types
//!
//! Custom error types for the Geiger logger using `thiserror`.

use thiserror::Error;

/// Main error type for the Geiger logger
#[derive(Debug, Error)]
pub enum GeigerLogError {
    /// No device identity has ever been provisioned.
    ///
    /// Fatal for logging: a record without a device id is meaningless and
    /// must never be written.
    #[error("device identity not provisioned: {0}")]
    ConfigurationMissing(String),

    /// GPS fix is untrustworthy (receiver has no lock, or fields are not
    /// calendar-valid). The current reporting cycle aborts; the next tick
    /// retries automatically.
    #[error("invalid GPS fix: {0}")]
    InvalidFix(String),

    /// The log sink rejected the record (storage full, device absent,
    /// transport error). Surfaced to the caller; never retried internally.
    #[error("log write failed: {0}")]
    WriteFailed(String),

    /// GPS data-path errors (line framing, sentence parse)
    #[error("GPS error: {0}")]
    Gps(String),

    /// Serial port errors
    #[error("serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the Geiger logger
pub type Result<T> = std::result::Result<T, GeigerLogError>;
