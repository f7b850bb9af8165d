//! Error types for SmileCare
//!
//! Every module reports failures through [`CareError`]. Input-format errors
//! carry the user-facing hint verbatim so the CLI and REPL can print them as-is.

use thiserror::Error;

/// Main error type for the SmileCare assistant
#[derive(Error, Debug)]
pub enum CareError {
    /// Date, time or number did not match the expected format
    #[error("Invalid {what}! Use {expected}.")]
    InvalidFormat { what: String, expected: String },

    /// Required input was empty or out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown diet concern or check kind
    #[error("Invalid category")]
    UnknownCategory(String),

    /// Image could not be opened or decoded
    #[error("Failed to load image: {path}")]
    ImageLoad {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Image decoded but has no pixels to analyse
    #[error("Image is empty")]
    EmptyImage,

    /// No reminder with the given id
    #[error("Reminder not found: {0}")]
    ReminderNotFound(String),

    /// No patient with the given name
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

impl CareError {
    /// Shorthand for format errors such as `Invalid time format! Use HH:MM.`
    pub fn format(what: impl Into<String>, expected: impl Into<String>) -> Self {
        CareError::InvalidFormat {
            what: what.into(),
            expected: expected.into(),
        }
    }
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, CareError>;

/// Convert anyhow errors to CareError
impl From<anyhow::Error> for CareError {
    fn from(err: anyhow::Error) -> Self {
        CareError::Generic(err.to_string())
    }
}
