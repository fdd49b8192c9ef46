/*!
 * Error types for the pinyin-annotator engine.
 *
 * This module contains custom error types for the different collaborators of
 * the annotation engine, using the thiserror crate for ergonomic error definitions.
 * None of these errors cross the action boundary: the dispatcher logs them and
 * carries on with the next node.
 */

use thiserror::Error;

/// Errors that can occur when talking to a conversion service
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The conversion request could not be completed
    #[error("Conversion request failed: {0}")]
    RequestFailed(String),

    /// The service answered with something that is not usable markup
    #[error("Malformed conversion response: {0}")]
    MalformedResponse(String),

    /// The channel to the service is gone
    #[error("Conversion channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors raised while parsing markup into document nodes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// The parser had to recover from malformed markup
    #[error("Markup rejected after {errors} parse error(s), first: {first}")]
    Rejected {
        /// Number of parse errors reported
        errors: usize,
        /// The first error message
        first: String,
    },
}

/// Errors from the preference store backends
#[derive(Error, Debug)]
pub enum PreferenceError {
    /// Reading or writing the backing file failed
    #[error("Preference storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be (de)serialized
    #[error("Preference serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other backend failure
    #[error("Preference backend error: {0}")]
    Backend(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the conversion service
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Error from markup parsing
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Error from the preference store
    #[error("Preference error: {0}")]
    Preference(#[from] PreferenceError),

    /// The message channel to the controller is closed
    #[error("Channel error: {0}")]
    Channel(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
