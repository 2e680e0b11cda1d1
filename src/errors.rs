/*!
 * Error types for the rtlsub application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the service asked us to slow down
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimitExceeded(_))
    }

    /// Whether retrying the same request can never succeed
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthenticationError(_))
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A batch could not be translated down to single-line granularity
    #[error("Batch of {size} line(s) could not be translated")]
    Untranslatable {
        /// Number of lines in the failed batch
        size: usize,
    },

    /// The service rejected us in a way no retry can fix
    #[error("Translation aborted: {0}")]
    Fatal(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A rename would have overwritten an existing file
    #[error("Refusing to rename {from:?} to {to:?}: destination already exists")]
    RenameConflict {
        /// File that was about to be renamed
        from: PathBuf,
        /// Destination that unexpectedly exists
        to: PathBuf,
    },

    /// A file failed translation on both passes
    #[error("Persistent failure translating {0:?}")]
    PersistentFailure(PathBuf),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Whether the run must stop instead of moving on to the next file
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Translation(TranslationError::Fatal(_)))
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
