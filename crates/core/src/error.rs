//! Error types for Glean operations.
//!
//! This module defines the main error type [`GleanError`] which represents
//! every failure the engine can surface to its caller: bad input, unparseable
//! documents, oversized documents and unexpected internal faults.
//!
//! Failures while resolving a block's URL or date are never represented here.
//! Those are recovered locally and show up as empty fields in the result.
//!
//! # Example
//!
//! ```rust
//! use glean_core::{GleanError, MatchConfig, find_matches};
//!
//! match find_matches("   ", &["rain"], &MatchConfig::default()) {
//!     Err(GleanError::Validation(msg)) => println!("bad request: {}", msg),
//!     Err(e) => println!("Error: {}", e),
//!     Ok(result) => println!("{:?}", result),
//! }
//! ```

use thiserror::Error;

/// Main error type for keyword extraction operations.
#[derive(Error, Debug)]
pub enum GleanError {
    /// Caller supplied a missing, empty or wrong-typed document, keyword list
    /// or option.
    ///
    /// Never worth retrying with the same input.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The document could not be parsed, even leniently.
    ///
    /// html5ever recovers from any markup, so in practice this only happens
    /// for non-text input such as bytes that are not UTF-8.
    #[error("Failed to parse HTML: {0}")]
    Parse(String),

    /// Input exceeds the configured size ceiling.
    #[error("Document is {size} bytes, larger than the {limit} byte limit")]
    ResourceLimit { size: usize, limit: usize },

    /// Invalid base URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Unexpected failure during normalization, matching or assembly.
    ///
    /// Front ends log the message and report a generic failure.
    #[error("Internal processing error: {0}")]
    Internal(String),
}

impl GleanError {
    /// Whether the error is the caller's fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidUrl(_) | Self::ResourceLimit { .. })
    }
}

impl From<url::ParseError> for GleanError {
    fn from(err: url::ParseError) -> Self {
        GleanError::InvalidUrl(err.to_string())
    }
}

/// Result type alias for GleanError.
pub type Result<T> = std::result::Result<T, GleanError>;
