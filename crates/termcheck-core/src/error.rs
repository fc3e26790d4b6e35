//! # Error Types
//!
//! Errors raised by the foundational collaborators: timestamp
//! canonicalization, URI and token-list grammar, and term conversion
//! from decoded config documents. All errors use `thiserror`.

use thiserror::Error;

/// Top-level error type for `termcheck-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A timestamp could not be canonicalized.
    #[error("invalid timestamp {input:?}: {reason}")]
    Timestamp {
        /// The raw input, rendered as text.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A URI failed to parse.
    #[error("invalid uri {input:?}: {reason}")]
    Uri {
        /// The raw input text.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A token list failed to parse.
    #[error("invalid token list {input:?}: {reason}")]
    Tokens {
        /// The raw input text.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A decoded document could not be represented as a term.
    #[error("term conversion error: {0}")]
    Conversion(String),
}
