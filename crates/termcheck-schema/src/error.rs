//! # Parse Errors
//!
//! Every failure carries the dotted path of the field that caused it, so a
//! caller can point at the exact location in a nested document. The first
//! failure aborts the whole `parse` call; no partial result is returned.
//!
//! `UnrecognizedRuleTag` is different in kind: it reports a defect in the
//! schema itself (a tag name the engine does not know) and is raised while
//! the schema is being built, never while validating data.

use termcheck_core::Term;
use thiserror::Error;

/// Error returned by schema construction and by `parse`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A field's raw value failed its rule.
    #[error("syntax error at '{path}': {reason}")]
    Syntax {
        /// Dotted path of the offending field.
        path: String,
        /// What the rule expected.
        reason: String,
    },

    /// A mandatory field is absent after defaults were applied.
    #[error("missing mandatory field '{path}'")]
    MissingField {
        /// Dotted path of the missing field.
        path: String,
    },

    /// A schema used a rule tag the engine does not recognize.
    #[error("unrecognized rule tag '{tag}'")]
    UnrecognizedRuleTag {
        /// The tag as written.
        tag: String,
    },

    /// A callback rejected the field with its own error payload.
    #[error("callback rejected '{path}': {detail:?}")]
    Callback {
        /// Dotted path of the field.
        path: String,
        /// Payload returned by the callback, verbatim.
        detail: Term,
    },

    /// A callback panicked while validating the field.
    #[error("callback for '{path}' failed unexpectedly")]
    CallbackFault {
        /// Dotted path of the field.
        path: String,
    },
}

impl ParseError {
    pub(crate) fn syntax(path: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        ParseError::Syntax {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// The dotted path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ParseError::Syntax { path, .. }
            | ParseError::MissingField { path }
            | ParseError::Callback { path, .. }
            | ParseError::CallbackFault { path } => Some(path),
            ParseError::UnrecognizedRuleTag { .. } => None,
        }
    }

    /// True for errors describing bad data, as opposed to a broken schema
    /// or a faulting callback. Alternatives fall through to the next
    /// candidate only on data errors.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ParseError::Syntax { .. } | ParseError::MissingField { .. } | ParseError::Callback { .. }
        )
    }
}
