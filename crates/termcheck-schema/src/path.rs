//! # Dotted Paths
//!
//! Location of a field inside nested input, rendered as `a.b.c`. The root
//! path is empty; a base prefix can be supplied through `ParseOptions`.

use std::fmt;

use termcheck_core::Key;

/// A dotted path such as `listeners.http.port`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DottedPath(String);

impl DottedPath {
    /// A path starting at `base` (may be empty).
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    /// Extend the path by one key.
    pub fn child(&self, key: &Key) -> Self {
        if self.0.is_empty() {
            Self(key.name().to_string())
        } else {
            Self(format!("{}.{}", self.0, key.name()))
        }
    }

    /// The rendered path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DottedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
