//! # Symbol Table — Interned Names With Fail-Closed Lookup
//!
//! A `Symbol` is an interned, process-wide name. Symbols are created
//! explicitly with [`Symbol::intern`], normally while schemas are being
//! built at startup. Textual input is only ever mapped onto a symbol that
//! already exists ([`Symbol::existing`]); lookup never grows the table.
//!
//! ## Security Invariant
//!
//! Untrusted input (config files, API payloads) must not be able to create
//! symbols. Every code path that converts text to a symbol on behalf of
//! input data goes through `existing()`, so an unknown name fails closed.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

fn table() -> &'static RwLock<HashSet<Arc<str>>> {
    static TABLE: OnceLock<RwLock<HashSet<Arc<str>>>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(HashSet::new()))
}

/// An interned name.
///
/// Cloning is cheap (reference-counted). Equality and ordering compare the
/// underlying name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Intern `name`, creating the symbol if it does not exist yet.
    pub fn intern(name: &str) -> Self {
        if let Some(existing) = Self::existing(name) {
            return existing;
        }
        let mut guard = table().write();
        // Another writer may have raced us between the read and the write.
        if let Some(found) = guard.get(name) {
            return Self(Arc::clone(found));
        }
        let interned: Arc<str> = Arc::from(name);
        guard.insert(Arc::clone(&interned));
        Self(interned)
    }

    /// Look up an already-interned symbol. Never creates one.
    pub fn existing(name: &str) -> Option<Self> {
        table().read().get(name).map(|s| Self(Arc::clone(s)))
    }

    /// The symbol's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::intern(name)
    }
}
