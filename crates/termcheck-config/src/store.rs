//! In-memory configuration store using DashMap.
//!
//! Values are addressed by `(owner, scope, key)`. Reads never block writers
//! on other shards; a write to one key is last-write-wins, and
//! [`ConfigStore::atomic_increment`] holds the key's shard lock for the
//! whole read-modify-write.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use termcheck_core::Term;
use thiserror::Error;

/// Address of one stored value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    /// Application or module that owns the value.
    pub owner: String,
    /// Partition within the owner, e.g. `global` or a host name.
    pub scope: String,
    /// Name of the value.
    pub key: String,
}

impl StoreKey {
    /// Build a key from its three parts.
    pub fn new(owner: impl Into<String>, scope: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            scope: scope.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.scope, self.key)
    }
}

/// Store operation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Increment of a value that is not an integer.
    #[error("cannot increment {key}: stored value is {found}, not an integer")]
    NotAnInteger {
        /// `owner/scope/key` of the value.
        key: String,
        /// Kind of the stored value.
        found: &'static str,
    },

    /// Increment would leave the `i64` range.
    #[error("incrementing {key} by {delta} overflows")]
    Overflow {
        /// `owner/scope/key` of the value.
        key: String,
        /// The rejected increment.
        delta: i64,
    },
}

/// Shared configuration store.
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<DashMap<StoreKey, Term>>,
}

impl ConfigStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored value, or `default` when absent.
    pub fn get(&self, owner: &str, scope: &str, key: &str, default: Term) -> Term {
        self.inner
            .get(&StoreKey::new(owner, scope, key))
            .map(|entry| entry.value().clone())
            .unwrap_or(default)
    }

    /// Store `value`, replacing any previous one.
    pub fn put(&self, owner: &str, scope: &str, key: &str, value: Term) {
        let key = StoreKey::new(owner, scope, key);
        tracing::debug!(key = %key, kind = value.kind(), "store put");
        self.inner.insert(key, value);
    }

    /// Remove a value. Returns it if it was present.
    pub fn delete(&self, owner: &str, scope: &str, key: &str) -> Option<Term> {
        self.inner
            .remove(&StoreKey::new(owner, scope, key))
            .map(|(_, value)| value)
    }

    /// Add `delta` to an integer value and return the new value.
    ///
    /// A missing key starts at 0.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotAnInteger`] if the stored value is not an integer,
    /// [`StoreError::Overflow`] if the sum does not fit in `i64`. The stored
    /// value is left unchanged on error.
    pub fn atomic_increment(&self, owner: &str, scope: &str, key: &str, delta: i64) -> Result<i64, StoreError> {
        let key = StoreKey::new(owner, scope, key);
        match self.inner.entry(key) {
            Entry::Vacant(vacant) => {
                vacant.insert(Term::Int(delta));
                Ok(delta)
            }
            Entry::Occupied(mut occupied) => {
                let current = match occupied.get() {
                    Term::Int(i) => *i,
                    other => {
                        return Err(StoreError::NotAnInteger {
                            key: occupied.key().to_string(),
                            found: other.kind(),
                        })
                    }
                };
                let next = current.checked_add(delta).ok_or_else(|| StoreError::Overflow {
                    key: occupied.key().to_string(),
                    delta,
                })?;
                occupied.insert(Term::Int(next));
                Ok(next)
            }
        }
    }

    /// All `(key, value)` pairs under one owner and scope, sorted by key.
    pub fn scope_entries(&self, owner: &str, scope: &str) -> Vec<(String, Term)> {
        let mut entries: Vec<(String, Term)> = self
            .inner
            .iter()
            .filter(|e| e.key().owner == owner && e.key().scope == scope)
            .map(|e| (e.key().key.clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
