//! # termcheck-config — Configuration Loading & Storage
//!
//! Connects validated configuration to the rest of an application:
//!
//! - [`store`]: [`ConfigStore`], a concurrent `(owner, scope, key)` value
//!   store with per-key atomic increment.
//! - [`loader`]: [`load_file`] / [`load_str`], which decode YAML or JSON,
//!   validate against a [`Schema`](termcheck_schema::Schema), and publish
//!   the accepted top-level values into a store.
//!
//! ## Crate Policy
//!
//! - Depends on `termcheck-core` and `termcheck-schema` internally.
//! - Nothing is published from a document that failed validation.

pub mod loader;
pub mod store;

pub use loader::{decode, load_file, load_str, DecodeError, Format, LoadError, LoaderOptions};
pub use store::{ConfigStore, StoreError, StoreKey};
