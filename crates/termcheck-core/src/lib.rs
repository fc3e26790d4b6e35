//! # termcheck-core — Foundational Types
//!
//! The bedrock of the termcheck workspace. Every other crate depends on
//! `termcheck-core`; it depends on nothing internal.
//!
//! ## Contents
//!
//! 1. **`Term`**: the dynamic value model validators consume and produce,
//!    with a total order and conversion from decoded YAML/JSON documents.
//!
//! 2. **`Symbol`**: interned names with fail-closed textual lookup. Input
//!    data can never create a symbol.
//!
//! 3. **`Timestamp`**: canonical UTC timestamps at a chosen precision.
//!
//! 4. **`Uri` / `Token`**: absolute URIs and comma-separated token lists.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `termcheck-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod symbol;
pub mod temporal;
pub mod term;
pub mod uri;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use symbol::Symbol;
pub use temporal::{TimeInput, TimeUnit, Timestamp};
pub use term::{is_char_list, Function, Key, Term};
pub use uri::{parse_token_list, parse_uri, render_tokens, render_uri, Token, Uri};
