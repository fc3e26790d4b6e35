//! # termcheck-schema — Declarative Term Validation
//!
//! Validates a loosely typed [`Term`](termcheck_core::Term) (typically a
//! decoded YAML or JSON document) against a declarative [`Schema`] and
//! returns the accepted, coerced key/value pairs or the first error, tagged
//! with the dotted path of the offending field.
//!
//! ## Layers
//!
//! - [`primitive`]: one validator per [`TypeTag`]: coercion from text,
//!   bounds checks, host/IP/URI/path normalization.
//! - [`list`]: list wrappers with ordered, sorted and unique disciplines.
//! - [`schema`]: field rules plus the level-scoped `defaults` and
//!   `mandatory` directives, and fragment merging.
//! - [`engine`]: the recursive descent over nested levels.
//!
//! ## Example
//!
//! ```
//! use termcheck_core::{Key, Term};
//! use termcheck_schema::{parse, Schema, TypeTag};
//!
//! let schema = Schema::new()
//!     .field("port", TypeTag::Port)
//!     .default_value("port", Term::Int(8080))
//!     .field("host", TypeTag::Host)
//!     .mandatory(["host"]);
//!
//! let input = Term::map([(Key::text("host"), Term::str("Example.COM"))]);
//! let out = parse(&input, &schema).unwrap();
//! assert_eq!(out.get("host"), Some(&Term::str("example.com")));
//! assert_eq!(out.get("port"), Some(&Term::Int(8080)));
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `termcheck-core` internally.
//! - Schemas are immutable after construction and safe to share across
//!   threads. A `parse` call owns all of its state.
//! - Input is untrusted: validation never creates symbols and never panics
//!   on malformed data. Callback panics are contained and reported.

pub mod engine;
pub mod error;
pub mod list;
pub mod path;
pub mod primitive;
pub mod rule;
pub mod schema;

pub use engine::{parse, parse_with, Context, ParseOptions, ParseOutput};
pub use error::ParseError;
pub use path::DottedPath;
pub use primitive::{validate, validate_named, Invalid, Outcome};
pub use rule::{Callback, Multiplicity, Rule, TypeTag, Verdict};
pub use schema::{add_defaults, add_mandatory, merge, merge_terms, Schema};
