//! # Configuration Loader
//!
//! Reads a YAML or JSON document, validates it against a [`Schema`], and
//! publishes every accepted top-level pair into a [`ConfigStore`] under the
//! loader's owner and scope.
//!
//! Publishing happens only after the whole document validated: a document
//! with any error leaves the store untouched.
//!
//! JSON object keys keep document order, so unknown keys are reported in
//! the order they appear in the file for both formats.

use std::path::Path;

use serde::Deserialize;
use termcheck_core::{CoreError, Term};
use termcheck_schema::{parse_with, ParseError, ParseOptions, ParseOutput, Schema};
use thiserror::Error;

use crate::store::ConfigStore;

/// Where loaded values are published, and how the document is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Store owner, typically the application name.
    pub owner: String,
    /// Store scope, e.g. `global` or a host name.
    pub scope: String,
    /// Options for the validation pass.
    pub parse: ParseOptions,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            owner: "termcheck".to_string(),
            scope: "global".to_string(),
            parse: ParseOptions::default(),
        }
    }
}

/// Document encodings the loader reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML; also accepts JSON text.
    Yaml,
    /// Strict JSON.
    Json,
}

impl Format {
    /// Pick the format from a file extension: `.json` is JSON, everything
    /// else is YAML (a superset of JSON).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Why a document could not be turned into a term.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Malformed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Well-formed YAML with no term equivalent, such as a sequence used
    /// as a mapping key.
    #[error("YAML conversion failed: {0}")]
    Conversion(#[from] CoreError),
}

/// Loader failures.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read '{path}': {reason}")]
    Read {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        reason: String,
    },

    /// The document is not well-formed YAML/JSON.
    #[error("cannot decode '{path}': {source}")]
    Decode {
        /// Path of the file, or `<memory>`.
        path: String,
        #[source]
        source: DecodeError,
    },

    /// The document decoded but failed validation.
    #[error("invalid configuration in '{path}': {source}")]
    Invalid {
        /// Path of the file, or `<memory>`.
        path: String,
        #[source]
        source: ParseError,
    },
}

/// Load, validate and publish a configuration file.
///
/// # Errors
///
/// Returns [`LoadError::Read`] if the file cannot be read,
/// [`LoadError::Decode`] if it is not valid for its format, and
/// [`LoadError::Invalid`] if it fails validation.
pub fn load_file(
    path: &Path,
    schema: &Schema,
    options: &LoaderOptions,
    store: &ConfigStore,
) -> Result<ParseOutput, LoadError> {
    let origin = path.display().to_string();
    tracing::debug!(path = %origin, "loading configuration file");
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: origin.clone(),
        reason: e.to_string(),
    })?;
    load_document(&content, Format::from_path(path), &origin, schema, options, store)
}

/// Validate and publish an in-memory document.
///
/// # Errors
///
/// As [`load_file`], minus read failures. Errors name the source `<memory>`.
pub fn load_str(
    text: &str,
    format: Format,
    schema: &Schema,
    options: &LoaderOptions,
    store: &ConfigStore,
) -> Result<ParseOutput, LoadError> {
    load_document(text, format, "<memory>", schema, options, store)
}

/// Decode a document into a term without validating it.
///
/// # Errors
///
/// Returns [`DecodeError`] naming the syntax or conversion failure.
pub fn decode(text: &str, format: Format) -> Result<Term, DecodeError> {
    match format {
        Format::Json => {
            let value: serde_json::Value = serde_json::from_str(text)?;
            Ok(Term::from_json(&value))
        }
        Format::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(text)?;
            Ok(Term::from_yaml(&value)?)
        }
    }
}

fn load_document(
    text: &str,
    format: Format,
    origin: &str,
    schema: &Schema,
    options: &LoaderOptions,
    store: &ConfigStore,
) -> Result<ParseOutput, LoadError> {
    let document = decode(text, format).map_err(|source| LoadError::Decode {
        path: origin.to_string(),
        source,
    })?;

    let output = parse_with(&document, schema, &options.parse).map_err(|source| LoadError::Invalid {
        path: origin.to_string(),
        source,
    })?;

    for (key, value) in &output.accepted {
        store.put(&options.owner, &options.scope, key.name(), value.clone());
    }
    tracing::debug!(
        path = %origin,
        owner = %options.owner,
        scope = %options.scope,
        accepted = output.accepted.len(),
        unknown = output.unknown.len(),
        "configuration loaded"
    );
    Ok(output)
}
