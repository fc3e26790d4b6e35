//! # Recursive Descent Engine
//!
//! Drives validation of one level of input against a [`Schema`]:
//!
//! 1. **collecting**: each `(key, value)` pair is resolved to a rule and
//!    dispatched. Keys without a rule are recorded as unknown and skipped.
//! 2. **applying defaults**: every default whose key was not accepted is
//!    dispatched exactly like input. A nested level that arrived empty
//!    skips this phase; the top level never does.
//! 3. **checking mandatory**: the first declared mandatory key that is
//!    still absent fails the call.
//!
//! Nested schemas recurse with a fresh [`Context`] whose path is extended by
//! the field's key; the child's unknown keys and flattened entries are
//! folded into the parent.
//!
//! Every failure aborts the whole call. There is no partial result.
//!
//! The engine is synchronous and holds no shared state: one schema can be
//! used by any number of threads at once, each `parse` building its own
//! contexts.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Deserialize;
use termcheck_core::{Key, Term};

use crate::error::ParseError;
use crate::list::validate_list;
use crate::path::DottedPath;
use crate::primitive;
use crate::rule::{Callback, Rule, Verdict};
use crate::schema::Schema;

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Prefix for every reported path, e.g. `"modules.auth"`.
    pub path: String,
    /// Emit a `tracing` warning for each unknown key.
    pub warn_unknown: bool,
}

impl ParseOptions {
    /// Options with a base path.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Result of a successful `parse`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    /// Accepted pairs, in the order they were first processed.
    pub accepted: Vec<(Key, Term)>,
    /// Every accepted pair at every level, keyed by its dotted path.
    pub flattened: Vec<(String, Term)>,
    /// Dotted paths of keys no rule matched, in encounter order.
    pub unknown: Vec<String>,
}

impl ParseOutput {
    /// The first accepted value stored under a key of this name.
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.accepted.iter().find(|(k, _)| k.name() == name).map(|(_, v)| v)
    }

    /// The accepted pairs as a `Map` term.
    pub fn into_term(self) -> Term {
        Term::Map(self.accepted)
    }
}

/// State of one level of validation.
///
/// Callbacks of the [`Callback::WithContext`] form receive a shared view of
/// it.
#[derive(Debug)]
pub struct Context<'a> {
    accepted: Vec<(Key, Term)>,
    flattened: Vec<(String, Term)>,
    unknown: Vec<String>,
    path: DottedPath,
    options: &'a ParseOptions,
}

impl<'a> Context<'a> {
    fn new(path: DottedPath, options: &'a ParseOptions) -> Self {
        Self {
            accepted: Vec::new(),
            flattened: Vec::new(),
            unknown: Vec::new(),
            path,
            options,
        }
    }

    /// Pairs accepted so far at this level.
    pub fn accepted(&self) -> &[(Key, Term)] {
        &self.accepted
    }

    /// Flattened entries accepted so far, including nested levels.
    pub fn flattened(&self) -> &[(String, Term)] {
        &self.flattened
    }

    /// Unknown keys seen so far, including nested levels.
    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    /// Path of this level.
    pub fn path(&self) -> &DottedPath {
        &self.path
    }

    /// Options of the enclosing `parse` call.
    pub fn options(&self) -> &ParseOptions {
        self.options
    }

    fn has(&self, key: &Key) -> bool {
        self.accepted.iter().any(|(k, _)| k.same_name(key))
    }

    fn into_output(self) -> ParseOutput {
        ParseOutput {
            accepted: self.accepted,
            flattened: self.flattened,
            unknown: self.unknown,
        }
    }
}

/// What dispatching one value produced.
enum Resolved {
    Accept {
        key: Key,
        value: Term,
        flattened: Vec<(String, Term)>,
        unknown: Vec<String>,
    },
    Drop,
    ReplaceAll(Vec<(Key, Term)>),
}

impl Resolved {
    fn leaf(key: &Key, value: Term) -> Self {
        Resolved::Accept {
            key: key.clone(),
            value,
            flattened: Vec::new(),
            unknown: Vec::new(),
        }
    }
}

/// Validate `input` against `schema` with default options.
///
/// `input` is a `Map` or an options list of `(key, value)` tuples.
///
/// # Errors
///
/// See [`parse_with`].
pub fn parse(input: &Term, schema: &Schema) -> Result<ParseOutput, ParseError> {
    parse_with(input, schema, &ParseOptions::default())
}

/// Validate `input` against `schema`.
///
/// # Errors
///
/// Returns the first failure: `Syntax` for a value that fails its rule (or
/// input that is not key/value shaped), `MissingField` for an absent
/// mandatory key, `Callback`/`CallbackFault` for callback rejections and
/// panics. Errors carry the dotted path of the offending field.
pub fn parse_with(
    input: &Term,
    schema: &Schema,
    options: &ParseOptions,
) -> Result<ParseOutput, ParseError> {
    let path = DottedPath::new(options.path.clone());
    let pairs = input.as_pairs().ok_or_else(|| {
        ParseError::syntax(&path, format!("expected a map or key/value list, got {}", input.kind()))
    })?;
    let mut ctx = Context::new(path, options);
    parse_level(&pairs, schema, Level::Top, &mut ctx)?;
    Ok(ctx.into_output())
}

/// Where a level sits in the input.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Level {
    Top,
    Nested,
}

fn parse_level(
    pairs: &[(Key, Term)],
    schema: &Schema,
    level: Level,
    ctx: &mut Context<'_>,
) -> Result<(), ParseError> {
    for (key, value) in pairs {
        process_pair(key, value, schema, ctx)?;
    }

    // An empty nested object does not pull in its defaults.
    if level == Level::Top || !pairs.is_empty() {
        for (key, value) in schema.defaults() {
            if !ctx.has(key) {
                process_pair(key, value, schema, ctx)?;
            }
        }
    }

    for key in schema.mandatory_keys() {
        if !ctx.has(key) {
            return Err(ParseError::MissingField {
                path: ctx.path.child(key).to_string(),
            });
        }
    }
    Ok(())
}

fn process_pair(key: &Key, value: &Term, schema: &Schema, ctx: &mut Context<'_>) -> Result<(), ParseError> {
    let Some(rule) = schema.rule_for(key) else {
        let path = ctx.path.child(key).to_string();
        if ctx.options.warn_unknown {
            tracing::warn!(key = %path, "unknown configuration key");
        }
        ctx.unknown.push(path);
        return Ok(());
    };

    match resolve(key, value, rule, ctx)? {
        Resolved::Accept {
            key,
            value,
            flattened,
            unknown,
        } => {
            ctx.flattened.push((ctx.path.child(&key).to_string(), value.clone()));
            ctx.flattened.extend(flattened);
            ctx.unknown.extend(unknown);
            ctx.accepted.push((key, value));
        }
        Resolved::Drop => {}
        Resolved::ReplaceAll(pairs) => {
            ctx.flattened = pairs
                .iter()
                .map(|(k, v)| (ctx.path.child(k).to_string(), v.clone()))
                .collect();
            ctx.accepted = pairs;
        }
    }
    Ok(())
}

/// Dispatch one value on the shape of its rule.
fn resolve(key: &Key, value: &Term, rule: &Rule, ctx: &Context<'_>) -> Result<Resolved, ParseError> {
    let path = ctx.path.child(key);
    match rule {
        Rule::Type(tag) => primitive::validate(tag, value)
            .map(|coerced| Resolved::leaf(key, coerced))
            .map_err(|e| ParseError::syntax(&path, e.0)),

        Rule::Ignore => Ok(Resolved::Drop),

        Rule::Callback(callback) => run_callback(callback, key, value, ctx, &path),

        Rule::List(discipline, inner) => {
            let mut flattened = Vec::new();
            let mut unknown = Vec::new();
            let list = validate_list(value, *discipline, |element| {
                match resolve(key, element, inner, ctx)? {
                    Resolved::Accept {
                        value,
                        flattened: f,
                        unknown: u,
                        ..
                    } => {
                        flattened.extend(f);
                        unknown.extend(u);
                        Ok(Some(value))
                    }
                    Resolved::Drop => Ok(None),
                    Resolved::ReplaceAll(_) => Err(ParseError::syntax(
                        &path,
                        "bulk replacement is not allowed for a list element",
                    )),
                }
            })?;
            Ok(Resolved::Accept {
                key: key.clone(),
                value: list,
                flattened,
                unknown,
            })
        }

        Rule::Nested(child_schema) => {
            let pairs = value.as_pairs().ok_or_else(|| {
                ParseError::syntax(&path, format!("expected a nested map, got {}", value.kind()))
            })?;
            let mut child = Context::new(path, ctx.options);
            parse_level(&pairs, child_schema, Level::Nested, &mut child)?;
            let out = child.into_output();
            Ok(Resolved::Accept {
                key: key.clone(),
                value: Term::Map(out.accepted),
                flattened: out.flattened,
                unknown: out.unknown,
            })
        }

        Rule::OneOf(candidates) => {
            for candidate in candidates {
                match resolve(key, value, candidate, ctx) {
                    Ok(resolved) => return Ok(resolved),
                    Err(e) if e.is_data_error() => continue,
                    Err(e) => return Err(e),
                }
            }
            Err(ParseError::syntax(
                &path,
                format!("{} matched none of {} alternatives", value.kind(), candidates.len()),
            ))
        }
    }
}

fn run_callback(
    callback: &Callback,
    key: &Key,
    value: &Term,
    ctx: &Context<'_>,
    path: &DottedPath,
) -> Result<Resolved, ParseError> {
    let verdict = catch_unwind(AssertUnwindSafe(|| match callback {
        Callback::Value(f) => f(value),
        Callback::KeyValue(f) => f(key, value),
        Callback::WithContext(f) => f(key, value, ctx),
    }))
    .map_err(|_| {
        tracing::error!(field = %path, key = %key, "validation callback panicked");
        ParseError::CallbackFault {
            path: path.to_string(),
        }
    })?;

    match verdict {
        Verdict::Accept => Ok(Resolved::leaf(key, value.clone())),
        Verdict::Replace(new_value) => Ok(Resolved::leaf(key, new_value)),
        Verdict::Rename(new_key, new_value) => Ok(Resolved::leaf(&new_key, new_value)),
        Verdict::Reject => Err(ParseError::syntax(path, "rejected by callback")),
        Verdict::Error(detail) => Err(ParseError::Callback {
            path: path.to_string(),
            detail,
        }),
        Verdict::ReplaceAll(pairs) => Ok(Resolved::ReplaceAll(pairs)),
    }
}
