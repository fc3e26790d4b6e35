//! # Field Rules
//!
//! A [`Rule`] is one validation strategy for a single field. Rules form a
//! closed sum type and the engine dispatches on them with an exhaustive
//! `match`:
//!
//! - [`Rule::Type`]: a primitive [`TypeTag`], optionally parameterized.
//! - [`Rule::List`]: a wrapped rule applied to every element, with a
//!   [`Multiplicity`] discipline.
//! - [`Rule::OneOf`]: alternatives tried left to right, first success wins.
//! - [`Rule::Nested`]: a sub-schema; the value must itself be a map.
//! - [`Rule::Callback`]: user code, in one of three explicit forms.
//! - [`Rule::Ignore`]: consume the field and drop it silently.
//!
//! Schemas authored as text (for example in a YAML file) name their rules;
//! [`Rule::named`] and `TypeTag::from_str` turn those names into rules and
//! report unknown names as [`ParseError::UnrecognizedRuleTag`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use termcheck_core::{Key, Symbol, Term, TimeUnit};

use crate::engine::Context;
use crate::error::ParseError;
use crate::schema::Schema;

/// Primitive type tags understood by [`crate::primitive::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    /// Anything, unchanged.
    Any,
    /// An already-known symbol.
    Atom,
    /// One of the listed symbols.
    Enum(Vec<Symbol>),
    /// `true`/`false`, `0`/`1`.
    Boolean,
    /// Any integer.
    Integer,
    /// Integer ≥ 0.
    PosInteger,
    /// Integer ≥ 1.
    NatInteger,
    /// Integer within optional inclusive bounds.
    IntRange {
        /// Lower bound, if any.
        min: Option<i64>,
        /// Upper bound, if any.
        max: Option<i64>,
    },
    /// One of the listed integers.
    IntSet(Vec<i64>),
    /// Floating point number.
    Float,
    /// Printable text.
    String,
    /// Raw bytes.
    Binary,
    /// Raw bytes, ASCII-lowercased.
    LowerBinary,
    /// Host name or address, normalized.
    Host,
    /// As `Host`, with IPv6 literals wrapped in brackets.
    Host6,
    /// IPv4 or IPv6 address.
    Ip,
    /// Address with prefix length.
    IpMask,
    /// TCP/UDP port.
    Port,
    /// `local@domain`.
    Email,
    /// Absolute URI.
    Uri,
    /// Comma-separated token list.
    Tokens,
    /// Filesystem path, lexically normalized.
    Path,
    /// Standard base64, decoded.
    Base64,
    /// URL-safe base64, decoded.
    Base64Url,
    /// Function of the given arity.
    Fun(u8),
    /// Syslog-style severity.
    LogLevel,
    /// Structure whose keys are all textual or symbolic.
    Map,
    /// Canonical timestamp at the given precision.
    Timestamp(TimeUnit),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Any => f.write_str("any"),
            TypeTag::Atom => f.write_str("atom"),
            TypeTag::Enum(members) => {
                let names: Vec<&str> = members.iter().map(Symbol::as_str).collect();
                write!(f, "enum({})", names.join(","))
            }
            TypeTag::Boolean => f.write_str("boolean"),
            TypeTag::Integer => f.write_str("integer"),
            TypeTag::PosInteger => f.write_str("pos_integer"),
            TypeTag::NatInteger => f.write_str("nat_integer"),
            TypeTag::IntRange { min, max } => {
                let bound = |b: &Option<i64>| b.map_or_else(|| "_".to_string(), |v| v.to_string());
                write!(f, "int({},{})", bound(min), bound(max))
            }
            TypeTag::IntSet(set) => {
                let items: Vec<String> = set.iter().map(i64::to_string).collect();
                write!(f, "int_set({})", items.join(","))
            }
            TypeTag::Float => f.write_str("float"),
            TypeTag::String => f.write_str("string"),
            TypeTag::Binary => f.write_str("binary"),
            TypeTag::LowerBinary => f.write_str("lower_binary"),
            TypeTag::Host => f.write_str("host"),
            TypeTag::Host6 => f.write_str("host6"),
            TypeTag::Ip => f.write_str("ip"),
            TypeTag::IpMask => f.write_str("ip_mask"),
            TypeTag::Port => f.write_str("port"),
            TypeTag::Email => f.write_str("email"),
            TypeTag::Uri => f.write_str("uri"),
            TypeTag::Tokens => f.write_str("tokens"),
            TypeTag::Path => f.write_str("path"),
            TypeTag::Base64 => f.write_str("base64"),
            TypeTag::Base64Url => f.write_str("base64url"),
            TypeTag::Fun(arity) => write!(f, "fun({arity})"),
            TypeTag::LogLevel => f.write_str("log_level"),
            TypeTag::Map => f.write_str("map"),
            TypeTag::Timestamp(unit) => write!(f, "timestamp({})", unit_name(*unit)),
        }
    }
}

fn unit_name(unit: TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "second",
        TimeUnit::Millisecond => "millisecond",
        TimeUnit::Microsecond => "microsecond",
        TimeUnit::Nanosecond => "nanosecond",
    }
}

impl FromStr for TypeTag {
    type Err = ParseError;

    /// Parse `name` or `name(arg, ...)`.
    ///
    /// Integer bounds use `_` for "unbounded": `int(1,_)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unrecognized = || ParseError::UnrecognizedRuleTag { tag: s.to_string() };
        let s = s.trim();
        let (name, args) = match s.split_once('(') {
            Some((name, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(unrecognized)?;
                let args: Vec<&str> = inner
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .collect();
                (name.trim(), Some(args))
            }
            None => (s, None),
        };

        let int = |a: &str| a.parse::<i64>().map_err(|_| unrecognized());
        let bound = |a: &str| if a == "_" { Ok(None) } else { int(a).map(Some) };

        let tag = match (name, args.as_deref()) {
            ("any", None) => TypeTag::Any,
            ("atom", None) => TypeTag::Atom,
            ("enum", Some(members)) => TypeTag::Enum(members.iter().map(|m| Symbol::intern(m)).collect()),
            ("boolean", None) => TypeTag::Boolean,
            ("integer" | "int", None) => TypeTag::Integer,
            ("pos_integer", None) => TypeTag::PosInteger,
            ("nat_integer" | "non_neg", None) => TypeTag::NatInteger,
            ("int", Some([min, max])) => TypeTag::IntRange {
                min: bound(*min)?,
                max: bound(*max)?,
            },
            ("int_set", Some(items)) => {
                TypeTag::IntSet(items.iter().map(|i| int(*i)).collect::<Result<_, _>>()?)
            }
            ("float", None) => TypeTag::Float,
            ("string", None) => TypeTag::String,
            ("binary", None) => TypeTag::Binary,
            ("lower_binary", None) => TypeTag::LowerBinary,
            ("host", None) => TypeTag::Host,
            ("host6", None) => TypeTag::Host6,
            ("ip", None) => TypeTag::Ip,
            ("ip_mask", None) => TypeTag::IpMask,
            ("port", None) => TypeTag::Port,
            ("email", None) => TypeTag::Email,
            ("uri", None) => TypeTag::Uri,
            ("tokens", None) => TypeTag::Tokens,
            ("path", None) => TypeTag::Path,
            ("base64", None) => TypeTag::Base64,
            ("base64url", None) => TypeTag::Base64Url,
            ("fun", Some([arity])) => TypeTag::Fun(arity.parse().map_err(|_| unrecognized())?),
            ("log_level", None) => TypeTag::LogLevel,
            ("map", None) => TypeTag::Map,
            ("timestamp", None) => TypeTag::Timestamp(TimeUnit::Second),
            ("timestamp", Some([unit])) => TypeTag::Timestamp(match *unit {
                "second" => TimeUnit::Second,
                "millisecond" => TimeUnit::Millisecond,
                "microsecond" => TimeUnit::Microsecond,
                "nanosecond" => TimeUnit::Nanosecond,
                _ => return Err(unrecognized()),
            }),
            _ => return Err(unrecognized()),
        };
        Ok(tag)
    }
}

/// Output discipline of a list rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// Keep the input order.
    Ordered,
    /// Sort ascending.
    Sorted,
    /// Sort ascending and drop duplicates.
    Unique,
}

/// What a callback decided about a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Keep the key and value as given.
    Accept,
    /// Keep the key, store this value instead.
    Replace(Term),
    /// Store this key and value instead.
    Rename(Key, Term),
    /// Reject the value; reported as a syntax error at the field's path.
    Reject,
    /// Reject the value with a custom payload.
    Error(Term),
    /// Replace everything accepted so far at this level, dropping the
    /// current field. Intended for cross-field rewrites by
    /// [`Callback::WithContext`].
    ReplaceAll(Vec<(Key, Term)>),
}

/// Callback receiving the value only.
pub type ValueFn = dyn Fn(&Term) -> Verdict + Send + Sync;
/// Callback receiving the key and the value.
pub type KeyValueFn = dyn Fn(&Key, &Term) -> Verdict + Send + Sync;
/// Callback receiving the key, the value and the level's context.
pub type ContextFn = dyn Fn(&Key, &Term, &Context<'_>) -> Verdict + Send + Sync;

/// A user-supplied validator. The form is chosen when the schema is
/// written, not inferred when the callback runs.
#[derive(Clone)]
pub enum Callback {
    /// `fn(value)`.
    Value(Arc<ValueFn>),
    /// `fn(key, value)`.
    KeyValue(Arc<KeyValueFn>),
    /// `fn(key, value, context)`.
    WithContext(Arc<ContextFn>),
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Value(_) => f.write_str("Callback::Value(..)"),
            Callback::KeyValue(_) => f.write_str("Callback::KeyValue(..)"),
            Callback::WithContext(_) => f.write_str("Callback::WithContext(..)"),
        }
    }
}

/// One validation strategy for a single field.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Primitive type.
    Type(TypeTag),
    /// Elementwise rule with an output discipline.
    List(Multiplicity, Box<Rule>),
    /// Alternatives, first success wins.
    OneOf(Vec<Rule>),
    /// Sub-schema.
    Nested(Schema),
    /// User callback.
    Callback(Callback),
    /// Consume and drop the field.
    Ignore,
}

impl Rule {
    /// Order-preserving list of `inner`.
    pub fn list(inner: impl Into<Rule>) -> Self {
        Rule::List(Multiplicity::Ordered, Box::new(inner.into()))
    }

    /// Sorted list of `inner`.
    pub fn slist(inner: impl Into<Rule>) -> Self {
        Rule::List(Multiplicity::Sorted, Box::new(inner.into()))
    }

    /// Sorted, duplicate-free list of `inner`.
    pub fn ulist(inner: impl Into<Rule>) -> Self {
        Rule::List(Multiplicity::Unique, Box::new(inner.into()))
    }

    /// Alternatives, tried in order.
    pub fn one_of(rules: impl IntoIterator<Item = Rule>) -> Self {
        Rule::OneOf(rules.into_iter().collect())
    }

    /// Callback taking the value.
    pub fn value_fn<F>(f: F) -> Self
    where
        F: Fn(&Term) -> Verdict + Send + Sync + 'static,
    {
        Rule::Callback(Callback::Value(Arc::new(f)))
    }

    /// Callback taking the key and the value.
    pub fn key_value_fn<F>(f: F) -> Self
    where
        F: Fn(&Key, &Term) -> Verdict + Send + Sync + 'static,
    {
        Rule::Callback(Callback::KeyValue(Arc::new(f)))
    }

    /// Callback taking the key, the value and the level's context.
    pub fn context_fn<F>(f: F) -> Self
    where
        F: Fn(&Key, &Term, &Context<'_>) -> Verdict + Send + Sync + 'static,
    {
        Rule::Callback(Callback::WithContext(Arc::new(f)))
    }

    /// Build a rule from its textual name.
    ///
    /// Accepts every [`TypeTag`] spelling plus `ignore`, `list(..)`,
    /// `slist(..)` and `ulist(..)` around another name.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnrecognizedRuleTag` for unknown names.
    pub fn named(name: &str) -> Result<Self, ParseError> {
        let name = name.trim();
        if name == "ignore" {
            return Ok(Rule::Ignore);
        }
        for (prefix, discipline) in [
            ("list(", Multiplicity::Ordered),
            ("slist(", Multiplicity::Sorted),
            ("ulist(", Multiplicity::Unique),
        ] {
            if let Some(inner) = name.strip_prefix(prefix).and_then(|r| r.strip_suffix(')')) {
                return Ok(Rule::List(discipline, Box::new(Rule::named(inner)?)));
            }
        }
        name.parse::<TypeTag>().map(Rule::Type)
    }
}

impl From<TypeTag> for Rule {
    fn from(tag: TypeTag) -> Self {
        Rule::Type(tag)
    }
}

impl From<Schema> for Rule {
    fn from(schema: Schema) -> Self {
        Rule::Nested(schema)
    }
}
