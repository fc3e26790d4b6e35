//! # Term Model
//!
//! `Term` is the dynamic value every validator consumes and produces. Raw
//! input arrives as loosely typed terms (decoded YAML/JSON, options lists
//! built in code); validation coerces them into the canonical variants
//! (`Bytes`, `Ip`, `Uri`, `Timestamp`, ...).
//!
//! ## Keys
//!
//! Map keys are either symbolic ([`Key::Sym`]) or textual ([`Key::Text`]).
//! Decoded documents always produce textual keys; schemas built in code
//! usually use symbolic ones. Schema lookup treats the two as
//! interchangeable (see `termcheck-schema`).
//!
//! ## Ordering
//!
//! [`Term::total_cmp`] defines a total order across all variants, used by
//! the sorted list disciplines: numbers < atoms < booleans < functions <
//! addresses < timestamps < URIs < tuples < maps < lists < strings < bytes.
//! Integers and floats compare numerically; on a tie the integer sorts
//! first.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CoreError;
use crate::symbol::Symbol;
use crate::temporal::Timestamp;
use crate::uri::Uri;

/// A map key: symbolic or textual.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// An interned symbol.
    Sym(Symbol),
    /// Free text, as decoded from a document.
    Text(String),
}

impl Key {
    /// A symbolic key, interning `name`.
    pub fn sym(name: &str) -> Self {
        Key::Sym(Symbol::intern(name))
    }

    /// A textual key.
    pub fn text(name: impl Into<String>) -> Self {
        Key::Text(name.into())
    }

    /// The key's name regardless of representation.
    pub fn name(&self) -> &str {
        match self {
            Key::Sym(s) => s.as_str(),
            Key::Text(t) => t,
        }
    }

    /// True when both keys spell the same name.
    pub fn same_name(&self, other: &Key) -> bool {
        self.name() == other.name()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Symbol> for Key {
    fn from(s: Symbol) -> Self {
        Key::Sym(s)
    }
}

/// Signature of a function term.
pub type TermFn = dyn Fn(&[Term]) -> Term + Send + Sync;

/// A callable term with a fixed arity.
///
/// Two functions are equal only if they share the same closure.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    arity: u8,
    body: Arc<TermFn>,
}

impl Function {
    /// Wrap a closure as a function term.
    pub fn new<F>(name: &str, arity: u8, body: F) -> Self
    where
        F: Fn(&[Term]) -> Term + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            arity,
            body: Arc::new(body),
        }
    }

    /// The function's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of arguments the function takes.
    pub fn arity(&self) -> u8 {
        self.arity
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Term]) -> Term {
        (self.body)(args)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fun {}/{}", self.name, self.arity)
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Symbolic constant.
    Atom(Symbol),
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Native text.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Sequence.
    List(Vec<Term>),
    /// Fixed-size group, used for `(key, value)` pairs in options lists.
    Tuple(Vec<Term>),
    /// Ordered key/value pairs; duplicate keys are preserved.
    Map(Vec<(Key, Term)>),
    /// IP address.
    Ip(IpAddr),
    /// IP network in `address/prefix` form.
    IpMask(IpAddr, u8),
    /// Absolute URI.
    Uri(Uri),
    /// Canonical UTC timestamp.
    Timestamp(Timestamp),
    /// Callable.
    Fun(Function),
}

impl Term {
    /// An atom, interning `name`.
    pub fn atom(name: &str) -> Self {
        Term::Atom(Symbol::intern(name))
    }

    /// Native text.
    pub fn str(s: impl Into<String>) -> Self {
        Term::Str(s.into())
    }

    /// Raw bytes.
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Term::Bytes(b.into())
    }

    /// A map from `(key, value)` pairs.
    pub fn map<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Key, Term)>,
    {
        Term::Map(pairs.into_iter().collect())
    }

    /// A two-element tuple, the shape of one options-list entry.
    pub fn pair(key: Term, value: Term) -> Self {
        Term::Tuple(vec![key, value])
    }

    /// Short variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Term::Atom(_) => "atom",
            Term::Bool(_) => "boolean",
            Term::Int(_) => "integer",
            Term::Float(_) => "float",
            Term::Str(_) => "string",
            Term::Bytes(_) => "binary",
            Term::List(_) => "list",
            Term::Tuple(_) => "tuple",
            Term::Map(_) => "map",
            Term::Ip(_) => "ip",
            Term::IpMask(..) => "ip_mask",
            Term::Uri(_) => "uri",
            Term::Timestamp(_) => "timestamp",
            Term::Fun(_) => "fun",
        }
    }

    /// Text view of textual terms: strings, atoms, UTF-8 bytes and
    /// printable char lists.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Term::Str(s) => Some(Cow::Borrowed(s)),
            Term::Atom(a) => Some(Cow::Borrowed(a.as_str())),
            Term::Bytes(b) => std::str::from_utf8(b).ok().map(Cow::Borrowed),
            Term::List(items) if is_char_list(items) => {
                Some(Cow::Owned(items.iter().filter_map(char_of).collect()))
            }
            _ => None,
        }
    }

    /// Interpret the term as a key, if it is textual or symbolic.
    pub fn as_key(&self) -> Option<Key> {
        match self {
            Term::Atom(a) => Some(Key::Sym(a.clone())),
            Term::Str(s) => Some(Key::Text(s.clone())),
            Term::Bytes(b) => std::str::from_utf8(b).ok().map(|s| Key::Text(s.to_string())),
            _ => None,
        }
    }

    /// View the term as ordered `(key, value)` pairs.
    ///
    /// Accepts a `Map`, or a `List` whose every element is a two-element
    /// tuple with a textual or symbolic first element. An empty list is an
    /// empty set of pairs.
    pub fn as_pairs(&self) -> Option<Vec<(Key, Term)>> {
        match self {
            Term::Map(pairs) => Some(pairs.clone()),
            Term::List(items) => items
                .iter()
                .map(|item| match item {
                    Term::Tuple(kv) if kv.len() == 2 => {
                        kv[0].as_key().map(|k| (k, kv[1].clone()))
                    }
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Look up the first value stored under a key of this name.
    pub fn get(&self, name: &str) -> Option<&Term> {
        match self {
            Term::Map(pairs) => pairs.iter().find(|(k, _)| k.name() == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Total order across all terms.
    pub fn total_cmp(&self, other: &Term) -> Ordering {
        match (self, other) {
            (Term::Int(a), Term::Int(b)) => a.cmp(b),
            (Term::Float(a), Term::Float(b)) => a.total_cmp(b),
            (Term::Int(a), Term::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Term::Float(a), Term::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Term::Atom(a), Term::Atom(b)) => a.cmp(b),
            (Term::Bool(a), Term::Bool(b)) => a.cmp(b),
            (Term::Fun(a), Term::Fun(b)) => (a.arity, &*a.name).cmp(&(b.arity, &*b.name)),
            (Term::Ip(a), Term::Ip(b)) => a.cmp(b),
            (Term::IpMask(a, m), Term::IpMask(b, n)) => (a, m).cmp(&(b, n)),
            (Term::Timestamp(a), Term::Timestamp(b)) => a.cmp(b),
            (Term::Uri(a), Term::Uri(b)) => a.cmp(b),
            (Term::Tuple(a), Term::Tuple(b)) => {
                a.len().cmp(&b.len()).then_with(|| cmp_seq(a, b))
            }
            (Term::Map(a), Term::Map(b)) => a.len().cmp(&b.len()).then_with(|| {
                a.iter()
                    .zip(b)
                    .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| va.total_cmp(vb)))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            }),
            (Term::List(a), Term::List(b)) => cmp_seq(a, b),
            (Term::Str(a), Term::Str(b)) => a.cmp(b),
            (Term::Bytes(a), Term::Bytes(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Term::Int(_) | Term::Float(_) => 0,
            Term::Atom(_) => 1,
            Term::Bool(_) => 2,
            Term::Fun(_) => 3,
            Term::Ip(_) => 4,
            Term::IpMask(..) => 5,
            Term::Timestamp(_) => 6,
            Term::Uri(_) => 7,
            Term::Tuple(_) => 8,
            Term::Map(_) => 9,
            Term::List(_) => 10,
            Term::Str(_) => 11,
            Term::Bytes(_) => 12,
        }
    }

    /// Decode a JSON document into a term.
    ///
    /// Strings become `Str`, object keys become textual keys, `null` becomes
    /// the atom `null`, and integers outside `i64` become floats.
    pub fn from_json(value: &Value) -> Term {
        match value {
            Value::Null => Term::atom("null"),
            Value::Bool(b) => Term::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Term::Int(i),
                None => Term::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Term::Str(s.clone()),
            Value::Array(items) => Term::List(items.iter().map(Term::from_json).collect()),
            Value::Object(map) => Term::Map(
                map.iter()
                    .map(|(k, v)| (Key::Text(k.clone()), Term::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Decode a YAML document into a term.
    ///
    /// Mapping keys must be scalars; numbers and booleans used as keys are
    /// stringified. YAML tags are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Conversion` for sequence or mapping keys.
    pub fn from_yaml(value: &serde_yaml::Value) -> Result<Term, CoreError> {
        use serde_yaml::Value as Y;
        Ok(match value {
            Y::Null => Term::atom("null"),
            Y::Bool(b) => Term::Bool(*b),
            Y::Number(n) => match n.as_i64() {
                Some(i) => Term::Int(i),
                None => Term::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Y::String(s) => Term::Str(s.clone()),
            Y::Sequence(seq) => {
                Term::List(seq.iter().map(Term::from_yaml).collect::<Result<_, _>>()?)
            }
            Y::Mapping(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (k, v) in map {
                    let key = match k {
                        Y::String(s) => s.clone(),
                        Y::Number(n) => n.to_string(),
                        Y::Bool(b) => b.to_string(),
                        other => {
                            return Err(CoreError::Conversion(format!(
                                "unsupported YAML map key: {other:?}"
                            )))
                        }
                    };
                    pairs.push((Key::Text(key), Term::from_yaml(v)?));
                }
                Term::Map(pairs)
            }
            Y::Tagged(tagged) => Term::from_yaml(&tagged.value)?,
        })
    }

    /// Render the term as JSON for reporting.
    ///
    /// Bytes render as text when they are valid UTF-8 and as an array of
    /// octets otherwise; functions render as `"fun name/arity"`.
    pub fn to_json(&self) -> Value {
        match self {
            Term::Atom(a) => Value::String(a.as_str().to_string()),
            Term::Bool(b) => Value::Bool(*b),
            Term::Int(i) => Value::from(*i),
            Term::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Term::Str(s) => Value::String(s.clone()),
            Term::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => Value::String(s.to_string()),
                Err(_) => Value::Array(b.iter().map(|o| Value::from(*o)).collect()),
            },
            Term::List(items) | Term::Tuple(items) => {
                Value::Array(items.iter().map(Term::to_json).collect())
            }
            Term::Map(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.name().to_string(), v.to_json()))
                    .collect(),
            ),
            Term::Ip(ip) => Value::String(ip.to_string()),
            Term::IpMask(ip, len) => Value::String(format!("{ip}/{len}")),
            Term::Uri(u) => Value::String(u.to_string()),
            Term::Timestamp(t) => Value::String(t.to_rfc3339()),
            Term::Fun(f) => Value::String(format!("fun {}/{}", f.name(), f.arity())),
        }
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::Int(i)
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Bool(b)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Str(s.to_string())
    }
}

impl From<Vec<Term>> for Term {
    fn from(items: Vec<Term>) -> Self {
        Term::List(items)
    }
}

fn cmp_seq(a: &[Term], b: &[Term]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

fn char_of(t: &Term) -> Option<char> {
    match t {
        Term::Int(c) => u32::try_from(*c).ok().and_then(char::from_u32),
        _ => None,
    }
}

/// True for a non-empty list of printable character codes.
///
/// Such a list is text spelled as integers; callers that must tell
/// "one text value" from "a sequence of values" treat it as the former.
pub fn is_char_list(items: &[Term]) -> bool {
    !items.is_empty()
        && items.iter().all(|t| {
            char_of(t).is_some_and(|c| {
                !c.is_control() || matches!(c, '\n' | '\r' | '\t' | '\x0b' | '\x08' | '\x0c' | '\x1b')
            })
        })
}
