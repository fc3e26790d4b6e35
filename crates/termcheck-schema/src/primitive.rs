//! # Primitive Validators
//!
//! Pure functions from `(type tag, raw term)` to a coerced term. Each tag
//! accepts a family of raw shapes and normalizes to one canonical variant:
//!
//! | tag | accepts | produces |
//! |-----|---------|----------|
//! | `boolean` | `0`/`1`, `"0"`/`"1"`, `"true"`/`"false"`, atoms | `Bool` |
//! | integer family | integers, numeric text | `Int` |
//! | `string` | text, char lists, atoms, integers, UTF-8 bytes | `Str` |
//! | `binary` | the same plus arbitrary bytes | `Bytes` |
//! | `host6` | host names, IPv6 literals | `Str` (`[::1]`) |
//! | `log_level` | `0..=8` or a severity name | `Int` |
//!
//! Validation never panics and never consults global state except the
//! symbol table, which is read-only here: `atom` and `enum` only ever
//! produce symbols that already exist.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use termcheck_core::{
    is_char_list, parse_token_list, parse_uri, Symbol, Term, TimeInput, Timestamp,
};

use crate::rule::TypeTag;

/// Why a value failed its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalid(pub String);

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of validating against a tag given by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The value passed; this is its coerced form.
    Valid(Term),
    /// The tag is known but the value failed it.
    Invalid(Invalid),
    /// The tag name itself is unknown.
    Unrecognized(String),
}

/// Severity names and their numeric levels, most verbose first.
pub const LOG_LEVELS: [(&str, i64); 9] = [
    ("debug", 8),
    ("info", 7),
    ("notice", 6),
    ("warning", 5),
    ("error", 4),
    ("critical", 3),
    ("alert", 2),
    ("emergency", 1),
    ("none", 0),
];

fn invalid(tag: &TypeTag, raw: &Term) -> Invalid {
    Invalid(format!("expected {tag}, got {} {raw:?}", raw.kind()))
}

/// Validate `raw` against a named tag.
///
/// Unknown names yield [`Outcome::Unrecognized`] rather than `Invalid`,
/// so callers can tell a broken schema from bad data.
pub fn validate_named(tag: &str, raw: &Term) -> Outcome {
    match tag.parse::<TypeTag>() {
        Ok(tag) => match validate(&tag, raw) {
            Ok(term) => Outcome::Valid(term),
            Err(e) => Outcome::Invalid(e),
        },
        Err(_) => Outcome::Unrecognized(tag.to_string()),
    }
}

/// Validate and coerce `raw` against `tag`.
///
/// # Errors
///
/// Returns [`Invalid`] describing the expected shape when `raw` does not
/// satisfy `tag`.
pub fn validate(tag: &TypeTag, raw: &Term) -> Result<Term, Invalid> {
    let fail = || invalid(tag, raw);
    match tag {
        TypeTag::Any => Ok(raw.clone()),
        TypeTag::Atom => match raw {
            Term::Atom(_) => Ok(raw.clone()),
            _ => raw
                .as_text()
                .and_then(|t| Symbol::existing(&t))
                .map(Term::Atom)
                .ok_or_else(fail),
        },
        TypeTag::Enum(members) => {
            let text = raw.as_text().ok_or_else(fail)?;
            members
                .iter()
                .find(|m| m.as_str() == text)
                .map(|m| Term::Atom(m.clone()))
                .ok_or_else(|| {
                    let names: Vec<&str> = members.iter().map(Symbol::as_str).collect();
                    Invalid(format!("{text:?} is not one of [{}]", names.join(", ")))
                })
        }
        TypeTag::Boolean => to_bool(raw).map(Term::Bool).ok_or_else(fail),
        TypeTag::Integer => to_int(raw).map(Term::Int).ok_or_else(fail),
        TypeTag::PosInteger => bounded(raw, Some(0), None).ok_or_else(fail),
        TypeTag::NatInteger => bounded(raw, Some(1), None).ok_or_else(fail),
        TypeTag::IntRange { min, max } => bounded(raw, *min, *max).ok_or_else(fail),
        TypeTag::Port => bounded(raw, Some(0), Some(65_535)).ok_or_else(fail),
        TypeTag::IntSet(set) => to_int(raw)
            .filter(|i| set.contains(i))
            .map(Term::Int)
            .ok_or_else(fail),
        TypeTag::Float => to_float(raw).map(Term::Float).ok_or_else(fail),
        TypeTag::String => to_string(raw).map(Term::Str).ok_or_else(fail),
        TypeTag::Binary => to_bytes(raw).map(Term::Bytes).ok_or_else(fail),
        TypeTag::LowerBinary => to_bytes(raw)
            .map(|b| Term::Bytes(b.to_ascii_lowercase()))
            .ok_or_else(fail),
        TypeTag::Host => to_host(raw).map(Term::Str).ok_or_else(fail),
        TypeTag::Host6 => {
            let text = to_string(raw).ok_or_else(fail)?;
            match text.trim().parse::<Ipv6Addr>() {
                Ok(v6) => Ok(Term::Str(format!("[{v6}]"))),
                Err(_) => to_host(raw).map(Term::Str).ok_or_else(fail),
            }
        }
        TypeTag::Ip => match raw {
            Term::Ip(_) => Ok(raw.clone()),
            _ => raw
                .as_text()
                .and_then(|t| t.trim().parse::<IpAddr>().ok())
                .map(Term::Ip)
                .ok_or_else(fail),
        },
        TypeTag::IpMask => match raw {
            Term::IpMask(..) => Ok(raw.clone()),
            _ => raw
                .as_text()
                .and_then(|t| to_ip_mask(t.trim()))
                .map(|(ip, len)| Term::IpMask(ip, len))
                .ok_or_else(fail),
        },
        TypeTag::Email => {
            let text = to_string(raw).ok_or_else(fail)?;
            if text.split('@').count() == 2 {
                Ok(Term::Str(text))
            } else {
                Err(fail())
            }
        }
        TypeTag::Uri => match raw {
            Term::Uri(_) => Ok(raw.clone()),
            _ => {
                let text = raw.as_text().ok_or_else(fail)?;
                parse_uri(&text).map(Term::Uri).map_err(|e| Invalid(e.to_string()))
            }
        },
        TypeTag::Tokens => {
            let text = raw.as_text().ok_or_else(fail)?;
            parse_token_list(&text)
                .map(|tokens| {
                    Term::List(tokens.iter().map(|t| Term::str(t.as_str())).collect())
                })
                .map_err(|e| Invalid(e.to_string()))
        }
        TypeTag::Path => {
            let text = raw.as_text().ok_or_else(fail)?;
            normalize_path(&text).map(Term::Str).ok_or_else(fail)
        }
        TypeTag::Base64 => {
            let text = raw.as_text().ok_or_else(fail)?;
            STANDARD
                .decode(text.trim())
                .map(Term::Bytes)
                .map_err(|e| Invalid(format!("invalid base64: {e}")))
        }
        TypeTag::Base64Url => {
            let text = raw.as_text().ok_or_else(fail)?;
            URL_SAFE_NO_PAD
                .decode(text.trim().trim_end_matches('='))
                .map(Term::Bytes)
                .map_err(|e| Invalid(format!("invalid base64url: {e}")))
        }
        TypeTag::Fun(arity) => match raw {
            Term::Fun(f) if f.arity() == *arity => Ok(raw.clone()),
            _ => Err(fail()),
        },
        TypeTag::LogLevel => match raw {
            Term::Int(level) if (0..=8).contains(level) => Ok(raw.clone()),
            _ => {
                let text = raw.as_text().ok_or_else(fail)?;
                LOG_LEVELS
                    .iter()
                    .find(|(name, _)| *name == text)
                    .map(|(_, level)| Term::Int(*level))
                    .ok_or_else(fail)
            }
        },
        TypeTag::Map => {
            if is_map_shaped(raw) {
                Ok(raw.clone())
            } else {
                Err(fail())
            }
        }
        TypeTag::Timestamp(unit) => {
            let input = match raw {
                Term::Timestamp(ts) if ts.unit() == *unit => return Ok(raw.clone()),
                Term::Int(n) => TimeInput::Number(*n),
                _ => {
                    let text = raw.as_text().ok_or_else(fail)?;
                    return Timestamp::to_canonical(TimeInput::Text(&text), *unit)
                        .map(Term::Timestamp)
                        .map_err(|e| Invalid(e.to_string()));
                }
            };
            Timestamp::to_canonical(input, *unit)
                .map(Term::Timestamp)
                .map_err(|e| Invalid(e.to_string()))
        }
    }
}

fn to_bool(raw: &Term) -> Option<bool> {
    match raw {
        Term::Bool(b) => Some(*b),
        Term::Int(0) => Some(false),
        Term::Int(1) => Some(true),
        _ => match &*raw.as_text()? {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
    }
}

fn to_int(raw: &Term) -> Option<i64> {
    match raw {
        Term::Int(i) => Some(*i),
        Term::Str(_) | Term::Bytes(_) | Term::List(_) => raw.as_text()?.parse().ok(),
        _ => None,
    }
}

fn bounded(raw: &Term, min: Option<i64>, max: Option<i64>) -> Option<Term> {
    let i = to_int(raw)?;
    let above = min.map_or(true, |m| i >= m);
    let below = max.map_or(true, |m| i <= m);
    (above && below).then_some(Term::Int(i))
}

fn to_float(raw: &Term) -> Option<f64> {
    match raw {
        Term::Float(f) => Some(*f),
        Term::Int(i) => Some(*i as f64),
        Term::Str(_) | Term::Bytes(_) | Term::List(_) => raw.as_text()?.parse().ok(),
        _ => None,
    }
}

fn to_string(raw: &Term) -> Option<String> {
    match raw {
        Term::Int(i) => Some(i.to_string()),
        Term::List(items) if items.is_empty() => Some(String::new()),
        Term::Str(_) | Term::Atom(_) | Term::Bytes(_) | Term::List(_) => {
            raw.as_text().map(|t| t.into_owned())
        }
        _ => None,
    }
}

fn to_bytes(raw: &Term) -> Option<Vec<u8>> {
    match raw {
        Term::Bytes(b) => Some(b.clone()),
        _ => to_string(raw).map(String::into_bytes),
    }
}

fn to_host(raw: &Term) -> Option<String> {
    let host = to_string(raw)?.trim().to_ascii_lowercase();
    (!host.is_empty() && !host.contains(char::is_whitespace)).then_some(host)
}

fn to_ip_mask(text: &str) -> Option<(IpAddr, u8)> {
    let (addr, len) = match text.split_once('/') {
        Some((addr, len)) => (addr.parse::<IpAddr>().ok()?, Some(len.parse::<u8>().ok()?)),
        None => (text.parse::<IpAddr>().ok()?, None),
    };
    let full = if addr.is_ipv4() { 32 } else { 128 };
    let len = len.unwrap_or(full);
    (len <= full).then_some((addr, len))
}

/// Lexically normalize a path: drop `.` and empty segments, resolve `..`
/// against preceding segments. `..` above the root of an absolute path
/// is discarded; leading `..` of a relative path is kept.
fn normalize_path(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let absolute = text.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in text.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last().copied() {
                Some(last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    Some(match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    })
}

/// True if every key in a (possibly nested) map or options list is
/// textual or symbolic. Values are not inspected beyond nesting.
fn is_map_shaped(term: &Term) -> bool {
    match term {
        Term::Map(pairs) => pairs.iter().all(|(_, v)| nested_ok(v)),
        Term::List(items) => items.iter().all(|item| match item {
            Term::Tuple(kv) if kv.len() == 2 => kv[0].as_key().is_some() && nested_ok(&kv[1]),
            _ => false,
        }),
        _ => false,
    }
}

fn nested_ok(value: &Term) -> bool {
    match value {
        Term::Map(_) => is_map_shaped(value),
        Term::List(items)
            if !items.is_empty()
                && !is_char_list(items)
                && items.iter().all(|i| matches!(i, Term::Tuple(kv) if kv.len() == 2)) =>
        {
            is_map_shaped(value)
        }
        _ => true,
    }
}
