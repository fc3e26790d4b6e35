//! # URI and Token-List Grammar
//!
//! Thin adapters over the `url` crate plus a small token-list grammar
//! (`gzip, deflate, br`), used by the `uri` and `tokens` validators.
//!
//! Both parsers only accept input they can render back canonically:
//! `render_uri(parse_uri(s)?)` is the canonical spelling of `s`.

use std::fmt;

use url::Url;

use crate::error::CoreError;

/// An absolute URI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uri(Url);

impl Uri {
    /// Access the parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The URI scheme, lowercased.
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// The host component, if any.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// A single token from a comma-separated token list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(String);

impl Token {
    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse an absolute URI.
///
/// # Errors
///
/// Returns `CoreError::Uri` for relative references and malformed text.
pub fn parse_uri(text: &str) -> Result<Uri, CoreError> {
    Url::parse(text.trim()).map(Uri).map_err(|e| CoreError::Uri {
        input: text.to_string(),
        reason: e.to_string(),
    })
}

/// Render a URI in canonical form.
pub fn render_uri(uri: &Uri) -> String {
    uri.0.as_str().to_string()
}

/// Parse a comma-separated list of tokens.
///
/// Whitespace around each token is ignored. Empty input yields an empty
/// list; an empty element between commas is an error.
///
/// # Errors
///
/// Returns `CoreError::Tokens` if an element is empty or contains a
/// character outside the token alphabet.
pub fn parse_token_list(text: &str) -> Result<Vec<Token>, CoreError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|raw| {
            let token = raw.trim();
            if token.is_empty() {
                return Err(CoreError::Tokens {
                    input: text.to_string(),
                    reason: "empty token".to_string(),
                });
            }
            if let Some(bad) = token.chars().find(|c| !is_tchar(*c)) {
                return Err(CoreError::Tokens {
                    input: text.to_string(),
                    reason: format!("invalid character {bad:?} in token {token:?}"),
                });
            }
            Ok(Token(token.to_string()))
        })
        .collect()
}

/// Render tokens as a canonical comma-separated list.
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// RFC 9110 `tchar`.
fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render_uri() {
        let uri = parse_uri("HTTPS://Example.COM/a/../b?x=1").unwrap();
        assert_eq!(uri.scheme(), "https");
        assert_eq!(uri.host(), Some("example.com"));
        assert_eq!(render_uri(&uri), "https://example.com/b?x=1");
    }

    #[test]
    fn test_relative_uri_rejected() {
        assert!(matches!(parse_uri("/just/a/path"), Err(CoreError::Uri { .. })));
        assert!(parse_uri("").is_err());
    }

    #[test]
    fn test_parse_token_list() {
        let tokens = parse_token_list(" gzip,deflate , br").unwrap();
        let names: Vec<&str> = tokens.iter().map(Token::as_str).collect();
        assert_eq!(names, ["gzip", "deflate", "br"]);
        assert_eq!(render_tokens(&tokens), "gzip, deflate, br");
    }

    #[test]
    fn test_empty_token_list() {
        assert!(parse_token_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_token_list_rejects_empty_element() {
        assert!(matches!(parse_token_list("a,,b"), Err(CoreError::Tokens { .. })));
    }

    #[test]
    fn test_token_list_rejects_separators() {
        assert!(parse_token_list("a b").is_err());
        assert!(parse_token_list("a;b").is_err());
    }
}
