use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An opaque URI string.
///
/// A `Uri` names entity identities, type tags, and property predicates. The
/// engine never resolves or normalizes it; two URIs are equal only if their
/// strings are equal. Labels of the form `_:name` stand for blank nodes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(String);

impl Uri {
    /// Parse a URI, rejecting empty strings and characters that cannot
    /// appear inside an IRI reference.
    pub fn parse(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.is_empty() {
            return Err(TypeError::EmptyUri);
        }
        if let Some(ch) = s
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`'))
        {
            return Err(TypeError::InvalidUriChar { uri: s, ch });
        }
        Ok(Self(s))
    }

    /// The URI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the URI and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if this is a blank node label: `_:` followed by one or
    /// more ASCII letters, digits, `_` or `-`.
    pub fn is_blank(&self) -> bool {
        self.0
            .strip_prefix("_:")
            .is_some_and(|label| !label.is_empty() && label.chars().all(is_blank_label_char))
    }

    /// The part after the last `#` or `/`.
    ///
    /// `http://sbols.org/v2#displayId` yields `displayId`;
    /// `http://example.com/parts/pLac` yields `pLac`.
    pub fn local_name(&self) -> &str {
        match self.0.rfind(['#', '/']) {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }

    /// Everything up to and including the last `#` or `/`.
    pub fn namespace(&self) -> &str {
        match self.0.rfind(['#', '/']) {
            Some(i) => &self.0[..=i],
            None => "",
        }
    }

    /// Returns `true` if the URI lives in the given namespace.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.0.starts_with(namespace)
    }

    /// Identity of a child owned by this URI: `{self}/{local}`.
    pub fn child(&self, local: &str) -> Uri {
        let base = self.0.trim_end_matches('/');
        Uri(format!("{base}/{local}"))
    }
}

/// Characters allowed in a blank node label.
pub fn is_blank_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Uri {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&Uri> for Uri {
    fn from(uri: &Uri) -> Self {
        uri.clone()
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Uri {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Uri {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Uri {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Uri {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_uri() {
        let uri = Uri::parse("http://example.com/parts/pLac").unwrap();
        assert_eq!(uri.as_str(), "http://example.com/parts/pLac");
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Uri::parse(""), Err(TypeError::EmptyUri));
    }

    #[test]
    fn parse_rejects_whitespace_and_brackets() {
        assert!(matches!(
            Uri::parse("http://example.com/a b"),
            Err(TypeError::InvalidUriChar { ch: ' ', .. })
        ));
        assert!(matches!(
            Uri::parse("http://example.com/<a>"),
            Err(TypeError::InvalidUriChar { ch: '<', .. })
        ));
    }

    #[test]
    fn local_name_and_namespace_split_on_hash() {
        let uri = Uri::from("http://sbols.org/v2#displayId");
        assert_eq!(uri.local_name(), "displayId");
        assert_eq!(uri.namespace(), "http://sbols.org/v2#");
        assert!(uri.in_namespace("http://sbols.org/v2#"));
    }

    #[test]
    fn local_name_and_namespace_split_on_slash() {
        let uri = Uri::from("http://example.com/parts/pLac");
        assert_eq!(uri.local_name(), "pLac");
        assert_eq!(uri.namespace(), "http://example.com/parts/");
    }

    #[test]
    fn local_name_without_separator_is_whole_string() {
        let uri = Uri::from("urn-like");
        assert_eq!(uri.local_name(), "urn-like");
        assert_eq!(uri.namespace(), "");
    }

    #[test]
    fn child_appends_local_name() {
        let owner = Uri::from("http://example.com/design");
        assert_eq!(owner.child("fc1"), "http://example.com/design/fc1");
        let trailing = Uri::from("http://example.com/design/");
        assert_eq!(trailing.child("fc1"), "http://example.com/design/fc1");
    }

    #[test]
    fn derefs_to_str() {
        let uri = Uri::from("http://example.com/x");
        let s: &str = &uri;
        assert_eq!(s, "http://example.com/x");
        assert!(uri.ends_with("/x"));
    }

    #[test]
    fn blank_labels_are_detected() {
        assert!(Uri::from("_:b0").is_blank());
        assert!(!Uri::from("http://example.com/b0").is_blank());
    }

    #[test]
    fn malformed_blank_labels_are_not_blank() {
        assert!(!Uri::from("_:").is_blank());
        assert!(!Uri::from("_:a b").is_blank());
        assert!(!Uri::from("_:a.b").is_blank());
        assert!(Uri::from("_:node-1_x").is_blank());
    }

    #[test]
    fn serde_is_transparent() {
        let uri = Uri::from("http://example.com/x");
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"http://example.com/x\"");
        let parsed: Uri = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, uri);
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Uri::from("http://a") < Uri::from("http://b"));
    }
}
