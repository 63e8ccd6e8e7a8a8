use std::fmt;

use serde::{Deserialize, Serialize};

use crate::uri::Uri;

/// How a property slot encodes its values.
///
/// A slot's kind is fixed when the slot is declared. Every value stored in the
/// slot carries the same kind, so a slot never drifts between URI references
/// and literals.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// URI reference (`<...>` in the triple form).
    Uri,
    /// Plain literal (`"..."` in the triple form).
    Literal,
    /// Literal with an explicit datatype (`"..."^^<datatype>`).
    Typed(Uri),
}

impl ValueKind {
    /// Wrap a lexical form into a value of this kind.
    pub fn wrap(&self, lexical: impl Into<String>) -> Value {
        let lexical = lexical.into();
        match self {
            Self::Uri => Value::Uri(Uri::from(lexical)),
            Self::Literal => Value::Literal(lexical),
            Self::Typed(datatype) => Value::Typed {
                lexical,
                datatype: datatype.clone(),
            },
        }
    }

    /// Shorthand for a typed kind.
    pub fn typed(datatype: impl Into<Uri>) -> Self {
        Self::Typed(datatype.into())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri => f.write_str("uri"),
            Self::Literal => f.write_str("literal"),
            Self::Typed(datatype) => write!(f, "typed<{datatype}>"),
        }
    }
}

/// A property value with its encoding carried explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Uri(Uri),
    Literal(String),
    Typed { lexical: String, datatype: Uri },
}

impl Value {
    pub fn uri(uri: impl Into<Uri>) -> Self {
        Self::Uri(uri.into())
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Self::Literal(lexical.into())
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<Uri>) -> Self {
        Self::Typed {
            lexical: lexical.into(),
            datatype: datatype.into(),
        }
    }

    /// The kind this value is encoded with.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Uri(_) => ValueKind::Uri,
            Self::Literal(_) => ValueKind::Literal,
            Self::Typed { datatype, .. } => ValueKind::Typed(datatype.clone()),
        }
    }

    /// The bare lexical form, without delimiters.
    pub fn lexical(&self) -> &str {
        match self {
            Self::Uri(uri) => uri.as_str(),
            Self::Literal(lexical) | Self::Typed { lexical, .. } => lexical,
        }
    }

    pub fn as_uri(&self) -> Option<&Uri> {
        match self {
            Self::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Self::Uri(_))
    }

    /// Returns `true` if the value is encoded with `kind`.
    pub fn is_kind(&self, kind: &ValueKind) -> bool {
        match (self, kind) {
            (Self::Uri(_), ValueKind::Uri) => true,
            (Self::Literal(_), ValueKind::Literal) => true,
            (Self::Typed { datatype, .. }, ValueKind::Typed(expected)) => datatype == expected,
            _ => false,
        }
    }

    /// Re-encode the lexical form with `kind`. Values already of that kind
    /// are returned unchanged.
    pub fn coerce(self, kind: &ValueKind) -> Value {
        if self.is_kind(kind) {
            return self;
        }
        let lexical = match self {
            Self::Uri(uri) => uri.into_string(),
            Self::Literal(lexical) | Self::Typed { lexical, .. } => lexical,
        };
        kind.wrap(lexical)
    }
}

/// Renders the delimiter convention of the triple form: `<uri>`,
/// `"literal"`, or `"lexical"^^<datatype>`. Quotes inside literals are not
/// escaped; use the N-Triples writer for serialization.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => write!(f, "<{uri}>"),
            Self::Literal(lexical) => write!(f, "\"{lexical}\""),
            Self::Typed { lexical, datatype } => write!(f, "\"{lexical}\"^^<{datatype}>"),
        }
    }
}
