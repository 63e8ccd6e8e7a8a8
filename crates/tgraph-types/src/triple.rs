use std::fmt;

use serde::{Deserialize, Serialize};

use crate::uri::Uri;
use crate::value::Value;
use crate::vocab;

/// A subject/predicate/object statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Uri,
    pub predicate: Uri,
    pub object: Value,
}

impl Triple {
    pub fn new(subject: impl Into<Uri>, predicate: impl Into<Uri>, object: Value) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }

    /// A type arc: `(subject, rdf:type, type_uri)`.
    pub fn type_arc(subject: impl Into<Uri>, type_uri: impl Into<Uri>) -> Self {
        Self::new(subject, vocab::RDF_TYPE, Value::Uri(type_uri.into()))
    }

    /// Returns `true` if the predicate is `rdf:type`.
    pub fn is_type_arc(&self) -> bool {
        self.predicate == vocab::RDF_TYPE
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> <{}> {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_arc_uses_rdf_type() {
        let triple = Triple::type_arc("http://example.com/x", "http://sbols.org/v2#ComponentDefinition");
        assert!(triple.is_type_arc());
        assert_eq!(triple.object, Value::uri("http://sbols.org/v2#ComponentDefinition"));
    }

    #[test]
    fn property_triple_is_not_type_arc() {
        let triple = Triple::new(
            "http://example.com/x",
            "http://sbols.org/v2#displayId",
            Value::literal("x"),
        );
        assert!(!triple.is_type_arc());
    }

    #[test]
    fn display_is_statement_form() {
        let triple = Triple::new("http://s", "http://p", Value::literal("o"));
        assert_eq!(triple.to_string(), "<http://s> <http://p> \"o\" .");
    }
}
