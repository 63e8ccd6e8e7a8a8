use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What a read does with subjects whose type arcs name no registered type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Fail the read with `DocumentError::UnknownType`.
    #[default]
    Reject,
    /// Drop the subject and its triples, logging a warning.
    Skip,
}

/// Configuration for a [`Document`](crate::Document).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Handling of unregistered type URIs during read.
    pub unknown_types: UnknownTypePolicy,
    /// Prefix declarations every new (or cleared) document starts with.
    pub namespaces: BTreeMap<String, String>,
    /// Run `Document::validate` before writing and refuse to write an
    /// invalid document.
    pub validate_on_write: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            unknown_types: UnknownTypePolicy::Reject,
            namespaces: BTreeMap::new(),
            validate_on_write: false,
        }
    }
}

impl DocumentConfig {
    /// Reject unknown types and validate before every write.
    pub fn strict() -> Self {
        Self {
            validate_on_write: true,
            ..Default::default()
        }
    }

    /// Skip unknown types and never validate on write.
    pub fn lenient() -> Self {
        Self {
            unknown_types: UnknownTypePolicy::Skip,
            ..Default::default()
        }
    }

    /// Add a prefix declaration.
    pub fn with_namespace(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), namespace.into());
        self
    }
}
