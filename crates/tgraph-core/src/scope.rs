use std::collections::{BTreeMap, BTreeSet};

use tgraph_types::Uri;

use crate::entity::Entity;

/// Document-wide state visible to property accessors and rules.
///
/// Holds every identity in the document (top-level and owned) and the
/// declared namespace prefixes. Accessors reach it through a borrow handed
/// out by the document, so entities never point back at their container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentScope {
    identities: BTreeSet<Uri>,
    namespaces: BTreeMap<String, String>,
}

impl DocumentScope {
    /// Returns `true` if any entity in the document has this identity.
    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains(identity)
    }

    /// Number of identities in the document.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn identities(&self) -> impl Iterator<Item = &Uri> {
        self.identities.iter()
    }

    /// Record the identities of `entity` and all its descendants.
    pub fn insert_tree(&mut self, entity: &Entity) {
        self.identities
            .extend(entity.walk().map(|e| e.identity().clone()));
    }

    /// Forget the identities of `entity` and all its descendants.
    pub fn remove_tree(&mut self, entity: &Entity) {
        for e in entity.walk() {
            self.identities.remove(e.identity());
        }
    }

    /// Declare (or redeclare) a namespace prefix.
    pub fn declare(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.namespaces.insert(prefix.into(), namespace.into());
    }

    /// Namespace bound to `prefix`.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Returns `true` if some prefix is bound to `namespace`.
    pub fn declares(&self, namespace: &str) -> bool {
        self.namespaces.values().any(|ns| ns == namespace)
    }

    /// Declared prefixes, sorted by prefix.
    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    pub(crate) fn reset(&mut self, namespaces: BTreeMap<String, String>) {
        self.identities.clear();
        self.namespaces = namespaces;
    }
}
