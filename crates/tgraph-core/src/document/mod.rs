//! The document: root container and object store.
//!
//! A [`Document`] owns a flat map of top-level entities keyed by identity.
//! Every other entity lives inside exactly one owner's owned-object slot, so
//! the store is a forest of ownership trees. Reading replaces the whole
//! forest from a triple stream (see [`read`]), writing walks it depth first
//! (see [`write`]).

pub mod read;
pub mod validate;
pub mod write;

use std::collections::BTreeMap;

use tgraph_types::{Uri, Value};
use tracing::debug;

use crate::config::DocumentConfig;
use crate::entity::{Entity, SlotKind};
use crate::error::{DocumentError, DocumentResult, PropertyError};
use crate::property::{apply_amendments, EntityMut};
use crate::registry::TypeRegistry;
use crate::rule::{Mutation, RuleContext, RuleSet, ValidationRule};
use crate::rules::UniqueIdentity;
use crate::scope::DocumentScope;

/// A single-document object mapper.
///
/// Not internally synchronized; callers sharing a document across threads
/// must serialize access themselves.
#[derive(Debug)]
pub struct Document {
    config: DocumentConfig,
    store: BTreeMap<Uri, Entity>,
    scope: DocumentScope,
    rules: RuleSet,
    poisoned: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// An empty document. Identity uniqueness is always enforced; further
    /// document-wide rules can be added with [`add_rule`](Self::add_rule).
    pub fn with_config(config: DocumentConfig) -> Self {
        let mut rules = RuleSet::new();
        rules.register(UniqueIdentity);
        let mut scope = DocumentScope::default();
        scope.reset(config.namespaces.clone());
        Self {
            config,
            store: BTreeMap::new(),
            scope,
            rules,
            poisoned: false,
        }
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Add a document-wide rule, run on every insertion and adoption and
    /// during [`validate`](Self::validate).
    pub fn add_rule(&mut self, rule: impl ValidationRule + 'static) {
        self.rules.register(rule);
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn scope(&self) -> &DocumentScope {
        &self.scope
    }

    /// Returns `true` after a failed read until the next `clear` or
    /// successful read.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn ensure_usable(&self) -> DocumentResult<()> {
        if self.poisoned {
            Err(DocumentError::Poisoned)
        } else {
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Store
    // -----------------------------------------------------------------------

    /// Insert `entity` (with its owned subtree) at the top level.
    ///
    /// Document rules run before the insertion; the default rule set rejects
    /// identities already present anywhere in the document.
    pub fn add(&mut self, entity: Entity) -> DocumentResult<EntityMut<'_>> {
        self.ensure_usable()?;
        if entity.identity().as_str().is_empty() {
            return Err(DocumentError::MissingIdentity {
                type_tag: entity.type_tag().clone(),
            });
        }
        let ctx = RuleContext {
            owner: None,
            scope: Some(&self.scope),
        };
        let amendments = self.rules.check(&ctx, &Mutation::Insert { entity: &entity })?;

        self.scope.insert_tree(&entity);
        let identity = entity.identity().clone();
        debug!(%identity, type_tag = %entity.type_tag(), "added top-level entity");
        let slot = self.store.entry(identity.clone()).or_insert(entity);
        if let Err(err) = apply_amendments(slot, Some(&mut self.scope), Some(&self.rules), amendments) {
            if let Some(entity) = self.store.remove(&identity) {
                self.scope.remove_tree(&entity);
            }
            debug!(%identity, error = %err, "insertion rolled back");
            return Err(err.into());
        }
        let Some(slot) = self.store.get_mut(&identity) else {
            return Err(DocumentError::NotFound { identity });
        };
        Ok(EntityMut::attached(slot, &mut self.scope, &self.rules))
    }

    /// Construct an entity of `type_uri` through `registry`, give it
    /// `identity`, and [`add`](Self::add) it.
    pub fn create(
        &mut self,
        registry: &TypeRegistry,
        type_uri: &str,
        identity: impl Into<Uri>,
    ) -> DocumentResult<EntityMut<'_>> {
        self.ensure_usable()?;
        let mut entity = registry.create(type_uri)?;
        entity.set_identity(identity);
        self.add(entity)
    }

    /// A top-level entity.
    pub fn get(&self, identity: &str) -> Option<&Entity> {
        self.store.get(identity)
    }

    /// Any entity, searching the top level first and then the owned forest.
    pub fn find(&self, identity: &str) -> Option<&Entity> {
        self.store
            .get(identity)
            .or_else(|| self.store.values().find_map(|root| root.find(identity)))
    }

    /// Edit any entity in the document.
    pub fn entity_mut(&mut self, identity: &str) -> DocumentResult<EntityMut<'_>> {
        self.ensure_usable()?;
        let entity = if self.store.contains_key(identity) {
            self.store.get_mut(identity)
        } else {
            self.store.values_mut().find_map(|root| root.find_mut(identity))
        };
        let Some(entity) = entity else {
            return Err(DocumentError::NotFound {
                identity: Uri::from(identity),
            });
        };
        Ok(EntityMut::attached(entity, &mut self.scope, &self.rules))
    }

    /// Remove a top-level entity and its owned subtree.
    pub fn remove(&mut self, identity: &str) -> DocumentResult<Entity> {
        self.ensure_usable()?;
        let entity = self.store.remove(identity).ok_or_else(|| DocumentError::NotFound {
            identity: Uri::from(identity),
        })?;
        self.scope.remove_tree(&entity);
        debug!(%identity, "removed top-level entity");
        Ok(entity)
    }

    /// Top-level entities in identity order.
    pub fn top_level(&self) -> impl Iterator<Item = &Entity> {
        self.store.values()
    }

    /// Every entity, each tree in pre-order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.store.values().flat_map(Entity::walk)
    }

    /// Number of top-level entities.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns `true` if any entity, top-level or owned, has this identity.
    pub fn contains(&self, identity: &str) -> bool {
        self.scope.contains(identity)
    }

    // -----------------------------------------------------------------------
    // Namespaces and references
    // -----------------------------------------------------------------------

    /// Declare a namespace prefix, written before the first triple.
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.scope.declare(prefix, namespace);
    }

    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        self.scope.namespaces()
    }

    /// Follow the referenced-object slot `property` of `holder`.
    ///
    /// Returns `Ok(None)` if nothing is stored, and
    /// [`DocumentError::DanglingReference`] if the stored identity is not in
    /// the document.
    pub fn resolve(&self, holder: &str, property: &str) -> DocumentResult<Option<&Entity>> {
        self.ensure_usable()?;
        let entity = self.find(holder).ok_or_else(|| DocumentError::NotFound {
            identity: Uri::from(holder),
        })?;
        match entity.slot_kind(property) {
            Some(SlotKind::Reference) => {}
            Some(actual) => {
                return Err(PropertyError::WrongSlotKind {
                    property: Uri::from(property),
                    expected: SlotKind::Reference,
                    actual,
                }
                .into())
            }
            None => {
                return Err(PropertyError::Undeclared {
                    type_tag: entity.type_tag().clone(),
                    property: Uri::from(property),
                }
                .into())
            }
        }
        let Some(target) = entity.get(property).and_then(Value::as_uri) else {
            return Ok(None);
        };
        self.find(target)
            .map(Some)
            .ok_or_else(|| DocumentError::DanglingReference {
                holder: entity.identity().clone(),
                property: Uri::from(property),
                target: target.clone(),
            })
    }

    /// Drop every entity, restore the configured namespaces, and lift any
    /// poisoning.
    pub fn clear(&mut self) {
        self.store.clear();
        self.scope.reset(self.config.namespaces.clone());
        self.poisoned = false;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use tgraph_types::{vocab, ValueKind};

    use crate::entity::Entity;
    use crate::registry::TypeRegistry;
    use crate::rules::DisplayIdSyntax;

    pub const NS: &str = "http://example.com/vocab#";
    pub const MODULE: &str = "http://example.com/vocab#Module";
    pub const PART: &str = "http://example.com/vocab#Part";
    pub const NAME: &str = "http://example.com/vocab#name";
    pub const ROLE: &str = "http://example.com/vocab#role";
    pub const LENGTH: &str = "http://example.com/vocab#length";
    pub const DEFINITION: &str = "http://example.com/vocab#definition";
    pub const HAS_PART: &str = "http://example.com/vocab#hasPart";
    pub const SUB_MODULE: &str = "http://example.com/vocab#subModule";

    pub fn module() -> Entity {
        Entity::new(MODULE)
            .scalar(NAME, ValueKind::Literal)
            .rule(NAME, DisplayIdSyntax)
            .owned(HAS_PART, PART)
            .owned(SUB_MODULE, MODULE)
    }

    pub fn part() -> Entity {
        Entity::new(PART)
            .scalar(NAME, ValueKind::Literal)
            .rule(NAME, DisplayIdSyntax)
            .list(ROLE, ValueKind::Uri)
            .scalar(LENGTH, ValueKind::typed(vocab::XSD_LONG))
            .reference(DEFINITION)
            .owned(HAS_PART, PART)
    }

    pub fn registry() -> TypeRegistry {
        let mut builder = TypeRegistry::builder();
        builder.register(MODULE, module).unwrap();
        builder.register(PART, part).unwrap();
        builder.build()
    }

    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::error::ValidationError;

    fn doc_with_module() -> Document {
        let registry = registry();
        let mut doc = Document::new();
        doc.create(&registry, MODULE, "http://x/m").unwrap();
        doc
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    #[test]
    fn add_and_get() {
        let doc = doc_with_module();
        assert_eq!(doc.len(), 1);
        assert!(doc.contains("http://x/m"));
        assert_eq!(doc.get("http://x/m").unwrap().type_tag(), MODULE);
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let registry = registry();
        let mut doc = doc_with_module();
        let err = doc.create(&registry, PART, "http://x/m").err().unwrap();
        assert!(matches!(
            err,
            DocumentError::Validation(ValidationError::DuplicateIdentity { .. })
        ));
        assert_eq!(doc.get("http://x/m").unwrap().type_tag(), MODULE);
    }

    #[test]
    fn entity_without_identity_is_rejected() {
        let mut doc = Document::new();
        assert!(matches!(doc.add(part()).err(), Some(DocumentError::MissingIdentity { .. })));
    }

    #[test]
    fn nested_identity_collides_with_top_level() {
        let registry = registry();
        let mut doc = doc_with_module();
        doc.create(&registry, PART, "http://x/p").unwrap();
        let mut module = doc.entity_mut("http://x/m").unwrap();
        let err = module
            .owned(HAS_PART)
            .unwrap()
            .adopt(part().with_identity("http://x/p"))
            .unwrap_err();
        assert_eq!(
            err,
            PropertyError::Validation(ValidationError::DuplicateIdentity {
                identity: "http://x/p".into()
            })
        );
    }

    #[test]
    fn owned_children_join_the_scope() {
        let registry = registry();
        let mut doc = doc_with_module();
        doc.entity_mut("http://x/m")
            .unwrap()
            .owned(HAS_PART)
            .unwrap()
            .create(&registry, "p1")
            .unwrap();
        assert!(doc.contains("http://x/m/p1"));
        assert!(doc.get("http://x/m/p1").is_none());
        assert_eq!(doc.find("http://x/m/p1").unwrap().type_tag(), PART);
        assert_eq!(doc.entities().count(), 2);

        doc.entity_mut("http://x/m/p1")
            .unwrap()
            .scalar(NAME)
            .unwrap()
            .set("p1")
            .unwrap();
        assert_eq!(
            doc.find("http://x/m/p1").unwrap().get(NAME),
            Some(&Value::literal("p1"))
        );
    }

    #[test]
    fn remove_forgets_subtree() {
        let registry = registry();
        let mut doc = doc_with_module();
        doc.entity_mut("http://x/m")
            .unwrap()
            .owned(HAS_PART)
            .unwrap()
            .create(&registry, "p1")
            .unwrap();
        let removed = doc.remove("http://x/m").unwrap();
        assert_eq!(removed.children(HAS_PART).len(), 1);
        assert!(doc.is_empty());
        assert!(!doc.contains("http://x/m/p1"));
        assert!(matches!(doc.remove("http://x/m"), Err(DocumentError::NotFound { .. })));
    }

    #[test]
    fn document_rules_see_insertions() {
        let mut doc = Document::new();
        doc.add_rule(crate::rules::RequiredNamespace::new(NS));
        let err = doc.add(part().with_identity("http://x/p")).err().unwrap();
        assert!(matches!(
            err,
            DocumentError::Validation(ValidationError::MissingNamespace { .. })
        ));

        doc.declare_namespace("ex", NS);
        doc.add(part().with_identity("http://x/p")).unwrap();
        assert_eq!(doc.rules().names().collect::<Vec<_>>(), vec!["unique-identity", "required-namespace"]);
    }

    #[test]
    fn failed_insertion_amendment_leaves_document_unchanged() {
        let mut doc = doc_with_module();
        doc.add_rule(crate::rule::FnRule::new(
            "starter-part",
            |_: &RuleContext<'_>, mutation: &Mutation<'_>| {
                let Mutation::Insert { entity } = *mutation else {
                    return Ok(crate::rule::Verdict::Pass);
                };
                Ok(crate::rule::Verdict::Amend(vec![crate::rule::Amendment::AdoptChild {
                    parent: entity.identity().clone(),
                    property: Uri::from(HAS_PART),
                    child: part().with_identity("http://x/m"),
                }]))
            },
        ));
        let err = doc.add(part().with_identity("http://x/p")).err().unwrap();
        assert!(matches!(
            err,
            DocumentError::Property(PropertyError::Validation(ValidationError::DuplicateIdentity { .. }))
        ));
        assert_eq!(doc.len(), 1);
        assert!(!doc.contains("http://x/p"));
        assert!(doc.contains("http://x/m"));
    }

    // -----------------------------------------------------------------------
    // References
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_reference() {
        let registry = registry();
        let mut doc = Document::new();
        doc.create(&registry, PART, "http://x/a").unwrap();
        doc.create(&registry, PART, "http://x/b")
            .unwrap()
            .reference(DEFINITION)
            .unwrap()
            .set("http://x/a")
            .unwrap();

        let target = doc.resolve("http://x/b", DEFINITION).unwrap().unwrap();
        assert_eq!(target.identity(), "http://x/a");
        assert!(doc.resolve("http://x/a", DEFINITION).unwrap().is_none());
        assert!(matches!(
            doc.resolve("http://x/a", NAME),
            Err(DocumentError::Property(PropertyError::WrongSlotKind { .. }))
        ));

        doc.remove("http://x/a").unwrap();
        assert!(matches!(
            doc.resolve("http://x/b", DEFINITION),
            Err(DocumentError::DanglingReference { .. })
        ));
        let mut b = doc.entity_mut("http://x/b").unwrap();
        assert!(matches!(
            b.reference(DEFINITION).unwrap().get(),
            Err(DocumentError::DanglingReference { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Namespaces and clearing
    // -----------------------------------------------------------------------

    #[test]
    fn clear_restores_configured_namespaces() {
        let config = DocumentConfig::default().with_namespace("ex", NS);
        let mut doc = Document::with_config(config);
        doc.declare_namespace("other", "http://other/");
        doc.add(part().with_identity("http://x/p")).unwrap();
        doc.clear();
        assert!(doc.is_empty());
        assert_eq!(doc.namespaces().len(), 1);
        assert_eq!(doc.scope().namespace("ex"), Some(NS));
    }
}
