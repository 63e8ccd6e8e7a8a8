use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tgraph_types::{Uri, Value, ValueKind};
use tracing::warn;

use crate::property::EntityMut;
use crate::rule::{RuleSet, ValidationRule};

// ---------------------------------------------------------------------------
// SlotKind
// ---------------------------------------------------------------------------

/// The four kinds of property slot an entity can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Exactly one current value, overwritten on `set`.
    Scalar,
    /// Append-only, order-preserving values.
    List,
    /// A scalar URI naming another entity in the document.
    Reference,
    /// Child entities owned by this entity.
    Owned,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scalar => "scalar",
            Self::List => "list",
            Self::Reference => "reference",
            Self::Owned => "owned",
        })
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct ValueSlot {
    pub(crate) kind: SlotKind,
    pub(crate) value_kind: ValueKind,
    pub(crate) values: Vec<Value>,
    pub(crate) rules: RuleSet,
}

impl PartialEq for ValueSlot {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value_kind == other.value_kind && self.values == other.values
    }
}

#[derive(Clone, Debug)]
pub(crate) struct OwnedSlot {
    pub(crate) child_type: Uri,
    pub(crate) children: Vec<Entity>,
    pub(crate) rules: RuleSet,
}

impl PartialEq for OwnedSlot {
    fn eq(&self, other: &Self) -> bool {
        self.child_type == other.child_type && self.children == other.children
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One typed node of the graph.
///
/// An entity is declared once per variant with the builder methods
/// ([`scalar`](Self::scalar), [`list`](Self::list),
/// [`reference`](Self::reference), [`owned`](Self::owned)) and then filled
/// through the accessors on [`EntityMut`]. Owned children are held by value,
/// so every entity has at most one owner.
///
/// Equality compares identity, type tag, slot declarations, stored values
/// and owned children. Attached rules are not compared.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub(crate) identity: Uri,
    pub(crate) type_tag: Uri,
    pub(crate) values: BTreeMap<Uri, ValueSlot>,
    pub(crate) owned: BTreeMap<Uri, OwnedSlot>,
}

impl Entity {
    /// A new entity of the given type with no identity and no slots.
    pub fn new(type_tag: impl Into<Uri>) -> Self {
        Self {
            identity: Uri::from(String::new()),
            type_tag: type_tag.into(),
            values: BTreeMap::new(),
            owned: BTreeMap::new(),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<Uri>) -> Self {
        self.identity = identity.into();
        self
    }

    /// Assign the identity. Only meaningful before the entity is inserted
    /// into a document or adopted by an owner.
    pub fn set_identity(&mut self, identity: impl Into<Uri>) {
        self.identity = identity.into();
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    /// Declare a scalar slot holding values of `kind`.
    pub fn scalar(self, property: impl Into<Uri>, kind: ValueKind) -> Self {
        self.declare_values(property.into(), SlotKind::Scalar, kind)
    }

    /// Declare a list slot holding values of `kind`.
    pub fn list(self, property: impl Into<Uri>, kind: ValueKind) -> Self {
        self.declare_values(property.into(), SlotKind::List, kind)
    }

    /// Declare a referenced-object slot.
    pub fn reference(self, property: impl Into<Uri>) -> Self {
        self.declare_values(property.into(), SlotKind::Reference, ValueKind::Uri)
    }

    /// Declare an owned-object slot whose children are of `child_type`.
    pub fn owned(mut self, property: impl Into<Uri>, child_type: impl Into<Uri>) -> Self {
        let property = property.into();
        self.values.remove(&property);
        self.owned.insert(
            property,
            OwnedSlot {
                child_type: child_type.into(),
                children: Vec::new(),
                rules: RuleSet::new(),
            },
        );
        self
    }

    /// Attach a rule to a declared slot.
    pub fn rule(self, property: impl Into<Uri>, rule: impl ValidationRule + 'static) -> Self {
        self.shared_rule(property, Arc::new(rule))
    }

    /// Attach a shared rule to a declared slot.
    pub fn shared_rule(mut self, property: impl Into<Uri>, rule: Arc<dyn ValidationRule>) -> Self {
        let property = property.into();
        if let Some(slot) = self.values.get_mut(&property) {
            slot.rules.register_shared(rule);
        } else if let Some(slot) = self.owned.get_mut(&property) {
            slot.rules.register_shared(rule);
        } else {
            warn!(type_tag = %self.type_tag, %property, rule = rule.name(), "rule attached to undeclared slot ignored");
        }
        self
    }

    fn declare_values(mut self, property: Uri, kind: SlotKind, value_kind: ValueKind) -> Self {
        self.owned.remove(&property);
        self.values.insert(
            property,
            ValueSlot {
                kind,
                value_kind,
                values: Vec::new(),
                rules: RuleSet::new(),
            },
        );
        self
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn identity(&self) -> &Uri {
        &self.identity
    }

    pub fn type_tag(&self) -> &Uri {
        &self.type_tag
    }

    /// The kind of slot declared for `property`.
    pub fn slot_kind(&self, property: &str) -> Option<SlotKind> {
        if let Some(slot) = self.values.get(property) {
            Some(slot.kind)
        } else if self.owned.contains_key(property) {
            Some(SlotKind::Owned)
        } else {
            None
        }
    }

    /// The value kind of a scalar, list, or reference slot.
    pub fn value_kind(&self, property: &str) -> Option<&ValueKind> {
        self.values.get(property).map(|slot| &slot.value_kind)
    }

    /// The declared child type of an owned slot.
    pub fn child_type(&self, property: &str) -> Option<&Uri> {
        self.owned.get(property).map(|slot| &slot.child_type)
    }

    /// First stored value of a value slot.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values(property).first()
    }

    /// All stored values of a value slot, in order. Empty if undeclared.
    pub fn values(&self, property: &str) -> &[Value] {
        self.values
            .get(property)
            .map(|slot| slot.values.as_slice())
            .unwrap_or_default()
    }

    /// Children of an owned slot, in order. Empty if undeclared.
    pub fn children(&self, property: &str) -> &[Entity] {
        self.owned
            .get(property)
            .map(|slot| slot.children.as_slice())
            .unwrap_or_default()
    }

    /// Declared slots with their kinds, value slots first, each group sorted
    /// by property URI.
    pub fn properties(&self) -> impl Iterator<Item = (&Uri, SlotKind)> {
        self.values
            .iter()
            .map(|(property, slot)| (property, slot.kind))
            .chain(self.owned.keys().map(|property| (property, SlotKind::Owned)))
    }

    /// Property URIs of the declared owned slots.
    pub fn owned_properties(&self) -> impl Iterator<Item = &Uri> {
        self.owned.keys()
    }

    /// This entity and all its descendants, depth first, parents before
    /// children.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Find this entity or a descendant by identity.
    pub fn find(&self, identity: &str) -> Option<&Entity> {
        self.walk().find(|e| e.identity == *identity)
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, identity: &str) -> Option<&mut Entity> {
        if self.identity == *identity {
            return Some(self);
        }
        self.owned
            .values_mut()
            .flat_map(|slot| slot.children.iter_mut())
            .find_map(|child| child.find_mut(identity))
    }

    /// Edit this entity outside any document.
    ///
    /// Slot rules still run; document-wide rules and reference resolution
    /// see no document.
    pub fn edit(&mut self) -> EntityMut<'_> {
        EntityMut::detached(self)
    }

    /// Store a value read from a triple, coerced to the slot's declared
    /// kind. Returns `false` if `property` is not a value slot.
    pub(crate) fn assign(&mut self, property: &str, value: Value) -> bool {
        let Some(slot) = self.values.get_mut(property) else {
            return false;
        };
        let value = value.coerce(&slot.value_kind);
        match slot.kind {
            SlotKind::List => slot.values.push(value),
            _ => slot.values = vec![value],
        }
        true
    }

    pub(crate) fn value_slots(&self) -> impl Iterator<Item = (&Uri, &ValueSlot)> {
        self.values.iter()
    }

    pub(crate) fn owned_slots(&self) -> impl Iterator<Item = (&Uri, &OwnedSlot)> {
        self.owned.iter()
    }
}

/// Pre-order iterator over an entity tree.
pub struct Walk<'a> {
    stack: Vec<&'a Entity>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let entity = self.stack.pop()?;
        for slot in entity.owned.values().rev() {
            self.stack.extend(slot.children.iter().rev());
        }
        Some(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgraph_types::vocab;

    const PART: &str = "http://example.com/Part";
    const NAME: &str = "http://example.com/name";
    const ROLE: &str = "http://example.com/role";
    const SEQ: &str = "http://example.com/sequence";
    const SUB: &str = "http://example.com/sub";

    fn part() -> Entity {
        Entity::new(PART)
            .scalar(NAME, ValueKind::Literal)
            .list(ROLE, ValueKind::Uri)
            .reference(SEQ)
            .owned(SUB, PART)
    }

    fn tree() -> Entity {
        let mut root = part().with_identity("http://x/root");
        {
            let mut edit = root.edit();
            let mut subs = edit.owned(SUB).unwrap();
            subs.adopt(part().with_identity("http://x/root/a")).unwrap();
            subs.adopt(part().with_identity("http://x/root/b")).unwrap();
        }
        root.find_mut("http://x/root/a")
            .unwrap()
            .edit()
            .owned(SUB)
            .unwrap()
            .adopt(part().with_identity("http://x/root/a/c"))
            .unwrap();
        root
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    #[test]
    fn new_entity_has_no_identity() {
        let entity = Entity::new(PART);
        assert_eq!(entity.identity().as_str(), "");
        assert_eq!(entity.type_tag(), PART);
    }

    #[test]
    fn declared_slots_report_their_kind() {
        let entity = part();
        assert_eq!(entity.slot_kind(NAME), Some(SlotKind::Scalar));
        assert_eq!(entity.slot_kind(ROLE), Some(SlotKind::List));
        assert_eq!(entity.slot_kind(SEQ), Some(SlotKind::Reference));
        assert_eq!(entity.slot_kind(SUB), Some(SlotKind::Owned));
        assert_eq!(entity.slot_kind("http://example.com/other"), None);
        assert_eq!(entity.value_kind(SEQ), Some(&ValueKind::Uri));
        assert_eq!(entity.child_type(SUB).map(Uri::as_str), Some(PART));
        assert_eq!(entity.properties().count(), 4);
    }

    #[test]
    fn redeclaring_replaces_slot_kind() {
        let entity = part().scalar(SUB, ValueKind::typed(vocab::XSD_LONG));
        assert_eq!(entity.slot_kind(SUB), Some(SlotKind::Scalar));
        assert_eq!(entity.owned_properties().count(), 0);
    }

    #[test]
    fn rule_on_undeclared_slot_is_ignored() {
        let entity = part().rule("http://example.com/nope", crate::rules::DisplayIdSyntax);
        assert_eq!(entity, part());
    }

    // -----------------------------------------------------------------------
    // Tree navigation
    // -----------------------------------------------------------------------

    #[test]
    fn walk_is_preorder() {
        let root = tree();
        let order: Vec<&str> = root.walk().map(|e| e.identity().as_str()).collect();
        assert_eq!(
            order,
            vec!["http://x/root", "http://x/root/a", "http://x/root/a/c", "http://x/root/b"]
        );
    }

    #[test]
    fn find_reaches_descendants() {
        let mut root = tree();
        assert!(root.find("http://x/root/a/c").is_some());
        assert!(root.find("http://x/missing").is_none());
        assert!(root.find_mut("http://x/root/b").is_some());
    }

    #[test]
    fn unset_slots_read_empty() {
        let entity = part();
        assert!(entity.get(NAME).is_none());
        assert!(entity.values(ROLE).is_empty());
        assert!(entity.children(SUB).is_empty());
        assert!(entity.values("http://undeclared").is_empty());
    }

    #[test]
    fn equality_ignores_rules() {
        let plain = part();
        let ruled = part().rule(NAME, crate::rules::DisplayIdSyntax);
        assert_eq!(plain, ruled);
    }
}
