//! Typed accessors over an entity's property slots.
//!
//! Storage lives in the [`Entity`]; an accessor is a view bound to one
//! property that checks the slot's declared kind, runs the slot's rules
//! before the change, applies the change, and then applies any amendments
//! the rules asked for.

use tgraph_types::{Uri, Value};
use tracing::debug;

use crate::entity::{Entity, SlotKind};
use crate::error::{DocumentError, DocumentResult, PropertyError, PropertyResult};
use crate::registry::TypeRegistry;
use crate::rule::{Amendment, Mutation, RuleContext, RuleSet};
use crate::scope::DocumentScope;

// ---------------------------------------------------------------------------
// EntityMut
// ---------------------------------------------------------------------------

/// Mutable handle to an entity, optionally attached to a document.
///
/// Handles obtained from a document carry its [`DocumentScope`] and
/// document-wide rules; handles from [`Entity::edit`] carry neither.
pub struct EntityMut<'a> {
    entity: &'a mut Entity,
    scope: Option<&'a mut DocumentScope>,
    document_rules: Option<&'a RuleSet>,
}

impl<'a> EntityMut<'a> {
    pub(crate) fn detached(entity: &'a mut Entity) -> Self {
        Self {
            entity,
            scope: None,
            document_rules: None,
        }
    }

    pub(crate) fn attached(entity: &'a mut Entity, scope: &'a mut DocumentScope, document_rules: &'a RuleSet) -> Self {
        Self {
            entity,
            scope: Some(scope),
            document_rules: Some(document_rules),
        }
    }

    pub fn entity(&self) -> &Entity {
        self.entity
    }

    pub fn identity(&self) -> &Uri {
        &self.entity.identity
    }

    /// Returns `true` if the handle was obtained from a document.
    pub fn is_attached(&self) -> bool {
        self.scope.is_some()
    }

    pub fn scalar(&mut self, property: impl Into<Uri>) -> PropertyResult<ScalarProperty<'_>> {
        Ok(ScalarProperty(self.slot(property.into(), SlotKind::Scalar)?))
    }

    pub fn list(&mut self, property: impl Into<Uri>) -> PropertyResult<ListProperty<'_>> {
        Ok(ListProperty(self.slot(property.into(), SlotKind::List)?))
    }

    pub fn reference(&mut self, property: impl Into<Uri>) -> PropertyResult<ReferenceProperty<'_>> {
        Ok(ReferenceProperty(self.slot(property.into(), SlotKind::Reference)?))
    }

    pub fn owned(&mut self, property: impl Into<Uri>) -> PropertyResult<OwnedProperty<'_>> {
        Ok(OwnedProperty(self.slot(property.into(), SlotKind::Owned)?))
    }

    /// Edit a descendant of this entity.
    pub fn descendant(&mut self, identity: &str) -> Option<EntityMut<'_>> {
        let entity = self.entity.find_mut(identity)?;
        Some(EntityMut {
            entity,
            scope: self.scope.as_deref_mut(),
            document_rules: self.document_rules,
        })
    }

    fn slot(&mut self, property: Uri, expected: SlotKind) -> PropertyResult<Slot<'_>> {
        match self.entity.slot_kind(&property) {
            Some(actual) if actual == expected => Ok(Slot {
                entity: self.entity,
                scope: self.scope.as_deref_mut(),
                document_rules: self.document_rules,
                property,
            }),
            Some(actual) => Err(PropertyError::WrongSlotKind {
                property,
                expected,
                actual,
            }),
            None => Err(PropertyError::Undeclared {
                type_tag: self.entity.type_tag.clone(),
                property,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Slot plumbing
// ---------------------------------------------------------------------------

struct Slot<'b> {
    entity: &'b mut Entity,
    scope: Option<&'b mut DocumentScope>,
    document_rules: Option<&'b RuleSet>,
    property: Uri,
}

impl Slot<'_> {
    fn values(&self) -> &[Value] {
        self.entity.values(&self.property)
    }

    fn undeclared(&self) -> PropertyError {
        PropertyError::Undeclared {
            type_tag: self.entity.type_tag.clone(),
            property: self.property.clone(),
        }
    }

    /// Check, apply, then amend a write to a value slot.
    fn write(&mut self, value: Value, append: bool) -> PropertyResult<()> {
        let slot = self.entity.values.get(&self.property).ok_or_else(|| self.undeclared())?;
        if let Value::Uri(uri) = &value {
            Uri::parse(uri.as_str()).map_err(|source| PropertyError::InvalidUri {
                property: self.property.clone(),
                source,
            })?;
        }
        if !value.is_kind(&slot.value_kind) {
            return Err(PropertyError::KindMismatch {
                property: self.property.clone(),
                expected: slot.value_kind.clone(),
                actual: value.kind(),
            });
        }

        let ctx = RuleContext {
            owner: Some(&*self.entity),
            scope: self.scope.as_deref(),
        };
        let mutation = if append {
            Mutation::Add {
                property: &self.property,
                value: &value,
            }
        } else {
            Mutation::Set {
                property: &self.property,
                value: &value,
            }
        };
        let amendments = slot.rules.check(&ctx, &mutation)?;

        let property = &self.property;
        commit(self.entity, self.scope.as_deref_mut(), self.document_rules, amendments, |entity, _| {
            if let Some(slot) = entity.values.get_mut(property) {
                if append {
                    slot.values.push(value);
                } else {
                    slot.values = vec![value];
                }
            }
        })
    }
}

/// Apply a checked mutation followed by its amendments.
///
/// If an amendment fails, the entity and the scope are restored to their
/// state before the mutation and the amendment's error is returned.
pub(crate) fn commit(
    entity: &mut Entity,
    mut scope: Option<&mut DocumentScope>,
    document_rules: Option<&RuleSet>,
    amendments: Vec<Amendment>,
    apply: impl FnOnce(&mut Entity, Option<&mut DocumentScope>),
) -> PropertyResult<()> {
    let saved = (!amendments.is_empty()).then(|| (entity.clone(), scope.as_deref().cloned()));
    apply(entity, scope.as_deref_mut());
    let Err(err) = apply_amendments(entity, scope.as_deref_mut(), document_rules, amendments) else {
        return Ok(());
    };
    if let Some((saved_entity, saved_scope)) = saved {
        debug!(identity = %saved_entity.identity, error = %err, "amendment failed, rolling back");
        *entity = saved_entity;
        if let (Some(scope), Some(saved_scope)) = (scope, saved_scope) {
            *scope = saved_scope;
        }
    }
    Err(err)
}

pub(crate) fn apply_amendments(
    entity: &mut Entity,
    mut scope: Option<&mut DocumentScope>,
    document_rules: Option<&RuleSet>,
    amendments: Vec<Amendment>,
) -> PropertyResult<()> {
    for amendment in amendments {
        match amendment {
            Amendment::AdoptChild {
                parent,
                property,
                child,
            } => {
                debug!(%parent, %property, child = %child.identity, "applying amendment");
                let owner = entity.identity.clone();
                let target = entity
                    .find_mut(&parent)
                    .ok_or(PropertyError::AmendmentTarget { owner, target: parent })?;
                let mut handle = EntityMut {
                    entity: target,
                    scope: scope.as_deref_mut(),
                    document_rules,
                };
                handle.owned(property)?.adopt(child)?;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ScalarProperty
// ---------------------------------------------------------------------------

/// A slot holding exactly one current value.
pub struct ScalarProperty<'b>(Slot<'b>);

impl ScalarProperty<'_> {
    pub fn get(&self) -> Option<&Value> {
        self.0.values().first()
    }

    /// Overwrite the value, wrapping `lexical` in the slot's declared kind.
    pub fn set(&mut self, lexical: impl Into<String>) -> PropertyResult<()> {
        let kind = self.0.entity.value_kind(&self.0.property).cloned().ok_or_else(|| self.0.undeclared())?;
        self.0.write(kind.wrap(lexical), false)
    }

    /// Overwrite the value with an explicitly encoded one. The encoding must
    /// match the slot's declared kind.
    pub fn set_value(&mut self, value: Value) -> PropertyResult<()> {
        self.0.write(value, false)
    }
}

// ---------------------------------------------------------------------------
// ListProperty
// ---------------------------------------------------------------------------

/// An append-only, order-preserving slot.
pub struct ListProperty<'b>(Slot<'b>);

impl ListProperty<'_> {
    /// Append `lexical`, wrapped in the slot's declared kind.
    pub fn add(&mut self, lexical: impl Into<String>) -> PropertyResult<()> {
        let kind = self.0.entity.value_kind(&self.0.property).cloned().ok_or_else(|| self.0.undeclared())?;
        self.0.write(kind.wrap(lexical), true)
    }

    pub fn add_value(&mut self, value: Value) -> PropertyResult<()> {
        self.0.write(value, true)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.values().iter()
    }

    pub fn len(&self) -> usize {
        self.0.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().is_empty()
    }
}

// ---------------------------------------------------------------------------
// ReferenceProperty
// ---------------------------------------------------------------------------

/// A scalar URI naming another entity, resolved against the document.
pub struct ReferenceProperty<'b>(Slot<'b>);

impl ReferenceProperty<'_> {
    /// The stored identity, without checking that it resolves.
    pub fn identity(&self) -> Option<&Uri> {
        self.0.values().first().and_then(Value::as_uri)
    }

    /// Point at `target`.
    pub fn set(&mut self, target: impl Into<Uri>) -> PropertyResult<()> {
        self.0.write(Value::Uri(target.into()), false)
    }

    /// The stored identity, checked against the document.
    ///
    /// Returns `Ok(None)` when nothing is stored or the entity is not
    /// attached to a document. Use `Document::resolve` to obtain the
    /// referenced entity itself.
    pub fn get(&self) -> DocumentResult<Option<&Uri>> {
        let (Some(target), Some(scope)) = (self.identity(), self.0.scope.as_deref()) else {
            return Ok(None);
        };
        if scope.contains(target) {
            Ok(Some(target))
        } else {
            Err(DocumentError::DanglingReference {
                holder: self.0.entity.identity.clone(),
                property: self.0.property.clone(),
                target: target.clone(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// OwnedProperty
// ---------------------------------------------------------------------------

/// A slot of child entities owned by value.
pub struct OwnedProperty<'b>(Slot<'b>);

impl OwnedProperty<'_> {
    fn children(&self) -> &[Entity] {
        self.0.entity.children(&self.0.property)
    }

    /// Number of owned children.
    pub fn size(&self) -> usize {
        self.children().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.children().iter()
    }

    /// A direct child by identity.
    pub fn get(&self, identity: &str) -> Option<&Entity> {
        self.children().iter().find(|c| c.identity == *identity)
    }

    /// The declared child type.
    pub fn child_type(&self) -> Option<&Uri> {
        self.0.entity.child_type(&self.0.property)
    }

    /// Construct a child of the declared type through `registry`, name it
    /// `{owner}/{local_name}`, and adopt it. Returns a handle to the new
    /// child.
    pub fn create(&mut self, registry: &TypeRegistry, local_name: &str) -> PropertyResult<EntityMut<'_>> {
        let child_type = self.child_type().cloned().ok_or_else(|| self.0.undeclared())?;
        let mut child = registry.create(&child_type)?;
        child.set_identity(self.0.entity.identity.child(local_name));
        let identity = child.identity.clone();
        let owner = self.0.entity.identity.clone();
        self.adopt(child)?;
        self.child(&identity)
            .ok_or(PropertyError::MissingChild { owner, child: identity })
    }

    /// Take ownership of `child`.
    ///
    /// The child must carry an identity and the declared child type. Slot
    /// rules run first, then the document's rules when attached.
    pub fn adopt(&mut self, child: Entity) -> PropertyResult<()> {
        let slot = &mut self.0;
        if child.identity.as_str().is_empty() {
            return Err(PropertyError::MissingIdentity {
                type_tag: child.type_tag.clone(),
            });
        }
        let owned = slot.entity.owned.get(&slot.property).ok_or_else(|| slot.undeclared())?;
        if owned.child_type != child.type_tag {
            return Err(PropertyError::ChildTypeMismatch {
                property: slot.property.clone(),
                expected: owned.child_type.clone(),
                actual: child.type_tag.clone(),
            });
        }
        if slot.scope.is_none() {
            if let Some(clash) = child.walk().find(|e| slot.entity.find(&e.identity).is_some()) {
                return Err(PropertyError::DuplicateChild {
                    owner: slot.entity.identity.clone(),
                    child: clash.identity.clone(),
                });
            }
        }

        let ctx = RuleContext {
            owner: Some(&*slot.entity),
            scope: slot.scope.as_deref(),
        };
        let mutation = Mutation::Adopt {
            property: &slot.property,
            child: &child,
        };
        let mut amendments = owned.rules.check(&ctx, &mutation)?;
        if let Some(rules) = slot.document_rules {
            amendments.extend(rules.check(&ctx, &mutation)?);
        }

        debug!(owner = %slot.entity.identity, property = %slot.property, child = %child.identity, "adopted");
        let property = &slot.property;
        commit(slot.entity, slot.scope.as_deref_mut(), slot.document_rules, amendments, |entity, scope| {
            if let Some(scope) = scope {
                scope.insert_tree(&child);
            }
            if let Some(owned) = entity.owned.get_mut(property) {
                owned.children.push(child);
            }
        })
    }

    /// Detach a direct child and hand it back to the caller.
    pub fn remove(&mut self, identity: &str) -> PropertyResult<Entity> {
        let slot = &mut self.0;
        let Some(owned) = slot.entity.owned.get_mut(&slot.property) else {
            return Err(slot.undeclared());
        };
        let Some(index) = owned.children.iter().position(|c| c.identity == *identity) else {
            return Err(PropertyError::MissingChild {
                owner: slot.entity.identity.clone(),
                child: Uri::from(identity),
            });
        };
        let child = owned.children.remove(index);
        if let Some(scope) = slot.scope.as_deref_mut() {
            scope.remove_tree(&child);
        }
        Ok(child)
    }

    /// Edit a direct child.
    pub fn child(&mut self, identity: &str) -> Option<EntityMut<'_>> {
        let slot = &mut self.0;
        let child = slot
            .entity
            .owned
            .get_mut(&slot.property)?
            .children
            .iter_mut()
            .find(|c| c.identity == *identity)?;
        Some(EntityMut {
            entity: child,
            scope: slot.scope.as_deref_mut(),
            document_rules: slot.document_rules,
        })
    }
}
