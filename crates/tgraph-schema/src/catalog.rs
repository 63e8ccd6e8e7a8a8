//! Constructors for the built-in entity types.
//!
//! Each constructor returns a default-initialized entity with every slot of
//! its type declared. Identities are assigned by the caller (or by the
//! reader, from the triple subject).

use tgraph_core::{
    DateTimeFormat, DisplayIdSyntax, Entity, FnRule, Mutation, RegistryResult, RuleContext, TypeRegistry,
    TypeRegistryBuilder, ValidationError, ValidationRule, Verdict,
};
use tgraph_types::{vocab as xsd, ValueKind};

use crate::correlation::StructureFunctionCorrelation;
use crate::vocab::*;

/// Slots shared by every identified type.
fn identified(type_uri: &str) -> Entity {
    Entity::new(type_uri)
        .scalar(PERSISTENT_IDENTITY, ValueKind::Uri)
        .scalar(DISPLAY_ID, ValueKind::Literal)
        .rule(DISPLAY_ID, DisplayIdSyntax)
        .scalar(VERSION, ValueKind::Literal)
        .list(WAS_DERIVED_FROM, ValueKind::Uri)
        .scalar(TITLE, ValueKind::Literal)
        .scalar(DESCRIPTION, ValueKind::Literal)
}

/// Rejects adopting a second, different child into the slot.
fn single_child() -> impl ValidationRule {
    FnRule::new("single-child", |ctx: &RuleContext<'_>, mutation: &Mutation<'_>| {
        let (Some(owner), Mutation::Adopt { property, child }) = (ctx.owner, *mutation) else {
            return Ok(Verdict::Pass);
        };
        match owner.children(property).iter().find(|c| c.identity() != child.identity()) {
            Some(existing) => Err(ValidationError::rejected(
                "single-child",
                format!("{property} of {} already holds {}", owner.identity(), existing.identity()),
            )),
            None => Ok(Verdict::Pass),
        }
    })
}

pub fn component_definition() -> Entity {
    identified(COMPONENT_DEFINITION)
        .list(TYPE, ValueKind::Uri)
        .list(ROLE, ValueKind::Uri)
        .list(SEQUENCE_PROPERTY, ValueKind::Uri)
        .owned(COMPONENT_PROPERTY, COMPONENT)
        .owned(SEQUENCE_ANNOTATION_PROPERTY, SEQUENCE_ANNOTATION)
        .owned(SEQUENCE_CONSTRAINT_PROPERTY, SEQUENCE_CONSTRAINT)
}

pub fn component() -> Entity {
    identified(COMPONENT)
        .reference(DEFINITION)
        .scalar(ACCESS, ValueKind::Uri)
}

pub fn sequence_annotation() -> Entity {
    identified(SEQUENCE_ANNOTATION).list(ROLE, ValueKind::Uri)
}

pub fn sequence_constraint() -> Entity {
    identified(SEQUENCE_CONSTRAINT)
        .reference(SUBJECT)
        .reference(OBJECT)
        .scalar(RESTRICTION, ValueKind::Uri)
}

pub fn module_definition() -> Entity {
    identified(MODULE_DEFINITION)
        .list(ROLE, ValueKind::Uri)
        .owned(FUNCTIONAL_COMPONENT_PROPERTY, FUNCTIONAL_COMPONENT)
}

pub fn functional_component() -> Entity {
    identified(FUNCTIONAL_COMPONENT)
        .reference(DEFINITION)
        .scalar(ACCESS, ValueKind::Uri)
        .scalar(DIRECTION, ValueKind::Uri)
}

pub fn sequence() -> Entity {
    identified(SEQUENCE)
        .scalar(ELEMENTS, ValueKind::Literal)
        .scalar(ENCODING, ValueKind::Uri)
}

pub fn attachment() -> Entity {
    identified(ATTACHMENT)
        .scalar(SOURCE, ValueKind::Uri)
        .scalar(FORMAT, ValueKind::Uri)
        .scalar(SIZE, ValueKind::typed(xsd::XSD_LONG))
        .scalar(HASH, ValueKind::Literal)
}

pub fn activity() -> Entity {
    identified(ACTIVITY)
        .scalar(STARTED_AT_TIME, ValueKind::typed(xsd::XSD_DATE_TIME))
        .rule(STARTED_AT_TIME, DateTimeFormat)
        .scalar(ENDED_AT_TIME, ValueKind::typed(xsd::XSD_DATE_TIME))
        .rule(ENDED_AT_TIME, DateTimeFormat)
}

/// A composite design pairing one structural `ComponentDefinition` with one
/// functional `ModuleDefinition`.
pub fn design() -> Entity {
    identified(DESIGN)
        .owned(STRUCTURE, COMPONENT_DEFINITION)
        .rule(STRUCTURE, single_child())
        .rule(STRUCTURE, StructureFunctionCorrelation)
        .owned(FUNCTION, MODULE_DEFINITION)
        .rule(FUNCTION, single_child())
        .rule(FUNCTION, StructureFunctionCorrelation)
}

/// Register every built-in type with `builder`.
pub fn register_builtin(builder: &mut TypeRegistryBuilder) -> RegistryResult<()> {
    builder
        .register(COMPONENT_DEFINITION, component_definition)?
        .register(COMPONENT, component)?
        .register(SEQUENCE_ANNOTATION, sequence_annotation)?
        .register(SEQUENCE_CONSTRAINT, sequence_constraint)?
        .register(MODULE_DEFINITION, module_definition)?
        .register(FUNCTIONAL_COMPONENT, functional_component)?
        .register(SEQUENCE, sequence)?
        .register(ATTACHMENT, attachment)?
        .register(ACTIVITY, activity)?
        .register(DESIGN, design)?;
    Ok(())
}

/// A registry holding exactly the built-in types.
pub fn sbol_registry() -> RegistryResult<TypeRegistry> {
    let mut builder = TypeRegistry::builder();
    register_builtin(&mut builder)?;
    Ok(builder.build())
}
