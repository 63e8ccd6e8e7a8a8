use std::fmt;

use tgraph_rdf::RdfError;
use tgraph_types::{TypeError, Uri, ValueKind};

use crate::entity::SlotKind;

/// Errors raised by validation rules at the point of mutation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The identity is already used by another entity in the document.
    #[error("identity {identity} already exists in the document")]
    DuplicateIdentity { identity: Uri },

    /// A display-style identifier is not alphanumeric/underscore or starts
    /// with a digit.
    #[error("invalid identifier {value:?}: use letters, digits and '_' and do not start with a digit")]
    InvalidIdentifierSyntax { value: String },

    /// A date-time value matches none of the accepted lexical forms.
    #[error("invalid date-time {value:?}: expected e.g. 2016-03-16T20:12:00Z")]
    InvalidDateTimeFormat { value: String },

    /// The document does not declare a namespace the entity's vocabulary
    /// requires.
    #[error("namespace {namespace} must be declared before {type_tag} entities are valid")]
    MissingNamespace { namespace: String, type_tag: Uri },

    /// A custom rule rejected the mutation.
    #[error("rule '{rule}' rejected the change: {reason}")]
    Rejected { rule: String, reason: String },
}

impl ValidationError {
    /// Create a rejection from a custom rule.
    pub fn rejected(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from the type registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No constructor is registered for the type URI.
    #[error("unknown type {type_uri}")]
    UnknownType { type_uri: Uri },

    /// A constructor is already registered for the type URI.
    #[error("type {type_uri} is already registered")]
    AlreadyRegistered { type_uri: Uri },

    /// The constructor produced an entity with a different type tag.
    #[error("constructor registered for {registered} produces {produced}")]
    TagMismatch { registered: Uri, produced: Uri },
}

/// Errors from property accessors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The entity does not declare a slot for the property.
    #[error("{type_tag} does not declare {property}")]
    Undeclared { type_tag: Uri, property: Uri },

    /// The slot exists but is of another kind.
    #[error("{property} is a {actual} slot, not a {expected} slot")]
    WrongSlotKind {
        property: Uri,
        expected: SlotKind,
        actual: SlotKind,
    },

    /// The value is encoded differently from the slot's declared kind.
    #[error("{property} holds {expected} values, got {actual}")]
    KindMismatch {
        property: Uri,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// A URI-kind value is empty or contains characters no IRI may hold.
    #[error("invalid URI for {property}: {source}")]
    InvalidUri { property: Uri, source: TypeError },

    /// The child's type does not match the owned slot's declared type.
    #[error("{property} owns {expected} entities, got {actual}")]
    ChildTypeMismatch {
        property: Uri,
        expected: Uri,
        actual: Uri,
    },

    /// The child is already owned somewhere in this entity's tree.
    #[error("{child} is already owned under {owner}")]
    DuplicateChild { owner: Uri, child: Uri },

    /// A child was offered without an identity.
    #[error("child entity of type {type_tag} has no identity")]
    MissingIdentity { type_tag: Uri },

    /// The owned slot has no direct child with this identity.
    #[error("{owner} owns no child {child}")]
    MissingChild { owner: Uri, child: Uri },

    /// An amendment named an entity outside the mutated entity's tree.
    #[error("amendment target {target} is not under {owner}")]
    AmendmentTarget { owner: Uri, target: Uri },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors from document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A subject's only type arcs name unregistered types.
    #[error("subject {subject} has unregistered type {type_uri}")]
    UnknownType { subject: Uri, type_uri: Uri },

    /// An owned-object triple names an entity that was never constructed.
    #[error("{owner} owns {child} under {property}, but {child} has no type arc")]
    UnresolvedOwnedReference {
        owner: Uri,
        property: Uri,
        child: Uri,
    },

    /// A referenced-object property points at an identity not in the
    /// document.
    #[error("{holder} references missing entity {target} via {property}")]
    DanglingReference {
        holder: Uri,
        property: Uri,
        target: Uri,
    },

    /// Entities own each other in a loop and no top-level root reaches them.
    #[error("ownership cycle among {}", CycleMembers(.identities))]
    OwnershipCycle { identities: Vec<Uri> },

    /// Two owners claim the same child.
    #[error("{child} is owned by both {first} and {second}")]
    MultipleOwners { child: Uri, first: Uri, second: Uri },

    /// No entity with the identity exists in the document.
    #[error("entity {identity} not found")]
    NotFound { identity: Uri },

    /// An entity was inserted without an identity.
    #[error("entity of type {type_tag} has no identity")]
    MissingIdentity { type_tag: Uri },

    /// Write-time validation found violations.
    #[error("document has {violations} validation violation(s)")]
    Invalid { violations: usize },

    /// A previous read failed; the document must be cleared or re-read.
    #[error("document is poisoned by a failed read")]
    Poisoned,

    #[error(transparent)]
    Rdf(#[from] RdfError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

struct CycleMembers<'a>(&'a [Uri]);

impl fmt::Display for CycleMembers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, identity) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{identity}")?;
        }
        Ok(())
    }
}

pub type PropertyResult<T> = Result<T, PropertyError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
pub type DocumentResult<T> = Result<T, DocumentError>;
