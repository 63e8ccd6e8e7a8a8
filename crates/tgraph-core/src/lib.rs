//! Typed object-graph engine for tgraph.
//!
//! A [`Document`] holds a forest of typed [`Entity`] trees and maps them to
//! and from a flat triple stream. Entities declare their slots up front:
//! scalar and list slots hold values, referenced-object slots hold the
//! identity of another entity, and owned-object slots hold child entities by
//! value. Every mutation goes through a typed accessor on [`EntityMut`],
//! which runs the slot's [`ValidationRule`]s and the document's rules before
//! anything changes.
//!
//! # Quick Start
//!
//! ```rust
//! use tgraph_core::{DisplayIdSyntax, Document, Entity, TypeRegistry};
//! use tgraph_types::ValueKind;
//!
//! const PART: &str = "http://example.com/Part";
//! const NAME: &str = "http://example.com/name";
//!
//! let mut builder = TypeRegistry::builder();
//! builder
//!     .register(PART, || {
//!         Entity::new(PART)
//!             .scalar(NAME, ValueKind::Literal)
//!             .rule(NAME, DisplayIdSyntax)
//!     })
//!     .unwrap();
//! let registry = builder.build();
//!
//! let mut doc = Document::new();
//! let mut part = doc.create(&registry, PART, "http://example.com/p1").unwrap();
//! part.scalar(NAME).unwrap().set("p1").unwrap();
//! assert!(part.scalar(NAME).unwrap().set("not valid").is_err());
//!
//! let triples = doc.to_buffer().unwrap();
//! assert_eq!(triples.len(), 2);
//! ```

pub mod config;
pub mod document;
pub mod entity;
pub mod error;
pub mod property;
pub mod registry;
pub mod report;
pub mod rule;
pub mod rules;
pub mod scope;

// Re-exports for convenience.
pub use config::{DocumentConfig, UnknownTypePolicy};
pub use document::Document;
pub use entity::{Entity, SlotKind, Walk};
pub use error::{
    DocumentError, DocumentResult, PropertyError, PropertyResult, RegistryError, RegistryResult,
    ValidationError,
};
pub use property::{EntityMut, ListProperty, OwnedProperty, ReferenceProperty, ScalarProperty};
pub use registry::{TypeRegistry, TypeRegistryBuilder};
pub use report::{ReadReport, ValidationReport, Violation, ViolationKind, WriteReport};
pub use rule::{Amendment, FnRule, Mutation, RuleContext, RuleSet, ValidationRule, Verdict};
pub use rules::{DateTimeFormat, DisplayIdSyntax, RequiredNamespace, UniqueIdentity};
pub use scope::DocumentScope;
