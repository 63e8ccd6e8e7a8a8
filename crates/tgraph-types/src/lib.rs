//! Foundation types for tgraph.
//!
//! This crate provides the identity, value, and statement types shared by the
//! triple codec and the object-graph engine. Every other tgraph crate depends
//! on `tgraph-types`.
//!
//! # Key Types
//!
//! - [`Uri`] -- Opaque URI string used for identities, type tags and predicates
//! - [`Value`] -- Tagged property value: URI reference, plain literal, or typed literal
//! - [`ValueKind`] -- The encoding a property slot is declared with
//! - [`Triple`] -- A subject/predicate/object statement
//! - [`vocab`] -- RDF and XML Schema vocabulary constants

pub mod error;
pub mod triple;
pub mod uri;
pub mod value;
pub mod vocab;

pub use error::TypeError;
pub use triple::Triple;
pub use uri::Uri;
pub use value::{Value, ValueKind};
