//! Built-in SBOL entity catalog for tgraph.
//!
//! The engine in `tgraph-core` knows nothing about any particular schema.
//! This crate registers the SBOL 2 core types it is usually driven with
//! (component and module definitions and their owned children, sequences,
//! attachments and provenance activities) plus the `Design` extension,
//! which pairs a structural and a functional view and keeps them linked
//! through [`StructureFunctionCorrelation`].
//!
//! # Quick Start
//!
//! ```rust
//! use tgraph_schema::{sbol_document, sbol_registry, vocab};
//!
//! let registry = sbol_registry().unwrap();
//! let mut doc = sbol_document();
//! let mut cd = doc
//!     .create(&registry, vocab::COMPONENT_DEFINITION, "http://example.com/pLac")
//!     .unwrap();
//! cd.scalar(vocab::DISPLAY_ID).unwrap().set("pLac").unwrap();
//! assert!(cd.scalar(vocab::DISPLAY_ID).unwrap().set("1bad").is_err());
//! ```

pub mod catalog;
pub mod correlation;
pub mod vocab;

use tgraph_core::{Document, DocumentConfig, RequiredNamespace};

// Re-exports for convenience.
pub use catalog::{register_builtin, sbol_registry};
pub use correlation::StructureFunctionCorrelation;

/// Document configuration declaring the `sbol`, `dcterms`, `prov`, `rdf`
/// and `sysbio` prefixes.
pub fn sbol_config() -> DocumentConfig {
    DocumentConfig::default()
        .with_namespace("sbol", vocab::SBOL_NS)
        .with_namespace("dcterms", vocab::DCTERMS_NS)
        .with_namespace("prov", vocab::PROV_NS)
        .with_namespace("rdf", tgraph_types::vocab::RDF_NS)
        .with_namespace("sysbio", vocab::SYSBIO_NS)
}

/// An empty document with [`sbol_config`] that requires the SBOL namespace
/// to stay declared for SBOL entities to be valid.
pub fn sbol_document() -> Document {
    sbol_document_with(sbol_config())
}

/// Like [`sbol_document`], with a caller-supplied configuration.
pub fn sbol_document_with(config: DocumentConfig) -> Document {
    let mut doc = Document::with_config(config);
    doc.add_rule(RequiredNamespace::new(vocab::SBOL_NS));
    doc
}
