//! Object graph to triple stream.
//!
//! Entities are emitted depth first from each top-level entity, in identity
//! order. For every entity the writer emits its type arc, then the values
//! of each value slot, then for each non-empty owned slot an ownership
//! marker `(identity, rdf:type, property)` followed by one
//! `(identity, property, child)` triple per child and the child's own
//! subtree.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tgraph_rdf::{NTriplesWriter, RdfError, TripleBuffer, TripleSink};
use tgraph_types::{Triple, Value};
use tracing::info;

use super::Document;
use crate::entity::Entity;
use crate::error::{DocumentError, DocumentResult};
use crate::report::WriteReport;

impl Document {
    /// Write every entity and declared prefix to `sink`.
    ///
    /// With [`validate_on_write`](crate::DocumentConfig::validate_on_write)
    /// set, an invalid document is refused with [`DocumentError::Invalid`]
    /// before anything reaches the sink.
    pub fn write_to<S>(&self, sink: &mut S) -> DocumentResult<WriteReport>
    where
        S: TripleSink + ?Sized,
    {
        self.ensure_usable()?;
        if self.config.validate_on_write {
            let validation = self.validate()?;
            if !validation.is_valid() {
                return Err(DocumentError::Invalid {
                    violations: validation.violations.len(),
                });
            }
        }

        for (prefix, namespace) in self.scope.namespaces() {
            sink.prefix(prefix, namespace)?;
        }
        let mut report = WriteReport::default();
        for root in self.store.values() {
            emit(root, sink, &mut report)?;
        }
        sink.finish()?;

        info!(triples = report.triples, entities = report.entities, "document written");
        Ok(report)
    }

    /// Write the document to an N-Triples file, replacing it.
    pub fn write(&self, path: impl AsRef<Path>) -> DocumentResult<WriteReport> {
        let file = File::create(path.as_ref()).map_err(RdfError::Io)?;
        let mut writer = NTriplesWriter::new(BufWriter::new(file));
        self.write_to(&mut writer)
    }

    /// Write the document into a fresh in-memory buffer.
    pub fn to_buffer(&self) -> DocumentResult<TripleBuffer> {
        let mut buffer = TripleBuffer::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }
}

fn emit<S>(entity: &Entity, sink: &mut S, report: &mut WriteReport) -> DocumentResult<()>
where
    S: TripleSink + ?Sized,
{
    let identity = entity.identity();
    put(sink, report, &Triple::type_arc(identity, entity.type_tag()))?;
    report.entities += 1;

    for (property, slot) in entity.value_slots() {
        for value in &slot.values {
            put(sink, report, &Triple::new(identity, property, value.clone()))?;
        }
    }

    for (property, slot) in entity.owned_slots() {
        if slot.children.is_empty() {
            continue;
        }
        put(sink, report, &Triple::type_arc(identity, property))?;
        for child in &slot.children {
            put(
                sink,
                report,
                &Triple::new(identity, property, Value::Uri(child.identity().clone())),
            )?;
            emit(child, sink, report)?;
        }
    }
    Ok(())
}

fn put<S>(sink: &mut S, report: &mut WriteReport, triple: &Triple) -> DocumentResult<()>
where
    S: TripleSink + ?Sized,
{
    sink.triple(triple)?;
    report.triples += 1;
    Ok(())
}
