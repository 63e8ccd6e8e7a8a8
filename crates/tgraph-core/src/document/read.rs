//! Triple stream to object graph.
//!
//! Two passes over a restartable [`TripleSource`]:
//!
//! 1. **Construction.** Every `rdf:type` arc whose object is a registered
//!    type constructs an entity for its subject (first arc wins, repeats are
//!    ignored). Arcs whose object is a registered owned-property URI are
//!    ownership markers written by the writer and are skipped. A subject
//!    with nothing but markers falls under the unknown-type policy.
//! 2. **Assignment.** Every other triple is classified against its
//!    subject's declared slots. Value slots receive the object, coerced to
//!    the slot's declared kind. Owned slots record an ownership edge.
//!
//! Ownership edges are applied only after the second pass, by assembling
//! each tree from the entities nobody owns. Property triples therefore reach
//! owned entities regardless of where their ownership triple sits in the
//! stream, and any entity left over after assembly sits on a cycle.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tgraph_rdf::{NTriplesFile, Statement, TripleSource};
use tgraph_types::{Triple, Uri, Value};
use tracing::{debug, info, warn};

use super::Document;
use crate::config::UnknownTypePolicy;
use crate::entity::{Entity, SlotKind};
use crate::error::{DocumentError, DocumentResult, PropertyError};
use crate::registry::TypeRegistry;
use crate::report::ReadReport;

impl Document {
    /// Replace the document's contents with the graph in `source`.
    ///
    /// On failure the document is emptied and poisoned: every further
    /// operation except [`clear`](Self::clear) and another read returns
    /// [`DocumentError::Poisoned`].
    pub fn read_from<S>(&mut self, source: &mut S, registry: &TypeRegistry) -> DocumentResult<ReadReport>
    where
        S: TripleSource + ?Sized,
    {
        self.clear();
        match load(source, registry, self.config.unknown_types) {
            Ok(loaded) => {
                for (prefix, namespace) in loaded.prefixes {
                    self.scope.declare(prefix, namespace);
                }
                for root in loaded.roots.values() {
                    self.scope.insert_tree(root);
                }
                self.store = loaded.roots;
                let report = loaded.report;
                if report.dropped_dangling + report.dropped_undeclared > 0 {
                    warn!(
                        dangling = report.dropped_dangling,
                        undeclared = report.dropped_undeclared,
                        "triples dropped during read"
                    );
                }
                info!(
                    constructed = report.constructed,
                    top_level = report.top_level,
                    relocated = report.relocated,
                    assigned = report.assigned,
                    "document read"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "read failed, document poisoned");
                self.poisoned = true;
                Err(e)
            }
        }
    }

    /// Read an N-Triples file, opening it once per pass.
    pub fn read(&mut self, path: impl AsRef<Path>, registry: &TypeRegistry) -> DocumentResult<ReadReport> {
        let mut source = NTriplesFile::new(path);
        self.read_from(&mut source, registry)
    }
}

struct Loaded {
    prefixes: Vec<(String, String)>,
    roots: BTreeMap<Uri, Entity>,
    report: ReadReport,
}

/// Child identity -> (owner identity, property).
type Owners = BTreeMap<Uri, (Uri, Uri)>;

/// Owner identity -> (property, child identity), in stream order.
type Edges = BTreeMap<Uri, Vec<(Uri, Uri)>>;

fn load<S>(source: &mut S, registry: &TypeRegistry, policy: UnknownTypePolicy) -> DocumentResult<Loaded>
where
    S: TripleSource + ?Sized,
{
    let mut report = ReadReport::default();
    let mut prefixes = Vec::new();
    let mut constructed = BTreeMap::new();

    // Pass 1: construction.
    let mut unknown: BTreeMap<Uri, Uri> = BTreeMap::new();
    for statement in source.pass()? {
        match statement? {
            Statement::Prefix { prefix, namespace } => prefixes.push((prefix, namespace)),
            Statement::Triple(triple) => construct(triple, registry, &mut constructed, &mut unknown)?,
        }
    }

    let mut skipped = BTreeSet::new();
    for (subject, type_uri) in unknown {
        if constructed.contains_key(&subject) {
            continue;
        }
        match policy {
            UnknownTypePolicy::Reject => return Err(DocumentError::UnknownType { subject, type_uri }),
            UnknownTypePolicy::Skip => {
                warn!(%subject, %type_uri, "skipping subject of unregistered type");
                skipped.insert(subject);
            }
        }
    }
    report.skipped_unknown_types = skipped.len();
    report.constructed = constructed.len();

    // Pass 2: assignment.
    let mut owners = Owners::new();
    let mut edges = Edges::new();
    for statement in source.pass()? {
        let Statement::Triple(triple) = statement? else {
            continue;
        };
        if triple.is_type_arc() {
            continue;
        }
        assign(triple, &mut constructed, &mut owners, &mut edges, &mut report)?;
    }

    // Relocation.
    report.relocated = owners.len();
    let root_ids: Vec<Uri> = constructed
        .keys()
        .filter(|identity| !owners.contains_key(*identity))
        .cloned()
        .collect();
    let mut roots = BTreeMap::new();
    for identity in root_ids {
        let root = assemble(&identity, &mut constructed, &edges)?;
        roots.insert(identity, root);
    }
    if !constructed.is_empty() {
        return Err(DocumentError::OwnershipCycle {
            identities: constructed.into_keys().collect(),
        });
    }
    report.top_level = roots.len();

    Ok(Loaded {
        prefixes,
        roots,
        report,
    })
}

fn construct(
    triple: Triple,
    registry: &TypeRegistry,
    constructed: &mut BTreeMap<Uri, Entity>,
    unknown: &mut BTreeMap<Uri, Uri>,
) -> DocumentResult<()> {
    if !triple.is_type_arc() {
        return Ok(());
    }
    let Value::Uri(type_uri) = triple.object else {
        return Ok(());
    };
    if registry.contains(&type_uri) {
        if constructed.contains_key(&triple.subject) {
            debug!(subject = %triple.subject, %type_uri, "subject already constructed");
            return Ok(());
        }
        let mut entity = registry.create(&type_uri)?;
        entity.set_identity(triple.subject.clone());
        debug!(subject = %triple.subject, %type_uri, "constructed");
        constructed.insert(triple.subject, entity);
    } else {
        // Markers name no type; report one only when no unregistered type
        // arc exists for the subject.
        let marker = registry.is_owned_property(&type_uri);
        match unknown.entry(triple.subject) {
            Entry::Vacant(slot) => {
                slot.insert(type_uri);
            }
            Entry::Occupied(mut slot) if !marker && registry.is_owned_property(slot.get()) => {
                slot.insert(type_uri);
            }
            Entry::Occupied(_) => {}
        }
    }
    Ok(())
}

fn assign(
    triple: Triple,
    constructed: &mut BTreeMap<Uri, Entity>,
    owners: &mut Owners,
    edges: &mut Edges,
    report: &mut ReadReport,
) -> DocumentResult<()> {
    let Triple {
        subject,
        predicate,
        object,
    } = triple;
    let Some(entity) = constructed.get(&subject) else {
        debug!(%subject, %predicate, "dropping triple for unconstructed subject");
        report.dropped_dangling += 1;
        return Ok(());
    };

    match entity.slot_kind(&predicate) {
        Some(SlotKind::Owned) => {
            let expected = entity.child_type(&predicate).cloned();
            let child = match object {
                Value::Uri(uri) => uri,
                other => Uri::from(other.lexical()),
            };
            let Some(child_entity) = constructed.get(&child) else {
                return Err(DocumentError::UnresolvedOwnedReference {
                    owner: subject,
                    property: predicate,
                    child,
                });
            };
            if let Some(expected) = expected.filter(|t| t != child_entity.type_tag()) {
                return Err(PropertyError::ChildTypeMismatch {
                    property: predicate,
                    expected,
                    actual: child_entity.type_tag().clone(),
                }
                .into());
            }
            match owners.get(&child) {
                Some((owner, property)) if *owner == subject && *property == predicate => {
                    debug!(%child, "repeated ownership triple");
                }
                Some((owner, _)) => {
                    return Err(DocumentError::MultipleOwners {
                        first: owner.clone(),
                        second: subject,
                        child,
                    });
                }
                None => {
                    owners.insert(child.clone(), (subject.clone(), predicate.clone()));
                    edges.entry(subject).or_default().push((predicate, child));
                }
            }
        }
        Some(_) => {
            if let Some(entity) = constructed.get_mut(&subject) {
                entity.assign(&predicate, object);
                report.assigned += 1;
            }
        }
        None => {
            debug!(%subject, %predicate, "dropping undeclared property");
            report.dropped_undeclared += 1;
        }
    }
    Ok(())
}

/// Move `identity` and, recursively, everything it owns out of `pool`.
fn assemble(identity: &Uri, pool: &mut BTreeMap<Uri, Entity>, edges: &Edges) -> DocumentResult<Entity> {
    let Some(mut entity) = pool.remove(identity) else {
        return Err(DocumentError::OwnershipCycle {
            identities: vec![identity.clone()],
        });
    };
    for (property, child) in edges.get(identity).into_iter().flatten() {
        let child = assemble(child, pool, edges)?;
        debug!(owner = %identity, %property, child = %child.identity(), "relocated");
        if let Some(slot) = entity.owned.get_mut(property) {
            slot.children.push(child);
        }
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::config::DocumentConfig;
    use proptest::prelude::*;
    use tgraph_rdf::TripleBuffer;

    fn ty(subject: &str, type_uri: &str) -> Triple {
        Triple::type_arc(subject, type_uri)
    }

    fn lit(subject: &str, predicate: &str, value: &str) -> Triple {
        Triple::new(subject, predicate, Value::literal(value))
    }

    fn link(subject: &str, predicate: &str, object: &str) -> Triple {
        Triple::new(subject, predicate, Value::uri(object))
    }

    fn read(triples: Vec<Triple>) -> (Document, DocumentResult<ReadReport>) {
        read_with(DocumentConfig::default(), triples)
    }

    fn read_with(config: DocumentConfig, triples: Vec<Triple>) -> (Document, DocumentResult<ReadReport>) {
        init_tracing();
        let mut doc = Document::with_config(config);
        let mut buffer = TripleBuffer::from(triples);
        let result = doc.read_from(&mut buffer, &registry());
        (doc, result)
    }

    // -----------------------------------------------------------------------
    // Construction and assignment
    // -----------------------------------------------------------------------

    #[test]
    fn scalar_property_is_assigned() {
        let (doc, result) = read(vec![ty("http://x/p", PART), lit("http://x/p", NAME, "myPart")]);
        let report = result.unwrap();
        assert_eq!(report.constructed, 1);
        assert_eq!(report.assigned, 1);
        let part = doc.get("http://x/p").unwrap();
        assert_eq!(part.get(NAME), Some(&Value::literal("myPart")));
    }

    #[test]
    fn owned_entity_is_relocated() {
        let (doc, result) = read(vec![
            ty("http://x/m", MODULE),
            ty("http://x/p", PART),
            link("http://x/m", HAS_PART, "http://x/p"),
        ]);
        let report = result.unwrap();
        assert_eq!(report.relocated, 1);
        assert_eq!(report.top_level, 1);
        assert!(doc.get("http://x/p").is_none());
        let module = doc.get("http://x/m").unwrap();
        assert_eq!(module.children(HAS_PART).len(), 1);
        assert_eq!(module.children(HAS_PART)[0].identity(), "http://x/p");
        assert!(doc.contains("http://x/p"));
    }

    #[test]
    fn owned_entity_keeps_properties_listed_after_its_ownership() {
        let (doc, result) = read(vec![
            ty("http://x/m", MODULE),
            ty("http://x/p", PART),
            link("http://x/m", HAS_PART, "http://x/p"),
            lit("http://x/p", NAME, "late"),
        ]);
        result.unwrap();
        let part = doc.find("http://x/p").unwrap();
        assert_eq!(part.get(NAME), Some(&Value::literal("late")));
    }

    #[test]
    fn list_order_follows_stream_order() {
        let (doc, result) = read(vec![
            ty("http://x/p", PART),
            link("http://x/p", ROLE, "http://roles/b"),
            link("http://x/p", ROLE, "http://roles/a"),
        ]);
        result.unwrap();
        let roles = doc.get("http://x/p").unwrap().values(ROLE);
        assert_eq!(roles, &[Value::uri("http://roles/b"), Value::uri("http://roles/a")]);
    }

    #[test]
    fn objects_are_coerced_to_declared_kind() {
        let (doc, result) = read(vec![
            ty("http://x/p", PART),
            lit("http://x/p", ROLE, "http://roles/a"),
            lit("http://x/p", LENGTH, "42"),
        ]);
        result.unwrap();
        let part = doc.get("http://x/p").unwrap();
        assert_eq!(part.values(ROLE), &[Value::uri("http://roles/a")]);
        assert_eq!(
            part.get(LENGTH),
            Some(&Value::typed("42", tgraph_types::vocab::XSD_LONG))
        );
    }

    #[test]
    fn repeated_type_arcs_and_ownership_are_idempotent() {
        let (doc, result) = read(vec![
            ty("http://x/m", MODULE),
            ty("http://x/m", MODULE),
            ty("http://x/p", PART),
            link("http://x/m", HAS_PART, "http://x/p"),
            link("http://x/m", HAS_PART, "http://x/p"),
        ]);
        let report = result.unwrap();
        assert_eq!(report.constructed, 2);
        assert_eq!(doc.get("http://x/m").unwrap().children(HAS_PART).len(), 1);
    }

    #[test]
    fn dangling_and_undeclared_triples_are_counted() {
        let (_, result) = read(vec![
            ty("http://x/p", PART),
            lit("http://x/ghost", NAME, "boo"),
            lit("http://x/p", "http://example.com/vocab#colour", "red"),
        ]);
        let report = result.unwrap();
        assert_eq!(report.dropped_dangling, 1);
        assert_eq!(report.dropped_undeclared, 1);
        assert_eq!(report.assigned, 0);
    }

    #[test]
    fn ownership_markers_are_not_types() {
        let (doc, result) = read(vec![
            ty("http://x/m", MODULE),
            ty("http://x/m", HAS_PART),
            ty("http://x/p", PART),
            link("http://x/m", HAS_PART, "http://x/p"),
        ]);
        assert_eq!(result.unwrap().skipped_unknown_types, 0);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn prefixes_become_namespaces() {
        init_tracing();
        let mut buffer = TripleBuffer::new();
        buffer.declare("ex", NS);
        buffer.push(ty("http://x/p", PART));
        let mut doc = Document::new();
        doc.read_from(&mut buffer, &registry()).unwrap();
        assert_eq!(doc.scope().namespace("ex"), Some(NS));
    }

    // -----------------------------------------------------------------------
    // Failures
    // -----------------------------------------------------------------------

    #[test]
    fn unresolved_owned_reference_fails_and_poisons() {
        let (mut doc, result) = read(vec![
            ty("http://x/m", MODULE),
            link("http://x/m", HAS_PART, "http://x/z"),
        ]);
        assert!(matches!(
            result,
            Err(DocumentError::UnresolvedOwnedReference { ref child, .. }) if child == "http://x/z"
        ));
        assert!(doc.is_poisoned());
        assert!(doc.is_empty());
        assert!(matches!(doc.add(part().with_identity("http://x/q")), Err(DocumentError::Poisoned)));
        assert!(matches!(doc.validate(), Err(DocumentError::Poisoned)));

        doc.clear();
        assert!(!doc.is_poisoned());
        doc.add(part().with_identity("http://x/q")).unwrap();
    }

    #[test]
    fn unknown_type_is_rejected_by_default() {
        let (doc, result) = read(vec![
            ty("http://x/p", PART),
            ty("http://x/u", "http://example.com/vocab#Unknown"),
            lit("http://x/u", NAME, "u"),
        ]);
        assert!(matches!(
            result,
            Err(DocumentError::UnknownType { ref subject, .. }) if subject == "http://x/u"
        ));
        assert!(doc.is_poisoned());
    }

    #[test]
    fn unknown_type_is_skipped_when_lenient() {
        let (doc, result) = read_with(
            DocumentConfig::lenient(),
            vec![
                ty("http://x/p", PART),
                ty("http://x/u", "http://example.com/vocab#Unknown"),
                lit("http://x/u", NAME, "u"),
            ],
        );
        let report = result.unwrap();
        assert_eq!(report.skipped_unknown_types, 1);
        assert_eq!(report.dropped_dangling, 1);
        assert_eq!(doc.len(), 1);
        assert!(!doc.contains("http://x/u"));
    }

    #[test]
    fn marker_only_subject_follows_unknown_type_policy() {
        let stream = || {
            vec![
                ty("http://x/p", PART),
                ty("http://x/ghost", HAS_PART),
                link("http://x/ghost", HAS_PART, "http://x/p"),
            ]
        };
        let (_, result) = read(stream());
        assert!(matches!(
            result,
            Err(DocumentError::UnknownType { ref subject, ref type_uri })
                if subject == "http://x/ghost" && type_uri == HAS_PART
        ));

        let (doc, result) = read_with(DocumentConfig::lenient(), stream());
        let report = result.unwrap();
        assert_eq!(report.skipped_unknown_types, 1);
        assert_eq!(report.dropped_dangling, 1);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn unregistered_type_is_reported_over_marker() {
        let (_, result) = read(vec![
            ty("http://x/u", HAS_PART),
            ty("http://x/u", "http://example.com/vocab#Unknown"),
        ]);
        assert!(matches!(
            result,
            Err(DocumentError::UnknownType { ref type_uri, .. })
                if type_uri == "http://example.com/vocab#Unknown"
        ));
    }

    #[test]
    fn extra_unknown_type_on_known_subject_is_tolerated() {
        let (doc, result) = read(vec![
            ty("http://x/p", "http://example.com/vocab#Unknown"),
            ty("http://x/p", PART),
        ]);
        assert_eq!(result.unwrap().constructed, 1);
        assert_eq!(doc.get("http://x/p").unwrap().type_tag(), PART);
    }

    #[test]
    fn two_owners_fail() {
        let (_, result) = read(vec![
            ty("http://x/m1", MODULE),
            ty("http://x/m2", MODULE),
            ty("http://x/p", PART),
            link("http://x/m1", HAS_PART, "http://x/p"),
            link("http://x/m2", HAS_PART, "http://x/p"),
        ]);
        assert!(matches!(result, Err(DocumentError::MultipleOwners { .. })));
    }

    #[test]
    fn owned_child_must_have_declared_type() {
        let (_, result) = read(vec![
            ty("http://x/m", MODULE),
            ty("http://x/n", MODULE),
            link("http://x/m", HAS_PART, "http://x/n"),
        ]);
        assert!(matches!(
            result,
            Err(DocumentError::Property(PropertyError::ChildTypeMismatch { .. }))
        ));
    }

    #[test]
    fn ownership_cycle_fails() {
        let (_, result) = read(vec![
            ty("http://x/a", MODULE),
            ty("http://x/b", MODULE),
            link("http://x/a", SUB_MODULE, "http://x/b"),
            link("http://x/b", SUB_MODULE, "http://x/a"),
        ]);
        match result {
            Err(DocumentError::OwnershipCycle { identities }) => {
                assert_eq!(identities, vec![Uri::from("http://x/a"), Uri::from("http://x/b")]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_ownership_is_a_cycle() {
        let (_, result) = read(vec![
            ty("http://x/a", MODULE),
            link("http://x/a", SUB_MODULE, "http://x/a"),
        ]);
        assert!(matches!(result, Err(DocumentError::OwnershipCycle { .. })));
    }

    #[test]
    fn syntax_errors_surface_from_the_source() {
        init_tracing();
        let mut source = tgraph_rdf::NTriplesText::new("<http://x/p> <http://p> oops .\n");
        let mut doc = Document::new();
        let err = doc.read_from(&mut source, &registry()).unwrap_err();
        assert!(matches!(err, DocumentError::Rdf(tgraph_rdf::RdfError::Syntax { line: 1, .. })));
    }

    #[test]
    fn read_replaces_previous_contents() {
        let registry = registry();
        let mut doc = Document::new();
        doc.create(&registry, PART, "http://x/old").unwrap();
        let mut buffer = TripleBuffer::from(vec![ty("http://x/new", PART)]);
        doc.read_from(&mut buffer, &registry).unwrap();
        assert!(!doc.contains("http://x/old"));
        assert!(doc.contains("http://x/new"));
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    fn part_stream(index: usize, roles: &[u8]) -> Vec<Triple> {
        let subject = format!("http://x/p{index}");
        let mut triples = vec![ty(&subject, PART)];
        triples.extend(roles.iter().map(|r| link(&subject, ROLE, &format!("http://roles/{r}"))));
        triples
    }

    proptest! {
        #[test]
        fn interleaving_subjects_does_not_matter(
            roles in prop::collection::vec(prop::collection::vec(0u8..4, 0..4), 1..5),
            permutation in Just((0..64).collect::<Vec<usize>>()).prop_shuffle(),
        ) {
            let streams: Vec<Vec<Triple>> = roles
                .iter()
                .enumerate()
                .map(|(i, r)| part_stream(i, r))
                .collect();
            let grouped: Vec<Triple> = streams.iter().flatten().cloned().collect();

            let slots: Vec<usize> = streams
                .iter()
                .enumerate()
                .flat_map(|(i, s)| std::iter::repeat(i).take(s.len()))
                .collect();
            let mut pending: Vec<std::vec::IntoIter<Triple>> =
                streams.into_iter().map(Vec::into_iter).collect();
            let interleaved: Vec<Triple> = permutation
                .iter()
                .filter(|&&k| k < slots.len())
                .filter_map(|&k| pending[slots[k]].next())
                .collect();
            prop_assert_eq!(interleaved.len(), grouped.len());

            let (a, ra) = read(grouped);
            let (b, rb) = read(interleaved);
            prop_assert_eq!(ra.unwrap(), rb.unwrap());
            prop_assert_eq!(a.top_level().collect::<Vec<_>>(), b.top_level().collect::<Vec<_>>());
        }
    }
}
