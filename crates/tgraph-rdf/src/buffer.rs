use tgraph_types::Triple;

use crate::error::{RdfError, RdfResult};
use crate::traits::{Statement, TripleSink, TripleSource};

/// In-memory statement buffer.
///
/// Collects triples written by the engine and replays them as a source, which
/// makes it the natural fixture for round-trip tests and for embedding
/// callers that bring their own parser.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TripleBuffer {
    prefixes: Vec<(String, String)>,
    triples: Vec<Triple>,
}

impl TripleBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a triple.
    pub fn push(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    /// Declare a prefix. Later declarations of the same prefix replace
    /// earlier ones.
    pub fn declare(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.prefixes.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = namespace,
            None => self.prefixes.push((prefix, namespace)),
        }
    }

    /// All triples in insertion order.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Mutable access to the triples, e.g. to reorder them in tests.
    pub fn triples_mut(&mut self) -> &mut Vec<Triple> {
        &mut self.triples
    }

    /// Declared prefixes in declaration order.
    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    /// Number of triples held.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns `true` if no triples are held.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Consume the buffer and return its triples.
    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }
}

impl From<Vec<Triple>> for TripleBuffer {
    fn from(triples: Vec<Triple>) -> Self {
        Self {
            prefixes: Vec::new(),
            triples,
        }
    }
}

impl FromIterator<Triple> for TripleBuffer {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl TripleSource for TripleBuffer {
    fn pass(&mut self) -> RdfResult<Box<dyn Iterator<Item = RdfResult<Statement>> + '_>> {
        let prefixes = self.prefixes.iter().map(|(prefix, namespace)| {
            Ok(Statement::Prefix {
                prefix: prefix.clone(),
                namespace: namespace.clone(),
            })
        });
        let triples = self
            .triples
            .iter()
            .map(|triple| Ok(Statement::Triple(triple.clone())));
        Ok(Box::new(prefixes.chain(triples)))
    }
}

impl TripleSink for TripleBuffer {
    fn prefix(&mut self, prefix: &str, namespace: &str) -> RdfResult<()> {
        if !self.triples.is_empty() {
            return Err(RdfError::LatePrefix {
                prefix: prefix.to_string(),
            });
        }
        self.declare(prefix, namespace);
        Ok(())
    }

    fn triple(&mut self, triple: &Triple) -> RdfResult<()> {
        self.triples.push(triple.clone());
        Ok(())
    }
}
