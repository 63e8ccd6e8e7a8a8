use tgraph_types::Triple;

use crate::error::RdfResult;

/// One item of a parsed triple stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// A namespace prefix declaration.
    Prefix { prefix: String, namespace: String },
    /// A subject/predicate/object triple.
    Triple(Triple),
}

/// A replayable stream of statements in file order.
///
/// Every call to [`pass`](TripleSource::pass) starts again from the first
/// statement. The document reader calls it exactly twice.
pub trait TripleSource {
    /// Begin a new pass over the stream.
    fn pass(&mut self) -> RdfResult<Box<dyn Iterator<Item = RdfResult<Statement>> + '_>>;
}

/// Consumer of emitted triples.
///
/// Implementations group or abbreviate triples however their target format
/// requires. Prefixes are always declared before the first triple.
pub trait TripleSink {
    /// Declare a namespace prefix.
    fn prefix(&mut self, prefix: &str, namespace: &str) -> RdfResult<()>;

    /// Accept one triple.
    fn triple(&mut self, triple: &Triple) -> RdfResult<()>;

    /// Flush any buffered output. Called once after the last triple.
    fn finish(&mut self) -> RdfResult<()> {
        Ok(())
    }
}
