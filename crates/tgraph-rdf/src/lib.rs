//! Triple-stream boundary for tgraph.
//!
//! The object-graph engine never parses or prints markup itself. It pulls
//! [`Statement`]s from a [`TripleSource`] (once per construction pass) and
//! pushes triples into a [`TripleSink`]. This crate defines both seams and
//! ships two implementations:
//!
//! - [`TripleBuffer`] -- in-memory statements, usable as source and sink
//! - [`NTriplesFile`] / [`NTriplesText`] / [`NTriplesWriter`] -- line-based
//!   N-Triples, extended with Turtle `@prefix` directives so namespace
//!   declarations survive a round trip
//!
//! # Design Rules
//!
//! 1. A source can be replayed from the start any number of times.
//! 2. Prefix declarations reach a sink before its first triple.
//! 3. Syntax errors carry the 1-based line number.

pub mod buffer;
pub mod error;
pub mod ntriples;
pub mod traits;

pub use buffer::TripleBuffer;
pub use error::{RdfError, RdfResult};
pub use ntriples::{NTriplesFile, NTriplesReader, NTriplesText, NTriplesWriter};
pub use traits::{Statement, TripleSink, TripleSource};
