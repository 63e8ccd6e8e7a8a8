//! Line-based N-Triples codec.
//!
//! One statement per line: `<s> <p> <o> .`, `<s> <p> "lit" .` or
//! `<s> <p> "lex"^^<dt> .`. Blank node labels (`_:b0`) are accepted wherever
//! an IRI is. Turtle `@prefix` (and SPARQL-style `PREFIX`) directives are
//! accepted on input and emitted on output; prefixed names are not expanded
//! inside statements, so every statement stays valid N-Triples.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tgraph_types::uri::is_blank_label_char;
use tgraph_types::{Triple, Uri, Value};
use tracing::debug;

use crate::error::{RdfError, RdfResult};
use crate::traits::{Statement, TripleSink, TripleSource};

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Streaming statement reader over any buffered input.
pub struct NTriplesReader<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl<R: BufRead> NTriplesReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for NTriplesReader<R> {
    type Item = RdfResult<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(RdfError::Io(e))),
            };
            self.line += 1;
            match parse_line(&text, self.line) {
                Ok(Some(statement)) => return Some(Ok(statement)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Parse a single line. Blank lines and comments yield `None`.
pub fn parse_line(text: &str, line: usize) -> RdfResult<Option<Statement>> {
    let mut cursor = Cursor { rest: text, line };
    cursor.skip_ws();
    match cursor.peek() {
        None | Some('#') => Ok(None),
        Some('@') => cursor.prefix_directive(true).map(Some),
        Some('P') | Some('p') if cursor.at_keyword() => cursor.prefix_directive(false).map(Some),
        Some(_) => {
            let subject = cursor.resource("subject")?;
            cursor.skip_ws();
            let predicate = Uri::from(cursor.iri()?);
            cursor.skip_ws();
            let object = cursor.object()?;
            cursor.end_of_statement(true)?;
            Ok(Some(Statement::Triple(Triple {
                subject,
                predicate,
                object,
            })))
        }
    }
}

struct Cursor<'a> {
    rest: &'a str,
    line: usize,
}

impl Cursor<'_> {
    fn error(&self, message: impl Into<String>) -> RdfError {
        RdfError::syntax(self.line, message)
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn expect(&mut self, expected: char) -> RdfResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of line"))),
        }
    }

    fn at_keyword(&self) -> bool {
        self.rest
            .get(..6)
            .is_some_and(|word| word.eq_ignore_ascii_case("prefix"))
    }

    fn prefix_directive(&mut self, turtle: bool) -> RdfResult<Statement> {
        if turtle {
            self.expect('@')?;
        }
        if !self.at_keyword() {
            return Err(self.error("only prefix directives are supported"));
        }
        self.rest = &self.rest[6..];
        self.skip_ws();
        let colon = self
            .rest
            .find(':')
            .ok_or_else(|| self.error("prefix name must end with ':'"))?;
        let prefix = self.rest[..colon].trim().to_string();
        if prefix.chars().any(|c| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '.')) {
            return Err(self.error(format!("invalid prefix name {prefix:?}")));
        }
        self.rest = &self.rest[colon + 1..];
        self.skip_ws();
        let namespace = self.iri()?;
        self.end_of_statement(turtle)?;
        Ok(Statement::Prefix { prefix, namespace })
    }

    /// An IRI or a blank node label.
    fn resource(&mut self, role: &str) -> RdfResult<Uri> {
        match self.peek() {
            Some('<') => Ok(Uri::from(self.iri()?)),
            Some('_') => Ok(Uri::from(self.blank()?)),
            Some(c) => Err(self.error(format!("{role} must be an IRI or blank node, found {c:?}"))),
            None => Err(self.error(format!("missing {role}"))),
        }
    }

    fn iri(&mut self) -> RdfResult<String> {
        self.expect('<')?;
        let mut iri = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some('\\') => match self.bump() {
                    Some('u') => iri.push(self.unicode(4)?),
                    Some('U') => iri.push(self.unicode(8)?),
                    _ => return Err(self.error("only \\u and \\U escapes are allowed in IRIs")),
                },
                Some(c) if c.is_whitespace() || c == '<' || c == '"' => {
                    return Err(self.error(format!("invalid character {c:?} in IRI")));
                }
                Some(c) => iri.push(c),
                None => return Err(self.error("unterminated IRI")),
            }
        }
        if iri.is_empty() {
            return Err(self.error("empty IRI"));
        }
        Ok(iri)
    }

    fn blank(&mut self) -> RdfResult<String> {
        self.expect('_')?;
        self.expect(':')?;
        let end = self
            .rest
            .find(|c: char| !is_blank_label_char(c))
            .unwrap_or(self.rest.len());
        if end == 0 {
            return Err(self.error("empty blank node label"));
        }
        let label = format!("_:{}", &self.rest[..end]);
        self.rest = &self.rest[end..];
        Ok(label)
    }

    fn object(&mut self) -> RdfResult<Value> {
        match self.peek() {
            Some('"') => self.literal(),
            _ => self.resource("object").map(Value::Uri),
        }
    }

    fn literal(&mut self) -> RdfResult<Value> {
        self.expect('"')?;
        let mut lexical = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => lexical.push(self.escape()?),
                Some(c) => lexical.push(c),
                None => return Err(self.error("unterminated literal")),
            }
        }
        if self.rest.starts_with("^^") {
            self.rest = &self.rest[2..];
            let datatype = self.iri()?;
            return Ok(Value::typed(lexical, datatype));
        }
        if self.peek() == Some('@') {
            self.bump();
            let end = self
                .rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(self.rest.len());
            if end == 0 {
                return Err(self.error("empty language tag"));
            }
            debug!(line = self.line, tag = &self.rest[..end], "dropping language tag");
            self.rest = &self.rest[end..];
        }
        Ok(Value::Literal(lexical))
    }

    fn escape(&mut self) -> RdfResult<char> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{8}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.unicode(4),
            Some('U') => self.unicode(8),
            Some(c) => Err(self.error(format!("invalid escape \\{c}"))),
            None => Err(self.error("dangling escape")),
        }
    }

    fn unicode(&mut self, digits: usize) -> RdfResult<char> {
        if self.rest.len() < digits || !self.rest.is_char_boundary(digits) {
            return Err(self.error("truncated unicode escape"));
        }
        let hex = &self.rest[..digits];
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| self.error(format!("invalid unicode escape {hex:?}")))?;
        let c = char::from_u32(code)
            .ok_or_else(|| self.error(format!("invalid code point U+{code:X}")))?;
        self.rest = &self.rest[digits..];
        Ok(c)
    }

    fn end_of_statement(&mut self, dot_required: bool) -> RdfResult<()> {
        self.skip_ws();
        if self.peek() == Some('.') {
            self.bump();
        } else if dot_required {
            return Err(self.error("statement must end with '.'"));
        }
        self.skip_ws();
        match self.peek() {
            None | Some('#') => Ok(()),
            Some(c) => Err(self.error(format!("unexpected {c:?} after statement"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// N-Triples file, reopened from the start on every pass.
#[derive(Clone, Debug)]
pub struct NTriplesFile {
    path: PathBuf,
}

impl NTriplesFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TripleSource for NTriplesFile {
    fn pass(&mut self) -> RdfResult<Box<dyn Iterator<Item = RdfResult<Statement>> + '_>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(NTriplesReader::new(BufReader::new(file))))
    }
}

/// N-Triples document held in memory.
#[derive(Clone, Debug, Default)]
pub struct NTriplesText {
    text: String,
}

impl NTriplesText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl TripleSource for NTriplesText {
    fn pass(&mut self) -> RdfResult<Box<dyn Iterator<Item = RdfResult<Statement>> + '_>> {
        Ok(Box::new(NTriplesReader::new(self.text.as_bytes())))
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Writes one statement per line.
pub struct NTriplesWriter<W: Write> {
    out: W,
    triples: usize,
}

impl<W: Write> NTriplesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, triples: 0 }
    }

    /// Number of triples written so far.
    pub fn triple_count(&self) -> usize {
        self.triples
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TripleSink for NTriplesWriter<W> {
    fn prefix(&mut self, prefix: &str, namespace: &str) -> RdfResult<()> {
        if self.triples > 0 {
            return Err(RdfError::LatePrefix {
                prefix: prefix.to_string(),
            });
        }
        writeln!(self.out, "@prefix {prefix}: <{}> .", escape_iri(namespace))?;
        Ok(())
    }

    fn triple(&mut self, triple: &Triple) -> RdfResult<()> {
        writeln!(
            self.out,
            "{} <{}> {} .",
            format_resource(&triple.subject),
            escape_iri(triple.predicate.as_str()),
            format_value(&triple.object)
        )?;
        self.triples += 1;
        Ok(())
    }

    fn finish(&mut self) -> RdfResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

fn format_resource(uri: &Uri) -> String {
    if uri.is_blank() {
        uri.to_string()
    } else {
        format!("<{}>", escape_iri(uri.as_str()))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Uri(uri) => format_resource(uri),
        Value::Literal(lexical) => format!("\"{}\"", escape_literal(lexical)),
        Value::Typed { lexical, datatype } => {
            format!("\"{}\"^^<{}>", escape_literal(lexical), escape_iri(datatype.as_str()))
        }
    }
}

fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for c in iri.chars() {
        if c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') {
            out.push_str(&format!("\\u{:04X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_literal(lexical: &str) -> String {
    let mut out = String::with_capacity(lexical.len());
    for c in lexical.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
