use serde::Serialize;
use tgraph_types::Uri;

/// Counts gathered by `Document::read_from`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReadReport {
    /// Entities constructed from type arcs.
    pub constructed: usize,
    /// Entities left at the top level after relocation.
    pub top_level: usize,
    /// Ownership edges applied.
    pub relocated: usize,
    /// Values stored into scalar, list, and reference slots.
    pub assigned: usize,
    /// Property triples whose subject was never constructed.
    pub dropped_dangling: usize,
    /// Property triples whose predicate the subject does not declare.
    pub dropped_undeclared: usize,
    /// Subjects dropped because none of their types is registered.
    pub skipped_unknown_types: usize,
}

/// Counts gathered by `Document::write_to`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub triples: usize,
    pub entities: usize,
}

/// Result of `Document::validate`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub entities_checked: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// One failed check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub identity: Uri,
    /// The slot checked, or `None` for document-wide rules.
    pub property: Option<Uri>,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "rule", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A slot or document rule rejected a stored value or entity.
    Rule(String),
    /// A referenced-object slot points at a missing identity.
    DanglingReference,
}
