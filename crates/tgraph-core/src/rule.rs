use std::fmt;
use std::sync::Arc;

use tgraph_types::{Uri, Value};
use tracing::debug;

use crate::entity::Entity;
use crate::error::ValidationError;
use crate::scope::DocumentScope;

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

/// The change a rule is asked to approve.
///
/// Rules run before the change is applied, so the owner seen in the
/// [`RuleContext`] is still in its previous state.
#[derive(Clone, Copy, Debug)]
pub enum Mutation<'a> {
    /// A scalar or referenced-object slot is being overwritten.
    Set { property: &'a Uri, value: &'a Value },
    /// A value is being appended to a list slot.
    Add { property: &'a Uri, value: &'a Value },
    /// A child is being adopted into an owned-object slot.
    Adopt { property: &'a Uri, child: &'a Entity },
    /// An entity is being inserted at the top level of a document.
    Insert { entity: &'a Entity },
    /// An existing entity is being re-checked by `Document::validate`.
    Audit { entity: &'a Entity },
}

impl<'a> Mutation<'a> {
    /// The value being written, for `Set` and `Add`.
    pub fn value(&self) -> Option<&'a Value> {
        match *self {
            Self::Set { value, .. } | Self::Add { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The entity entering the document, for `Adopt` and `Insert`.
    pub fn incoming(&self) -> Option<&'a Entity> {
        match *self {
            Self::Adopt { child, .. } => Some(child),
            Self::Insert { entity } => Some(entity),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// A follow-up change a rule asks the engine to make once the triggering
/// mutation has been applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Amendment {
    /// Adopt `child` into the owned slot `property` of `parent`, which must
    /// be the mutated entity or one of its descendants.
    AdoptChild {
        parent: Uri,
        property: Uri,
        child: Entity,
    },
}

/// The outcome of a rule check that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// The mutation may proceed unchanged.
    Pass,
    /// The mutation may proceed, followed by the listed amendments.
    Amend(Vec<Amendment>),
}

impl Verdict {
    /// Returns `true` if the verdict is `Pass`.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ---------------------------------------------------------------------------
// RuleContext
// ---------------------------------------------------------------------------

/// What a rule can see besides the mutation itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleContext<'a> {
    /// The entity whose slot is being mutated. `None` for document rules.
    pub owner: Option<&'a Entity>,
    /// The enclosing document, if the owner is attached to one.
    pub scope: Option<&'a DocumentScope>,
}

// ---------------------------------------------------------------------------
// ValidationRule trait
// ---------------------------------------------------------------------------

/// A named check bound to mutation events.
///
/// Rules are attached to individual slots when an entity variant is declared,
/// or to a document for document-wide checks such as identity uniqueness.
/// The trait is object-safe and `Send + Sync` so rules can be shared between
/// the entities built by one constructor.
pub trait ValidationRule: Send + Sync {
    /// Human-readable name of this rule (e.g., "display-id-syntax").
    fn name(&self) -> &str;

    /// Approve, amend, or reject the mutation.
    fn check(&self, ctx: &RuleContext<'_>, mutation: &Mutation<'_>) -> Result<Verdict, ValidationError>;
}

/// A rule backed by a closure.
pub struct FnRule<F> {
    name: String,
    check: F,
}

impl<F> FnRule<F>
where
    F: Fn(&RuleContext<'_>, &Mutation<'_>) -> Result<Verdict, ValidationError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> ValidationRule for FnRule<F>
where
    F: Fn(&RuleContext<'_>, &Mutation<'_>) -> Result<Verdict, ValidationError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, ctx: &RuleContext<'_>, mutation: &Mutation<'_>) -> Result<Verdict, ValidationError> {
        (self.check)(ctx, mutation)
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// An ordered collection of rules, evaluated fail-fast.
///
/// Cloning a `RuleSet` shares the rules rather than copying them.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Rules run in registration order.
    pub fn register(&mut self, rule: impl ValidationRule + 'static) {
        self.rules.push(Arc::new(rule));
    }

    /// Append an already shared rule.
    pub fn register_shared(&mut self, rule: Arc<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Look up a rule by name.
    pub fn get(&self, name: &str) -> Option<&dyn ValidationRule> {
        self.rules.iter().find(|r| r.name() == name).map(|r| &**r)
    }

    /// Names of all rules, in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ValidationRule> {
        self.rules.iter().map(|r| &**r)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule, stopping at the first error. Amendments from all
    /// passing rules are returned in rule order.
    pub fn check(&self, ctx: &RuleContext<'_>, mutation: &Mutation<'_>) -> Result<Vec<Amendment>, ValidationError> {
        let mut amendments = Vec::new();
        for rule in &self.rules {
            match rule.check(ctx, mutation)? {
                Verdict::Pass => {}
                Verdict::Amend(mut more) => {
                    debug!(rule = rule.name(), count = more.len(), "rule requested amendments");
                    amendments.append(&mut more);
                }
            }
        }
        Ok(amendments)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
