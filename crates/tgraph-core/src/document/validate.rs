//! Explicit whole-document validation.
//!
//! Mutations are checked as they happen, but a document read from triples
//! never ran its rules. [`Document::validate`] re-runs every check against
//! the stored state and collects the failures instead of stopping at the
//! first one.

use tgraph_types::Uri;
use tracing::{debug, info};

use super::Document;
use crate::entity::{Entity, SlotKind};
use crate::error::DocumentResult;
use crate::report::{ValidationReport, Violation, ViolationKind};
use crate::rule::{Mutation, RuleContext, RuleSet, Verdict};

impl Document {
    /// Check every entity against its slot rules and the document rules,
    /// and every referenced-object slot against the document's identities.
    ///
    /// Amendments requested by rules are not applied.
    pub fn validate(&self) -> DocumentResult<ValidationReport> {
        self.ensure_usable()?;
        let mut report = ValidationReport::default();
        for entity in self.entities() {
            self.audit(entity, &mut report);
            report.entities_checked += 1;
        }
        info!(
            entities = report.entities_checked,
            violations = report.violations.len(),
            "document validated"
        );
        Ok(report)
    }

    fn audit(&self, entity: &Entity, report: &mut ValidationReport) {
        let owned_ctx = RuleContext {
            owner: Some(entity),
            scope: Some(&self.scope),
        };

        for (property, slot) in entity.value_slots() {
            for value in &slot.values {
                let mutation = match slot.kind {
                    SlotKind::List => Mutation::Add { property, value },
                    _ => Mutation::Set { property, value },
                };
                run(&slot.rules, &owned_ctx, &mutation, entity, Some(property), report);

                if slot.kind == SlotKind::Reference {
                    let target = value.lexical();
                    if !self.scope.contains(target) {
                        report.violations.push(Violation {
                            identity: entity.identity().clone(),
                            property: Some(property.clone()),
                            kind: ViolationKind::DanglingReference,
                            description: format!("{target} is not in the document"),
                        });
                    }
                }
            }
        }

        for (property, slot) in entity.owned_slots() {
            for child in &slot.children {
                let mutation = Mutation::Adopt { property, child };
                run(&slot.rules, &owned_ctx, &mutation, entity, Some(property), report);
            }
        }

        let document_ctx = RuleContext {
            owner: None,
            scope: Some(&self.scope),
        };
        run(&self.rules, &document_ctx, &Mutation::Audit { entity }, entity, None, report);
    }
}

fn run(
    rules: &RuleSet,
    ctx: &RuleContext<'_>,
    mutation: &Mutation<'_>,
    entity: &Entity,
    property: Option<&Uri>,
    report: &mut ValidationReport,
) {
    for rule in rules.iter() {
        match rule.check(ctx, mutation) {
            Ok(Verdict::Pass) => {}
            Ok(Verdict::Amend(amendments)) => {
                debug!(
                    rule = rule.name(),
                    identity = %entity.identity(),
                    count = amendments.len(),
                    "amendments not applied during validation"
                );
            }
            Err(e) => report.violations.push(Violation {
                identity: entity.identity().clone(),
                property: property.cloned(),
                kind: ViolationKind::Rule(rule.name().to_string()),
                description: e.to_string(),
            }),
        }
    }
}
