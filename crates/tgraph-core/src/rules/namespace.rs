use crate::error::ValidationError;
use crate::rule::{Mutation, RuleContext, ValidationRule, Verdict};

/// Entities whose type lives in `namespace` are only valid in a document
/// that declares a prefix for that namespace.
pub struct RequiredNamespace {
    namespace: String,
}

impl RequiredNamespace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl ValidationRule for RequiredNamespace {
    fn name(&self) -> &str {
        "required-namespace"
    }

    fn check(&self, ctx: &RuleContext<'_>, mutation: &Mutation<'_>) -> Result<Verdict, ValidationError> {
        let entity = match *mutation {
            Mutation::Insert { entity } | Mutation::Audit { entity } => entity,
            Mutation::Adopt { child, .. } => child,
            _ => return Ok(Verdict::Pass),
        };
        let Some(scope) = ctx.scope else {
            return Ok(Verdict::Pass);
        };
        if entity.type_tag().in_namespace(&self.namespace) && !scope.declares(&self.namespace) {
            return Err(ValidationError::MissingNamespace {
                namespace: self.namespace.clone(),
                type_tag: entity.type_tag().clone(),
            });
        }
        Ok(Verdict::Pass)
    }
}
