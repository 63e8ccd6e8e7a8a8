use crate::error::ValidationError;
use crate::rule::{Mutation, RuleContext, ValidationRule, Verdict};

/// Rejects entities whose identity, or any descendant's identity, is
/// already present in the document.
///
/// Entities outside a document have nothing to collide with and pass.
pub struct UniqueIdentity;

impl ValidationRule for UniqueIdentity {
    fn name(&self) -> &str {
        "unique-identity"
    }

    fn check(&self, ctx: &RuleContext<'_>, mutation: &Mutation<'_>) -> Result<Verdict, ValidationError> {
        let (Some(scope), Some(incoming)) = (ctx.scope, mutation.incoming()) else {
            return Ok(Verdict::Pass);
        };
        for entity in incoming.walk() {
            if scope.contains(entity.identity()) {
                return Err(ValidationError::DuplicateIdentity {
                    identity: entity.identity().clone(),
                });
            }
        }
        Ok(Verdict::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::scope::DocumentScope;

    fn scope_with(identity: &str) -> DocumentScope {
        let mut scope = DocumentScope::default();
        scope.insert_tree(&Entity::new("http://T").with_identity(identity));
        scope
    }

    #[test]
    fn new_identity_passes() {
        let scope = scope_with("http://a");
        let entity = Entity::new("http://T").with_identity("http://b");
        let ctx = RuleContext { owner: None, scope: Some(&scope) };
        let verdict = UniqueIdentity.check(&ctx, &Mutation::Insert { entity: &entity }).unwrap();
        assert!(verdict.is_pass());
    }

    #[test]
    fn existing_identity_fails() {
        let scope = scope_with("http://a");
        let entity = Entity::new("http://T").with_identity("http://a");
        let ctx = RuleContext { owner: None, scope: Some(&scope) };
        let err = UniqueIdentity.check(&ctx, &Mutation::Insert { entity: &entity }).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateIdentity { identity: "http://a".into() });
    }

    #[test]
    fn nested_collision_fails() {
        let scope = scope_with("http://a/child");
        let child = Entity::new("http://C").with_identity("http://a/child");
        let mut parent = Entity::new("http://T")
            .with_identity("http://a")
            .owned("http://owns", "http://C");
        parent.edit().owned("http://owns").unwrap().adopt(child).unwrap();
        let ctx = RuleContext { owner: None, scope: Some(&scope) };
        assert!(UniqueIdentity.check(&ctx, &Mutation::Insert { entity: &parent }).is_err());
    }

    #[test]
    fn detached_entities_pass() {
        let entity = Entity::new("http://T").with_identity("http://a");
        let verdict = UniqueIdentity
            .check(&RuleContext::default(), &Mutation::Insert { entity: &entity })
            .unwrap();
        assert!(verdict.is_pass());
    }
}
