use crate::error::ValidationError;
use crate::rule::{Mutation, RuleContext, ValidationRule, Verdict};

/// Display identifiers: ASCII letters, digits and `_`, not starting with a
/// digit. The empty string marks the field as unset and passes.
pub struct DisplayIdSyntax;

impl DisplayIdSyntax {
    pub fn is_valid(value: &str) -> bool {
        let mut chars = value.chars();
        match chars.next() {
            None => true,
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}

impl ValidationRule for DisplayIdSyntax {
    fn name(&self) -> &str {
        "display-id-syntax"
    }

    fn check(&self, _ctx: &RuleContext<'_>, mutation: &Mutation<'_>) -> Result<Verdict, ValidationError> {
        match mutation.value() {
            Some(value) if !Self::is_valid(value.lexical()) => Err(ValidationError::InvalidIdentifierSyntax {
                value: value.lexical().to_string(),
            }),
            _ => Ok(Verdict::Pass),
        }
    }
}
