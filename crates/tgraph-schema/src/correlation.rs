//! Keeps the two halves of a `Design` pointing at each other.
//!
//! A design's functional view must contain a `FunctionalComponent` whose
//! `definition` is the design's structure. When either half is adopted and
//! the other is already present without that link, the rule does not fail;
//! it asks the engine to adopt a synthesized functional component into the
//! module definition once the adoption has gone through.

use tgraph_core::{Amendment, DisplayIdSyntax, Entity, Mutation, RuleContext, ValidationError, ValidationRule, Verdict};
use tracing::debug;

use crate::catalog::functional_component;
use crate::vocab::{DEFINITION, DISPLAY_ID, FUNCTION, FUNCTIONAL_COMPONENT_PROPERTY, STRUCTURE};

const NAME: &str = "structure-function-correlation";

/// Attached to the `structure` and `function` slots of `Design`.
pub struct StructureFunctionCorrelation;

impl ValidationRule for StructureFunctionCorrelation {
    fn name(&self) -> &str {
        NAME
    }

    fn check(&self, ctx: &RuleContext<'_>, mutation: &Mutation<'_>) -> Result<Verdict, ValidationError> {
        let (Some(design), Mutation::Adopt { property, child }) = (ctx.owner, *mutation) else {
            return Ok(Verdict::Pass);
        };
        let pair = if *property == STRUCTURE {
            design.children(FUNCTION).first().map(|fx| (child, fx))
        } else if *property == FUNCTION {
            design.children(STRUCTURE).first().map(|structure| (structure, child))
        } else {
            None
        };
        let Some((structure, fx)) = pair else {
            return Ok(Verdict::Pass);
        };
        if is_correlated(structure, fx) {
            return Ok(Verdict::Pass);
        }

        let correlation = correlate(structure, fx)?;
        debug!(
            design = %design.identity(),
            structure = %structure.identity(),
            function = %fx.identity(),
            "synthesizing correlation"
        );
        Ok(Verdict::Amend(vec![Amendment::AdoptChild {
            parent: fx.identity().clone(),
            property: FUNCTIONAL_COMPONENT_PROPERTY.into(),
            child: correlation,
        }]))
    }
}

/// Returns `true` if some functional component of `fx` is defined by
/// `structure`.
pub fn is_correlated(structure: &Entity, fx: &Entity) -> bool {
    fx.children(FUNCTIONAL_COMPONENT_PROPERTY)
        .iter()
        .filter_map(|fc| fc.get(DEFINITION))
        .any(|definition| definition.lexical() == structure.identity().as_str())
}

/// A functional component of `fx`, named after `structure`, whose definition
/// is `structure`.
fn correlate(structure: &Entity, fx: &Entity) -> Result<Entity, ValidationError> {
    let local = structure.identity().local_name();
    let mut fc = functional_component().with_identity(fx.identity().child(local));
    let mut handle = fc.edit();
    handle
        .reference(DEFINITION)
        .and_then(|mut definition| definition.set(structure.identity()))
        .map_err(|e| ValidationError::rejected(NAME, e.to_string()))?;
    if !local.is_empty() && DisplayIdSyntax::is_valid(local) {
        handle
            .scalar(DISPLAY_ID)
            .and_then(|mut display_id| display_id.set(local))
            .map_err(|e| ValidationError::rejected(NAME, e.to_string()))?;
    }
    Ok(fc)
}
