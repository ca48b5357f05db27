//! Add undocumented outcomes to the convention method that already applies

use crate::context::FixContext;
use crate::error::FixError;
use crate::strategy::{DeclineReason, FixStrategy, StrategyOutcome};
use apiconv_source::EditPlan;
use async_trait::async_trait;

/// Extends an existing convention method
///
/// Applies when the declared outcomes come from a convention method with a
/// single declaration in editable source. One outcome annotation per
/// undocumented outcome is appended to that method, in the order the
/// outcomes were reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateExistingConventionMethod;

impl UpdateExistingConventionMethod {
    pub const NAME: &'static str = "update-existing-convention-method";

    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FixStrategy for UpdateExistingConventionMethod {
    async fn execute(&self, ctx: &FixContext) -> Result<StrategyOutcome, FixError> {
        ctx.check_cancelled()?;

        // only the first declared outcome decides where they were declared
        let Some(first) = ctx.declared().first() else {
            return Ok(DeclineReason::NoDeclaredOutcomes.into());
        };
        let declaring = &first.declaring_operation;
        if declaring == &ctx.operation().id {
            return Ok(DeclineReason::DeclaredOnOperation.into());
        }

        let Some(convention) = ctx.index().get_operation(declaring) else {
            return Ok(DeclineReason::UnknownDeclaration(declaring.clone()).into());
        };
        let Some(reference) = convention.single_reference() else {
            return Ok(DeclineReason::AmbiguousDeclaration {
                id: convention.id.clone(),
                count: convention.declaring_references.len(),
            }
            .into());
        };
        if !reference.is_in_source() {
            return Ok(DeclineReason::NotInSource(convention.id.clone()).into());
        }

        let document = ctx.load_document(&reference.document).await?;
        if document.method(&reference.path).is_none() {
            return Ok(DeclineReason::DeclarationMissing(convention.id.clone()).into());
        }

        let syntax = ctx.syntax();
        let mut builder = EditPlan::builder();
        for outcome in ctx.undocumented() {
            builder.add_annotation(
                &document,
                reference.path.clone(),
                syntax.outcome_annotation(outcome),
            );
        }

        tracing::debug!(
            "adding {} outcome(s) to {}",
            ctx.undocumented().len(),
            convention.id
        );
        Ok(StrategyOutcome::Applied(builder.build()?))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
