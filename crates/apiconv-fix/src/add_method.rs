//! Move an operation's outcome annotations into a new convention method

use crate::context::FixContext;
use crate::error::FixError;
use crate::strategy::{DeclineReason, FixStrategy, StrategyOutcome};
use apiconv_source::{Annotation, Document, EditPlan};
use apiconv_symbol::{SyntaxReference, TypeSymbol};
use async_trait::async_trait;
use std::sync::Arc;

/// Adds a convention method to the first editable convention type
///
/// The operation's own outcome annotations are removed and carried onto
/// the new method, followed by one annotation per undocumented outcome.
/// Both edits land in one plan so they apply together or not at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddConventionMethod;

impl AddConventionMethod {
    pub const NAME: &'static str = "add-convention-method";

    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// First convention type whose first declaration is editable
    ///
    /// An existing method with the same signature does not disqualify a
    /// type; the new method is added next to it as an overload.
    async fn target(
        ctx: &FixContext,
        types: Vec<TypeSymbol>,
    ) -> Result<Option<(Arc<Document>, SyntaxReference)>, FixError> {
        for ty in types {
            let Some(reference) = ty.first_reference().filter(|r| r.is_in_source()) else {
                tracing::debug!("skipping convention type {}: not in source", ty.id);
                continue;
            };
            let document = ctx.load_document(&reference.document).await?;
            if document.type_decl(&reference.path).is_none() {
                tracing::debug!("skipping convention type {}: declaration missing", ty.id);
                continue;
            }
            let reference = reference.clone();
            return Ok(Some((document, reference)));
        }
        Ok(None)
    }
}

#[async_trait]
impl FixStrategy for AddConventionMethod {
    async fn execute(&self, ctx: &FixContext) -> Result<StrategyOutcome, FixError> {
        ctx.check_cancelled()?;

        let types = ctx
            .host()
            .conventions
            .convention_types(ctx.symbol_cache(), ctx.operation(), ctx.cancel())
            .await?;
        let Some((convention_doc, convention_ref)) = Self::target(ctx, types).await? else {
            return Ok(DeclineReason::NoConventionType.into());
        };

        let syntax = ctx.syntax();
        let produces = &ctx.symbol_cache().produces_response_type().id;
        let own: Vec<Annotation> = ctx
            .document()
            .method(ctx.operation_path())
            .map(|m| {
                m.annotations
                    .iter()
                    .filter(|a| ctx.semantic_model().annotation_is(a, produces))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let mut builder = EditPlan::builder();
        let mut carried = Vec::with_capacity(own.len());
        for annotation in own {
            carried.push(annotation.renamed(syntax.outcome_type()));
            builder.remove_annotation(ctx.document(), ctx.operation_path().clone(), annotation);
        }

        let method = syntax.convention_method(ctx.operation(), carried, ctx.undocumented());
        tracing::debug!(
            "adding convention method {} to {}",
            method.name,
            convention_ref.path
        );
        builder.add_member(&convention_doc, convention_ref.path, method);

        Ok(StrategyOutcome::Applied(builder.build()?))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
