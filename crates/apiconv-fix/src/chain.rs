//! Ordered strategy chain
//!
//! Provides [`StrategyChain`], which runs strategies in order and stops at
//! the first one that produces a plan.

use crate::add_method::AddConventionMethod;
use crate::context::FixContext;
use crate::error::FixError;
use crate::strategy::{FixStrategy, StrategyOutcome};
use crate::update_existing::UpdateExistingConventionMethod;
use apiconv_source::EditPlan;
use std::sync::Arc;

/// Strategies in priority order
#[derive(Debug, Clone)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn FixStrategy>>,
}

impl StrategyChain {
    /// Create an empty chain
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Update the existing convention method, then fall back to adding one
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut chain = Self::new();
        chain.push(Arc::new(UpdateExistingConventionMethod::new()));
        chain.push(Arc::new(AddConventionMethod::new()));
        chain
    }

    /// Append a strategy with the lowest priority so far
    pub fn push(&mut self, strategy: Arc<dyn FixStrategy>) {
        self.strategies.push(strategy);
    }

    /// Strategy names, in order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies until one applies
    ///
    /// Returns the name of the applied strategy with its plan, or `None`
    /// when every strategy declined.
    ///
    /// # Errors
    /// Returns the first strategy error; cancellation is checked before
    /// each strategy
    pub async fn run(
        &self,
        ctx: &FixContext,
    ) -> Result<Option<(&'static str, EditPlan)>, FixError> {
        for strategy in &self.strategies {
            ctx.check_cancelled()?;

            match strategy.execute(ctx).await? {
                StrategyOutcome::Applied(plan) => {
                    tracing::info!(
                        "{} applied to {} ({} operation(s))",
                        strategy.name(),
                        ctx.operation().id,
                        plan.operation_count()
                    );
                    for edit in plan.edits() {
                        for operation in edit.operations() {
                            tracing::debug!(
                                "{}@{}: {}",
                                edit.document(),
                                edit.base_hash().short(),
                                operation.describe()
                            );
                        }
                    }
                    return Ok(Some((strategy.name(), plan)));
                }
                StrategyOutcome::Declined(reason) => {
                    tracing::debug!("{} declined: {}", strategy.name(), reason);
                }
            }
        }
        Ok(None)
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::with_defaults()
    }
}
