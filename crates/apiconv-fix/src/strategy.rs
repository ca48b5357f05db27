//! Fix strategy trait and core types
//!
//! Provides the [`FixStrategy`] trait: one way of documenting undocumented
//! outcomes. A strategy either declines, with a reason, or returns the
//! complete [`EditPlan`] it wants applied.

use crate::context::FixContext;
use crate::error::FixError;
use apiconv_source::EditPlan;
use apiconv_symbol::SymbolId;
use async_trait::async_trait;
use std::fmt::{self, Display, Formatter};

/// Fix strategy
///
/// Strategies never touch the workspace. Declining has no side effect, so a
/// declined strategy leaves everything exactly as it found it.
#[async_trait]
pub trait FixStrategy: Send + Sync + fmt::Debug {
    /// Try to produce a plan
    ///
    /// # Errors
    /// Only cancellation and host failures are errors; anything that merely
    /// makes the strategy inapplicable is [`StrategyOutcome::Declined`]
    async fn execute(&self, context: &FixContext) -> Result<StrategyOutcome, FixError>;

    /// Strategy name (for logs)
    fn name(&self) -> &'static str;
}

/// Result of running one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Not applicable; the next strategy runs
    Declined(DeclineReason),
    /// Plan to apply; no later strategy runs
    Applied(EditPlan),
}

impl StrategyOutcome {
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The plan, if applied
    #[inline]
    #[must_use]
    pub fn into_plan(self) -> Option<EditPlan> {
        match self {
            Self::Applied(plan) => Some(plan),
            Self::Declined(_) => None,
        }
    }
}

impl From<DeclineReason> for StrategyOutcome {
    fn from(reason: DeclineReason) -> Self {
        Self::Declined(reason)
    }
}

/// Why a strategy declined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineReason {
    /// Nothing is declared, so there is no convention to extend
    NoDeclaredOutcomes,

    /// Declared outcomes sit on the operation itself
    DeclaredOnOperation,

    /// Declaring operation is not in the index
    UnknownDeclaration(SymbolId),

    /// Declaration is partial, overloaded or metadata-only
    AmbiguousDeclaration { id: SymbolId, count: usize },

    /// Declaration is generated or otherwise not editable
    NotInSource(SymbolId),

    /// Reference points at a declaration the document does not contain
    DeclarationMissing(SymbolId),

    /// No convention container with an editable declaration
    NoConventionType,
}

impl Display for DeclineReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDeclaredOutcomes => f.write_str("no declared outcomes"),
            Self::DeclaredOnOperation => f.write_str("outcomes are declared on the operation"),
            Self::UnknownDeclaration(id) => write!(f, "{id} is not indexed"),
            Self::AmbiguousDeclaration { id, count } => {
                write!(f, "{id} has {count} declarations, expected 1")
            }
            Self::NotInSource(id) => write!(f, "{id} is not declared in source"),
            Self::DeclarationMissing(id) => write!(f, "declaration of {id} not found"),
            Self::NoConventionType => f.write_str("no editable convention type"),
        }
    }
}
