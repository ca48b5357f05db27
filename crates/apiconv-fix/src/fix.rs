//! Fix orchestration
//!
//! [`ConventionFix`] turns one diagnostic into at most one applied edit.
//! The work runs lazily on the first [`ConventionFix::compute`] and its
//! result is kept, so the plan is built and applied at most once however
//! often the host asks for it.

use crate::chain::StrategyChain;
use crate::config::DEFAULT_TITLE;
use crate::context::{FixContext, FixHost};
use crate::error::FixError;
use crate::metadata::compute_undocumented;
use crate::provider::Diagnostic;
use apiconv_source::{ChangedDocument, EditPlan, Workspace};
use apiconv_symbol::{SemanticModel, SymbolCache, SymbolError};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

/// Outcome of an applied fix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditResult {
    /// One document changed
    Document(ChangedDocument),
    /// Several documents changed together
    Solution(Vec<ChangedDocument>),
}

impl EditResult {
    /// Every changed document
    #[must_use]
    pub fn documents(&self) -> &[ChangedDocument] {
        match self {
            Self::Document(changed) => std::slice::from_ref(changed),
            Self::Solution(changed) => changed,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_solution(&self) -> bool {
        matches!(self, Self::Solution(_))
    }

    fn from_changes(mut changes: Vec<ChangedDocument>) -> Option<Self> {
        match changes.len() {
            0 => None,
            1 => changes.pop().map(Self::Document),
            _ => Some(Self::Solution(changes)),
        }
    }
}

/// Deferred fix for one diagnostic
#[derive(Debug)]
pub struct ConventionFix {
    host: FixHost,
    diagnostic: Diagnostic,
    chain: StrategyChain,
    title: String,
    result: OnceCell<Option<EditResult>>,
}

impl ConventionFix {
    /// Fix using the default strategy chain
    #[must_use]
    pub fn new(host: FixHost, diagnostic: Diagnostic) -> Self {
        Self {
            host,
            diagnostic,
            chain: StrategyChain::with_defaults(),
            title: DEFAULT_TITLE.to_string(),
            result: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_chain(mut self, chain: StrategyChain) -> Self {
        self.chain = chain;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Code-action title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    #[must_use]
    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }

    /// True once a result has been computed
    #[inline]
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.result.initialized()
    }

    /// Compute the fix, or return the result of an earlier computation
    ///
    /// `Ok(None)` means no fix applies. Failed and cancelled runs are not
    /// remembered; a later call starts over.
    ///
    /// # Errors
    /// Returns [`FixError::Cancelled`] if `cancel` fires, or the host failure
    /// that stopped the computation
    pub async fn compute(&self, cancel: &CancellationToken) -> Result<Option<&EditResult>, FixError> {
        let result = self
            .result
            .get_or_try_init(|| self.calculate(cancel))
            .await?;
        Ok(result.as_ref())
    }

    /// The changed document, when the fix touches exactly one
    ///
    /// # Errors
    /// Same as [`ConventionFix::compute`]
    pub async fn changed_document(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<&ChangedDocument>, FixError> {
        Ok(match self.compute(cancel).await? {
            Some(EditResult::Document(changed)) => Some(changed),
            _ => None,
        })
    }

    /// Every changed document; empty when no fix applies
    ///
    /// # Errors
    /// Same as [`ConventionFix::compute`]
    pub async fn changed_solution(
        &self,
        cancel: &CancellationToken,
    ) -> Result<&[ChangedDocument], FixError> {
        Ok(self
            .compute(cancel)
            .await?
            .map_or(&[][..], EditResult::documents))
    }

    async fn calculate(&self, cancel: &CancellationToken) -> Result<Option<EditResult>, FixError> {
        let Some(ctx) = self.context(cancel).await? else {
            return Ok(None);
        };

        let Some((strategy, plan)) = self.chain.run(&ctx).await? else {
            tracing::debug!("no strategy applies to {}", ctx.operation().id);
            return Ok(None);
        };

        let changes = self.apply(&plan, cancel).await?;
        tracing::info!(
            "{} changed {} document(s) via {}",
            self.title,
            changes.len(),
            strategy
        );
        Ok(EditResult::from_changes(changes))
    }

    /// Gather everything the strategies need; `None` when there is nothing to fix
    async fn context(&self, cancel: &CancellationToken) -> Result<Option<FixContext>, FixError> {
        let host = &self.host;
        if cancel.is_cancelled() {
            return Err(FixError::Cancelled);
        }

        let document = host
            .documents
            .document(&self.diagnostic.document, cancel)
            .await?;
        let model = SemanticModel::new(Arc::clone(&document), Arc::clone(&host.index));

        let Some(path) = document.enclosing_method(&self.diagnostic.span) else {
            tracing::debug!("no method encloses {}", self.diagnostic);
            return Ok(None);
        };
        let Some(operation) = model.declared_operation(&path) else {
            tracing::debug!("{path} in {} is not an indexed operation", document.id);
            return Ok(None);
        };

        let cache = match SymbolCache::new(&host.index, host.names.clone()) {
            Ok(cache) => cache,
            Err(SymbolError::MissingWellKnownType(name)) => {
                tracing::debug!("well-known type {name} is not available");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let declared = host
            .declared
            .declared_outcomes(&cache, &operation, cancel)
            .await?;
        let Some(actual) = host
            .actual
            .actual_outcomes(&model, &cache, &operation, cancel)
            .await?
        else {
            tracing::debug!("body of {} cannot be classified", operation.id);
            return Ok(None);
        };

        let undocumented = compute_undocumented(&declared, &actual);
        tracing::debug!(
            "{}: {} declared, {} actual, {} undocumented",
            operation.id,
            declared.len(),
            actual.len(),
            undocumented.len()
        );
        if undocumented.is_empty() {
            return Ok(None);
        }

        Ok(Some(FixContext::new(
            host.clone(),
            model,
            cache,
            operation,
            path,
            declared,
            undocumented,
            cancel.clone(),
        )))
    }

    /// Apply a plan against the current version of every document it touches
    async fn apply(
        &self,
        plan: &EditPlan,
        cancel: &CancellationToken,
    ) -> Result<Vec<ChangedDocument>, FixError> {
        let mut workspace = Workspace::new();
        for id in plan.documents() {
            let document = self.host.documents.document(id, cancel).await?;
            workspace.insert(document.as_ref().clone());
        }
        if cancel.is_cancelled() {
            return Err(FixError::Cancelled);
        }
        Ok(workspace.apply(plan)?)
    }
}
