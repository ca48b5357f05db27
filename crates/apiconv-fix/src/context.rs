//! Fix host and per-request context

use crate::collectors::{
    ActualOutcomeCollector, AnnotatedConventionTypes, AnnotationDeclaredOutcomes,
    ConventionTypeLookup, DeclaredOutcomeCollector, DocumentProvider,
};
use crate::error::FixError;
use crate::metadata::{ActualOutcome, DeclaredOutcome};
use crate::syntax::ConventionSyntax;
use apiconv_source::{DeclPath, Document, DocumentId};
use apiconv_symbol::{OperationSymbol, SemanticModel, SymbolCache, SymbolIndex, WellKnownNames};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything the host supplies to a fix
///
/// Cheap to clone; shared by every fix created for the same compilation.
#[derive(Debug, Clone)]
pub struct FixHost {
    pub documents: Arc<dyn DocumentProvider>,
    pub declared: Arc<dyn DeclaredOutcomeCollector>,
    pub actual: Arc<dyn ActualOutcomeCollector>,
    pub conventions: Arc<dyn ConventionTypeLookup>,
    pub index: Arc<SymbolIndex>,
    pub names: WellKnownNames,
}

impl FixHost {
    /// Host using the annotation-based default collaborators
    #[must_use]
    pub fn with_defaults(
        documents: Arc<dyn DocumentProvider>,
        index: Arc<SymbolIndex>,
        actual: Arc<dyn ActualOutcomeCollector>,
        names: WellKnownNames,
    ) -> Self {
        let conventions: Arc<dyn ConventionTypeLookup> = Arc::new(AnnotatedConventionTypes::new(
            Arc::clone(&documents),
            Arc::clone(&index),
        ));
        let declared = Arc::new(AnnotationDeclaredOutcomes::new(
            Arc::clone(&documents),
            Arc::clone(&index),
            Arc::clone(&conventions),
        ));

        Self {
            documents,
            declared,
            actual,
            conventions,
            index,
            names,
        }
    }

    /// Replace the declared-outcome collector
    #[must_use]
    pub fn with_declared(mut self, declared: Arc<dyn DeclaredOutcomeCollector>) -> Self {
        self.declared = declared;
        self
    }

    /// Replace the convention-type lookup
    #[must_use]
    pub fn with_conventions(mut self, conventions: Arc<dyn ConventionTypeLookup>) -> Self {
        self.conventions = conventions;
        self
    }
}

/// Inputs shared by every strategy of one fix attempt
///
/// Strategies only ever see `&FixContext`; their result is their return
/// value, so nothing here changes while the chain runs.
#[derive(Debug)]
pub struct FixContext {
    host: FixHost,
    document: Arc<Document>,
    semantic_model: SemanticModel,
    symbol_cache: SymbolCache,
    operation: OperationSymbol,
    operation_path: DeclPath,
    declared: Vec<DeclaredOutcome>,
    undocumented: Vec<ActualOutcome>,
    cancel: CancellationToken,
}

impl FixContext {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        host: FixHost,
        semantic_model: SemanticModel,
        symbol_cache: SymbolCache,
        operation: OperationSymbol,
        operation_path: DeclPath,
        declared: Vec<DeclaredOutcome>,
        undocumented: Vec<ActualOutcome>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            host,
            document: Arc::clone(semantic_model.document()),
            semantic_model,
            symbol_cache,
            operation,
            operation_path,
            declared,
            undocumented,
            cancel,
        }
    }

    /// Document containing the operation under analysis
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    #[inline]
    #[must_use]
    pub fn semantic_model(&self) -> &SemanticModel {
        &self.semantic_model
    }

    #[inline]
    #[must_use]
    pub fn symbol_cache(&self) -> &SymbolCache {
        &self.symbol_cache
    }

    /// Operation under analysis
    #[inline]
    #[must_use]
    pub fn operation(&self) -> &OperationSymbol {
        &self.operation
    }

    /// Path of the operation's declaration in [`FixContext::document`]
    #[inline]
    #[must_use]
    pub fn operation_path(&self) -> &DeclPath {
        &self.operation_path
    }

    /// Every declared outcome, own or inherited
    #[inline]
    #[must_use]
    pub fn declared(&self) -> &[DeclaredOutcome] {
        &self.declared
    }

    /// Actual outcomes without a declared match
    #[inline]
    #[must_use]
    pub fn undocumented(&self) -> &[ActualOutcome] {
        &self.undocumented
    }

    #[inline]
    #[must_use]
    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    #[inline]
    #[must_use]
    pub fn host(&self) -> &FixHost {
        &self.host
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.host.index
    }

    /// Fragment builder bound to the configured names
    #[inline]
    #[must_use]
    pub fn syntax(&self) -> ConventionSyntax<'_> {
        ConventionSyntax::new(self.symbol_cache.names())
    }

    /// Fail with [`FixError::Cancelled`] once the token fires
    ///
    /// # Errors
    /// Returns error if the request was cancelled
    #[inline]
    pub fn check_cancelled(&self) -> Result<(), FixError> {
        if self.cancel.is_cancelled() {
            Err(FixError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Load a document through the host
    ///
    /// # Errors
    /// Returns error if cancelled or the host cannot supply the document
    pub async fn load_document(&self, id: &DocumentId) -> Result<Arc<Document>, FixError> {
        self.check_cancelled()?;
        if id == &self.document.id {
            return Ok(Arc::clone(&self.document));
        }
        self.host.documents.document(id, &self.cancel).await
    }
}
