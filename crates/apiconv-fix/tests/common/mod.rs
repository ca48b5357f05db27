//! Shared helpers for the fix integration tests

#![allow(dead_code)]

use apiconv_fix::collectors::{ActualOutcomeCollector, DocumentProvider};
use apiconv_fix::{ActualOutcome, Diagnostic, FixError, FixHost, RecordedActualOutcomes};
use apiconv_source::{Document, DocumentId, Workspace};
use apiconv_symbol::{OperationSymbol, SemanticModel, SymbolCache, WellKnownNames};
use apiconv_test_utils::{doc_id, symbol, Fixture, CONTROLLER_DOC, DIAGNOSTIC_SPAN, OPERATION};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;

/// The diagnostic every scenario reports inside `PostItem`
pub fn diagnostic() -> Diagnostic {
    Diagnostic::new("MVC1004", doc_id(CONTROLLER_DOC), DIAGNOSTIC_SPAN)
}

/// Actual outcomes recorded for `PostItem`
pub fn recorded(outcomes: Vec<ActualOutcome>) -> RecordedActualOutcomes {
    RecordedActualOutcomes::new().with(symbol(OPERATION), outcomes)
}

/// Host over the fixture's workspace with the default collaborators
pub fn host(fixture: &Fixture, actual: Arc<dyn ActualOutcomeCollector>) -> FixHost {
    FixHost::with_defaults(
        Arc::new(fixture.workspace()),
        Arc::new(fixture.index()),
        actual,
        WellKnownNames::default(),
    )
}

/// Workspace the test can change while a fix is running
#[derive(Debug, Default)]
pub struct SharedWorkspace {
    inner: RwLock<Workspace>,
}

impl SharedWorkspace {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            inner: RwLock::new(workspace),
        }
    }

    pub fn replace(&self, document: Document) {
        self.inner.write().unwrap().insert(document);
    }
}

#[async_trait]
impl DocumentProvider for SharedWorkspace {
    async fn document(
        &self,
        id: &DocumentId,
        cancel: &CancellationToken,
    ) -> Result<Arc<Document>, FixError> {
        if cancel.is_cancelled() {
            return Err(FixError::Cancelled);
        }
        self.inner
            .read()
            .unwrap()
            .get(id)
            .ok_or_else(|| FixError::DocumentUnavailable(id.clone()))
    }

    fn document_ids(&self) -> Vec<DocumentId> {
        self.inner
            .read()
            .unwrap()
            .documents()
            .map(|d| d.id.clone())
            .collect()
    }
}

/// Records how often the actual outcomes are asked for
///
/// With `cancel_first` set, the first call cancels the request's token
/// before answering, as a user would by dismissing the action.
#[derive(Debug, Default)]
pub struct CountingActual {
    inner: RecordedActualOutcomes,
    calls: AtomicUsize,
    cancel_first: AtomicBool,
}

impl CountingActual {
    pub fn new(inner: RecordedActualOutcomes) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            cancel_first: AtomicBool::new(false),
        }
    }

    pub fn cancelling_first_call(self) -> Self {
        self.cancel_first.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActualOutcomeCollector for CountingActual {
    async fn actual_outcomes(
        &self,
        model: &SemanticModel,
        cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<ActualOutcome>>, FixError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.cancel_first.swap(false, Ordering::SeqCst) {
            cancel.cancel();
        }
        self.inner
            .actual_outcomes(model, cache, operation, cancel)
            .await
    }
}
