//! Collaborators
//!
//! The fix consumes four collaborators: documents, declared outcomes, actual
//! outcomes, and convention types. Each is an `async_trait` so hosts can
//! back them with lazy I/O; every call receives the request's cancellation
//! token. Default implementations work over a [`Workspace`] and a
//! [`SymbolIndex`].

use crate::error::FixError;
use crate::metadata::{ActualOutcome, DeclaredOutcome};
use crate::naming::boundaries;
use crate::syntax::{NameMatchBehavior, TypeMatchBehavior};
use apiconv_source::{Annotation, Document, DocumentId, MethodDecl, ParameterDecl, TypeRef, Workspace};
use apiconv_symbol::{
    OperationSymbol, ParameterSymbol, SemanticModel, SymbolCache, SymbolId, SymbolIndex, TypeSymbol,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Loads documents, possibly lazily
#[async_trait]
pub trait DocumentProvider: Send + Sync + Debug {
    /// Current version of a document
    async fn document(
        &self,
        id: &DocumentId,
        cancel: &CancellationToken,
    ) -> Result<Arc<Document>, FixError>;

    /// Every document of the compilation, in a stable order
    fn document_ids(&self) -> Vec<DocumentId>;
}

/// Outcomes an operation documents, including inherited ones
#[async_trait]
pub trait DeclaredOutcomeCollector: Send + Sync + Debug {
    async fn declared_outcomes(
        &self,
        cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Vec<DeclaredOutcome>, FixError>;
}

/// Outcomes an operation's body produces
#[async_trait]
pub trait ActualOutcomeCollector: Send + Sync + Debug {
    /// `Ok(None)` when the body cannot be classified
    async fn actual_outcomes(
        &self,
        model: &SemanticModel,
        cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<ActualOutcome>>, FixError>;
}

/// Candidate convention containers for an operation, in priority order
#[async_trait]
pub trait ConventionTypeLookup: Send + Sync + Debug {
    async fn convention_types(
        &self,
        cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Vec<TypeSymbol>, FixError>;
}

#[inline]
fn ensure_live(cancel: &CancellationToken) -> Result<(), FixError> {
    if cancel.is_cancelled() {
        Err(FixError::Cancelled)
    } else {
        Ok(())
    }
}

#[async_trait]
impl DocumentProvider for Workspace {
    async fn document(
        &self,
        id: &DocumentId,
        cancel: &CancellationToken,
    ) -> Result<Arc<Document>, FixError> {
        ensure_live(cancel)?;
        self.get(id)
            .ok_or_else(|| FixError::DocumentUnavailable(id.clone()))
    }

    fn document_ids(&self) -> Vec<DocumentId> {
        self.documents().map(|d| d.id.clone()).collect()
    }
}

// ============================================================================
// Convention matching
// ============================================================================

/// True when `name` matches `convention` under `behavior`
///
/// `Prefix` and `Suffix` only match at a lower→upper case boundary of
/// `name`; the first character of a suffix is compared case-insensitively.
#[must_use]
pub fn is_name_match(name: &str, convention: &str, behavior: NameMatchBehavior) -> bool {
    match behavior {
        NameMatchBehavior::Any => true,
        NameMatchBehavior::Exact => name == convention,
        NameMatchBehavior::Prefix => {
            name == convention
                || (name.starts_with(convention)
                    && boundaries(name).contains(&convention.chars().count()))
        }
        NameMatchBehavior::Suffix => {
            if name == convention {
                return true;
            }
            let name_chars: Vec<char> = name.chars().collect();
            let conv_chars: Vec<char> = convention.chars().collect();
            if conv_chars.is_empty() || name_chars.len() <= conv_chars.len() {
                return false;
            }
            let start = name_chars.len() - conv_chars.len();
            boundaries(name).contains(&start)
                && name_chars[start].to_lowercase().eq(conv_chars[0].to_lowercase())
                && name_chars[start + 1..] == conv_chars[1..]
        }
    }
}

/// Matches convention methods against operations
#[derive(Debug, Clone, Copy)]
pub struct ConventionMatcher<'a> {
    model: &'a SemanticModel,
    cache: &'a SymbolCache,
}

impl<'a> ConventionMatcher<'a> {
    /// `model` must belong to the document declaring the convention methods
    #[inline]
    #[must_use]
    pub fn new(model: &'a SemanticModel, cache: &'a SymbolCache) -> Self {
        Self { model, cache }
    }

    fn behavior_member<'b>(&self, annotations: &'b [Annotation], attribute: &SymbolId) -> Option<&'b str> {
        annotations
            .iter()
            .find(|a| self.model.annotation_is(a, attribute))
            .and_then(Annotation::first_enum_member)
    }

    /// Name-match behavior declared by `annotations`; `Exact` when absent
    #[must_use]
    pub fn name_behavior(&self, annotations: &[Annotation]) -> NameMatchBehavior {
        self.behavior_member(annotations, &self.cache.name_match_attribute().id)
            .and_then(|m| m.parse().ok())
            .unwrap_or_default()
    }

    /// Type-match behavior declared by `annotations`; `AssignableFrom` when absent
    #[must_use]
    pub fn type_behavior(&self, annotations: &[Annotation]) -> TypeMatchBehavior {
        self.behavior_member(annotations, &self.cache.type_match_attribute().id)
            .and_then(|m| m.parse().ok())
            .unwrap_or_default()
    }

    fn type_matches(&self, convention: &ParameterDecl, parameter: &ParameterSymbol) -> bool {
        match self.type_behavior(&convention.annotations) {
            TypeMatchBehavior::Any => true,
            // type hierarchies are not modelled: only the wildcard and
            // identically written types are assignable
            TypeMatchBehavior::AssignableFrom => match &convention.ty {
                TypeRef::Any => true,
                TypeRef::Named { name, .. } if name == "object" => true,
                other => other.name() == parameter.ty.name(),
            },
        }
    }

    /// True when `convention` applies to `operation`
    #[must_use]
    pub fn matches(&self, convention: &MethodDecl, operation: &OperationSymbol) -> bool {
        let method_behavior = self.name_behavior(&convention.annotations);
        if !is_name_match(&operation.name, &convention.name, method_behavior) {
            return false;
        }
        if convention.parameters.len() != operation.parameters.len() {
            return false;
        }

        convention
            .parameters
            .iter()
            .zip(&operation.parameters)
            .all(|(c, p)| {
                is_name_match(&p.name, &c.name, self.name_behavior(&c.annotations))
                    && self.type_matches(c, p)
            })
    }
}

// ============================================================================
// Default collaborators
// ============================================================================

/// Declared outcomes read from outcome annotations
///
/// The operation's own annotations win. When it has none, the convention
/// types are searched in order for the first method matching the operation,
/// and that method's annotations are reported with it as declaring operation.
#[derive(Debug, Clone)]
pub struct AnnotationDeclaredOutcomes {
    documents: Arc<dyn DocumentProvider>,
    index: Arc<SymbolIndex>,
    conventions: Arc<dyn ConventionTypeLookup>,
}

impl AnnotationDeclaredOutcomes {
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentProvider>,
        index: Arc<SymbolIndex>,
        conventions: Arc<dyn ConventionTypeLookup>,
    ) -> Self {
        Self {
            documents,
            index,
            conventions,
        }
    }

    /// Outcome annotations physically on `operation`
    async fn outcomes_on(
        &self,
        cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Vec<DeclaredOutcome>, FixError> {
        let produces = &cache.produces_response_type().id;
        let mut outcomes = Vec::new();

        for reference in &operation.declaring_references {
            let document = self.documents.document(&reference.document, cancel).await?;
            let Some(method) = document.method(&reference.path) else {
                continue;
            };
            let model = SemanticModel::new(Arc::clone(&document), Arc::clone(&self.index));

            for annotation in &method.annotations {
                if !model.annotation_is(annotation, produces) {
                    continue;
                }
                let Some(status) = annotation.first_int().and_then(|s| i32::try_from(s).ok()) else {
                    continue;
                };
                outcomes.push(DeclaredOutcome::new(
                    status,
                    annotation.clone(),
                    operation.id.clone(),
                ));
            }
        }
        Ok(outcomes)
    }

    /// First convention method that applies to `operation`
    pub async fn matching_convention(
        &self,
        cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Option<OperationSymbol>, FixError> {
        let types = self
            .conventions
            .convention_types(cache, operation, cancel)
            .await?;

        for ty in types {
            for reference in &ty.declaring_references {
                let document = self.documents.document(&reference.document, cancel).await?;
                let Some(decl) = document.type_decl(&reference.path) else {
                    continue;
                };
                let model = SemanticModel::new(Arc::clone(&document), Arc::clone(&self.index));
                let matcher = ConventionMatcher::new(&model, cache);

                for method in &decl.methods {
                    if !matcher.matches(method, operation) {
                        continue;
                    }
                    if let Some(symbol) = self.index.get_operation(&ty.id.child(&method.name)) {
                        tracing::debug!("{} matches convention {}", operation.id, symbol.id);
                        return Ok(Some(symbol));
                    }
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl DeclaredOutcomeCollector for AnnotationDeclaredOutcomes {
    async fn declared_outcomes(
        &self,
        cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Vec<DeclaredOutcome>, FixError> {
        ensure_live(cancel)?;

        let own = self.outcomes_on(cache, operation, cancel).await?;
        if !own.is_empty() {
            return Ok(own);
        }

        match self.matching_convention(cache, operation, cancel).await? {
            Some(convention) => self.outcomes_on(cache, &convention, cancel).await,
            None => Ok(Vec::new()),
        }
    }
}

/// Convention types named by convention-type annotations
///
/// Annotations on the operation's containing type are used when present;
/// otherwise the assembly-level annotations of every document, in document
/// order. Duplicates are dropped.
#[derive(Debug, Clone)]
pub struct AnnotatedConventionTypes {
    documents: Arc<dyn DocumentProvider>,
    index: Arc<SymbolIndex>,
}

impl AnnotatedConventionTypes {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentProvider>, index: Arc<SymbolIndex>) -> Self {
        Self { documents, index }
    }

    fn collect(
        &self,
        model: &SemanticModel,
        annotations: &[Annotation],
        attribute: &SymbolId,
        found: &mut Vec<TypeSymbol>,
    ) {
        let types = annotations
            .iter()
            .filter(|a| model.annotation_is(a, attribute))
            .filter_map(Annotation::first_type_of)
            .filter_map(|ty| model.resolve_type(ty))
            .filter_map(|id| self.index.get_type(&id));

        for ty in types {
            if !found.iter().any(|f| f.id == ty.id) {
                found.push(ty);
            }
        }
    }
}

#[async_trait]
impl ConventionTypeLookup for AnnotatedConventionTypes {
    async fn convention_types(
        &self,
        cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Vec<TypeSymbol>, FixError> {
        ensure_live(cancel)?;
        let attribute = &cache.convention_type_attribute().id;
        let mut found = Vec::new();

        if let Some(container) = self.index.get_type(&operation.containing_type) {
            for reference in &container.declaring_references {
                let document = self.documents.document(&reference.document, cancel).await?;
                let Some(decl) = document.type_decl(&reference.path) else {
                    continue;
                };
                let model = SemanticModel::new(Arc::clone(&document), Arc::clone(&self.index));
                self.collect(&model, &decl.annotations, attribute, &mut found);
            }
        }

        if found.is_empty() {
            for id in self.documents.document_ids() {
                let document = self.documents.document(&id, cancel).await?;
                if document.assembly_annotations.is_empty() {
                    continue;
                }
                let model = SemanticModel::new(Arc::clone(&document), Arc::clone(&self.index));
                self.collect(&model, &document.assembly_annotations, attribute, &mut found);
            }
        }

        tracing::debug!("{} convention type(s) for {}", found.len(), operation.id);
        Ok(found)
    }
}

/// Actual outcomes recorded by the host, per operation
///
/// An operation recorded as `None` (or not recorded at all) has a body that
/// could not be classified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedActualOutcomes {
    by_operation: IndexMap<SymbolId, Option<Vec<ActualOutcome>>>,
}

impl RecordedActualOutcomes {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcomes of an operation
    #[must_use]
    pub fn with(mut self, operation: SymbolId, outcomes: Vec<ActualOutcome>) -> Self {
        self.by_operation.insert(operation, Some(outcomes));
        self
    }

    /// Record that an operation's body could not be classified
    #[must_use]
    pub fn with_unclassifiable(mut self, operation: SymbolId) -> Self {
        self.by_operation.insert(operation, None);
        self
    }

    /// Recorded outcomes, `None` when unclassifiable or unknown
    #[must_use]
    pub fn get(&self, operation: &SymbolId) -> Option<&[ActualOutcome]> {
        self.by_operation.get(operation)?.as_deref()
    }
}

#[async_trait]
impl ActualOutcomeCollector for RecordedActualOutcomes {
    async fn actual_outcomes(
        &self,
        _model: &SemanticModel,
        _cache: &SymbolCache,
        operation: &OperationSymbol,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<ActualOutcome>>, FixError> {
        ensure_live(cancel)?;
        Ok(self.get(&operation.id).map(<[ActualOutcome]>::to_vec))
    }
}
