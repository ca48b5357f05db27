//! Semantic model
//!
//! Binds one document to the symbol index: resolves the names written in the
//! document (annotation types, `typeof` arguments) against its imports and
//! enclosing namespaces, and maps declarations back to their symbols.

use crate::index::SymbolIndex;
use crate::symbol::{OperationSymbol, SymbolId};
use apiconv_source::{Annotation, DeclPath, Document, TypeRef};
use std::sync::Arc;

const ATTRIBUTE_SUFFIX: &str = "Attribute";

/// Name resolution for one document
#[derive(Debug, Clone)]
pub struct SemanticModel {
    document: Arc<Document>,
    index: Arc<SymbolIndex>,
}

impl SemanticModel {
    #[inline]
    #[must_use]
    pub fn new(document: Arc<Document>, index: Arc<SymbolIndex>) -> Self {
        Self { document, index }
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.index
    }

    /// Namespaces searched for an unqualified name, innermost first
    fn search_scopes(&self) -> Vec<String> {
        let mut scopes = Vec::new();
        if let Some(ns) = &self.document.namespace {
            let mut current = Some(ns.as_str());
            while let Some(scope) = current {
                scopes.push(scope.to_string());
                current = scope.rsplit_once('.').map(|(parent, _)| parent);
            }
        }
        scopes.extend(self.document.imports.iter().cloned());
        scopes
    }

    fn resolve_candidates(&self, name: &str) -> Option<SymbolId> {
        let direct = SymbolId::new(name);
        if self.index.contains_type(&direct) {
            return Some(direct);
        }
        self.search_scopes()
            .into_iter()
            .map(|scope| SymbolId::new(format!("{scope}.{name}")))
            .find(|id| self.index.contains_type(id))
    }

    /// Resolve a written type reference to a type symbol id
    #[must_use]
    pub fn resolve_type(&self, ty: &TypeRef) -> Option<SymbolId> {
        self.resolve_candidates(ty.name()?)
    }

    /// Resolve an annotation's type, allowing the `Attribute` suffix to be omitted
    #[must_use]
    pub fn resolve_annotation(&self, annotation: &Annotation) -> Option<SymbolId> {
        let name = annotation.name.name()?;
        if let Some(id) = self.resolve_candidates(name) {
            return Some(id);
        }
        if name.ends_with(ATTRIBUTE_SUFFIX) {
            return None;
        }
        self.resolve_candidates(&format!("{name}{ATTRIBUTE_SUFFIX}"))
    }

    /// True when `annotation` is an instance of the type `expected`
    #[must_use]
    pub fn annotation_is(&self, annotation: &Annotation, expected: &SymbolId) -> bool {
        self.resolve_annotation(annotation).as_ref() == Some(expected)
    }

    /// Operation symbol of a method declared in this document
    #[must_use]
    pub fn declared_operation(&self, path: &DeclPath) -> Option<OperationSymbol> {
        self.document.method(path)?;
        self.index
            .get_operation(&SymbolId::new(self.document.qualify(path)))
    }
}
