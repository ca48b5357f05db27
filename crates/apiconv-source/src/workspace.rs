//! In-memory workspace
//!
//! Holds the current version of every document and applies [`EditPlan`]s
//! transactionally: either every document edit in a plan succeeds, or the
//! workspace is left exactly as it was.

use crate::edit::{EditError, EditPlan};
use crate::hash::ContentHash;
use crate::render::render_document;
use crate::syntax::{Document, DocumentId};
use indexmap::IndexMap;
use std::sync::Arc;

/// A document produced by applying an edit plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedDocument {
    pub id: DocumentId,
    pub base_hash: ContentHash,
    pub document: Arc<Document>,
    /// Rendered text of the new version
    pub text: String,
}

/// Set of documents, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    documents: IndexMap<DocumentId, Arc<Document>>,
}

impl Workspace {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from documents; later documents replace earlier ones with the same id
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut workspace = Self::new();
        for document in documents {
            workspace.insert(document);
        }
        workspace
    }

    /// Add or replace a document
    pub fn insert(&mut self, document: Document) -> Option<Arc<Document>> {
        self.documents.insert(document.id.clone(), Arc::new(document))
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<Arc<Document>> {
        self.documents.get(id).cloned()
    }

    /// Documents in insertion order
    pub fn documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.values()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Rendered text of a document
    #[must_use]
    pub fn render(&self, id: &DocumentId) -> Option<String> {
        self.documents.get(id).map(|d| render_document(d))
    }

    /// Compute the documents a plan would produce, without changing anything
    ///
    /// # Errors
    /// Returns the first failure; no partial result is returned
    pub fn apply(&self, plan: &EditPlan) -> Result<Vec<ChangedDocument>, EditError> {
        plan.edits()
            .iter()
            .map(|edit| {
                let base = self
                    .documents
                    .get(edit.document())
                    .ok_or_else(|| EditError::DocumentNotFound(edit.document().clone()))?;
                let document = edit.apply_to(base)?;
                let text = render_document(&document);
                Ok(ChangedDocument {
                    id: edit.document().clone(),
                    base_hash: *edit.base_hash(),
                    document: Arc::new(document),
                    text,
                })
            })
            .collect()
    }

    /// Replace documents with their changed versions
    pub fn commit(&mut self, changes: &[ChangedDocument]) {
        for change in changes {
            self.documents
                .insert(change.id.clone(), Arc::clone(&change.document));
        }
    }

    /// Apply a plan and commit it in one step
    ///
    /// # Errors
    /// Returns error if any document edit fails; the workspace is unchanged
    pub fn apply_and_commit(&mut self, plan: &EditPlan) -> Result<Vec<ChangedDocument>, EditError> {
        let changes = self.apply(plan)?;
        self.commit(&changes);
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::DeclPath;
    use crate::syntax::{Annotation, AnnotationArg, MethodDecl, TypeDecl, TypeRef};

    fn status(code: i64) -> Annotation {
        Annotation::new(TypeRef::named("ProducesResponseType")).with_arg(AnnotationArg::Int(code))
    }

    fn document(id: &str, type_name: &str, method: &str) -> Document {
        let mut ty = TypeDecl::new(type_name);
        ty.methods.push(MethodDecl::new(method));
        let mut doc = Document::new(DocumentId::new(id));
        doc.types.push(ty);
        doc
    }

    fn workspace() -> Workspace {
        Workspace::from_documents([
            document("Controller.cs", "ItemsController", "PostItem"),
            document("Conventions.cs", "Conventions", "Get"),
        ])
    }

    #[test]
    fn apply_spans_documents() {
        let mut ws = workspace();
        let controller = ws.get(&DocumentId::new("Controller.cs")).unwrap();
        let conventions = ws.get(&DocumentId::new("Conventions.cs")).unwrap();

        let mut builder = EditPlan::builder();
        builder
            .add_annotation(&controller, DeclPath::for_method("ItemsController", "PostItem"), status(404))
            .add_member(&conventions, DeclPath::for_type("Conventions"), MethodDecl::new("Post"));
        let plan = builder.build().unwrap();

        let changes = ws.apply_and_commit(&plan).unwrap();
        assert_eq!(changes.len(), 2);
        assert!(changes[1].text.contains("void Post()"));

        let conventions = ws.get(&DocumentId::new("Conventions.cs")).unwrap();
        assert_eq!(conventions.types[0].methods.len(), 2);
    }

    #[test]
    fn failed_plan_leaves_workspace_untouched() {
        let mut ws = workspace();
        let controller = ws.get(&DocumentId::new("Controller.cs")).unwrap();
        let conventions = ws.get(&DocumentId::new("Conventions.cs")).unwrap();
        let before = controller.content_hash().unwrap();

        let mut builder = EditPlan::builder();
        builder
            .add_annotation(&controller, DeclPath::for_method("ItemsController", "PostItem"), status(404))
            .add_member(&conventions, DeclPath::for_type("Missing"), MethodDecl::new("Post"));
        let plan = builder.build().unwrap();

        assert!(ws.apply_and_commit(&plan).is_err());
        let after = ws.get(&DocumentId::new("Controller.cs")).unwrap();
        assert_eq!(after.content_hash().unwrap(), before);
    }

    #[test]
    fn stale_plan_is_rejected() {
        let mut ws = workspace();
        let controller = ws.get(&DocumentId::new("Controller.cs")).unwrap();

        let mut builder = EditPlan::builder();
        builder.add_annotation(&controller, DeclPath::for_method("ItemsController", "PostItem"), status(404));
        let plan = builder.build().unwrap();

        let mut changed = (*controller).clone();
        changed.imports.push("System".to_string());
        ws.insert(changed);

        assert!(matches!(ws.apply(&plan), Err(EditError::BaseMismatch { .. })));
    }

    #[test]
    fn unknown_document_is_rejected() {
        let ws = workspace();
        let stray = document("Other.cs", "Other", "Get");

        let mut builder = EditPlan::builder();
        builder.add_annotation(&stray, DeclPath::for_type("Other"), status(200));
        let plan = builder.build().unwrap();

        assert!(matches!(ws.apply(&plan), Err(EditError::DocumentNotFound(_))));
    }
}
