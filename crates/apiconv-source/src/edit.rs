//! Edit plans
//!
//! An [`EditPlan`] is a value describing every insertion and removal a fix
//! wants to make, grouped per document. Plans are built completely before the
//! workspace is touched and are then applied all-or-nothing, so a plan that
//! moves an annotation from one file to another can never leave the removal
//! applied without the insertion.

use crate::hash::{ContentHash, HashError};
use crate::path::DeclPath;
use crate::syntax::{Annotation, Document, DocumentId, MethodDecl};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One structural operation on a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Append an annotation to a type (`Type`) or method (`Type.Method`)
    AddAnnotation {
        target: DeclPath,
        annotation: Annotation,
    },

    /// Remove the first annotation equal to `annotation`
    RemoveAnnotation {
        target: DeclPath,
        annotation: Annotation,
    },

    /// Append a method to a type
    AddMember { target: DeclPath, member: MethodDecl },
}

impl EditOperation {
    /// Declaration the operation applies to
    #[inline]
    #[must_use]
    pub fn target(&self) -> &DeclPath {
        match self {
            Self::AddAnnotation { target, .. }
            | Self::RemoveAnnotation { target, .. }
            | Self::AddMember { target, .. } => target,
        }
    }

    /// Short human-readable description
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::AddAnnotation { target, .. } => format!("add annotation to {target}"),
            Self::RemoveAnnotation { target, .. } => format!("remove annotation from {target}"),
            Self::AddMember { target, member } => format!("add member {} to {target}", member.name),
        }
    }

    fn apply(&self, document: &mut Document) -> Result<(), EditError> {
        let id = document.id.clone();
        match self {
            Self::AddAnnotation { target, annotation } => {
                annotations_mut(document, target)
                    .ok_or_else(|| EditError::target_not_found(&id, target))?
                    .push(annotation.clone());
            }
            Self::RemoveAnnotation { target, annotation } => {
                let annotations = annotations_mut(document, target)
                    .ok_or_else(|| EditError::target_not_found(&id, target))?;
                let position = annotations
                    .iter()
                    .position(|a| a == annotation)
                    .ok_or_else(|| EditError::AnnotationNotFound {
                        document: id.clone(),
                        target: target.clone(),
                    })?;
                annotations.remove(position);
            }
            Self::AddMember { target, member } => {
                let ty = document
                    .type_decl_mut(target)
                    .ok_or_else(|| EditError::target_not_found(&id, target))?;
                if ty.methods.contains(member) {
                    return Err(EditError::MemberAlreadyExists {
                        document: id,
                        target: target.clone(),
                        name: member.name.clone(),
                    });
                }
                ty.methods.push(member.clone());
            }
        }
        Ok(())
    }
}

fn annotations_mut<'d>(document: &'d mut Document, target: &DeclPath) -> Option<&'d mut Vec<Annotation>> {
    match target.len() {
        1 => document.type_decl_mut(target).map(|t| &mut t.annotations),
        2 => document.method_mut(target).map(|m| &mut m.annotations),
        _ => None,
    }
}

/// All operations against one document, built against one version of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEdit {
    document: DocumentId,
    base_hash: ContentHash,
    operations: Vec<EditOperation>,
}

impl DocumentEdit {
    #[inline]
    #[must_use]
    pub fn new(document: DocumentId, base_hash: ContentHash) -> Self {
        Self {
            document,
            base_hash,
            operations: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    /// Hash of the document version the operations were built against
    #[inline]
    #[must_use]
    pub fn base_hash(&self) -> &ContentHash {
        &self.base_hash
    }

    #[inline]
    #[must_use]
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// Apply every operation to a copy of `base`
    ///
    /// # Errors
    /// Returns error if `base` is not the version the edit was built against,
    /// or if any operation cannot be applied. `base` is never modified.
    pub fn apply_to(&self, base: &Document) -> Result<Document, EditError> {
        let actual = base.content_hash()?;
        if actual != self.base_hash {
            return Err(EditError::BaseMismatch {
                document: self.document.clone(),
                expected: self.base_hash,
                actual,
            });
        }

        let mut updated = base.clone();
        for operation in &self.operations {
            operation.apply(&mut updated)?;
        }
        Ok(updated)
    }
}

/// Atomic set of document edits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPlan {
    edits: Vec<DocumentEdit>,
}

impl EditPlan {
    #[inline]
    #[must_use]
    pub fn builder() -> EditPlanBuilder {
        EditPlanBuilder::new()
    }

    /// Per-document edits, in the order documents were first touched
    #[inline]
    #[must_use]
    pub fn edits(&self) -> &[DocumentEdit] {
        &self.edits
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.iter().all(|e| e.operations.is_empty())
    }

    /// True when the plan changes at most one document
    #[inline]
    #[must_use]
    pub fn is_single_document(&self) -> bool {
        self.edits.len() <= 1
    }

    /// Documents touched by the plan
    pub fn documents(&self) -> impl Iterator<Item = &DocumentId> {
        self.edits.iter().map(|e| &e.document)
    }

    /// Total number of operations
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.edits.iter().map(|e| e.operations.len()).sum()
    }
}

/// Builder for [`EditPlan`]
///
/// Operations on the same document are merged into one [`DocumentEdit`]
/// whose base hash is taken from the document when it is first touched.
#[derive(Debug, Default)]
pub struct EditPlanBuilder {
    edits: IndexMap<DocumentId, DocumentEdit>,
    error: Option<HashError>,
}

impl EditPlanBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an annotation insertion
    pub fn add_annotation(
        &mut self,
        document: &Document,
        target: DeclPath,
        annotation: Annotation,
    ) -> &mut Self {
        self.push(document, EditOperation::AddAnnotation { target, annotation })
    }

    /// Queue an annotation removal
    pub fn remove_annotation(
        &mut self,
        document: &Document,
        target: DeclPath,
        annotation: Annotation,
    ) -> &mut Self {
        self.push(document, EditOperation::RemoveAnnotation { target, annotation })
    }

    /// Queue a member insertion
    pub fn add_member(&mut self, document: &Document, target: DeclPath, member: MethodDecl) -> &mut Self {
        self.push(document, EditOperation::AddMember { target, member })
    }

    fn push(&mut self, document: &Document, operation: EditOperation) -> &mut Self {
        if !self.edits.contains_key(&document.id) {
            match document.content_hash() {
                Ok(hash) => {
                    self.edits
                        .insert(document.id.clone(), DocumentEdit::new(document.id.clone(), hash));
                }
                Err(e) => {
                    self.error.get_or_insert(e);
                    return self;
                }
            }
        }
        if let Some(edit) = self.edits.get_mut(&document.id) {
            edit.operations.push(operation);
        }
        self
    }

    /// Finish the plan
    ///
    /// # Errors
    /// Returns error if a touched document could not be hashed
    pub fn build(self) -> Result<EditPlan, EditError> {
        if let Some(e) = self.error {
            return Err(e.into());
        }
        Ok(EditPlan {
            edits: self.edits.into_values().collect(),
        })
    }
}

/// Errors raised while applying edits
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Document changed since the plan was built
    #[error("document {document} changed: expected base {expected}, found {actual}")]
    BaseMismatch {
        document: DocumentId,
        expected: ContentHash,
        actual: ContentHash,
    },

    /// Plan references a document the workspace does not hold
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Target declaration does not exist
    #[error("declaration {target} not found in {document}")]
    TargetNotFound { document: DocumentId, target: DeclPath },

    /// Annotation to remove does not exist
    #[error("annotation to remove not found on {target} in {document}")]
    AnnotationNotFound { document: DocumentId, target: DeclPath },

    /// Type already declares an identical method
    #[error("{target} in {document} already declares {name}")]
    MemberAlreadyExists {
        document: DocumentId,
        target: DeclPath,
        name: String,
    },

    #[error("hash error: {0}")]
    Hash(#[from] HashError),
}

impl EditError {
    fn target_not_found(document: &DocumentId, target: &DeclPath) -> Self {
        Self::TargetNotFound {
            document: document.clone(),
            target: target.clone(),
        }
    }
}
