//! Symbols
//!
//! Provides [`SymbolId`] and the type and operation symbols the convention
//! engine reasons about. A symbol may be declared in several places (partial
//! declarations); each place is a [`SyntaxReference`].

use apiconv_source::{DeclPath, DocumentId, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Fully-qualified symbol name, e.g. `TestApp.ItemsController.PostItem`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    #[inline]
    #[must_use]
    pub fn new(qualified: impl Into<String>) -> Self {
        Self(qualified.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Simple name (last segment)
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Enclosing symbol or namespace
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once('.').map(|(parent, _)| Self(parent.to_string()))
    }

    /// Member `name` of this symbol
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Key used by the radix trie; segments joined by `/`
    #[must_use]
    pub fn to_trie_key(&self) -> String {
        self.0.replace('.', "/")
    }
}

impl Display for SymbolId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a declaration can be edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Hand-written source the user owns
    #[default]
    Source,
    /// Generated or metadata-only; never edited
    Generated,
}

/// One declaration site of a symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyntaxReference {
    pub document: DocumentId,
    pub path: DeclPath,
    #[serde(default)]
    pub kind: SourceKind,
}

impl SyntaxReference {
    #[inline]
    #[must_use]
    pub fn new(document: DocumentId, path: DeclPath, kind: SourceKind) -> Self {
        Self {
            document,
            path,
            kind,
        }
    }

    /// True for an editable source location
    #[inline]
    #[must_use]
    pub fn is_in_source(&self) -> bool {
        self.kind == SourceKind::Source
    }
}

/// Parameter of an operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSymbol {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// A method: either an API operation or a convention method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSymbol {
    pub id: SymbolId,
    pub name: String,
    pub containing_type: SymbolId,
    pub parameters: Vec<ParameterSymbol>,
    pub declaring_references: Vec<SyntaxReference>,
}

impl OperationSymbol {
    /// The single declaration site, if the symbol is not partial or overloaded
    #[must_use]
    pub fn single_reference(&self) -> Option<&SyntaxReference> {
        match self.declaring_references.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// A type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub id: SymbolId,
    pub name: String,
    pub namespace: Option<String>,
    /// Empty for metadata-only types
    pub declaring_references: Vec<SyntaxReference>,
}

impl TypeSymbol {
    /// Type known only from metadata (no declaration in the workspace)
    #[must_use]
    pub fn metadata(id: SymbolId) -> Self {
        let namespace = id.parent().map(|p| p.as_str().to_string());
        Self {
            name: id.name().to_string(),
            id,
            namespace,
            declaring_references: Vec::new(),
        }
    }

    /// First declaration site, if any
    #[inline]
    #[must_use]
    pub fn first_reference(&self) -> Option<&SyntaxReference> {
        self.declaring_references.first()
    }
}

/// Any indexed symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symbol {
    Type(TypeSymbol),
    Operation(OperationSymbol),
}

impl Symbol {
    #[must_use]
    pub fn id(&self) -> &SymbolId {
        match self {
            Self::Type(t) => &t.id,
            Self::Operation(o) => &o.id,
        }
    }

    #[must_use]
    pub fn declaring_references(&self) -> &[SyntaxReference] {
        match self {
            Self::Type(t) => &t.declaring_references,
            Self::Operation(o) => &o.declaring_references,
        }
    }

    pub(crate) fn declaring_references_mut(&mut self) -> &mut Vec<SyntaxReference> {
        match self {
            Self::Type(t) => &mut t.declaring_references,
            Self::Operation(o) => &mut o.declaring_references,
        }
    }
}

/// Errors raised by the symbol layer
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    /// A type and an operation share one qualified name
    #[error("symbol {id} is declared both as a type and as an operation")]
    KindMismatch { id: SymbolId },

    /// A well-known type is absent from the index
    #[error("well-known type not found: {0}")]
    MissingWellKnownType(String),

    /// Lock poisoned
    #[error("index lock poisoned")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_navigation() {
        let id = SymbolId::new("TestApp.ItemsController.PostItem");
        assert_eq!(id.name(), "PostItem");
        assert_eq!(id.parent(), Some(SymbolId::new("TestApp.ItemsController")));
        assert_eq!(id.to_trie_key(), "TestApp/ItemsController/PostItem");
        assert_eq!(SymbolId::new("Root").parent(), None);
    }

    #[test]
    fn metadata_type_has_no_references() {
        let ty = TypeSymbol::metadata(SymbolId::new(
            "Microsoft.AspNetCore.Mvc.ProducesResponseTypeAttribute",
        ));
        assert_eq!(ty.name, "ProducesResponseTypeAttribute");
        assert_eq!(ty.namespace.as_deref(), Some("Microsoft.AspNetCore.Mvc"));
        assert!(ty.first_reference().is_none());
    }

    #[test]
    fn single_reference_rejects_partials() {
        let reference = SyntaxReference::new(
            DocumentId::new("a.cs"),
            DeclPath::for_method("Conventions", "Post"),
            SourceKind::Source,
        );
        let mut op = OperationSymbol {
            id: SymbolId::new("App.Conventions.Post"),
            name: "Post".to_string(),
            containing_type: SymbolId::new("App.Conventions"),
            parameters: Vec::new(),
            declaring_references: vec![reference.clone()],
        };
        assert_eq!(op.single_reference(), Some(&reference));

        op.declaring_references.push(reference);
        assert_eq!(op.single_reference(), None);
    }

    #[test]
    fn generated_reference_is_not_source() {
        let reference = SyntaxReference::new(
            DocumentId::new("obj/Generated.cs"),
            DeclPath::for_type("Conventions"),
            SourceKind::Generated,
        );
        assert!(!reference.is_in_source());
    }
}
