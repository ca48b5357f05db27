//! Symbol index with radix tree
//!
//! Provides [`SymbolIndex`] for symbol lookup by qualified name using
//! radix_trie. Keys are qualified names with segments joined by `/`.

use crate::symbol::{
    OperationSymbol, ParameterSymbol, SourceKind, Symbol, SymbolError, SymbolId, SyntaxReference,
    TypeSymbol,
};
use apiconv_source::{DeclPath, Document, DocumentId};
use dashmap::DashMap;
use radix_trie::{Trie, TrieCommon};
use std::sync::RwLock;

/// Symbol index shared between fix requests
///
/// The trie sits behind an `RwLock`; the per-document reverse index is a
/// `DashMap` so invalidation does not need the trie lock to find its work.
#[derive(Debug)]
pub struct SymbolIndex {
    /// Trie mapping key -> symbol
    trie: RwLock<Trie<String, Symbol>>,

    /// Reverse index: document -> symbols it declares (for invalidation)
    by_document: DashMap<DocumentId, Vec<SymbolId>>,
}

impl SymbolIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            trie: RwLock::new(Trie::new()),
            by_document: DashMap::new(),
        }
    }

    /// Index every document as editable source
    ///
    /// # Errors
    /// Returns error if a name is declared both as a type and an operation
    pub fn from_documents<'a>(
        documents: impl IntoIterator<Item = &'a Document>,
    ) -> Result<Self, SymbolError> {
        let index = Self::new();
        for document in documents {
            index.index_document(document, SourceKind::Source)?;
        }
        Ok(index)
    }

    /// Add the declarations of one document
    ///
    /// Whatever the document declared when it was last indexed is removed
    /// first, so re-indexing an edited document leaves no stale references.
    /// Declarations that already exist under the same qualified name (partial
    /// types, overloads) gain an additional syntax reference.
    ///
    /// # Errors
    /// Returns error if a name is declared both as a type and an operation
    pub fn index_document(&self, document: &Document, kind: SourceKind) -> Result<(), SymbolError> {
        self.remove_document(&document.id)?;
        let mut declared = Vec::new();

        for ty in &document.types {
            let type_path = DeclPath::for_type(ty.name.clone());
            let type_id = SymbolId::new(document.qualify(&type_path));
            let reference = SyntaxReference::new(document.id.clone(), type_path.clone(), kind);

            self.upsert(
                Symbol::Type(TypeSymbol {
                    id: type_id.clone(),
                    name: ty.name.clone(),
                    namespace: document.namespace.clone(),
                    declaring_references: vec![reference],
                }),
            )?;
            declared.push(type_id.clone());

            for method in &ty.methods {
                let method_path = type_path.child(method.name.clone());
                let id = type_id.child(&method.name);
                let reference = SyntaxReference::new(document.id.clone(), method_path, kind);

                self.upsert(Symbol::Operation(OperationSymbol {
                    id: id.clone(),
                    name: method.name.clone(),
                    containing_type: type_id.clone(),
                    parameters: method
                        .parameters
                        .iter()
                        .map(|p| ParameterSymbol {
                            name: p.name.clone(),
                            ty: p.ty.clone(),
                        })
                        .collect(),
                    declaring_references: vec![reference],
                }))?;
                declared.push(id);
            }
        }

        self.by_document
            .entry(document.id.clone())
            .or_default()
            .extend(declared);
        Ok(())
    }

    /// Register a type known only from referenced metadata
    ///
    /// # Errors
    /// Returns error if the name is already an operation
    pub fn register_metadata_type(&self, qualified: &str) -> Result<(), SymbolError> {
        self.upsert(Symbol::Type(TypeSymbol::metadata(SymbolId::new(qualified))))
    }

    fn upsert(&self, symbol: Symbol) -> Result<(), SymbolError> {
        let key = symbol.id().to_trie_key();
        let mut trie = self.trie.write().map_err(|_| SymbolError::LockPoisoned)?;

        match trie.get_mut(&key) {
            Some(existing) => {
                let same_kind = matches!(
                    (&*existing, &symbol),
                    (Symbol::Type(_), Symbol::Type(_)) | (Symbol::Operation(_), Symbol::Operation(_))
                );
                if !same_kind {
                    return Err(SymbolError::KindMismatch {
                        id: symbol.id().clone(),
                    });
                }
                existing
                    .declaring_references_mut()
                    .extend(symbol.declaring_references().iter().cloned());
            }
            None => {
                trie.insert(key, symbol);
            }
        }
        Ok(())
    }

    /// Remove every declaration contributed by a document
    ///
    /// Symbols left without declarations are dropped, except metadata types.
    /// Returns the number of symbols touched.
    ///
    /// # Errors
    /// Returns error if the trie lock is poisoned
    pub fn remove_document(&self, document: &DocumentId) -> Result<usize, SymbolError> {
        let Some((_, ids)) = self.by_document.remove(document) else {
            return Ok(0);
        };
        let mut trie = self.trie.write().map_err(|_| SymbolError::LockPoisoned)?;

        for id in &ids {
            let key = id.to_trie_key();
            let now_empty = match trie.get_mut(&key) {
                Some(symbol) => {
                    let references = symbol.declaring_references_mut();
                    references.retain(|r| &r.document != document);
                    references.is_empty()
                }
                None => false,
            };
            if now_empty {
                trie.remove(&key);
            }
        }
        Ok(ids.len())
    }

    /// Lookup any symbol by qualified name
    #[must_use]
    pub fn get(&self, id: &SymbolId) -> Option<Symbol> {
        let trie = self.trie.read().ok()?;
        trie.get(&id.to_trie_key()).cloned()
    }

    /// Lookup a type by qualified name
    #[must_use]
    pub fn get_type(&self, id: &SymbolId) -> Option<TypeSymbol> {
        match self.get(id)? {
            Symbol::Type(t) => Some(t),
            Symbol::Operation(_) => None,
        }
    }

    /// Lookup an operation by qualified name
    #[must_use]
    pub fn get_operation(&self, id: &SymbolId) -> Option<OperationSymbol> {
        match self.get(id)? {
            Symbol::Operation(o) => Some(o),
            Symbol::Type(_) => None,
        }
    }

    /// True when a type with this qualified name is indexed
    #[inline]
    #[must_use]
    pub fn contains_type(&self, id: &SymbolId) -> bool {
        self.get_type(id).is_some()
    }

    /// Total symbol count
    #[must_use]
    pub fn len(&self) -> usize {
        self.trie.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Check if index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiconv_source::{MethodDecl, ParameterDecl, TypeDecl, TypeRef};

    fn document(id: &str, type_name: &str, methods: &[&str]) -> Document {
        let mut ty = TypeDecl::new(type_name);
        for name in methods {
            let mut method = MethodDecl::new(*name);
            method
                .parameters
                .push(ParameterDecl::new("model", TypeRef::named("Model")));
            ty.methods.push(method);
        }
        let mut doc = Document::new(DocumentId::new(id));
        doc.namespace = Some("TestApp".to_string());
        doc.types.push(ty);
        doc
    }

    #[test]
    fn indexes_types_and_operations() {
        let doc = document("Items.cs", "ItemsController", &["PostItem", "GetItem"]);
        let index = SymbolIndex::from_documents([&doc]).unwrap();

        assert_eq!(index.len(), 3);
        let op = index
            .get_operation(&SymbolId::new("TestApp.ItemsController.PostItem"))
            .unwrap();
        assert_eq!(op.containing_type, SymbolId::new("TestApp.ItemsController"));
        assert_eq!(op.parameters[0].name, "model");
        assert_eq!(
            op.single_reference().unwrap().path,
            DeclPath::for_method("ItemsController", "PostItem")
        );
    }

    #[test]
    fn partial_types_collect_references() {
        let a = document("A.cs", "ItemsController", &["PostItem"]);
        let b = document("B.cs", "ItemsController", &["GetItem"]);
        let index = SymbolIndex::from_documents([&a, &b]).unwrap();

        let ty = index
            .get_type(&SymbolId::new("TestApp.ItemsController"))
            .unwrap();
        assert_eq!(ty.declaring_references.len(), 2);
        assert_eq!(ty.first_reference().unwrap().document, DocumentId::new("A.cs"));
    }

    #[test]
    fn reindexing_replaces_previous_declarations() {
        let index = SymbolIndex::new();
        let before = document("A.cs", "Conventions", &["Post"]);
        index.index_document(&before, SourceKind::Source).unwrap();

        let after = document("A.cs", "Conventions", &["Post", "Post", "Get"]);
        index.index_document(&after, SourceKind::Source).unwrap();

        let post = index
            .get_operation(&SymbolId::new("TestApp.Conventions.Post"))
            .unwrap();
        assert_eq!(post.declaring_references.len(), 2);
        let ty = index.get_type(&SymbolId::new("TestApp.Conventions")).unwrap();
        assert_eq!(ty.single_reference().unwrap().document, DocumentId::new("A.cs"));

        let renamed = document("A.cs", "Conventions", &["Put"]);
        index.index_document(&renamed, SourceKind::Source).unwrap();
        assert!(index
            .get_operation(&SymbolId::new("TestApp.Conventions.Post"))
            .is_none());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn metadata_types_are_types() {
        let index = SymbolIndex::new();
        index
            .register_metadata_type("Microsoft.AspNetCore.Mvc.ProducesResponseTypeAttribute")
            .unwrap();
        assert!(index.contains_type(&SymbolId::new(
            "Microsoft.AspNetCore.Mvc.ProducesResponseTypeAttribute"
        )));
        assert!(index
            .get_operation(&SymbolId::new(
                "Microsoft.AspNetCore.Mvc.ProducesResponseTypeAttribute"
            ))
            .is_none());
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let index = SymbolIndex::new();
        let doc = document("A.cs", "Conventions", &["Post"]);
        index.index_document(&doc, SourceKind::Source).unwrap();

        let result = index.register_metadata_type("TestApp.Conventions.Post");
        assert!(matches!(result, Err(SymbolError::KindMismatch { .. })));
    }

    #[test]
    fn remove_document_drops_orphans() {
        let a = document("A.cs", "ItemsController", &["PostItem"]);
        let b = document("B.cs", "ItemsController", &["GetItem"]);
        let index = SymbolIndex::from_documents([&a, &b]).unwrap();

        let touched = index.remove_document(&DocumentId::new("B.cs")).unwrap();
        assert_eq!(touched, 2);
        assert!(index
            .get_operation(&SymbolId::new("TestApp.ItemsController.GetItem"))
            .is_none());
        let ty = index
            .get_type(&SymbolId::new("TestApp.ItemsController"))
            .unwrap();
        assert_eq!(ty.declaring_references.len(), 1);
        assert!(!index.by_document.contains_key(&DocumentId::new("B.cs")));
    }

    #[test]
    fn generated_documents_are_not_source() {
        let doc = document("obj/Conventions.g.cs", "Conventions", &["Post"]);
        let index = SymbolIndex::new();
        index.index_document(&doc, SourceKind::Generated).unwrap();

        let op = index
            .get_operation(&SymbolId::new("TestApp.Conventions.Post"))
            .unwrap();
        assert!(!op.single_reference().unwrap().is_in_source());
    }
}
