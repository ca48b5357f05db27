//! Symbol layer
//!
//! Qualified-name symbols for the types and methods of a workspace, indexed
//! with a radix tree, plus per-document name resolution.
//!
//! # Overview
//!
//! - **SymbolIndex**: Lookup by qualified name; members of a type by prefix
//! - **SemanticModel**: Resolves names written in one document
//! - **SymbolCache**: The well-known framework types, resolved once
//!
//! # Example
//!
//! ```rust
//! use apiconv_source::{Document, DocumentId, TypeDecl};
//! use apiconv_symbol::{SymbolCache, SymbolId, SymbolIndex, WellKnownNames};
//!
//! let mut doc = Document::new(DocumentId::new("Conventions.cs"));
//! doc.namespace = Some("TestApp".to_string());
//! doc.types.push(TypeDecl::new("Conventions"));
//!
//! let index = SymbolIndex::from_documents([&doc]).unwrap();
//! WellKnownNames::default().register(&index).unwrap();
//!
//! assert!(index.contains_type(&SymbolId::new("TestApp.Conventions")));
//! assert!(SymbolCache::new(&index, WellKnownNames::default()).is_ok());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod index;
pub mod semantic;
pub mod symbol;

// Re-exports
pub use cache::{SymbolCache, WellKnownNames};
pub use index::SymbolIndex;
pub use semantic::SemanticModel;
pub use symbol::{
    OperationSymbol, ParameterSymbol, SourceKind, Symbol, SymbolError, SymbolId, SyntaxReference,
    TypeSymbol,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for symbol lookups
    pub use crate::{
        OperationSymbol, SemanticModel, SymbolCache, SymbolId, SymbolIndex, SyntaxReference,
        TypeSymbol, WellKnownNames,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
