//! Source model and edit substrate
//!
//! Structured source documents, declaration paths, content hashes and the
//! transactional edit plans the convention engine produces.
//!
//! # Core Concepts
//!
//! - [`Document`]: One source file as structured data (types, methods, annotations)
//! - [`DeclPath`]: Address of a declaration inside a document
//! - [`ContentHash`]: 32-byte Blake3 hash identifying one version of a document
//! - [`EditPlan`]: All insertions and removals of a fix, grouped per document
//! - [`Workspace`]: Current documents; applies plans all-or-nothing
//!
//! # Example
//!
//! ```rust
//! use apiconv_source::{DeclPath, Document, DocumentId, EditPlan, MethodDecl, TypeDecl, Workspace};
//!
//! let mut doc = Document::new(DocumentId::new("Conventions.cs"));
//! doc.types.push(TypeDecl::new("Conventions"));
//! let mut workspace = Workspace::from_documents([doc.clone()]);
//!
//! let mut builder = EditPlan::builder();
//! builder.add_member(&doc, DeclPath::for_type("Conventions"), MethodDecl::new("Post"));
//! let plan = builder.build().unwrap();
//!
//! let changes = workspace.apply_and_commit(&plan).unwrap();
//! assert!(changes[0].text.contains("void Post()"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod edit;
mod hash;
mod path;
mod render;
mod syntax;
mod workspace;

pub use edit::{DocumentEdit, EditError, EditOperation, EditPlan, EditPlanBuilder};
pub use hash::{ContentHash, HashError};
pub use path::{DeclPath, PathError};
pub use render::{render_document, Renderer};
pub use syntax::{
    Annotation, AnnotationArg, Document, DocumentId, MethodDecl, Modifier, ParameterDecl, Span,
    TypeDecl, TypeKind, TypeRef,
};
pub use workspace::{ChangedDocument, Workspace};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
