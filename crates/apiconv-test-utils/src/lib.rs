//! Testing utilities for the apiconv workspace
//!
//! Shared fixtures: a controller document with one `PostItem` operation, a
//! conventions document, and the annotations both use.

#![allow(missing_docs)]

use apiconv_source::{
    Annotation, AnnotationArg, Document, DocumentId, MethodDecl, Modifier, ParameterDecl, Span,
    TypeDecl, TypeRef, Workspace,
};
use apiconv_symbol::{SourceKind, SymbolId, SymbolIndex, WellKnownNames};

pub const MVC: &str = "Microsoft.AspNetCore.Mvc";
pub const MVC_API_EXPLORER: &str = "Microsoft.AspNetCore.Mvc.ApiExplorer";

pub const CONTROLLER_DOC: &str = "Controllers/ItemsController.cs";
pub const CONVENTIONS_DOC: &str = "Conventions.cs";

pub const CONTROLLER_TYPE: &str = "TestApp.Controllers.ItemsController";
pub const OPERATION: &str = "TestApp.Controllers.ItemsController.PostItem";
pub const CONVENTION_TYPE: &str = "TestApp.Conventions";
pub const CONVENTION_POST: &str = "TestApp.Conventions.Post";

/// Span of the `PostItem` declaration
pub const OPERATION_SPAN: Span = Span::new(100, 400);

/// Span inside the `PostItem` body, where diagnostics are reported
pub const DIAGNOSTIC_SPAN: Span = Span::new(250, 262);

pub fn doc_id(id: &str) -> DocumentId {
    DocumentId::new(id)
}

pub fn symbol(id: &str) -> SymbolId {
    SymbolId::new(id)
}

/// `[ProducesResponseType(status)]`, written the short way
pub fn produces(status: i64) -> Annotation {
    Annotation::new(TypeRef::named("ProducesResponseType")).with_arg(AnnotationArg::Int(status))
}

/// `[ApiConventionNameMatch(ApiConventionNameMatchBehavior.member)]`
pub fn name_match(member: &str) -> Annotation {
    Annotation::new(TypeRef::named("ApiConventionNameMatch")).with_arg(AnnotationArg::EnumMember {
        enum_type: TypeRef::named("ApiConventionNameMatchBehavior"),
        member: member.to_string(),
    })
}

/// `[ApiConventionTypeMatch(ApiConventionTypeMatchBehavior.member)]`
pub fn type_match(member: &str) -> Annotation {
    Annotation::new(TypeRef::named("ApiConventionTypeMatch")).with_arg(AnnotationArg::EnumMember {
        enum_type: TypeRef::named("ApiConventionTypeMatchBehavior"),
        member: member.to_string(),
    })
}

/// `[ApiConventionType(typeof(ty))]`
pub fn convention_type(ty: &str) -> Annotation {
    Annotation::new(TypeRef::named("ApiConventionType"))
        .with_arg(AnnotationArg::TypeOf(TypeRef::named(ty)))
}

/// `public IActionResult PostItem(ItemModel itemModel)`
pub fn post_item(annotations: Vec<Annotation>) -> MethodDecl {
    let mut method = MethodDecl::new("PostItem");
    method.modifiers = vec![Modifier::Public];
    method.return_type = TypeRef::named("IActionResult");
    method.annotations = annotations;
    method.parameters = vec![ParameterDecl::new("itemModel", TypeRef::named("ItemModel"))];
    method.body = Some(vec![
        "if (!ModelState.IsValid) return BadRequest();".to_string(),
        "return Ok();".to_string(),
    ]);
    method.span = Some(OPERATION_SPAN);
    method
}

/// Controller document declaring `ItemsController.PostItem`
pub fn controller_document(type_annotations: Vec<Annotation>, operation: MethodDecl) -> Document {
    let mut controller = TypeDecl::new("ItemsController");
    controller.modifiers = vec![Modifier::Public];
    controller.annotations = type_annotations;
    controller.methods.push(operation);
    controller.span = Some(Span::new(50, 500));

    let mut document = Document::new(doc_id(CONTROLLER_DOC));
    document.namespace = Some("TestApp.Controllers".to_string());
    document.imports = vec![MVC.to_string()];
    document.types.push(controller);
    document
}

/// `public static void Post(object model)` matching any `Post*` operation
/// with one parameter whose name ends in `model`
pub fn convention_post(outcomes: &[i64]) -> MethodDecl {
    let mut method = MethodDecl::new("Post");
    method.modifiers = vec![Modifier::Public, Modifier::Static];
    method.annotations = outcomes.iter().map(|s| produces(*s)).collect();
    method.annotations.push(name_match("Prefix"));

    let mut model = ParameterDecl::new("model", TypeRef::Any);
    model.annotations = vec![name_match("Suffix"), type_match("Any")];
    method.parameters = vec![model];
    method
}

/// `public static class Conventions` in namespace `TestApp`
pub fn conventions_document(methods: Vec<MethodDecl>) -> Document {
    let mut conventions = TypeDecl::new("Conventions");
    conventions.modifiers = vec![Modifier::Public, Modifier::Static];
    conventions.methods = methods;

    let mut document = Document::new(doc_id(CONVENTIONS_DOC));
    document.namespace = Some("TestApp".to_string());
    document.imports = vec![MVC.to_string(), MVC_API_EXPLORER.to_string()];
    document.types.push(conventions);
    document
}

/// Set of documents, some of them generated
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub documents: Vec<Document>,
    pub generated: Vec<DocumentId>,
}

impl Fixture {
    pub fn new(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            documents: documents.into_iter().collect(),
            generated: Vec::new(),
        }
    }

    /// Mark a document as generated code
    pub fn with_generated(mut self, id: &str) -> Self {
        self.generated.push(doc_id(id));
        self
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::from_documents(self.documents.iter().cloned())
    }

    /// Index with every document plus the default well-known types
    pub fn index(&self) -> SymbolIndex {
        index_workspace(&self.workspace(), &self.generated)
    }
}

/// Index every workspace document and register the default well-known types
pub fn index_workspace(workspace: &Workspace, generated: &[DocumentId]) -> SymbolIndex {
    let index = SymbolIndex::new();
    for document in workspace.documents() {
        let kind = if generated.contains(&document.id) {
            SourceKind::Generated
        } else {
            SourceKind::Source
        };
        index.index_document(document, kind).unwrap();
    }
    WellKnownNames::default().register(&index).unwrap();
    index
}

/// Controller with `PostItem` plus conventions applied at the type
pub fn standard_fixture(post_annotations: Vec<Annotation>, conventions: Vec<MethodDecl>) -> Fixture {
    Fixture::new([
        controller_document(vec![convention_type("Conventions")], post_item(post_annotations)),
        conventions_document(conventions),
    ])
}
