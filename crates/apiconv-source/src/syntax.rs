//! Structured source model
//!
//! Documents arrive already structured: a namespace, its imports, and type
//! declarations holding annotated methods. Every node is plain data with
//! `serde` support so hosts can hand documents over as YAML or JSON.

use crate::hash::{ContentHash, HashError};
use crate::path::DeclPath;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Identity of a document within a workspace (usually its relative path)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Byte range in the original document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `other` lies entirely inside `self`
    #[inline]
    #[must_use]
    pub const fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Declaration modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Internal,
    Protected,
    Private,
    Static,
    Abstract,
    Virtual,
    Override,
    Sealed,
    Partial,
    Async,
}

impl Modifier {
    /// Source keyword
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Static => "static",
            Self::Abstract => "abstract",
            Self::Virtual => "virtual",
            Self::Override => "override",
            Self::Sealed => "sealed",
            Self::Partial => "partial",
            Self::Async => "async",
        }
    }
}

/// Reference to a type from source
///
/// In fixtures a type reference is written as a string: `void`, `*` for the
/// wildcard type, `~Fully.Qualified.Name` for a name the renderer may shorten
/// against the document's imports, and anything else verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A named type; `simplify` marks a fully-qualified name that should be
    /// shortened when the document imports its namespace
    Named { name: String, simplify: bool },
    /// Unconstrained type accepting any value
    Any,
    /// No value
    Void,
}

impl TypeRef {
    /// Name written exactly as given
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            simplify: false,
        }
    }

    /// Fully-qualified name eligible for simplification
    #[inline]
    #[must_use]
    pub fn simplifiable(qualified: impl Into<String>) -> Self {
        Self::Named {
            name: qualified.into(),
            simplify: true,
        }
    }

    /// Name as written, `None` for the keyword types
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            Self::Any | Self::Void => None,
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "" => Err("type reference cannot be empty".to_string()),
            "void" => Ok(Self::Void),
            "*" => Ok(Self::Any),
            _ => match value.strip_prefix('~') {
                Some("") => Err("simplifiable type reference needs a name".to_string()),
                Some(rest) => Ok(Self::simplifiable(rest)),
                None => Ok(Self::named(value)),
            },
        }
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        match value {
            TypeRef::Void => "void".to_string(),
            TypeRef::Any => "*".to_string(),
            TypeRef::Named {
                name,
                simplify: true,
            } => format!("~{name}"),
            TypeRef::Named {
                name,
                simplify: false,
            } => name,
        }
    }
}

/// One annotation argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationArg {
    /// Integer literal
    Int(i64),
    /// `EnumType.Member`
    EnumMember { enum_type: TypeRef, member: String },
    /// `typeof(Type)`
    TypeOf(TypeRef),
    /// Any other expression, rendered verbatim
    Expr(String),
}

/// An annotation (attribute) applied to a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub name: TypeRef,
    #[serde(default)]
    pub args: Vec<AnnotationArg>,
}

impl Annotation {
    #[inline]
    #[must_use]
    pub fn new(name: TypeRef) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Append an argument
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: AnnotationArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Same arguments under a different type reference
    #[inline]
    #[must_use]
    pub fn renamed(&self, name: TypeRef) -> Self {
        Self {
            name,
            args: self.args.clone(),
        }
    }

    /// First integer literal argument
    #[must_use]
    pub fn first_int(&self) -> Option<i64> {
        self.args.iter().find_map(|arg| match arg {
            AnnotationArg::Int(value) => Some(*value),
            _ => None,
        })
    }

    /// First `typeof(..)` argument
    #[must_use]
    pub fn first_type_of(&self) -> Option<&TypeRef> {
        self.args.iter().find_map(|arg| match arg {
            AnnotationArg::TypeOf(ty) => Some(ty),
            _ => None,
        })
    }

    /// Member name of the first enum-member argument
    #[must_use]
    pub fn first_enum_member(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            AnnotationArg::EnumMember { member, .. } => Some(member.as_str()),
            _ => None,
        })
    }
}

/// Method parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl ParameterDecl {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }
}

fn empty_body() -> Option<Vec<String>> {
    Some(Vec::new())
}

fn void_type() -> TypeRef {
    TypeRef::Void
}

/// Method declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default = "void_type")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    /// Statement lines; `None` for a declaration without a body
    #[serde(default = "empty_body")]
    pub body: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl MethodDecl {
    /// `void` method with an empty body and nothing else
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: TypeRef::Void,
            modifiers: Vec::new(),
            annotations: Vec::new(),
            parameters: Vec::new(),
            body: empty_body(),
            span: None,
        }
    }
}

/// Kind of a type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
}

impl TypeKind {
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
        }
    }
}

/// Type declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl TypeDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            modifiers: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
            span: None,
        }
    }
}

/// One source document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Imported namespaces
    #[serde(default)]
    pub imports: Vec<String>,
    /// Annotations that apply to the whole compilation unit
    #[serde(default)]
    pub assembly_annotations: Vec<Annotation>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl Document {
    #[must_use]
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            namespace: None,
            imports: Vec::new(),
            assembly_annotations: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Structural hash of this version of the document
    ///
    /// # Errors
    /// Returns error if the document cannot be encoded
    pub fn content_hash(&self) -> Result<ContentHash, HashError> {
        ContentHash::compute_serializable(self)
    }

    /// Fully-qualified name of a declaration in this document
    #[must_use]
    pub fn qualify(&self, path: &DeclPath) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}.{path}"),
            _ => path.to_string(),
        }
    }

    /// Type declaration at a one-segment path
    #[must_use]
    pub fn type_decl(&self, path: &DeclPath) -> Option<&TypeDecl> {
        match path.segments() {
            [name] => self.types.iter().find(|t| &t.name == name),
            _ => None,
        }
    }

    /// Mutable type declaration at a one-segment path
    pub fn type_decl_mut(&mut self, path: &DeclPath) -> Option<&mut TypeDecl> {
        match path.segments() {
            [name] => self.types.iter_mut().find(|t| &t.name == name),
            _ => None,
        }
    }

    /// Method declaration at a `Type.Method` path
    #[must_use]
    pub fn method(&self, path: &DeclPath) -> Option<&MethodDecl> {
        match path.segments() {
            [ty, method] => self
                .types
                .iter()
                .find(|t| &t.name == ty)?
                .methods
                .iter()
                .find(|m| &m.name == method),
            _ => None,
        }
    }

    /// Mutable method declaration at a `Type.Method` path
    pub fn method_mut(&mut self, path: &DeclPath) -> Option<&mut MethodDecl> {
        match path.segments() {
            [ty, method] => self
                .types
                .iter_mut()
                .find(|t| &t.name == ty)?
                .methods
                .iter_mut()
                .find(|m| &m.name == method),
            _ => None,
        }
    }

    /// Every method in declaration order, with its path
    pub fn methods(&self) -> impl Iterator<Item = (DeclPath, &MethodDecl)> {
        self.types.iter().flat_map(|t| {
            t.methods
                .iter()
                .map(move |m| (DeclPath::for_method(t.name.clone(), m.name.clone()), m))
        })
    }

    /// Innermost method whose span contains `span`
    #[must_use]
    pub fn enclosing_method(&self, span: &Span) -> Option<DeclPath> {
        self.methods()
            .filter(|(_, m)| m.span.is_some_and(|s| s.contains(span)))
            .min_by_key(|(_, m)| m.span.map_or(usize::MAX, |s| s.len()))
            .map(|(path, _)| path)
    }
}
