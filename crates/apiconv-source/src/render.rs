//! Text rendering
//!
//! Turns a [`Document`] back into source text. Fully-qualified names marked
//! as simplifiable are shortened when the document imports (or lives in) the
//! namespace that declares them, and annotation names drop their
//! `Attribute` suffix when shortened.

use crate::syntax::{Annotation, AnnotationArg, Document, MethodDecl, TypeDecl, TypeRef};
use std::fmt::Write;

const INDENT: &str = "    ";
const ATTRIBUTE_SUFFIX: &str = "Attribute";

/// Render a whole document
#[must_use]
pub fn render_document(document: &Document) -> String {
    Renderer::new(document).render()
}

/// Renders one document; holds the import context used for simplification
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    document: &'a Document,
}

impl<'a> Renderer<'a> {
    #[inline]
    #[must_use]
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// True when names from `namespace` can be written unqualified
    #[must_use]
    pub fn namespace_in_scope(&self, namespace: &str) -> bool {
        if self.document.imports.iter().any(|i| i == namespace) {
            return true;
        }
        match &self.document.namespace {
            Some(own) => own == namespace || own.starts_with(&format!("{namespace}.")),
            None => false,
        }
    }

    /// Shortest spelling of a qualified name in this document
    #[must_use]
    pub fn simplify(&self, qualified: &str) -> String {
        match qualified.rsplit_once('.') {
            Some((namespace, simple)) if self.namespace_in_scope(namespace) => simple.to_string(),
            _ => qualified.to_string(),
        }
    }

    /// Spelling of a type reference
    #[must_use]
    pub fn type_name(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Void => "void".to_string(),
            TypeRef::Any => "object".to_string(),
            TypeRef::Named {
                name,
                simplify: true,
            } => self.simplify(name),
            TypeRef::Named {
                name,
                simplify: false,
            } => name.clone(),
        }
    }

    /// Spelling of an annotation's name
    #[must_use]
    pub fn annotation_name(&self, ty: &TypeRef) -> String {
        let name = self.type_name(ty);
        match ty {
            TypeRef::Named { simplify: true, .. } => match name.strip_suffix(ATTRIBUTE_SUFFIX) {
                Some(stripped) if !stripped.is_empty() && !stripped.ends_with('.') => {
                    stripped.to_string()
                }
                _ => name,
            },
            _ => name,
        }
    }

    /// `Name(arg, ...)` without brackets
    #[must_use]
    pub fn annotation(&self, annotation: &Annotation) -> String {
        let name = self.annotation_name(&annotation.name);
        if annotation.args.is_empty() {
            return name;
        }
        let args: Vec<String> = annotation.args.iter().map(|a| self.argument(a)).collect();
        format!("{name}({})", args.join(", "))
    }

    fn argument(&self, arg: &AnnotationArg) -> String {
        match arg {
            AnnotationArg::Int(value) => value.to_string(),
            AnnotationArg::EnumMember { enum_type, member } => {
                format!("{}.{member}", self.type_name(enum_type))
            }
            AnnotationArg::TypeOf(ty) => format!("typeof({})", self.type_name(ty)),
            AnnotationArg::Expr(expr) => expr.clone(),
        }
    }

    /// Render the document
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let doc = self.document;

        for import in &doc.imports {
            let _ = writeln!(out, "using {import};");
        }
        if !doc.imports.is_empty() {
            out.push('\n');
        }

        for annotation in &doc.assembly_annotations {
            let _ = writeln!(out, "[assembly: {}]", self.annotation(annotation));
        }
        if !doc.assembly_annotations.is_empty() {
            out.push('\n');
        }

        let depth = match &doc.namespace {
            Some(ns) => {
                let _ = writeln!(out, "namespace {ns}\n{{");
                1
            }
            None => 0,
        };

        for (i, ty) in doc.types.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.render_type(&mut out, ty, depth);
        }

        if doc.namespace.is_some() {
            out.push_str("}\n");
        }
        out
    }

    fn render_type(&self, out: &mut String, ty: &TypeDecl, depth: usize) {
        let pad = INDENT.repeat(depth);
        for annotation in &ty.annotations {
            let _ = writeln!(out, "{pad}[{}]", self.annotation(annotation));
        }
        let _ = writeln!(
            out,
            "{pad}{}{} {}\n{pad}{{",
            modifiers_prefix(ty.modifiers.iter().map(|m| m.keyword())),
            ty.kind.keyword(),
            ty.name
        );
        for (i, method) in ty.methods.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.render_method(out, method, depth + 1);
        }
        let _ = writeln!(out, "{pad}}}");
    }

    fn render_method(&self, out: &mut String, method: &MethodDecl, depth: usize) {
        let pad = INDENT.repeat(depth);
        for annotation in &method.annotations {
            let _ = writeln!(out, "{pad}[{}]", self.annotation(annotation));
        }

        let params: Vec<String> = method
            .parameters
            .iter()
            .map(|p| {
                let ty = self.type_name(&p.ty);
                if p.annotations.is_empty() {
                    format!("{ty} {}", p.name)
                } else {
                    let annotations: Vec<String> =
                        p.annotations.iter().map(|a| self.annotation(a)).collect();
                    format!("[{}] {ty} {}", annotations.join(", "), p.name)
                }
            })
            .collect();

        let signature = format!(
            "{}{} {}({})",
            modifiers_prefix(method.modifiers.iter().map(|m| m.keyword())),
            self.type_name(&method.return_type),
            method.name,
            params.join(", ")
        );

        match &method.body {
            None => {
                let _ = writeln!(out, "{pad}{signature};");
            }
            Some(lines) => {
                let _ = writeln!(out, "{pad}{signature}\n{pad}{{");
                for line in lines {
                    let _ = writeln!(out, "{pad}{INDENT}{line}");
                }
                let _ = writeln!(out, "{pad}}}");
            }
        }
    }
}

fn modifiers_prefix<'m>(keywords: impl Iterator<Item = &'m str>) -> String {
    keywords.map(|k| format!("{k} ")).collect()
}
