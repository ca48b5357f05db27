//! Convention declaration fragments
//!
//! Builds the annotations and method skeletons a fix inserts. Nothing here
//! knows where the fragments end up; every framework name is emitted as a
//! simplifiable qualified name and shortened by the renderer.

use crate::metadata::ActualOutcome;
use crate::naming::{convention_operation_name, convention_parameter_name};
use apiconv_source::{Annotation, AnnotationArg, MethodDecl, Modifier, ParameterDecl, TypeRef};
use apiconv_symbol::{OperationSymbol, WellKnownNames};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// How a convention method or parameter name is compared with an operation's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NameMatchBehavior {
    #[default]
    Exact,
    Prefix,
    Suffix,
    Any,
}

impl NameMatchBehavior {
    /// Enum member name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "Exact",
            Self::Prefix => "Prefix",
            Self::Suffix => "Suffix",
            Self::Any => "Any",
        }
    }
}

impl Display for NameMatchBehavior {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NameMatchBehavior {
    type Err = UnknownBehavior;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Exact" => Ok(Self::Exact),
            "Prefix" => Ok(Self::Prefix),
            "Suffix" => Ok(Self::Suffix),
            "Any" => Ok(Self::Any),
            other => Err(UnknownBehavior(other.to_string())),
        }
    }
}

/// How a convention parameter type is compared with an operation's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypeMatchBehavior {
    #[default]
    AssignableFrom,
    Any,
}

impl TypeMatchBehavior {
    /// Enum member name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AssignableFrom => "AssignableFrom",
            Self::Any => "Any",
        }
    }
}

impl Display for TypeMatchBehavior {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeMatchBehavior {
    type Err = UnknownBehavior;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AssignableFrom" => Ok(Self::AssignableFrom),
            "Any" => Ok(Self::Any),
            other => Err(UnknownBehavior(other.to_string())),
        }
    }
}

/// Member name that is not part of a behavior enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown match behavior: {0}")]
pub struct UnknownBehavior(pub String);

/// Builds convention fragments against a set of well-known names
#[derive(Debug, Clone, Copy)]
pub struct ConventionSyntax<'a> {
    names: &'a WellKnownNames,
}

impl<'a> ConventionSyntax<'a> {
    #[inline]
    #[must_use]
    pub fn new(names: &'a WellKnownNames) -> Self {
        Self { names }
    }

    /// Outcome annotation type, as a simplifiable reference
    #[inline]
    #[must_use]
    pub fn outcome_type(&self) -> TypeRef {
        TypeRef::simplifiable(self.names.produces_response_type.clone())
    }

    /// `[ProducesResponseType(status)]` documenting `outcome`
    #[must_use]
    pub fn outcome_annotation(&self, outcome: &ActualOutcome) -> Annotation {
        Annotation::new(self.outcome_type())
            .with_arg(AnnotationArg::Int(i64::from(outcome.documented_status())))
    }

    /// `[ApiConventionNameMatch(ApiConventionNameMatchBehavior.X)]`
    #[must_use]
    pub fn name_match_annotation(&self, behavior: NameMatchBehavior) -> Annotation {
        Annotation::new(TypeRef::simplifiable(self.names.name_match_attribute.clone())).with_arg(
            AnnotationArg::EnumMember {
                enum_type: TypeRef::simplifiable(self.names.name_match_behavior.clone()),
                member: behavior.to_string(),
            },
        )
    }

    /// `[ApiConventionTypeMatch(ApiConventionTypeMatchBehavior.X)]`
    #[must_use]
    pub fn type_match_annotation(&self, behavior: TypeMatchBehavior) -> Annotation {
        Annotation::new(TypeRef::simplifiable(self.names.type_match_attribute.clone())).with_arg(
            AnnotationArg::EnumMember {
                enum_type: TypeRef::simplifiable(self.names.type_match_behavior.clone()),
                member: behavior.to_string(),
            },
        )
    }

    /// Signature-only convention method matching `operation`
    ///
    /// Annotations come in order: `carried`, one outcome annotation per
    /// `undocumented` entry, then name-match `Prefix`. Every parameter is the
    /// wildcard type, named by its trailing segment, and matched by `Suffix`
    /// name and `Any` type.
    #[must_use]
    pub fn convention_method(
        &self,
        operation: &OperationSymbol,
        carried: Vec<Annotation>,
        undocumented: &[ActualOutcome],
    ) -> MethodDecl {
        let mut method = MethodDecl::new(convention_operation_name(&operation.name));
        method.modifiers = vec![Modifier::Public, Modifier::Static];
        method.return_type = TypeRef::Void;
        method.body = Some(Vec::new());

        method.annotations = carried;
        method
            .annotations
            .extend(undocumented.iter().map(|o| self.outcome_annotation(o)));
        method
            .annotations
            .push(self.name_match_annotation(NameMatchBehavior::Prefix));

        method.parameters = operation
            .parameters
            .iter()
            .map(|p| {
                let mut param = ParameterDecl::new(convention_parameter_name(&p.name), TypeRef::Any);
                param.annotations = vec![
                    self.name_match_annotation(NameMatchBehavior::Suffix),
                    self.type_match_annotation(TypeMatchBehavior::Any),
                ];
                param
            })
            .collect();

        method
    }
}
