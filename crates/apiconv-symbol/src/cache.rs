//! Well-known symbols
//!
//! [`SymbolCache`] resolves, once per fix request, the framework types the
//! convention engine needs: the outcome annotation, the name-match and
//! type-match annotations with their behavior enums, and the convention-type
//! annotation.

use crate::index::SymbolIndex;
use crate::symbol::{SymbolError, SymbolId, TypeSymbol};
use serde::{Deserialize, Serialize};

/// Qualified names of the well-known framework types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellKnownNames {
    pub produces_response_type: String,
    pub name_match_attribute: String,
    pub name_match_behavior: String,
    pub type_match_attribute: String,
    pub type_match_behavior: String,
    pub convention_type_attribute: String,
}

impl Default for WellKnownNames {
    fn default() -> Self {
        Self {
            produces_response_type: "Microsoft.AspNetCore.Mvc.ProducesResponseTypeAttribute"
                .to_string(),
            name_match_attribute: "Microsoft.AspNetCore.Mvc.ApiConventionNameMatchAttribute"
                .to_string(),
            name_match_behavior:
                "Microsoft.AspNetCore.Mvc.ApiExplorer.ApiConventionNameMatchBehavior".to_string(),
            type_match_attribute: "Microsoft.AspNetCore.Mvc.ApiConventionTypeMatchAttribute"
                .to_string(),
            type_match_behavior:
                "Microsoft.AspNetCore.Mvc.ApiExplorer.ApiConventionTypeMatchBehavior".to_string(),
            convention_type_attribute: "Microsoft.AspNetCore.Mvc.ApiConventionTypeAttribute"
                .to_string(),
        }
    }
}

impl WellKnownNames {
    /// Every name, in field order
    #[must_use]
    pub fn all(&self) -> [&str; 6] {
        [
            self.produces_response_type.as_str(),
            self.name_match_attribute.as_str(),
            self.name_match_behavior.as_str(),
            self.type_match_attribute.as_str(),
            self.type_match_behavior.as_str(),
            self.convention_type_attribute.as_str(),
        ]
    }

    /// Register every name as a metadata type
    ///
    /// Types already declared in source are left as they are.
    ///
    /// # Errors
    /// Returns error if a name is already indexed as an operation
    pub fn register(&self, index: &SymbolIndex) -> Result<(), SymbolError> {
        for name in self.all() {
            if !index.contains_type(&SymbolId::new(name)) {
                index.register_metadata_type(name)?;
            }
        }
        Ok(())
    }
}

/// Resolved well-known types
#[derive(Debug, Clone)]
pub struct SymbolCache {
    names: WellKnownNames,
    produces_response_type: TypeSymbol,
    name_match_attribute: TypeSymbol,
    name_match_behavior: TypeSymbol,
    type_match_attribute: TypeSymbol,
    type_match_behavior: TypeSymbol,
    convention_type_attribute: TypeSymbol,
}

impl SymbolCache {
    /// Resolve every well-known name
    ///
    /// # Errors
    /// Returns [`SymbolError::MissingWellKnownType`] for the first name the
    /// index does not know
    pub fn new(index: &SymbolIndex, names: WellKnownNames) -> Result<Self, SymbolError> {
        let resolve = |name: &str| {
            index
                .get_type(&SymbolId::new(name))
                .ok_or_else(|| SymbolError::MissingWellKnownType(name.to_string()))
        };

        Ok(Self {
            produces_response_type: resolve(&names.produces_response_type)?,
            name_match_attribute: resolve(&names.name_match_attribute)?,
            name_match_behavior: resolve(&names.name_match_behavior)?,
            type_match_attribute: resolve(&names.type_match_attribute)?,
            type_match_behavior: resolve(&names.type_match_behavior)?,
            convention_type_attribute: resolve(&names.convention_type_attribute)?,
            names,
        })
    }

    #[inline]
    #[must_use]
    pub fn names(&self) -> &WellKnownNames {
        &self.names
    }

    /// Outcome-declaring annotation type
    #[inline]
    #[must_use]
    pub fn produces_response_type(&self) -> &TypeSymbol {
        &self.produces_response_type
    }

    #[inline]
    #[must_use]
    pub fn name_match_attribute(&self) -> &TypeSymbol {
        &self.name_match_attribute
    }

    #[inline]
    #[must_use]
    pub fn name_match_behavior(&self) -> &TypeSymbol {
        &self.name_match_behavior
    }

    #[inline]
    #[must_use]
    pub fn type_match_attribute(&self) -> &TypeSymbol {
        &self.type_match_attribute
    }

    #[inline]
    #[must_use]
    pub fn type_match_behavior(&self) -> &TypeSymbol {
        &self.type_match_behavior
    }

    /// Annotation that associates convention types with a type or assembly
    #[inline]
    #[must_use]
    pub fn convention_type_attribute(&self) -> &TypeSymbol {
        &self.convention_type_attribute
    }
}
