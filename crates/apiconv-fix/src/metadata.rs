//! Declared vs. actual response outcomes

use apiconv_source::Annotation;
use apiconv_symbol::SymbolId;
use serde::{Deserialize, Serialize};

/// Status implied when an operation declares nothing
pub const IMPLICIT_STATUS: i32 = 200;

/// Statuses that document a default response
pub const DEFAULT_RESPONSE_STATUSES: [i32; 2] = [200, 201];

/// One outcome documented by an annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredOutcome {
    pub status_code: i32,
    /// Annotation instance that declared the outcome
    pub declaration_site: Annotation,
    /// Operation the annotation physically sits on; a convention method when
    /// the outcome is inherited
    pub declaring_operation: SymbolId,
}

impl DeclaredOutcome {
    #[inline]
    #[must_use]
    pub fn new(status_code: i32, declaration_site: Annotation, declaring_operation: SymbolId) -> Self {
        Self {
            status_code,
            declaration_site,
            declaring_operation,
        }
    }
}

/// One outcome the implementation actually produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActualOutcome {
    /// Meaningless when `is_default_response` is set
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub is_default_response: bool,
}

impl ActualOutcome {
    /// Explicit status literal
    #[inline]
    #[must_use]
    pub const fn status(status_code: i32) -> Self {
        Self {
            status_code,
            is_default_response: false,
        }
    }

    /// Catch-all success inferred from the return type
    #[inline]
    #[must_use]
    pub const fn default_response() -> Self {
        Self {
            status_code: 0,
            is_default_response: true,
        }
    }

    /// Status an annotation documenting this outcome carries
    #[inline]
    #[must_use]
    pub const fn documented_status(&self) -> i32 {
        if self.is_default_response {
            IMPLICIT_STATUS
        } else {
            self.status_code
        }
    }
}

/// True when `actual` is documented by `declared`
///
/// An empty declaration implies a single 200. A default response is
/// documented by a declared 200 or 201; anything else needs an equal status.
#[must_use]
pub fn has_declared_match(declared: &[DeclaredOutcome], actual: &ActualOutcome) -> bool {
    if declared.is_empty() {
        return actual.is_default_response || actual.status_code == IMPLICIT_STATUS;
    }

    declared.iter().any(|d| {
        if actual.is_default_response {
            DEFAULT_RESPONSE_STATUSES.contains(&d.status_code)
        } else {
            actual.status_code == d.status_code
        }
    })
}

/// Actual outcomes without a declared match, in input order
#[must_use]
pub fn compute_undocumented(declared: &[DeclaredOutcome], actual: &[ActualOutcome]) -> Vec<ActualOutcome> {
    actual
        .iter()
        .filter(|a| !has_declared_match(declared, a))
        .copied()
        .collect()
}
