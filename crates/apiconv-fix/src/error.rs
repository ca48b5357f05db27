//! Error types for the convention fix
//!
//! "No fix available" is never an error: unclassifiable bodies, declined
//! strategies and missing conventions all surface as `Ok(None)`. Errors are
//! reserved for:
//! - Cancellation
//! - Host failures (documents that cannot be loaded, stale edit bases)
//! - Invalid configuration

use crate::config::ConfigError;
use apiconv_source::{DocumentId, EditError};
use apiconv_symbol::SymbolError;

/// Main fix error type
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// Cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// A document the fix needs is not available from the host
    #[error("document not available: {0}")]
    DocumentUnavailable(DocumentId),

    /// Collaborator failure reported by the host
    #[error("host error: {0}")]
    Host(String),

    /// Symbol layer failure
    #[error("symbol error: {0}")]
    Symbol(#[from] SymbolError),

    /// The edit plan could not be applied
    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FixError {
    /// Create a host error
    #[inline]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }

    /// Check if the error is a cancellation
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if a retry with fresh inputs may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Edit(EditError::BaseMismatch { .. })
        )
    }
}
