//! API convention fix engine
//!
//! Finds response outcomes an operation produces but does not document, and
//! moves their documentation into a reusable convention method.
//!
//! # Core Concepts
//!
//! - [`ConventionFix`]: Lazily computed, memoized fix for one diagnostic
//! - [`FixStrategy`]: One way of documenting outcomes; declines or returns a plan
//! - [`StrategyChain`]: Strategies in priority order, first applied wins
//! - [`UpdateExistingConventionMethod`]: Extends the convention that already applies
//! - [`AddConventionMethod`]: Re-homes the operation's outcomes into a new convention
//! - [`ExtractToConventionProvider`]: Creates fixes for configured diagnostics
//!
//! Collaborators that read declared and actual outcomes, convention types
//! and documents are traits in [`collectors`], with annotation-based
//! defaults.
//!
//! # Example
//!
//! ```rust,ignore
//! use apiconv_fix::{ConventionFix, Diagnostic, FixHost};
//! use tokio_util::sync::CancellationToken;
//!
//! let fix = ConventionFix::new(host, diagnostic);
//! if let Some(result) = fix.compute(&CancellationToken::new()).await? {
//!     for changed in result.documents() {
//!         println!("{}\n{}", changed.id, changed.text);
//!     }
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod collectors;
pub mod config;

mod add_method;
mod chain;
mod context;
mod error;
mod fix;
mod metadata;
mod naming;
mod provider;
mod strategy;
mod syntax;
mod update_existing;

// Re-exports
pub use add_method::AddConventionMethod;
pub use chain::StrategyChain;
pub use collectors::{
    ActualOutcomeCollector, AnnotatedConventionTypes, AnnotationDeclaredOutcomes,
    ConventionMatcher, ConventionTypeLookup, DeclaredOutcomeCollector, DocumentProvider,
    RecordedActualOutcomes,
};
pub use config::{ConfigError, FixConfig};
pub use context::{FixContext, FixHost};
pub use error::FixError;
pub use fix::{ConventionFix, EditResult};
pub use metadata::{
    compute_undocumented, has_declared_match, ActualOutcome, DeclaredOutcome,
    DEFAULT_RESPONSE_STATUSES, IMPLICIT_STATUS,
};
pub use naming::{boundaries, convention_operation_name, convention_parameter_name, first_boundary};
pub use provider::{Diagnostic, ExtractToConventionProvider};
pub use strategy::{DeclineReason, FixStrategy, StrategyOutcome};
pub use syntax::{ConventionSyntax, NameMatchBehavior, TypeMatchBehavior, UnknownBehavior};
pub use update_existing::UpdateExistingConventionMethod;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting the fix
    pub use crate::{
        ActualOutcome, ConventionFix, Diagnostic, EditResult, ExtractToConventionProvider,
        FixConfig, FixError, FixHost, RecordedActualOutcomes,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
