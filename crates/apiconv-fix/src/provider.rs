//! Code-fix provider
//!
//! Decides which diagnostics get an "Extract to convention" action and
//! creates the deferred [`ConventionFix`] for them.

use crate::config::FixConfig;
use crate::context::FixHost;
use crate::fix::ConventionFix;
use apiconv_source::{DocumentId, Span};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Diagnostic reported against a span of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub document: DocumentId,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(id: impl Into<String>, document: DocumentId, span: Span) -> Self {
        Self {
            id: id.into(),
            document,
            span,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}..{}",
            self.id, self.document, self.span.start, self.span.end
        )
    }
}

/// Offers the convention fix for configured diagnostics
#[derive(Debug, Clone, Default)]
pub struct ExtractToConventionProvider {
    config: Arc<FixConfig>,
}

impl ExtractToConventionProvider {
    #[must_use]
    pub fn new(config: Arc<FixConfig>) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &FixConfig {
        &self.config
    }

    /// Diagnostic ids this provider handles
    #[inline]
    #[must_use]
    pub fn fixable_diagnostic_ids(&self) -> &[String] {
        &self.config.fixable_diagnostic_ids
    }

    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Create a fix for the first of a document's diagnostics
    ///
    /// Only the first diagnostic is considered; `None` when there is none
    /// or its id is not fixable. Nothing is computed until the returned
    /// fix is asked for its result. The configured well-known names replace
    /// the host's.
    #[must_use]
    pub fn register(&self, diagnostics: &[Diagnostic], mut host: FixHost) -> Option<ConventionFix> {
        let diagnostic = diagnostics.first()?;
        if !self.config.is_fixable(&diagnostic.id) {
            tracing::debug!("ignoring diagnostic {diagnostic}");
            return None;
        }
        host.names = self.config.names.clone();

        tracing::debug!("registering '{}' for {diagnostic}", self.title());
        Some(ConventionFix::new(host, diagnostic.clone()).with_title(self.title()))
    }
}
