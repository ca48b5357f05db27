//! Fix configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! fixable_diagnostic_ids = ["MVC1004"]
//! title = "Extract to convention"
//!
//! [names]
//! produces_response_type = "Microsoft.AspNetCore.Mvc.ProducesResponseTypeAttribute"
//! ```

use apiconv_symbol::WellKnownNames;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Diagnostic the fix is registered for by default
pub const DEFAULT_DIAGNOSTIC_ID: &str = "MVC1004";

/// Default code-action title
pub const DEFAULT_TITLE: &str = "Extract to convention";

/// Provider and engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    /// Diagnostic ids the provider offers the fix for
    pub fixable_diagnostic_ids: Vec<String>,
    /// Title shown for the code action
    pub title: String,
    /// Qualified names of the framework types the engine recognises
    pub names: WellKnownNames,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            fixable_diagnostic_ids: vec![DEFAULT_DIAGNOSTIC_ID.to_string()],
            title: DEFAULT_TITLE.to_string(),
            names: WellKnownNames::default(),
        }
    }
}

impl FixConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fixable diagnostic ids
    #[must_use]
    pub fn with_diagnostic_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixable_diagnostic_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_names(mut self, names: WellKnownNames) -> Self {
        self.names = names;
        self
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or fails [`FixConfig::validate`]
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or its contents are invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    /// Check that no id, title or name is empty
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixable_diagnostic_ids.is_empty() {
            return Err(ConfigError::Invalid(
                "fixable_diagnostic_ids must not be empty".to_string(),
            ));
        }
        if self.fixable_diagnostic_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::Invalid("empty diagnostic id".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(ConfigError::Invalid("title must not be empty".to_string()));
        }
        if let Some(name) = self.names.all().iter().find(|n| !is_qualified(n)) {
            return Err(ConfigError::Invalid(format!(
                "well-known name {name:?} is not a qualified type name"
            )));
        }
        Ok(())
    }

    /// True when the provider handles `id`
    #[must_use]
    pub fn is_fixable(&self, id: &str) -> bool {
        self.fixable_diagnostic_ids.iter().any(|f| f == id)
    }
}

fn is_qualified(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(|s| !s.trim().is_empty())
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
