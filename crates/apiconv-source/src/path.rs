//! Declaration paths
//!
//! A [`DeclPath`] addresses a declaration inside one document: `Type` for a
//! type declaration, `Type.Method` for a method. Edit operations target
//! declarations through these paths rather than through text offsets, so a
//! plan stays meaningful until the document it was built against changes.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path of a declaration within a document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeclPath(Vec<String>);

impl DeclPath {
    /// Path from raw segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path of a type declaration
    #[inline]
    #[must_use]
    pub fn for_type(type_name: impl Into<String>) -> Self {
        Self(vec![type_name.into()])
    }

    /// Path of a method declared in `type_name`
    #[inline]
    #[must_use]
    pub fn for_method(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self(vec![type_name.into(), method_name.into()])
    }

    /// Path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty (document root) path
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment, returning a new path
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl Display for DeclPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for DeclPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg.contains(|c: char| !c.is_alphanumeric() && c != '_') {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<String>> for DeclPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl serde::Serialize for DeclPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for DeclPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors related to declaration paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// `a..b`
    #[error("path contains empty segment")]
    EmptySegment,

    /// Segment is not an identifier
    #[error("invalid segment: {0} (must be alphanumeric or underscore)")]
    InvalidSegment(String),
}
