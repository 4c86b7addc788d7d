//! Canonical dotted names and host-platform class identities
//!
//! Both ecosystems the backend bridges identify classes by dotted names, but they
//! disagree on how nesting is spelled. This module keeps the two shapes apart:
//!
//! - [`CanonicalName`]: a fully-qualified dotted name such as `kotlin.collections.List`.
//!   The empty name is the root package.
//! - [`ClassIdentity`]: a host class as a package plus a chain of nested simple
//!   names, e.g. package `java.util` with nesting `Map.Entry`.
//!
//! ## Usage
//!
//! ```
//! use lodestar_core::canonical::{CanonicalName, ClassIdentity};
//!
//! let name = CanonicalName::parse("kotlin.collections.List").unwrap();
//! assert_eq!(name.short_name(), "List");
//! assert_eq!(name.parent().unwrap().as_str(), "kotlin.collections");
//!
//! let entry = ClassIdentity::top_level("java.util.Map").nested("Entry");
//! assert_eq!(entry.as_single_name().as_str(), "java.util.Map.Entry");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An immutable fully-qualified dotted name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalName {
    text: String,
}

/// Errors that can occur while parsing a canonical name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonicalNameError {
    #[error("Empty segment in canonical name: {0:?}")]
    EmptySegment(String),
}

impl CanonicalName {
    /// The root package name
    pub fn root() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Parse a dotted name. The empty string is the root name.
    pub fn parse(text: &str) -> Result<Self, CanonicalNameError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        if text.split('.').any(str::is_empty) {
            return Err(CanonicalNameError::EmptySegment(text.to_string()));
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    /// Build a name from already-split segments, skipping empty ones
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Vec<String> = segments
            .into_iter()
            .filter(|s| !s.as_ref().is_empty())
            .map(|s| s.as_ref().to_string())
            .collect();
        Self {
            text: parts.join("."),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_root(&self) -> bool {
        self.text.is_empty()
    }

    /// Iterate over the dotted segments (none for the root name)
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.text.split('.').filter(|s| !s.is_empty())
    }

    /// Last segment, or the empty string for the root name
    pub fn short_name(&self) -> &str {
        match self.text.rfind('.') {
            Some(idx) => &self.text[idx + 1..],
            None => &self.text,
        }
    }

    /// Enclosing name, or `None` for the root name
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.text.rfind('.') {
            Some(idx) => Self {
                text: self.text[..idx].to_string(),
            },
            None => Self::root(),
        })
    }

    /// Append one segment
    pub fn child(&self, segment: &str) -> Self {
        if self.is_root() {
            Self::from(segment)
        } else {
            Self {
                text: format!("{}.{}", self.text, segment),
            }
        }
    }

    /// Whether `prefix` is this name or one of its ancestors
    pub fn starts_with(&self, prefix: &CanonicalName) -> bool {
        if prefix.is_root() || self == prefix {
            return true;
        }
        self.text.starts_with(&prefix.text) && self.text[prefix.text.len()..].starts_with('.')
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.text)
        }
    }
}

impl FromStr for CanonicalName {
    type Err = CanonicalNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CanonicalName {
    type Error = CanonicalNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CanonicalName> for String {
    fn from(name: CanonicalName) -> Self {
        name.text
    }
}

/// Lenient conversion for literal tables; empty segments are dropped.
impl From<&str> for CanonicalName {
    fn from(s: &str) -> Self {
        Self::from_segments(s.split('.'))
    }
}

/// Canonical identity of a host-platform class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassIdentity {
    /// Package of the outermost class (e.g. `java.util`)
    package: CanonicalName,
    /// Simple names from the outermost class inwards (e.g. `["Map", "Entry"]`)
    nesting: Vec<String>,
}

impl ClassIdentity {
    /// Identity of a top-level class given its fully-qualified name
    pub fn top_level(fq_name: impl Into<CanonicalName>) -> Self {
        let fq_name = fq_name.into();
        let package = fq_name.parent().unwrap_or_else(CanonicalName::root);
        Self {
            nesting: vec![fq_name.short_name().to_string()],
            package,
        }
    }

    /// Identity of a class nested directly inside this one
    pub fn nested(&self, simple_name: &str) -> Self {
        let mut nesting = self.nesting.clone();
        nesting.push(simple_name.to_string());
        Self {
            package: self.package.clone(),
            nesting,
        }
    }

    pub fn package(&self) -> &CanonicalName {
        &self.package
    }

    pub fn nesting(&self) -> &[String] {
        &self.nesting
    }

    pub fn is_nested(&self) -> bool {
        self.nesting.len() > 1
    }

    /// Flatten to one dotted name, e.g. `java.util.Map.Entry`
    pub fn as_single_name(&self) -> CanonicalName {
        let mut name = self.package.clone();
        for part in &self.nesting {
            name = name.child(part);
        }
        name
    }
}

impl fmt::Display for ClassIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_root() {
            write!(f, "{}", self.nesting.join("."))
        } else {
            write!(f, "{}/{}", self.package.as_str(), self.nesting.join("."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_name() {
        let name = CanonicalName::parse("kotlin.collections.Map.Entry").unwrap();
        assert_eq!(name.short_name(), "Entry");
        assert_eq!(
            name.segments().collect::<Vec<_>>(),
            vec!["kotlin", "collections", "Map", "Entry"]
        );
        assert!(!name.is_root());
    }

    #[test]
    fn test_parse_root() {
        let root = CanonicalName::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root.short_name(), "");
        assert_eq!(root.segments().count(), 0);
        assert!(root.parent().is_none());
        assert_eq!(format!("{}", root), "<root>");
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert_eq!(
            CanonicalName::parse("a..b"),
            Err(CanonicalNameError::EmptySegment("a..b".to_string()))
        );
        assert!(CanonicalName::parse(".a").is_err());
        assert!(CanonicalName::parse("a.").is_err());
    }

    #[test]
    fn test_parent_chain() {
        let name = CanonicalName::from("a.b.c");
        let parent = name.parent().unwrap();
        assert_eq!(parent.as_str(), "a.b");
        let grand = parent.parent().unwrap().parent().unwrap();
        assert!(grand.is_root());
    }

    #[test]
    fn test_child_of_root() {
        let name = CanonicalName::root().child("kotlin");
        assert_eq!(name.as_str(), "kotlin");
        assert_eq!(name.child("Any").as_str(), "kotlin.Any");
    }

    #[test]
    fn test_starts_with() {
        let name = CanonicalName::from("kotlin.collections.List");
        assert!(name.starts_with(&CanonicalName::from("kotlin")));
        assert!(name.starts_with(&CanonicalName::root()));
        assert!(name.starts_with(&name));
        assert!(!name.starts_with(&CanonicalName::from("kotlin.coll")));
    }

    #[test]
    fn test_lenient_from_str() {
        assert_eq!(CanonicalName::from("a..b").as_str(), "a.b");
    }

    #[test]
    fn test_serde_as_string() {
        let name = CanonicalName::from("kotlin.Any");
        let value: String = name.clone().into();
        assert_eq!(value, "kotlin.Any");
        assert_eq!(CanonicalName::try_from(value).unwrap(), name);
    }

    #[test]
    fn test_class_identity_nesting() {
        let map = ClassIdentity::top_level("java.util.Map");
        let entry = map.nested("Entry");
        assert_eq!(entry.package().as_str(), "java.util");
        assert_eq!(entry.nesting(), &["Map".to_string(), "Entry".to_string()]);
        assert!(entry.is_nested());
        assert!(!map.is_nested());
        assert_eq!(entry.as_single_name().as_str(), "java.util.Map.Entry");
        assert_eq!(format!("{}", entry), "java.util/Map.Entry");
    }

    #[test]
    fn test_class_identity_distinguishes_nesting() {
        // Same flattened text, different structure.
        let nested = ClassIdentity::top_level("a.B").nested("C");
        let top = ClassIdentity::top_level("a.B.C");
        assert_eq!(nested.as_single_name(), top.as_single_name());
        assert_ne!(nested, top);
    }
}
