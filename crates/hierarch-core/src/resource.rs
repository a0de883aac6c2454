//! Hierarchical resource addressing.
//!
//! A request addresses an ordered [`ResourceChain`] from the root ancestor to
//! the target. Parent links are indices into the chain rather than
//! references, so a chain is a plain owned value.

use crate::error::{SetupError, SetupResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How a resource level parses its path identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdFormat {
    /// Any non-empty string.
    #[default]
    Opaque,
    /// A signed 64-bit integer.
    Integer,
    /// A hyphenated or simple UUID.
    Uuid,
}

impl IdFormat {
    /// Returns `true` if `raw` is a valid identifier in this format.
    #[must_use]
    pub fn accepts(self, raw: &str) -> bool {
        if raw.is_empty() {
            return false;
        }
        match self {
            Self::Opaque => true,
            Self::Integer => raw.parse::<i64>().is_ok(),
            Self::Uuid => Uuid::parse_str(raw).is_ok(),
        }
    }
}

/// Opaque, immutable resource identifier.
///
/// # Example
///
/// ```
/// use hierarch_core::{IdFormat, ResourceId};
///
/// let id = ResourceId::parse("42", IdFormat::Integer).unwrap();
/// assert_eq!(id.as_i64(), Some(42));
/// assert!(ResourceId::parse("x", IdFormat::Integer).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wraps a raw identifier without checking its format.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parses `raw` under `format`.
    #[must_use]
    pub fn parse(raw: &str, format: IdFormat) -> Option<Self> {
        format.accepts(raw).then(|| Self(raw.to_string()))
    }

    /// The raw string value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Parses the identifier into any `FromStr` type.
    pub fn parse_as<T: FromStr>(&self) -> Result<T, T::Err> {
        self.0.parse()
    }

    /// The identifier as an integer, if it is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.parse_as().ok()
    }

    /// The identifier as a UUID, if it is one.
    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.0).ok()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One addressable node of a request's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    resource_type: String,
    id: ResourceId,
    parent: Option<usize>,
}

impl Resource {
    /// Plural resource-type name (e.g. `users`).
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// The resource's identifier.
    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Index of the parent within the owning chain.
    #[must_use]
    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }
}

/// Resources addressed by one request, root first.
///
/// For item requests the last entry is the target; for collection requests
/// (`GET_ALL`, `POST`) the chain holds only the ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceChain {
    resources: Vec<Resource>,
    targets_item: bool,
}

impl ResourceChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next level; its parent is the previous entry.
    pub fn push(&mut self, resource_type: impl Into<String>, id: ResourceId) {
        let parent = self.resources.len().checked_sub(1);
        self.resources.push(Resource {
            resource_type: resource_type.into(),
            id,
            parent,
        });
    }

    /// Marks whether the last entry is the request's target.
    #[must_use]
    pub fn with_target(mut self, targets_item: bool) -> Self {
        self.targets_item = targets_item;
        self
    }

    /// The addressed resource, for item requests.
    #[must_use]
    pub fn target(&self) -> Option<&Resource> {
        if self.targets_item {
            self.resources.last()
        } else {
            None
        }
    }

    /// Looks up the chain entry for a resource type.
    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|resource| resource.resource_type == resource_type)
    }

    /// Parent of `resource` within this chain.
    #[must_use]
    pub fn parent_of(&self, resource: &Resource) -> Option<&Resource> {
        resource.parent.and_then(|index| self.resources.get(index))
    }

    /// All entries, root first.
    #[must_use]
    pub fn as_slice(&self) -> &[Resource] {
        &self.resources
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Normalises a route prefix to a leading `/` and no trailing `/`; the root
/// is the empty string.
///
/// # Errors
///
/// Returns [`SetupError::InvalidBasePath`] if the prefix has an empty
/// segment, a `{`/`}` or whitespace inside it.
///
/// # Example
///
/// ```
/// use hierarch_core::normalize_base_path;
///
/// assert_eq!(normalize_base_path("api/").unwrap(), "/api");
/// assert_eq!(normalize_base_path("/").unwrap(), "");
/// assert!(normalize_base_path("/{tenant}").is_err());
/// ```
pub fn normalize_base_path(raw: &str) -> SetupResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let path = if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    if path.contains("//") || path.contains(&['{', '}'][..]) || path.chars().any(char::is_whitespace)
    {
        return Err(SetupError::InvalidBasePath {
            path: raw.to_string(),
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ResourceChain {
        let mut chain = ResourceChain::new();
        chain.push("users", ResourceId::new("ann"));
        chain.push("books", ResourceId::new("7"));
        chain.with_target(true)
    }

    #[test]
    fn test_id_formats() {
        assert!(IdFormat::Opaque.accepts("ann"));
        assert!(!IdFormat::Opaque.accepts(""));
        assert!(IdFormat::Integer.accepts("-12"));
        assert!(!IdFormat::Integer.accepts("12a"));
        assert!(IdFormat::Uuid.accepts("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!IdFormat::Uuid.accepts("not-a-uuid"));
    }

    #[test]
    fn test_typed_accessors() {
        let id = ResourceId::new("67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert!(id.as_uuid().is_some());
        assert!(id.as_i64().is_none());
        assert_eq!(ResourceId::new("5").parse_as::<u8>(), Ok(5));
    }

    #[test]
    fn test_chain_navigation() {
        let chain = chain();
        assert_eq!(chain.len(), 2);
        let target = chain.target().expect("item request has a target");
        assert_eq!(target.resource_type(), "books");
        let parent = chain.parent_of(target).expect("books is nested");
        assert_eq!(parent.id().value(), "ann");
        assert!(chain.parent_of(parent).is_none());
        assert_eq!(chain.get("users").map(|r| r.id().value()), Some("ann"));
    }

    #[test]
    fn test_collection_chain_has_no_target() {
        let mut chain = ResourceChain::new();
        chain.push("users", ResourceId::new("ann"));
        assert!(chain.target().is_none());
        assert!(chain.get("users").is_some());
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("").unwrap(), "");
        assert_eq!(normalize_base_path("/").unwrap(), "");
        assert_eq!(normalize_base_path(" api/ ").unwrap(), "/api");
        assert_eq!(normalize_base_path("/api/v").unwrap(), "/api/v");
        assert!(matches!(
            normalize_base_path("/a//b"),
            Err(SetupError::InvalidBasePath { path }) if path == "/a//b"
        ));
        assert!(normalize_base_path("/{x}").is_err());
        assert!(normalize_base_path("/my api").is_err());
    }
}
