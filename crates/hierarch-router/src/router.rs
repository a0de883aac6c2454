//! Router over the segment trie.

use crate::error::RouteError;
use crate::node::Node;
use crate::params::Params;

/// Maps path patterns to targets of type `T`.
///
/// Patterns are `/`-separated literal segments and `{name}` parameters.
/// Matching is O(k) in the number of path segments; literal segments take
/// priority over parameters, with backtracking when a literal branch fails.
///
/// # Example
///
/// ```rust
/// use hierarch_router::Router;
///
/// let mut router = Router::new();
/// router.insert("/users", "collection").unwrap();
/// router.insert("/users/{userId}", "item").unwrap();
///
/// let (target, params) = router.match_path("/users/ann").unwrap();
/// assert_eq!(*target, "item");
/// assert_eq!(params.get("userId"), Some("ann"));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    patterns: Vec<String>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            patterns: Vec::new(),
        }
    }

    /// Registers `target` under `pattern`.
    pub fn insert(&mut self, pattern: &str, target: T) -> Result<(), RouteError> {
        let segments = Node::<T>::parse_pattern(pattern)?;
        self.root.insert(pattern, &segments, target)?;
        self.patterns.push(pattern.to_string());
        Ok(())
    }

    /// Matches a concrete path, returning its target and parameters.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&T, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::default();
        let target = self.root.match_segments(&segments, &mut params)?;
        Some((target, params))
    }

    /// Registered patterns, in registration order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nested_resources() {
        let mut router = Router::new();
        router.insert("/users", 1).unwrap();
        router.insert("/users/{userId}", 2).unwrap();
        router.insert("/users/{userId}/books", 3).unwrap();
        router.insert("/users/{userId}/books/{bookId}", 4).unwrap();

        let (target, params) = router.match_path("/users/ann/books/7").unwrap();
        assert_eq!(*target, 4);
        assert_eq!(params.get("userId"), Some("ann"));
        assert_eq!(params.get("bookId"), Some("7"));

        let (target, params) = router.match_path("/users/ann/books").unwrap();
        assert_eq!(*target, 3);
        assert_eq!(params.iter().count(), 1);

        assert!(router.match_path("/users/ann/cars").is_none());
        assert_eq!(router.len(), 4);
    }

    #[test]
    fn test_trailing_and_repeated_slashes_are_ignored() {
        let mut router = Router::new();
        router.insert("/users/{userId}", ()).unwrap();
        assert!(router.match_path("/users/ann/").is_some());
        assert!(router.match_path("//users//ann").is_some());
    }

    #[test]
    fn test_duplicate_is_rejected_and_not_listed() {
        let mut router = Router::new();
        router.insert("/users", 1).unwrap();
        assert_eq!(
            router.insert("/users/", 2),
            Err(RouteError::Duplicate("/users/".into()))
        );
        assert_eq!(router.patterns(), ["/users"]);
    }

    proptest! {
        #[test]
        fn prop_param_captures_any_segment(id in "[A-Za-z0-9_.-]{1,16}") {
            let mut router = Router::new();
            router.insert("/users/{userId}", ()).unwrap();
            let path = format!("/users/{id}");
            let (_, params) = router.match_path(&path).unwrap();
            prop_assert_eq!(params.get("userId"), Some(id.as_str()));
        }
    }
}
