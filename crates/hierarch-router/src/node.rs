//! Segment trie node.

use crate::error::RouteError;
use crate::params::Params;

/// Kind of path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal segment (e.g. `users`).
    Static,
    /// Named parameter (e.g. `{userId}`).
    Param(String),
}

/// A node of the route trie.
///
/// Static children are kept sorted for binary search; a node has at most
/// one parameter child. A node holding a target terminates a route.
#[derive(Debug, Clone)]
pub struct Node<T> {
    segment: String,
    kind: SegmentKind,
    target: Option<T>,
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            segment: segment.into(),
            kind,
            target: None,
            static_children: Vec::new(),
            param_child: None,
        }
    }

    /// Creates the root node.
    #[must_use]
    pub fn root() -> Self {
        Self::new("", SegmentKind::Static)
    }

    /// The segment text as written in the pattern.
    #[must_use]
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The segment kind.
    #[must_use]
    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// Splits a pattern such as `/users/{userId}` into typed segments.
    pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
        pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    if name.is_empty() || name.contains(&['{', '}'][..]) {
                        return Err(RouteError::InvalidPattern(pattern.to_string()));
                    }
                    Ok((s.to_string(), SegmentKind::Param(name.to_string())))
                } else if s.contains(&['{', '}'][..]) {
                    Err(RouteError::InvalidPattern(pattern.to_string()))
                } else {
                    Ok((s.to_string(), SegmentKind::Static))
                }
            })
            .collect()
    }

    /// Inserts a route below this node.
    pub(crate) fn insert(
        &mut self,
        pattern: &str,
        segments: &[(String, SegmentKind)],
        target: T,
    ) -> Result<(), RouteError> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            if self.target.is_some() {
                return Err(RouteError::Duplicate(pattern.to_string()));
            }
            self.target = Some(target);
            return Ok(());
        };

        match kind {
            SegmentKind::Static => {
                match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => self.static_children[index].insert(pattern, remaining, target),
                    Err(index) => {
                        let mut child = Node::new(segment.clone(), SegmentKind::Static);
                        child.insert(pattern, remaining, target)?;
                        self.static_children.insert(index, child);
                        Ok(())
                    }
                }
            }
            SegmentKind::Param(name) => {
                let child = self
                    .param_child
                    .get_or_insert_with(|| Box::new(Node::new(segment.clone(), kind.clone())));
                if child.kind != *kind {
                    return Err(RouteError::ConflictingParam {
                        pattern: pattern.to_string(),
                        existing: child.segment.clone(),
                        new: name.clone(),
                    });
                }
                child.insert(pattern, remaining, target)
            }
        }
    }

    /// Matches concrete path segments, collecting parameters.
    pub(crate) fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'a T> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.target.as_ref();
        };

        // Static segments win over parameters.
        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.mark();
                params.capture(name, segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.rewind(mark);
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(root: &mut Node<&'static str>, pattern: &str, target: &'static str) {
        let segments = Node::<&str>::parse_pattern(pattern).unwrap();
        root.insert(pattern, &segments, target).unwrap();
    }

    fn lookup<'a>(root: &'a Node<&'static str>, path: &str) -> Option<(&'a str, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::default();
        root.match_segments(&segments, &mut params)
            .map(|target| (*target, params))
    }

    #[test]
    fn test_parse_pattern() {
        let segments = Node::<()>::parse_pattern("/users/{userId}").unwrap();
        assert_eq!(segments[0], ("users".to_string(), SegmentKind::Static));
        assert_eq!(
            segments[1],
            ("{userId}".to_string(), SegmentKind::Param("userId".to_string()))
        );
        assert!(Node::<()>::parse_pattern("/users/{}").is_err());
        assert!(Node::<()>::parse_pattern("/users/{a").is_err());
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        insert(&mut root, "/users/me", "me");
        insert(&mut root, "/users/{userId}", "user");

        assert_eq!(lookup(&root, "/users/me").map(|(t, _)| t), Some("me"));
        let (target, params) = lookup(&root, "/users/ann").unwrap();
        assert_eq!(target, "user");
        assert_eq!(params.get("userId"), Some("ann"));
    }

    #[test]
    fn test_backtracking_drops_stale_params() {
        let mut root = Node::root();
        insert(&mut root, "/users/{userId}/books", "books");
        insert(&mut root, "/users/me/settings", "settings");
        insert(&mut root, "/{kind}/me/other", "other");

        let (target, params) = lookup(&root, "/users/me/other").unwrap();
        assert_eq!(target, "other");
        assert_eq!(params.iter().count(), 1);
        assert_eq!(params.get("kind"), Some("users"));
    }

    #[test]
    fn test_duplicate_and_conflicting_routes() {
        let mut root = Node::root();
        insert(&mut root, "/users/{userId}", "user");

        let segments = Node::<&str>::parse_pattern("/users/{userId}").unwrap();
        assert_eq!(
            root.insert("/users/{userId}", &segments, "again"),
            Err(RouteError::Duplicate("/users/{userId}".into()))
        );

        let segments = Node::<&str>::parse_pattern("/users/{id}").unwrap();
        assert!(matches!(
            root.insert("/users/{id}", &segments, "other"),
            Err(RouteError::ConflictingParam { .. })
        ));
    }

    #[test]
    fn test_no_match() {
        let mut root = Node::root();
        insert(&mut root, "/users", "users");
        assert!(lookup(&root, "/posts").is_none());
        assert!(lookup(&root, "/users/ann").is_none());
    }
}
