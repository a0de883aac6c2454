//! Segments captured while matching a resource path.

use smallvec::SmallVec;

/// Captures kept inline before spilling to the heap: the version segment
/// plus the ids of a three-level resource chain.
const INLINE_CAPTURES: usize = 4;

/// Path segments captured by the `{name}` parts of a matched pattern, in
/// path order.
///
/// Only the trie writes captures; callers read them back by parameter name.
///
/// # Example
///
/// ```rust
/// use hierarch_router::Router;
///
/// let mut router = Router::new();
/// router.insert("/{version}/users/{userId}", "user").unwrap();
///
/// let (_, captures) = router.match_path("/v1/users/ann").unwrap();
/// assert_eq!(captures.get("version"), Some("v1"));
/// assert_eq!(captures.get("userId"), Some("ann"));
/// assert_eq!(captures.get("bookId"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    captures: SmallVec<[(String, String); INLINE_CAPTURES]>,
}

impl Params {
    /// Returns the segment captured for a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, segment)| segment.as_str())
    }

    /// Returns `(name, segment)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captures
            .iter()
            .map(|(param, segment)| (param.as_str(), segment.as_str()))
    }

    /// Records the segment matched by a parameter node.
    pub(crate) fn capture(&mut self, name: &str, segment: &str) {
        self.captures.push((name.to_string(), segment.to_string()));
    }

    /// Position to [`rewind`](Self::rewind) to if the branch fails.
    pub(crate) fn mark(&self) -> usize {
        self.captures.len()
    }

    /// Drops captures made after `mark`.
    pub(crate) fn rewind(&mut self, mark: usize) {
        self.captures.truncate(mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_in_path_order() {
        let mut captures = Params::default();
        captures.capture("version", "v2");
        captures.capture("userId", "ann");
        assert_eq!(captures.get("userId"), Some("ann"));
        let pairs: Vec<_> = captures.iter().collect();
        assert_eq!(pairs, vec![("version", "v2"), ("userId", "ann")]);
    }

    #[test]
    fn test_rewind_drops_failed_branch() {
        let mut captures = Params::default();
        captures.capture("userId", "ann");
        let mark = captures.mark();
        captures.capture("bookId", "7");
        captures.rewind(mark);
        assert_eq!(captures.get("bookId"), None);
        assert_eq!(captures.get("userId"), Some("ann"));
        assert_eq!(captures.mark(), 1);
    }

    #[test]
    fn test_deep_chain_spills_past_inline_capacity() {
        let mut captures = Params::default();
        for level in 0..8 {
            captures.capture(&format!("level{level}Id"), &level.to_string());
        }
        assert_eq!(captures.iter().count(), 8);
        assert_eq!(captures.get("level7Id"), Some("7"));
    }
}
