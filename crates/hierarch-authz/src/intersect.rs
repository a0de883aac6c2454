//! Merge-join intersection of sorted role lists.
//!
//! Both inputs are sorted ascending without duplicates (see
//! [`SortedRoles`]), so the intersection is a single linear walk with one
//! cursor per list: O(|a| + |b|) comparisons, no allocation until collected.

use hierarch_core::SortedRoles;
use std::cmp::Ordering;

/// Iterator over the common elements of two sorted slices.
#[derive(Debug, Clone)]
pub struct SortedIntersection<'a> {
    left: &'a [String],
    right: &'a [String],
    steps: usize,
}

impl<'a> SortedIntersection<'a> {
    /// Creates the iterator. Both slices must be sorted ascending.
    #[must_use]
    pub fn new(left: &'a [String], right: &'a [String]) -> Self {
        Self {
            left,
            right,
            steps: 0,
        }
    }

    /// Comparisons performed so far.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl<'a> Iterator for SortedIntersection<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let (Some((l, left_rest)), Some((r, right_rest))) =
            (self.left.split_first(), self.right.split_first())
        {
            self.steps += 1;
            match l.cmp(r) {
                Ordering::Equal => {
                    self.left = left_rest;
                    self.right = right_rest;
                    return Some(l.as_str());
                }
                Ordering::Less => self.left = left_rest,
                Ordering::Greater => self.right = right_rest,
            }
        }
        None
    }
}

/// Roles present in both lists, ascending.
///
/// # Example
///
/// ```
/// use hierarch_authz::matching_roles;
/// use hierarch_core::SortedRoles;
///
/// let supported = SortedRoles::from_unsorted(["admin", "user"]);
/// let caller = SortedRoles::from_unsorted(["user", "auditor"]);
/// assert_eq!(matching_roles(&supported, &caller), ["user"]);
/// ```
#[must_use]
pub fn matching_roles(supported: &SortedRoles, caller: &SortedRoles) -> Vec<String> {
    SortedIntersection::new(supported.as_slice(), caller.as_slice())
        .map(str::to_string)
        .collect()
}

/// Returns true if the lists share at least one role.
#[must_use]
pub fn has_overlap(supported: &SortedRoles, caller: &SortedRoles) -> bool {
    SortedIntersection::new(supported.as_slice(), caller.as_slice())
        .next()
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn roles(values: &[&str]) -> SortedRoles {
        SortedRoles::from_unsorted(values.iter().copied())
    }

    #[test]
    fn test_basic_intersection() {
        assert_eq!(
            matching_roles(&roles(&["a", "c", "e"]), &roles(&["b", "c", "d", "e"])),
            ["c", "e"]
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matching_roles(&roles(&[]), &roles(&["a"])).is_empty());
        assert!(matching_roles(&roles(&["a"]), &roles(&[])).is_empty());
        assert!(!has_overlap(&roles(&[]), &roles(&[])));
    }

    #[test]
    fn test_disjoint() {
        assert!(!has_overlap(&roles(&["admin"]), &roles(&["user"])));
    }

    proptest! {
        #[test]
        fn prop_equals_set_intersection(
            a in proptest::collection::vec("[a-h]{1,2}", 0..16),
            b in proptest::collection::vec("[a-h]{1,2}", 0..16),
        ) {
            let supported = SortedRoles::from_unsorted(a.clone());
            let caller = SortedRoles::from_unsorted(b.clone());

            let expected: Vec<String> = a
                .into_iter()
                .collect::<BTreeSet<_>>()
                .intersection(&b.into_iter().collect::<BTreeSet<_>>())
                .cloned()
                .collect();
            prop_assert_eq!(matching_roles(&supported, &caller), expected);

            let mut walk = SortedIntersection::new(supported.as_slice(), caller.as_slice());
            while walk.next().is_some() {}
            prop_assert!(walk.steps() <= supported.len() + caller.len());
        }
    }
}
