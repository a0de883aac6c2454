//! Authenticated caller identity and its role set.
//!
//! An [`Identity`] is produced by the credential collaborator once per request
//! and may be shared between concurrent requests. Its roles are normalised at
//! construction into a [`SortedRoles`] list (sorted ascending, duplicates
//! removed), so every later query is read-only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sorted, duplicate-free list of role names.
///
/// Role lists are tiny (usually fewer than ten entries) and very often
/// arrive already sorted, so normalisation uses insertion sort: linear on
/// sorted input and faster than a general sort for small `n`.
///
/// # Example
///
/// ```
/// use hierarch_core::SortedRoles;
///
/// let roles = SortedRoles::from_unsorted(["user", "admin", "user"]);
/// assert_eq!(roles.as_slice(), ["admin", "user"]);
/// assert!(roles.contains("admin"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SortedRoles(Vec<String>);

impl SortedRoles {
    /// Creates an empty role list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts and de-duplicates the given roles.
    pub fn from_unsorted<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        insertion_sort(&mut roles);
        roles.dedup();
        Self(roles)
    }

    /// Returns `true` if `role` is present. O(log n).
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.0
            .binary_search_by(|candidate| candidate.as_str().cmp(role))
            .is_ok()
    }

    /// Returns the roles in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns an iterator over the roles in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of distinct roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for SortedRoles {
    fn from(roles: Vec<String>) -> Self {
        Self::from_unsorted(roles)
    }
}

impl From<SortedRoles> for Vec<String> {
    fn from(roles: SortedRoles) -> Self {
        roles.0
    }
}

impl<S: Into<String>> FromIterator<S> for SortedRoles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_unsorted(iter)
    }
}

fn insertion_sort(values: &mut [String]) {
    for i in 1..values.len() {
        let mut j = i;
        while j > 0 && values[j - 1] > values[j] {
            values.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// An authenticated principal.
///
/// # Example
///
/// ```
/// use hierarch_core::Identity;
///
/// let identity = Identity::new("ann", "Ann", ["user"]);
/// assert!(identity.has_role("user"));
/// assert!(!identity.has_role("admin"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: String,
    name: String,
    roles: SortedRoles,
}

impl Identity {
    /// Creates an identity; `roles` may be unsorted and contain duplicates.
    pub fn new<I, S>(user_id: impl Into<String>, name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            roles: SortedRoles::from_unsorted(roles),
        }
    }

    /// The caller's stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the caller holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// The caller's roles, sorted ascending without duplicates.
    #[must_use]
    pub fn sorted_roles(&self) -> &SortedRoles {
        &self.roles
    }

    /// Identifier suitable for log fields. Never contains credentials.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("user:{}", self.user_id)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.user_id)
    }
}
