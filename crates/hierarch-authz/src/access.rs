//! Per-method access requirements.

use hierarch_core::SortedRoles;
use serde::{Deserialize, Serialize};

/// Authentication and role requirements of one resource method.
///
/// An empty role list means any authenticated caller is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAccessInfo {
    authenticated: bool,
    supported_roles: SortedRoles,
}

impl ResourceAccessInfo {
    /// Creates access info; roles are sorted and de-duplicated here.
    pub fn new<I, S>(authenticated: bool, supported_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authenticated,
            supported_roles: SortedRoles::from_unsorted(supported_roles),
        }
    }

    /// No authentication required.
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    /// Any authenticated caller, whatever its roles.
    #[must_use]
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            supported_roles: SortedRoles::new(),
        }
    }

    /// Whether callers must authenticate.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Roles allowed to call the method, sorted ascending.
    #[must_use]
    pub fn supported_roles(&self) -> &SortedRoles {
        &self.supported_roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_are_normalised() {
        let info = ResourceAccessInfo::new(true, ["user", "admin", "user"]);
        assert!(info.is_authenticated());
        assert_eq!(info.supported_roles().as_slice(), ["admin", "user"]);
    }

    #[test]
    fn test_public() {
        let info = ResourceAccessInfo::public();
        assert!(!info.is_authenticated());
        assert!(info.supported_roles().is_empty());
    }

    #[test]
    fn test_authenticated_without_roles() {
        let info = ResourceAccessInfo::authenticated();
        assert!(info.is_authenticated());
        assert!(info.supported_roles().is_empty());
    }
}
