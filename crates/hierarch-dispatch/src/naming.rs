//! Resource type names and the path parameters derived from them.

use hierarch_core::{SetupError, SetupResult};

/// Derives the path parameter of a plural resource type name.
///
/// `users` → `userId`, `categories` → `categoryId`, `staff` → `staffId`.
///
/// # Example
///
/// ```
/// use hierarch_dispatch::path_parameter;
///
/// assert_eq!(path_parameter("users"), "userId");
/// assert_eq!(path_parameter("categories"), "categoryId");
/// ```
#[must_use]
pub fn path_parameter(resource_type: &str) -> String {
    let singular = if let Some(stem) = resource_type.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = resource_type.strip_suffix('s') {
        stem.to_string()
    } else {
        resource_type.to_string()
    };
    format!("{singular}Id")
}

/// Checks that a resource type name is usable as a path segment.
pub(crate) fn validate_resource_type(name: &str) -> SetupResult<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SetupError::invalid_resource_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parameter() {
        assert_eq!(path_parameter("users"), "userId");
        assert_eq!(path_parameter("callEvents"), "callEventId");
        assert_eq!(path_parameter("companies"), "companyId");
        assert_eq!(path_parameter("staff"), "staffId");
    }

    #[test]
    fn test_validate_resource_type() {
        assert!(validate_resource_type("users").is_ok());
        assert!(validate_resource_type("call-events").is_ok());
        assert!(validate_resource_type("").is_err());
        assert!(validate_resource_type("1users").is_err());
        assert!(validate_resource_type("users/{id}").is_err());
        assert!(validate_resource_type("user s").is_err());
    }
}
