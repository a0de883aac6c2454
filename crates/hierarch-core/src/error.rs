//! Setup-phase error types.
//!
//! Every misconfiguration detected while a service is being assembled is a
//! [`SetupError`]. Setup errors abort startup; they never reach a live
//! request.

use thiserror::Error;

/// Result type alias using [`SetupError`].
pub type SetupResult<T> = Result<T, SetupError>;

/// A fatal misconfiguration found while building a service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// A representation's request parser was registered twice.
    #[error("representation `{name}` is already registered")]
    DuplicateRepresentation {
        /// Representation name.
        name: String,
    },

    /// A handler declared a request representation whose parser is not registered.
    #[error("representation `{name}` is used by `{resource}` but was never registered")]
    UnregisteredRepresentation {
        /// Representation name.
        name: String,
        /// Resource type that declared it.
        resource: String,
    },

    /// A custom method reuses the name of a fixed method.
    #[error("custom method `{name}` on `{resource}` collides with a fixed method")]
    CustomMethodCollision {
        /// Custom method name.
        name: String,
        /// Resource type.
        resource: String,
    },

    /// A custom method was declared twice on one resource.
    #[error("custom method `{name}` is declared twice on `{resource}`")]
    DuplicateCustomMethod {
        /// Custom method name.
        name: String,
        /// Resource type.
        resource: String,
    },

    /// Two handlers claim the same route.
    #[error("resource route `{path}` is registered twice")]
    DuplicateRoute {
        /// Route pattern.
        path: String,
    },

    /// The resource type name is unusable as a path segment.
    #[error("invalid resource type name `{name}`")]
    InvalidResourceName {
        /// Offending name.
        name: String,
    },

    /// Two levels of one ancestry derive the same path parameter.
    #[error("path parameter `{param}` appears twice in the ancestry of `{resource}`")]
    DuplicatePathParameter {
        /// Parameter name.
        param: String,
        /// Resource type.
        resource: String,
    },

    /// The parent handler reference does not name a registered handler.
    #[error("parent handler #{index} of `{resource}` is not registered")]
    UnknownParent {
        /// Referenced handler index.
        index: usize,
        /// Resource type.
        resource: String,
    },

    /// The parent chain loops back on itself.
    #[error("parent chain of `{resource}` is cyclic")]
    CyclicAncestry {
        /// Resource type.
        resource: String,
    },

    /// The service declares no API versions.
    #[error("at least one supported API version is required")]
    NoSupportedVersions,

    /// The base path cannot be used as a route prefix.
    #[error("invalid base path `{path}`")]
    InvalidBasePath {
        /// Offending path.
        path: String,
    },
}

impl SetupError {
    /// Creates a [`SetupError::DuplicateRepresentation`].
    #[must_use]
    pub fn duplicate_representation(name: impl Into<String>) -> Self {
        Self::DuplicateRepresentation { name: name.into() }
    }

    /// Creates a [`SetupError::UnregisteredRepresentation`].
    #[must_use]
    pub fn unregistered_representation(
        name: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self::UnregisteredRepresentation {
            name: name.into(),
            resource: resource.into(),
        }
    }

    /// Creates a [`SetupError::InvalidResourceName`].
    #[must_use]
    pub fn invalid_resource_name(name: impl Into<String>) -> Self {
        Self::InvalidResourceName { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SetupError::duplicate_representation("user");
        assert_eq!(err.to_string(), "representation `user` is already registered");

        let err = SetupError::unregistered_representation("callEvent", "users");
        assert!(err.to_string().contains("never registered"));

        let err = SetupError::CustomMethodCollision {
            name: "GET".into(),
            resource: "users".into(),
        };
        assert!(err.to_string().contains("collides"));
    }
}
