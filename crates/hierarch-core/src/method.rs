//! Resource methods.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed method set every resource handler exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    /// Read one resource.
    Get,
    /// Read the collection.
    GetAll,
    /// Idempotent create-or-replace of one resource.
    Put,
    /// Create one or more resources in the collection.
    Post,
    /// Delete one resource.
    Delete,
}

impl Method {
    /// All fixed methods, in registration order.
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::GetAll,
        Method::Put,
        Method::Post,
        Method::Delete,
    ];

    /// Wire name (`GET`, `GET_ALL`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::GetAll => "GET_ALL",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Returns the fixed method whose name matches `name`, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either a fixed method or a named custom method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodKey {
    /// One of the fixed methods.
    Fixed(Method),
    /// A custom method invoked through `POST ...?method=<name>`.
    Custom(String),
}

impl MethodKey {
    /// Creates a custom method key.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Returns the fixed method, if this is one.
    #[must_use]
    pub fn fixed(&self) -> Option<Method> {
        match self {
            Self::Fixed(method) => Some(*method),
            Self::Custom(_) => None,
        }
    }

    /// Returns `true` for custom methods.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Name used in logs and metrics labels.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Fixed(method) => method.as_str(),
            Self::Custom(name) => name,
        }
    }
}

impl From<Method> for MethodKey {
    fn from(method: Method) -> Self {
        Self::Fixed(method)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
