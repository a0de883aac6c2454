//! Authorization failures.

use crate::credentials::CredentialError;
use hierarch_core::{ClientErrorResponse, ResourceResponse, ServerErrorResponse};
use http::StatusCode;
use thiserror::Error;

/// Result type for authorization.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Why a request was not forwarded to its handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthzError {
    /// No token, no resolver, or the token was not recognised.
    #[error("caller is not authenticated")]
    Unauthenticated,

    /// The caller shares no role with the method.
    #[error("caller has none of the roles required by `{method}`")]
    Forbidden {
        /// Method name.
        method: String,
    },

    /// The credential collaborator failed.
    #[error(transparent)]
    Upstream(#[from] CredentialError),
}

impl AuthzError {
    /// Create a forbidden error.
    pub fn forbidden(method: impl Into<String>) -> Self {
        Self::Forbidden {
            method: method.into(),
        }
    }

    /// HTTP status the error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Converts the error into the response sent to the caller.
    ///
    /// Upstream details are not exposed.
    #[must_use]
    pub fn into_response(self) -> ResourceResponse {
        match self {
            Self::Unauthenticated => ClientErrorResponse::unauthorized().into(),
            Self::Forbidden { .. } => ClientErrorResponse::forbidden().into(),
            Self::Upstream(_) => ServerErrorResponse::bad_gateway(None).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthzError::Unauthenticated.into_response().status_code(), 401);
        assert_eq!(AuthzError::forbidden("GET").into_response().status_code(), 403);
        let upstream = AuthzError::from(CredentialError::new("down"));
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.into_response().status_code(), 502);
    }

    #[test]
    fn test_display() {
        let err = AuthzError::forbidden("DELETE");
        assert!(err.to_string().contains("DELETE"));
    }
}
