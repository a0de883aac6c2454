//! The per-method authorization gate.

use crate::access::ResourceAccessInfo;
use crate::credentials::CredentialResolver;
use crate::error::{AuthzError, AuthzResult};
use crate::intersect::matching_roles;
use hierarch_core::{Identity, MethodKey};
use std::sync::Arc;

/// Outcome of a successful authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authorization {
    /// The caller, for authenticated methods.
    pub identity: Option<Arc<Identity>>,
    /// Supported roles the caller holds, ascending.
    pub matching_roles: Vec<String>,
}

/// Gate for one resource method.
///
/// Authenticated methods resolve the caller through the credential
/// collaborator, then require a non-empty intersection between the
/// method's supported roles and the caller's roles. A method with no
/// supported roles admits any authenticated caller.
#[derive(Debug, Clone)]
pub struct ResourceAuthorizer {
    method: MethodKey,
    access: ResourceAccessInfo,
}

impl ResourceAuthorizer {
    /// Creates the gate for `method`.
    #[must_use]
    pub fn new(method: MethodKey, access: ResourceAccessInfo) -> Self {
        Self { method, access }
    }

    /// The guarded method.
    #[must_use]
    pub fn method(&self) -> &MethodKey {
        &self.method
    }

    /// The method's requirements.
    #[must_use]
    pub fn access(&self) -> &ResourceAccessInfo {
        &self.access
    }

    /// Authorizes one call.
    ///
    /// `token` is the bearer token with any `Bearer ` prefix already removed.
    pub async fn authorize(
        &self,
        resolver: Option<&dyn CredentialResolver>,
        token: Option<&str>,
    ) -> AuthzResult<Authorization> {
        if !self.access.is_authenticated() {
            return Ok(Authorization::default());
        }

        let (Some(resolver), Some(token)) = (resolver, token) else {
            tracing::debug!(method = %self.method, "no credentials presented");
            return Err(AuthzError::Unauthenticated);
        };

        let identity = match resolver.authenticate(token).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                tracing::debug!(method = %self.method, "token not recognised");
                return Err(AuthzError::Unauthenticated);
            }
            Err(err) => {
                tracing::warn!(method = %self.method, error = %err, "credential resolver failed");
                return Err(err.into());
            }
        };

        let supported = self.access.supported_roles();
        if supported.is_empty() {
            return Ok(Authorization {
                identity: Some(identity),
                matching_roles: Vec::new(),
            });
        }

        let matching = matching_roles(supported, identity.sorted_roles());
        if matching.is_empty() {
            tracing::debug!(
                method = %self.method,
                caller = %identity.log_id(),
                "caller holds none of the supported roles"
            );
            return Err(AuthzError::forbidden(self.method.name()));
        }

        Ok(Authorization {
            identity: Some(identity),
            matching_roles: matching,
        })
    }
}
