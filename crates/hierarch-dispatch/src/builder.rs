//! Service assembly.

use std::sync::Arc;

use hierarch_authz::CredentialResolver;
use hierarch_config::ServiceConfig;
use hierarch_core::{
    normalize_base_path, AccessMismatchPolicy, RepresentationCodec, RepresentationRegistry,
    SetupError, SetupResult,
};
use hierarch_router::{RouteError, Router};

use crate::handler::{HandlerId, ResourceHandler};
use crate::service::Service;
use crate::setup::{compile, PendingResource, RouteTarget};

/// Builder for a [`Service`].
///
/// Registration is collected first and checked as a whole by
/// [`build`](Self::build); every misconfiguration is a [`SetupError`].
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = Service::builder()
///     .config(&ServiceConfig::development())
///     .credentials(StaticCredentials::new().with_token("ann", ann));
/// builder.register::<UserRepresentation>()?;
/// let users = builder.resource(UsersHandler::new(store));
/// builder.nested_resource(users, CallEventsHandler::new(store));
/// let service = builder.build()?;
/// ```
pub struct ServiceBuilder {
    base_path: String,
    versions: Vec<u32>,
    development_mode: bool,
    access_mismatch: AccessMismatchPolicy,
    registry: RepresentationRegistry,
    resolver: Option<Arc<dyn CredentialResolver>>,
    resources: Vec<PendingResource>,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBuilder")
            .field("base_path", &self.base_path)
            .field("versions", &self.versions)
            .field("development_mode", &self.development_mode)
            .field("representations", &self.registry.len())
            .field("resources", &self.resources.len())
            .finish_non_exhaustive()
    }
}

impl ServiceBuilder {
    /// Creates a builder mounted at the root, answering version 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_path: String::new(),
            versions: vec![1],
            development_mode: false,
            access_mismatch: AccessMismatchPolicy::default(),
            registry: RepresentationRegistry::new(),
            resolver: None,
            resources: Vec::new(),
        }
    }

    /// Applies the `[service]` section of a loaded configuration.
    #[must_use]
    pub fn config(mut self, config: &ServiceConfig) -> Self {
        self.base_path.clone_from(&config.service.base_path);
        self.versions = config.service.supported_versions.clone();
        self.development_mode = config.service.development_mode;
        self.access_mismatch = config.service.access_mismatch;
        self
    }

    /// Sets the route prefix, e.g. `/api`.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Sets the API versions the service answers.
    #[must_use]
    pub fn supported_versions(mut self, versions: impl IntoIterator<Item = u32>) -> Self {
        self.versions = versions.into_iter().collect();
        self
    }

    /// Includes diagnostics in server error bodies.
    #[must_use]
    pub fn development_mode(mut self, enabled: bool) -> Self {
        self.development_mode = enabled;
        self
    }

    /// Sets the status handlers use for access mismatches.
    #[must_use]
    pub fn access_mismatch(mut self, policy: AccessMismatchPolicy) -> Self {
        self.access_mismatch = policy;
        self
    }

    /// Sets the credential collaborator.
    #[must_use]
    pub fn credentials(mut self, resolver: impl CredentialResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets a shared credential collaborator.
    #[must_use]
    pub fn shared_credentials(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Registers the request parser of `R`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::DuplicateRepresentation`] if `R` is already registered.
    pub fn register<R: RepresentationCodec>(&mut self) -> SetupResult<&mut Self> {
        self.registry.register::<R>()?;
        Ok(self)
    }

    /// Registers a root resource.
    pub fn resource(&mut self, handler: impl ResourceHandler) -> HandlerId {
        self.push(Arc::new(handler), None)
    }

    /// Registers a resource nested under `parent`.
    pub fn nested_resource(&mut self, parent: HandlerId, handler: impl ResourceHandler) -> HandlerId {
        self.push(Arc::new(handler), Some(parent))
    }

    fn push(&mut self, handler: Arc<dyn ResourceHandler>, parent: Option<HandlerId>) -> HandlerId {
        let id = HandlerId(self.resources.len());
        self.resources.push(PendingResource { handler, parent });
        id
    }

    /// Validates the registration and freezes the dispatch tables.
    ///
    /// # Errors
    ///
    /// Returns the first [`SetupError`] found.
    pub fn build(self) -> SetupResult<Service> {
        if self.versions.is_empty() {
            return Err(SetupError::NoSupportedVersions);
        }
        let base_path = normalize_base_path(&self.base_path)?;

        let mut resources = Vec::with_capacity(self.resources.len());
        let mut router = Router::new();
        for index in 0..self.resources.len() {
            let resource = compile(&self.resources, index, &self.versions, &self.registry)?;

            for (pattern, item) in [
                (resource.collection_pattern(&base_path), false),
                (resource.item_pattern(&base_path), true),
            ] {
                router
                    .insert(&pattern, RouteTarget { resource: index, item })
                    .map_err(|err| route_error(err, &pattern))?;
            }
            resources.push(resource);
        }

        tracing::info!(
            base_path = %base_path,
            versions = ?self.versions,
            resources = resources.len(),
            "service built"
        );

        Ok(Service {
            base_path,
            versions: self.versions,
            development_mode: self.development_mode,
            access_mismatch: self.access_mismatch,
            registry: self.registry,
            resolver: self.resolver,
            router,
            resources,
        })
    }
}

fn route_error(err: RouteError, pattern: &str) -> SetupError {
    match err {
        RouteError::InvalidPattern(_) => SetupError::InvalidBasePath {
            path: pattern.to_string(),
        },
        RouteError::Duplicate(_) | RouteError::ConflictingParam { .. } => SetupError::DuplicateRoute {
            path: pattern.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_versions() {
        let result = ServiceBuilder::new().supported_versions([]).build();
        assert!(matches!(result, Err(SetupError::NoSupportedVersions)));
    }

    #[test]
    fn test_empty_service_builds() {
        let service = ServiceBuilder::new().base_path("/api").build().unwrap();
        assert!(service.routes().is_empty());
        assert_eq!(service.supported_versions(), [1]);
    }
}
