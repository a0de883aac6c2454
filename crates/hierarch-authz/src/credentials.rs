//! The credential collaborator.
//!
//! Exchanging a bearer token for an [`Identity`] is delegated to a
//! [`CredentialResolver`], typically backed by an identity provider.
//! Resolution is the only suspension point of authorization.

use hierarch_core::{BoxFuture, Identity};
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// The credential collaborator failed (as opposed to rejecting the token).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("credential resolution failed: {message}")]
pub struct CredentialError {
    message: String,
}

impl CredentialError {
    /// Creates an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Exchanges a token for an identity.
///
/// `Ok(None)` means the token is not recognised; `Err` means the resolver
/// itself failed.
pub trait CredentialResolver: Send + Sync {
    /// Resolves `token`.
    fn authenticate<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Option<Arc<Identity>>, CredentialError>>;
}

/// Fixed token table, for tests and local development.
///
/// # Example
///
/// ```
/// use hierarch_authz::{CredentialResolver, StaticCredentials};
/// use hierarch_core::Identity;
///
/// let credentials = StaticCredentials::new()
///     .with_token("secret", Identity::new("ann", "Ann", ["user"]));
/// let identity = tokio_test::block_on(credentials.authenticate("secret")).unwrap();
/// assert_eq!(identity.unwrap().user_id(), "ann");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    tokens: IndexMap<String, Arc<Identity>>,
}

impl StaticCredentials {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `token` to `identity`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), Arc::new(identity));
        self
    }
}

impl CredentialResolver for StaticCredentials {
    fn authenticate<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Option<Arc<Identity>>, CredentialError>> {
        Box::pin(async move { Ok(self.tokens.get(token).cloned()) })
    }
}
