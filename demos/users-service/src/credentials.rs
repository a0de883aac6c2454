//! Token-equals-username credentials.

use crate::store::UserStore;
use hierarch::prelude::*;
use std::sync::Arc;

/// Resolves `admin` to an administrator and any existing username to that
/// user with the `user` role.
#[derive(Debug, Clone)]
pub struct UsernameTokens {
    store: Arc<UserStore>,
}

impl UsernameTokens {
    /// Creates a resolver backed by `store`.
    #[must_use]
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

impl CredentialResolver for UsernameTokens {
    fn authenticate<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Option<Arc<Identity>>, CredentialError>> {
        Box::pin(async move {
            if token == "admin" {
                return Ok(Some(Arc::new(Identity::new("admin", "Admin", ["admin"]))));
            }
            Ok(self
                .store
                .get(token)
                .map(|user| Arc::new(Identity::new(user.username, user.name, ["user"]))))
        })
    }
}
