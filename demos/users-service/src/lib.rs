//! # Users Service
//!
//! A `users` resource on Hierarch: sign-up, self-service profile updates,
//! admin listing and an `addCallEvent` custom method.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | POST | `/v1/users` | public |
//! | GET | `/v1/users` | admin |
//! | GET, PUT | `/v1/users/{userId}` | the user or an admin |
//! | DELETE | `/v1/users/{userId}` | admin (always 405) |
//! | POST | `/v1/users/{userId}?method=addCallEvent` | the user or an admin |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;
pub mod handler;
pub mod representation;
pub mod store;

use hierarch::prelude::*;
use std::sync::Arc;

pub use credentials::UsernameTokens;
pub use handler::{UsersHandler, ADD_CALL_EVENT};
pub use representation::{AddressRepresentation, CallEventRepresentation, UserRepresentation};
pub use store::UserStore;

/// Builds the service over `store`.
///
/// # Errors
///
/// Returns a [`SetupError`] if the configuration does not describe a
/// servable API.
pub fn build_service(config: &ServiceConfig, store: Arc<UserStore>) -> SetupResult<Service> {
    let mut builder = Service::builder()
        .config(config)
        .credentials(UsernameTokens::new(Arc::clone(&store)));
    builder
        .register::<UserRepresentation>()?
        .register::<CallEventRepresentation>()?;
    builder.resource(UsersHandler::new(store));
    builder.build()
}
