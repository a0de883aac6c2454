//! Hierarch Authorization - role-based access to resource methods.
//!
//! Every resource method gets one [`ResourceAuthorizer`] built at setup
//! from its [`ResourceAccessInfo`]. Per request the authorizer:
//!
//! ```text
//!   authenticated? ──no──────────────────────────────► forward (no identity)
//!        │ yes
//!   token + resolver? ──no──► 401
//!        │
//!   CredentialResolver::authenticate ──err──► 502
//!        │ None ──► 401
//!        │ Some(identity)
//!   supported roles empty? ──yes──► forward
//!        │ no
//!   sorted merge-join (supported ∩ caller) ──empty──► 403
//!        │
//!   forward (identity, matching roles)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod authorizer;
pub mod credentials;
pub mod error;
pub mod intersect;

pub use access::ResourceAccessInfo;
pub use authorizer::{Authorization, ResourceAuthorizer};
pub use credentials::{CredentialError, CredentialResolver, StaticCredentials};
pub use error::{AuthzError, AuthzResult};
pub use intersect::{has_overlap, matching_roles, SortedIntersection};
