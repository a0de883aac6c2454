//! Segment trie router for Hierarch resource paths.
//!
//! Resources register two patterns per level, a collection path and an
//! item path, nested under their ancestors:
//!
//! ```text
//!                    (root)
//!                      │
//!                   "users"          -> users collection
//!                      │
//!                 "{userId}"         -> user item
//!                      │
//!                   "books"          -> books of a user
//!                      │
//!                 "{bookId}"         -> one book of a user
//! ```
//!
//! The router is generic over its target so the dispatcher can attach
//! whatever it needs to a matched path.

mod error;
mod node;
mod params;
mod router;

pub use error::RouteError;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::Router;
