//! # Hierarch Dispatch
//!
//! Turns an [`InboundRequest`](hierarch_core::InboundRequest) into a call on
//! a [`ResourceHandler`] and the handler's result back into an
//! [`OutboundResponse`](hierarch_core::OutboundResponse).
//!
//! ## Setup
//!
//! [`ServiceBuilder::build`] derives, for every registered handler:
//!
//! - its ancestry (root to leaf) and the path parameter of each level
//! - one authorizer per fixed and custom method
//! - the representation contract per method and supported version
//! - collection and item routes
//!
//! ## Per request
//!
//! ```text
//! route ─► method ─► authorize ─► negotiate ─► version ─► envelope
//!   ─► parse + validate ─► presence ─► resource chain ─► handler ─► shape check
//! ```
//!
//! Every step either advances or ends the request with a structured
//! response; nothing is retried.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod handler;
mod naming;
mod pipeline;
mod service;
mod setup;

pub use builder::ServiceBuilder;
pub use handler::{HandlerId, HandlerResult, ResourceHandler};
pub use naming::path_parameter;
pub use pipeline::{resolve_version, METHOD_SELECTOR};
pub use service::Service;
