//! # Hierarch Core
//!
//! Value types shared by every Hierarch crate:
//!
//! - [`Identity`] / [`SortedRoles`] - authenticated caller and its role set
//! - [`Schema`] - declarative request schemas and the recursive validator
//! - [`Representation`] / [`RepresentationCodec`] - versioned wire payloads
//! - [`ResourceChain`] - hierarchical resource addressing
//! - [`ResourceResponse`] - success, client-error and server-error responses
//! - [`ResourceRequest`] - the request handed to business logic
//! - [`InboundRequest`] / [`OutboundResponse`] - the transport contract
//! - [`SetupError`] - fatal misconfiguration found while building a service

#![doc(html_root_url = "https://docs.rs/hierarch-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod identity;
mod method;
pub mod representation;
mod request;
mod resource;
pub mod response;
pub mod schema;
pub mod transport;

pub use error::{SetupError, SetupResult};
pub use identity::{Identity, SortedRoles};
pub use method::{Method, MethodKey};
pub use representation::{
    RegisteredRepresentation, Representation, RepresentationClass, RepresentationCodec,
    RepresentationError, RepresentationPair, RepresentationRegistry,
};
pub use request::{leading_integer, RequestPayload, ResourceRequest};
pub use resource::{normalize_base_path, IdFormat, Resource, ResourceChain, ResourceId};
pub use response::{
    AccessMismatchPolicy, ClientErrorResponse, ClientErrorStatus, ContractViolation, ResourceResponse,
    ResponseEnvelope, ServerErrorResponse, ServerErrorStatus, SuccessBody, SuccessResponse,
    SuccessStatus,
};
pub use schema::{FieldSpec, Schema, SchemaProperty, ValidationError, ValidationErrorKind, ValueKind};
pub use transport::{BoxFuture, InboundBody, InboundRequest, OutboundResponse, JSON_MEDIA_TYPE};
