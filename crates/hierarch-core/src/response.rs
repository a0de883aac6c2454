//! Resource response taxonomy.
//!
//! A handler answers with a [`ResourceResponse`]: a success carrying zero,
//! one or many representations, a client error, or a server error. Every
//! variant maps to an HTTP status code and renders to the wire envelope
//!
//! ```text
//! { "isArray": bool, "data"?: object | array, "error"?: { "message", "stack"? } }
//! ```

use crate::representation::{Representation, RepresentationClass};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Success status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuccessStatus {
    /// 200.
    Ok,
    /// 201.
    Created,
    /// 204.
    NoContent,
}

impl SuccessStatus {
    /// HTTP status code.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Ok => StatusCode::OK,
            Self::Created => StatusCode::CREATED,
            Self::NoContent => StatusCode::NO_CONTENT,
        }
    }
}

/// Payload of a success response.
#[derive(Debug)]
pub enum SuccessBody {
    /// No representation.
    None,
    /// A single representation.
    One(Box<dyn Representation>),
    /// A list of representations (`isArray: true`).
    Many(Vec<Box<dyn Representation>>),
}

/// A 2xx response.
///
/// # Example
///
/// ```
/// use hierarch_core::response::SuccessResponse;
///
/// let response = SuccessResponse::no_content();
/// assert_eq!(response.status_code().as_u16(), 204);
/// assert!(!response.is_array());
/// ```
#[derive(Debug)]
pub struct SuccessResponse {
    status: SuccessStatus,
    body: SuccessBody,
    error: Option<String>,
}

impl SuccessResponse {
    fn new(status: SuccessStatus, body: SuccessBody) -> Self {
        Self {
            status,
            body,
            error: None,
        }
    }

    /// 200 with one representation.
    pub fn ok(representation: impl Representation + 'static) -> Self {
        Self::new(SuccessStatus::Ok, SuccessBody::One(Box::new(representation)))
    }

    /// 200 with a list of representations.
    pub fn ok_many<R: Representation + 'static>(representations: Vec<R>) -> Self {
        Self::new(SuccessStatus::Ok, SuccessBody::Many(boxed(representations)))
    }

    /// 201 with one representation.
    pub fn created(representation: impl Representation + 'static) -> Self {
        Self::new(
            SuccessStatus::Created,
            SuccessBody::One(Box::new(representation)),
        )
    }

    /// 201 with a list of representations.
    pub fn created_many<R: Representation + 'static>(representations: Vec<R>) -> Self {
        Self::new(SuccessStatus::Created, SuccessBody::Many(boxed(representations)))
    }

    /// 204 without a body.
    #[must_use]
    pub fn no_content() -> Self {
        Self::new(SuccessStatus::NoContent, SuccessBody::None)
    }

    /// Creates a response from an already boxed body.
    #[must_use]
    pub fn with_body(status: SuccessStatus, body: SuccessBody) -> Self {
        Self::new(status, body)
    }

    /// Attaches a soft error message, e.g. for a partially applied batch.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Success status.
    #[must_use]
    pub fn status(&self) -> SuccessStatus {
        self.status
    }

    /// HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status.status_code()
    }

    /// The carried representation(s).
    #[must_use]
    pub fn body(&self) -> &SuccessBody {
        &self.body
    }

    /// The soft error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` if the body is a list.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.body, SuccessBody::Many(_))
    }

    /// Verifies the body against the declared response class.
    ///
    /// Absence where a class is required, presence where none is expected,
    /// and instances of another class are all violations. A 204 must not
    /// carry a body, so it only satisfies methods that declare no class.
    /// An empty list is not a representation.
    pub fn check_representation(
        &self,
        expected: Option<&RepresentationClass>,
    ) -> Result<(), ContractViolation> {
        if self.status == SuccessStatus::NoContent {
            match &self.body {
                SuccessBody::None => {}
                SuccessBody::One(found) => return Err(ContractViolation::unexpected(found.as_ref())),
                SuccessBody::Many(_) => return Err(ContractViolation::UnexpectedList),
            }
        }

        match (expected, &self.body) {
            (None, SuccessBody::None) => Ok(()),
            (None, SuccessBody::One(found)) => Err(ContractViolation::unexpected(found.as_ref())),
            (None, SuccessBody::Many(found)) if found.is_empty() => Ok(()),
            (None, SuccessBody::Many(_)) => Err(ContractViolation::UnexpectedList),
            (Some(class), SuccessBody::None) => Err(ContractViolation::Missing {
                expected: class.name(),
            }),
            (Some(class), SuccessBody::One(found)) => check_instance(class, found.as_ref()),
            (Some(class), SuccessBody::Many(found)) => found
                .iter()
                .try_for_each(|item| check_instance(class, item.as_ref())),
        }
    }

    fn data(&self) -> Option<Value> {
        match &self.body {
            SuccessBody::None => None,
            SuccessBody::One(representation) => Some(representation.to_json()),
            SuccessBody::Many(list) => Some(Value::Array(
                list.iter().map(|representation| representation.to_json()).collect(),
            )),
        }
    }
}

fn boxed<R: Representation + 'static>(representations: Vec<R>) -> Vec<Box<dyn Representation>> {
    representations
        .into_iter()
        .map(|representation| Box::new(representation) as Box<dyn Representation>)
        .collect()
}

fn check_instance(
    expected: &RepresentationClass,
    found: &dyn Representation,
) -> Result<(), ContractViolation> {
    if expected.matches(found) {
        Ok(())
    } else {
        Err(ContractViolation::WrongType {
            expected: expected.name(),
            found: found.name(),
        })
    }
}

/// A handler returned a success body that contradicts its declared contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// A representation was required but none was returned.
    #[error("response must carry a `{expected}` representation")]
    Missing {
        /// Declared response class.
        expected: &'static str,
    },

    /// A representation was returned where none is declared.
    #[error("response must not carry a representation, found `{found}`")]
    Unexpected {
        /// Returned class.
        found: &'static str,
    },

    /// A list was returned where none is declared.
    #[error("response must not carry a representation list")]
    UnexpectedList,

    /// A representation of the wrong class was returned.
    #[error("response representation must be `{expected}`, found `{found}`")]
    WrongType {
        /// Declared response class.
        expected: &'static str,
        /// Returned class.
        found: &'static str,
    },
}

impl ContractViolation {
    fn unexpected(found: &dyn Representation) -> Self {
        Self::Unexpected { found: found.name() }
    }
}

/// 4xx status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorStatus {
    /// 400.
    BadRequest,
    /// 401.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 405.
    MethodNotAllowed,
    /// 406.
    NotAcceptable,
    /// 409.
    Conflict,
    /// 415.
    UnsupportedMediaType,
    /// 422.
    UnprocessableEntity,
}

impl ClientErrorStatus {
    /// HTTP status code.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Self::Conflict => StatusCode::CONFLICT,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Message used when none is given.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::NotAcceptable => "Not Acceptable",
            Self::Conflict => "Conflict",
            Self::UnsupportedMediaType => "Unsupported Media Type",
            Self::UnprocessableEntity => "Unprocessable Entity",
        }
    }
}

/// How a handler answers a caller asking for a resource it may not see.
///
/// `NotFound` hides whether the resource exists; `Forbidden` reports the
/// denial honestly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMismatchPolicy {
    /// Answer 404.
    #[default]
    NotFound,
    /// Answer 403.
    Forbidden,
}

impl AccessMismatchPolicy {
    /// The response this policy prescribes.
    #[must_use]
    pub fn response(self) -> ClientErrorResponse {
        match self {
            Self::NotFound => ClientErrorResponse::not_found(),
            Self::Forbidden => ClientErrorResponse::forbidden(),
        }
    }
}

/// A 4xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientErrorResponse {
    status: ClientErrorStatus,
    message: String,
}

impl ClientErrorResponse {
    /// Creates a response with the status's default message.
    #[must_use]
    pub fn new(status: ClientErrorStatus) -> Self {
        Self {
            status,
            message: status.default_message().to_string(),
        }
    }

    /// Creates a response with a custom message.
    #[must_use]
    pub fn with_message(status: ClientErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400, optionally with a message.
    #[must_use]
    pub fn bad_request(message: Option<&str>) -> Self {
        match message {
            Some(message) => Self::with_message(ClientErrorStatus::BadRequest, message),
            None => Self::new(ClientErrorStatus::BadRequest),
        }
    }

    /// 401.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(ClientErrorStatus::Unauthorized)
    }

    /// 403.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(ClientErrorStatus::Forbidden)
    }

    /// 404.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(ClientErrorStatus::NotFound)
    }

    /// 404 with a message.
    #[must_use]
    pub fn not_found_with(message: impl Into<String>) -> Self {
        Self::with_message(ClientErrorStatus::NotFound, message)
    }

    /// 405.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(ClientErrorStatus::MethodNotAllowed)
    }

    /// 406.
    #[must_use]
    pub fn not_acceptable() -> Self {
        Self::new(ClientErrorStatus::NotAcceptable)
    }

    /// 409.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_message(ClientErrorStatus::Conflict, message)
    }

    /// 415.
    #[must_use]
    pub fn unsupported_media_type() -> Self {
        Self::new(ClientErrorStatus::UnsupportedMediaType)
    }

    /// 422.
    #[must_use]
    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        Self::with_message(ClientErrorStatus::UnprocessableEntity, message)
    }

    /// The status.
    #[must_use]
    pub fn status(&self) -> ClientErrorStatus {
        self.status
    }

    /// HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status.status_code()
    }

    /// The message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ClientErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code().as_u16(), self.message)
    }
}

/// 5xx status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerErrorStatus {
    /// 500.
    Internal,
    /// 501.
    NotImplemented,
    /// 502.
    BadGateway,
}

impl ServerErrorStatus {
    /// HTTP status code.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::BadGateway => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message used when none is given.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Internal => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::BadGateway => "Bad Gateway",
        }
    }
}

/// A 5xx response.
///
/// The diagnostic is rendered as `error.stack` in development mode only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerErrorResponse {
    status: ServerErrorStatus,
    message: String,
    diagnostic: Option<String>,
}

impl ServerErrorResponse {
    /// 500 with a message and optional diagnostic trace.
    #[must_use]
    pub fn internal(message: impl Into<String>, diagnostic: Option<String>) -> Self {
        Self {
            status: ServerErrorStatus::Internal,
            message: message.into(),
            diagnostic,
        }
    }

    /// 501.
    #[must_use]
    pub fn not_implemented() -> Self {
        Self {
            status: ServerErrorStatus::NotImplemented,
            message: ServerErrorStatus::NotImplemented.default_message().to_string(),
            diagnostic: None,
        }
    }

    /// 502, e.g. when the credential collaborator fails.
    #[must_use]
    pub fn bad_gateway(message: Option<&str>) -> Self {
        let status = ServerErrorStatus::BadGateway;
        Self {
            status,
            message: message.unwrap_or(status.default_message()).to_string(),
            diagnostic: None,
        }
    }

    /// The status.
    #[must_use]
    pub fn status(&self) -> ServerErrorStatus {
        self.status
    }

    /// HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status.status_code()
    }

    /// The message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The diagnostic trace, if captured.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }
}

impl fmt::Display for ServerErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code().as_u16(), self.message)
    }
}

/// Any response a resource handler can produce.
#[derive(Debug)]
pub enum ResourceResponse {
    /// 2xx.
    Success(SuccessResponse),
    /// 4xx.
    ClientError(ClientErrorResponse),
    /// 5xx.
    ServerError(ServerErrorResponse),
}

impl ResourceResponse {
    /// HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Success(response) => response.status_code(),
            Self::ClientError(response) => response.status_code(),
            Self::ServerError(response) => response.status_code(),
        }
    }

    /// Returns `true` for 2xx responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Renders the wire envelope.
    ///
    /// `include_diagnostics` controls whether a server error's diagnostic
    /// trace is emitted as `error.stack`.
    #[must_use]
    pub fn to_payload(&self, include_diagnostics: bool) -> Value {
        let mut envelope = Map::new();
        match self {
            Self::Success(response) => {
                envelope.insert("isArray".into(), Value::Bool(response.is_array()));
                if let Some(data) = response.data() {
                    envelope.insert("data".into(), data);
                }
                if let Some(message) = response.error() {
                    envelope.insert("error".into(), error_object(message, None));
                }
            }
            Self::ClientError(response) => {
                envelope.insert("isArray".into(), Value::Bool(false));
                envelope.insert("error".into(), error_object(response.message(), None));
            }
            Self::ServerError(response) => {
                let stack = response.diagnostic().filter(|_| include_diagnostics);
                envelope.insert("isArray".into(), Value::Bool(false));
                envelope.insert("error".into(), error_object(response.message(), stack));
            }
        }
        Value::Object(envelope)
    }
}

fn error_object(message: &str, stack: Option<&str>) -> Value {
    let mut error = Map::new();
    error.insert("message".into(), Value::String(message.to_string()));
    if let Some(stack) = stack {
        error.insert("stack".into(), Value::String(stack.to_string()));
    }
    Value::Object(error)
}

impl From<SuccessResponse> for ResourceResponse {
    fn from(response: SuccessResponse) -> Self {
        Self::Success(response)
    }
}

impl From<ClientErrorResponse> for ResourceResponse {
    fn from(response: ClientErrorResponse) -> Self {
        Self::ClientError(response)
    }
}

impl From<ServerErrorResponse> for ResourceResponse {
    fn from(response: ServerErrorResponse) -> Self {
        Self::ServerError(response)
    }
}

/// Typed view of a rendered envelope, for clients and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Whether `data` is a list.
    pub is_array: bool,
    /// Payload, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error details, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// The `error` member of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub message: String,
    /// Diagnostic trace (development mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}
