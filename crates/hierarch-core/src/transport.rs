//! Contract with the transport collaborator.
//!
//! The transport owns sockets, byte-level body parsing and the serve loop.
//! Per call it hands the dispatcher an [`InboundRequest`] and writes back the
//! [`OutboundResponse`] it receives.

use http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use indexmap::IndexMap;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The only media type the engine produces and consumes.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Request body as delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InboundBody {
    /// No body.
    #[default]
    Empty,
    /// Parsed JSON.
    Json(Value),
    /// The transport could not parse the body; carries the parser message.
    Malformed(String),
}

impl InboundBody {
    /// Returns `true` if no body was sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// One inbound call.
///
/// # Example
///
/// ```
/// use hierarch_core::transport::InboundRequest;
/// use serde_json::json;
///
/// let request = InboundRequest::new(http::Method::POST, "/v1/users")
///     .with_json(json!({"data": {"name": "Ann"}}))
///     .with_bearer_token("ann");
/// assert_eq!(request.bearer_token(), Some("ann"));
/// ```
#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: http::Method,
    path: String,
    query: IndexMap<String, String>,
    headers: HeaderMap,
    body: InboundBody,
}

impl InboundRequest {
    /// Creates a request with no query, headers or body.
    pub fn new(method: http::Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: IndexMap::new(),
            headers: HeaderMap::new(),
            body: InboundBody::Empty,
        }
    }

    /// Adds a query parameter; a repeated name keeps the last value.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    ///
    /// A token that is not a valid header value is ignored.
    #[must_use]
    pub fn with_bearer_token(self, token: &str) -> Self {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => self.with_header(AUTHORIZATION, value),
            Err(_) => self,
        }
    }

    /// Sets a JSON body together with a JSON `Content-Type`.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        self.body = InboundBody::Json(body);
        self
    }

    /// Sets the body as delivered by the transport.
    #[must_use]
    pub fn with_body(mut self, body: InboundBody) -> Self {
        self.body = body;
        self
    }

    /// Transport method.
    #[must_use]
    pub fn method(&self) -> &http::Method {
        &self.method
    }

    /// Request path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters.
    #[must_use]
    pub fn query(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// A single query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body.
    #[must_use]
    pub fn body(&self) -> &InboundBody {
        &self.body
    }

    /// Consumes the request, returning the body.
    #[must_use]
    pub fn into_body(self) -> InboundBody {
        self.body
    }

    /// The raw `Authorization` value with an optional `Bearer ` prefix removed.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        let raw = self.headers.get(AUTHORIZATION)?.to_str().ok()?.trim_start();
        let token = match raw.get(..7) {
            Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => &raw[7..],
            _ => raw,
        }
        .trim();
        (!token.is_empty()).then_some(token)
    }

    /// Returns `true` if the caller accepts JSON.
    ///
    /// A missing `Accept` header accepts anything. Otherwise one of the
    /// listed media ranges must be exactly `application/json`.
    #[must_use]
    pub fn accepts_json(&self) -> bool {
        let Some(accept) = self.headers.get(ACCEPT) else {
            return true;
        };
        accept
            .to_str()
            .is_ok_and(|value| value.split(',').any(is_json_media_type))
    }

    /// Returns `true` if the declared body media type is JSON.
    #[must_use]
    pub fn has_json_content_type(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_media_type)
    }
}

fn is_json_media_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

/// What the transport writes back.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// JSON envelope.
    pub body: Value,
}

impl OutboundResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// `Content-Type` of every response.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        JSON_MEDIA_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_prefix_is_optional() {
        let request = InboundRequest::new(http::Method::GET, "/v1/users")
            .with_header(AUTHORIZATION, HeaderValue::from_static("bearer ann"));
        assert_eq!(request.bearer_token(), Some("ann"));

        let request = InboundRequest::new(http::Method::GET, "/v1/users")
            .with_header(AUTHORIZATION, HeaderValue::from_static("admin"));
        assert_eq!(request.bearer_token(), Some("admin"));

        let request = InboundRequest::new(http::Method::GET, "/v1/users");
        assert_eq!(request.bearer_token(), None);

        let request = InboundRequest::new(http::Method::GET, "/v1/users")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(request.bearer_token(), None);
    }

    #[test]
    fn test_accept_negotiation() {
        let request = InboundRequest::new(http::Method::GET, "/v1/users");
        assert!(request.accepts_json());

        let request = request.with_header(ACCEPT, HeaderValue::from_static("text/html"));
        assert!(!request.accepts_json());

        let request = request.with_header(
            ACCEPT,
            HeaderValue::from_static("text/html, application/json; q=0.9"),
        );
        assert!(request.accepts_json());
    }

    #[test]
    fn test_content_type() {
        let request = InboundRequest::new(http::Method::POST, "/v1/users")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(request.has_json_content_type());

        let request = request.with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!request.has_json_content_type());
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let request =
            InboundRequest::new(http::Method::POST, "/v1/users").with_json(serde_json::json!({}));
        assert!(request.has_json_content_type());
        assert!(!request.body().is_empty());
    }
}
