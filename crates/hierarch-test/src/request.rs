//! Test request building.

use crate::client::TestClient;
use crate::error::TestError;
use crate::response::TestResponse;
use hierarch_core::{InboundBody, InboundRequest, JSON_MEDIA_TYPE};
use hierarch_dispatch::METHOD_SELECTOR;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::{json, Value};

/// Fluent builder for one call against a [`TestClient`].
///
/// The URI may carry a percent-encoded query string; it is decoded the way a
/// transport would before the request reaches the service. `Accept:
/// application/json` is set by default.
#[must_use]
pub struct TestRequestBuilder<'a> {
    client: &'a TestClient,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    bearer_token: Option<String>,
    body: InboundBody,
    error: Option<TestError>,
}

impl<'a> TestRequestBuilder<'a> {
    pub(crate) fn new(client: &'a TestClient, method: Method, uri: &str) -> Self {
        let mut builder = Self {
            client,
            method,
            path: String::new(),
            query: Vec::new(),
            headers: client.default_headers().clone(),
            bearer_token: None,
            body: InboundBody::Empty,
            error: None,
        };
        builder
            .headers
            .insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        builder.path = decode(path, &mut builder.error);
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = decode(name, &mut builder.error);
            let value = decode(value, &mut builder.error);
            builder.query.push((name, value));
        }
        builder
    }

    /// Adds a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Sets a header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => self.fail(TestError::InvalidHeader(format!("{name}: {value}"))),
        }
        self
    }

    /// Sets the Accept header.
    pub fn accept(self, accept: &str) -> Self {
        self.header(ACCEPT.as_str(), accept)
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: &str) -> Self {
        self.header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Removes a header, including the default `Accept`.
    pub fn without_header(mut self, name: HeaderName) -> Self {
        self.headers.remove(name);
        self
    }

    /// Sends `Authorization: Bearer <token>`.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the whole request envelope as JSON.
    pub fn json(mut self, envelope: Value) -> Self {
        self.body = InboundBody::Json(envelope);
        self.set_json_content_type();
        self
    }

    /// Sends `{ "data": <value> }`.
    pub fn data<T: Serialize>(self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(data) => self.json(json!({ "data": data })),
            Err(err) => self.failed(err.into()),
        }
    }

    /// Sends `{ "isArray": true, "data": [<values>] }`.
    pub fn batch<T: Serialize>(self, values: &[T]) -> Self {
        match serde_json::to_value(values) {
            Ok(data) => self.json(json!({ "isArray": true, "data": data })),
            Err(err) => self.failed(err.into()),
        }
    }

    /// Sets the body as the transport would deliver it.
    pub fn body(mut self, body: InboundBody) -> Self {
        self.body = body;
        self
    }

    /// Builds the inbound request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building.
    pub fn build(self) -> Result<InboundRequest, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut request = InboundRequest::new(self.method, self.path).with_body(self.body);
        for (name, value) in self.query {
            request = request.with_query(name, value);
        }
        for (name, value) in &self.headers {
            request = request.with_header(name.clone(), value.clone());
        }
        if let Some(token) = self.bearer_token {
            request = request.with_bearer_token(&token);
        }
        Ok(request)
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let client = self.client;
        let request = self.build()?;
        Ok(client.execute(request).await)
    }

    fn set_json_content_type(&mut self) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    }

    fn fail(&mut self, err: TestError) {
        self.error.get_or_insert(err);
    }

    fn failed(mut self, err: TestError) -> Self {
        self.fail(err);
        self
    }
}

impl TestClient {
    /// `GET <uri>`.
    pub fn get(&self, uri: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder::new(self, Method::GET, uri)
    }

    /// `POST <uri>`.
    pub fn post(&self, uri: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder::new(self, Method::POST, uri)
    }

    /// `PUT <uri>`.
    pub fn put(&self, uri: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder::new(self, Method::PUT, uri)
    }

    /// `DELETE <uri>`.
    pub fn delete(&self, uri: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder::new(self, Method::DELETE, uri)
    }

    /// `POST <item uri>?method=<name>`.
    pub fn custom_method(&self, uri: &str, name: &str) -> TestRequestBuilder<'_> {
        self.post(uri).query(METHOD_SELECTOR, name)
    }

    /// Any transport method.
    pub fn request(&self, method: Method, uri: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder::new(self, method, uri)
    }
}

fn decode(raw: &str, error: &mut Option<TestError>) -> String {
    match urlencoding::decode(&raw.replace('+', " ")) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            error.get_or_insert(TestError::RequestBuild(format!("invalid percent-encoding in {raw}: {err}")));
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hierarch_dispatch::Service;

    fn client() -> TestClient {
        TestClient::new(Service::builder().build().unwrap())
    }

    #[test]
    fn test_uri_is_decoded() {
        let client = client();
        let request = client
            .get("/v1/users?name=Ann%20Lee&tag=a+b&flag")
            .build()
            .unwrap();
        assert_eq!(request.path(), "/v1/users");
        assert_eq!(request.query_param("name"), Some("Ann Lee"));
        assert_eq!(request.query_param("tag"), Some("a b"));
        assert_eq!(request.query_param("flag"), Some(""));
        assert!(request.accepts_json());
    }

    #[test]
    fn test_custom_method_and_token() {
        let client = client();
        let request = client
            .custom_method("/v1/users/ann", "addCallEvent")
            .bearer_token("ann")
            .build()
            .unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.query_param("method"), Some("addCallEvent"));
        assert_eq!(request.bearer_token(), Some("ann"));
    }

    #[test]
    fn test_batch_envelope() {
        let client = client();
        let request = client.post("/v1/users").batch(&[1, 2]).build().unwrap();
        assert!(request.has_json_content_type());
        assert_eq!(
            request.body(),
            &InboundBody::Json(json!({"isArray": true, "data": [1, 2]}))
        );
    }

    #[test]
    fn test_invalid_header_is_reported() {
        let client = client();
        let result = client.get("/v1/users").header("bad header", "x").build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
