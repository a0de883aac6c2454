//! Test response with assertion helpers.

use crate::error::TestError;
use hierarch_core::{OutboundResponse, ResponseEnvelope};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A response captured by the [`TestClient`](crate::TestClient).
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    body: Value,
}

impl From<OutboundResponse> for TestResponse {
    fn from(response: OutboundResponse) -> Self {
        Self {
            status: response.status,
            body: response.body,
        }
    }
}

impl TestResponse {
    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the numeric status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns `true` for 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns `true` for 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Returns `true` for 5xx.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// The raw envelope.
    #[must_use]
    pub fn json_value(&self) -> &Value {
        &self.body
    }

    /// The envelope, typed.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a well-formed envelope.
    pub fn envelope(&self) -> Result<ResponseEnvelope, TestError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// The `isArray` flag.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.body["isArray"].as_bool().unwrap_or(false)
    }

    /// The `data` member.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data")
    }

    /// Deserializes the `data` member.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::MissingData`] if there is none, or a JSON error
    /// if it does not fit `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        let data = self.data().ok_or(TestError::MissingData)?;
        Ok(serde_json::from_value(data.clone())?)
    }

    /// `error.message`, if present.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.body.pointer("/error/message").and_then(Value::as_str)
    }

    /// `error.stack`, if present.
    #[must_use]
    pub fn error_stack(&self) -> Option<&str> {
        self.body.pointer("/error/stack").and_then(Value::as_str)
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status differs.
    #[track_caller]
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status_code(),
            expected,
            "expected status {expected}, got {} with body {}",
            self.status_code(),
            self.body
        );
        self
    }

    /// Asserts a 2xx status.
    ///
    /// # Panics
    ///
    /// Panics on any other status.
    #[track_caller]
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.is_success(),
            "expected success, got {} with body {}",
            self.status_code(),
            self.body
        );
        self
    }

    /// Asserts `error.message`.
    ///
    /// # Panics
    ///
    /// Panics if the message differs or is missing.
    #[track_caller]
    pub fn assert_error_message(&self, expected: &str) -> &Self {
        assert_eq!(
            self.error_message(),
            Some(expected),
            "unexpected error in {}",
            self.body
        );
        self
    }

    /// Asserts a field by dotted path, e.g. `data.address.city` or
    /// `data.0.username`.
    ///
    /// # Panics
    ///
    /// Panics if the field is missing or differs.
    #[track_caller]
    pub fn assert_json_field<T: Into<Value>>(&self, path: &str, expected: T) -> &Self {
        let pointer = format!("/{}", path.replace('.', "/"));
        let actual = self
            .body
            .pointer(&pointer)
            .unwrap_or_else(|| panic!("field {path} missing in {}", self.body));
        assert_eq!(actual, &expected.into(), "field {path} mismatch");
        self
    }

    /// Asserts a field is absent.
    ///
    /// # Panics
    ///
    /// Panics if the field is present.
    #[track_caller]
    pub fn assert_json_field_absent(&self, path: &str) -> &Self {
        let pointer = format!("/{}", path.replace('.', "/"));
        assert!(
            self.body.pointer(&pointer).is_none(),
            "field {path} unexpectedly present in {}",
            self.body
        );
        self
    }

    /// Asserts the whole envelope.
    ///
    /// # Panics
    ///
    /// Panics if the envelope differs.
    #[track_caller]
    pub fn assert_json_eq(&self, expected: &Value) -> &Self {
        assert_eq!(&self.body, expected, "envelope mismatch");
        self
    }
}
