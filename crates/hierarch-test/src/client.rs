//! In-memory test client.

use crate::response::TestResponse;
use hierarch_core::InboundRequest;
use hierarch_dispatch::Service;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

/// Drives a [`Service`] without a network.
///
/// Requests go straight into [`Service::handle`], so every test exercises
/// the same pipeline a transport would.
///
/// # Example
///
/// ```ignore
/// let client = TestClient::new(service);
///
/// let response = client
///     .get("/v1/users/ann")
///     .bearer_token("ann")
///     .send()
///     .await?;
///
/// response.assert_success();
/// response.assert_json_field("data.username", "ann");
/// ```
#[derive(Debug, Clone)]
pub struct TestClient {
    service: Arc<Service>,
    default_headers: HeaderMap,
}

impl TestClient {
    /// Creates a client owning the service.
    #[must_use]
    pub fn new(service: Service) -> Self {
        Self::shared(Arc::new(service))
    }

    /// Creates a client for a shared service.
    #[must_use]
    pub fn shared(service: Arc<Service>) -> Self {
        Self {
            service,
            default_headers: HeaderMap::new(),
        }
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// The service under test.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    pub(crate) fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Runs a prepared request through the service.
    pub async fn execute(&self, request: InboundRequest) -> TestResponse {
        TestResponse::from(self.service.handle(request).await)
    }
}
