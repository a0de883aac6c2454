//! # Hierarch Test
//!
//! In-memory client for exercising a [`Service`](hierarch_dispatch::Service)
//! end to end.
//!
//! ## Example
//!
//! ```ignore
//! use hierarch_test::TestClient;
//!
//! #[tokio::test]
//! async fn test_create_user() -> Result<(), hierarch_test::TestError> {
//!     let client = TestClient::new(build_service()?);
//!
//!     client
//!         .post("/v1/users")
//!         .data(&serde_json::json!({"username": "ann", "password": "secret"}))
//!         .send()
//!         .await?
//!         .assert_status(201)
//!         .assert_json_field("data.username", "ann");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod request;
mod response;

pub use client::TestClient;
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
