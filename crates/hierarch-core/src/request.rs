//! The fully populated request handed to business logic.

use crate::identity::Identity;
use crate::method::MethodKey;
use crate::representation::{Representation, RepresentationCodec};
use crate::resource::{Resource, ResourceChain};
use crate::response::{AccessMismatchPolicy, ClientErrorResponse};
use indexmap::IndexMap;
use std::sync::Arc;

/// Parsed request payload.
#[derive(Debug, Default)]
pub enum RequestPayload {
    /// No representation was supplied.
    #[default]
    None,
    /// A single representation.
    Single(Box<dyn Representation>),
    /// A batch (`isArray: true`, POST only).
    Batch(Vec<Box<dyn Representation>>),
}

impl RequestPayload {
    /// Returns `true` if no representation was supplied.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `true` for a batch.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Batch(_))
    }
}

/// One request, as seen by a resource handler.
///
/// Built by the dispatcher after authorization and payload validation have
/// succeeded; never shared between requests.
#[derive(Debug)]
pub struct ResourceRequest {
    method: MethodKey,
    version: u32,
    query: IndexMap<String, String>,
    path_params: IndexMap<String, String>,
    payload: RequestPayload,
    identity: Option<Arc<Identity>>,
    matching_roles: Vec<String>,
    resources: ResourceChain,
    access_mismatch: AccessMismatchPolicy,
}

impl ResourceRequest {
    /// Creates a request with no payload, identity or resources.
    #[must_use]
    pub fn new(method: MethodKey, version: u32) -> Self {
        Self {
            method,
            version,
            query: IndexMap::new(),
            path_params: IndexMap::new(),
            payload: RequestPayload::None,
            identity: None,
            matching_roles: Vec::new(),
            resources: ResourceChain::new(),
            access_mismatch: AccessMismatchPolicy::default(),
        }
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: IndexMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Sets the raw path parameters.
    #[must_use]
    pub fn with_path_params(mut self, params: IndexMap<String, String>) -> Self {
        self.path_params = params;
        self
    }

    /// Sets the parsed payload.
    #[must_use]
    pub fn with_payload(mut self, payload: RequestPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Sets the caller identity and the roles that granted access.
    #[must_use]
    pub fn with_identity(
        mut self,
        identity: Option<Arc<Identity>>,
        matching_roles: Vec<String>,
    ) -> Self {
        self.identity = identity;
        self.matching_roles = matching_roles;
        self
    }

    /// Sets the addressed resource chain.
    #[must_use]
    pub fn with_resources(mut self, resources: ResourceChain) -> Self {
        self.resources = resources;
        self
    }

    /// Sets the deployment's access-mismatch policy.
    #[must_use]
    pub fn with_access_mismatch(mut self, policy: AccessMismatchPolicy) -> Self {
        self.access_mismatch = policy;
        self
    }

    /// The invoked method.
    #[must_use]
    pub fn method(&self) -> &MethodKey {
        &self.method
    }

    /// Resolved API version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// A query parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// A query parameter read as an integer from its leading digits, so
    /// `30abc` is 30; `None` when it has no leading digits.
    #[must_use]
    pub fn query_integer(&self, name: &str) -> Option<i64> {
        self.query(name).and_then(leading_integer)
    }

    /// All query parameters.
    #[must_use]
    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// A raw path parameter (e.g. `userId`).
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// The parsed payload.
    #[must_use]
    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }

    /// Returns `true` if the payload is a batch.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.payload.is_array()
    }

    /// Borrows the single representation if it is an `R`.
    #[must_use]
    pub fn representation<R: RepresentationCodec>(&self) -> Option<&R> {
        match &self.payload {
            RequestPayload::Single(representation) => representation.downcast_ref::<R>(),
            _ => None,
        }
    }

    /// Borrows every payload element that is an `R`.
    pub fn representations<R: RepresentationCodec>(&self) -> impl Iterator<Item = &R> {
        let items: &[Box<dyn Representation>] = match &self.payload {
            RequestPayload::None => &[],
            RequestPayload::Single(representation) => std::slice::from_ref(representation),
            RequestPayload::Batch(list) => list,
        };
        items.iter().filter_map(|item| item.downcast_ref::<R>())
    }

    /// Takes the single representation if it is an `R`.
    pub fn take_representation<R: RepresentationCodec>(&mut self) -> Option<R> {
        match std::mem::take(&mut self.payload) {
            RequestPayload::Single(representation) if representation.is::<R>() => {
                representation.downcast::<R>()
            }
            other => {
                self.payload = other;
                None
            }
        }
    }

    /// Takes every batch element that is an `R`; other elements are kept.
    pub fn take_representations<R: RepresentationCodec>(&mut self) -> Vec<R> {
        let items = match std::mem::take(&mut self.payload) {
            RequestPayload::Batch(list) => list,
            other => {
                self.payload = other;
                return Vec::new();
            }
        };
        let (taken, kept): (Vec<_>, Vec<_>) = items.into_iter().partition(|item| item.is::<R>());
        if !kept.is_empty() {
            self.payload = RequestPayload::Batch(kept);
        }
        taken
            .into_iter()
            .filter_map(|item| item.downcast::<R>())
            .collect()
    }

    /// The caller identity, for authenticated methods.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_deref()
    }

    /// Intersection of the method's supported roles and the caller's roles.
    #[must_use]
    pub fn matching_roles(&self) -> &[String] {
        &self.matching_roles
    }

    /// The full resource chain, root first.
    #[must_use]
    pub fn resources(&self) -> &ResourceChain {
        &self.resources
    }

    /// The addressed resource, for item requests.
    #[must_use]
    pub fn resource(&self) -> Option<&Resource> {
        self.resources.target()
    }

    /// The chain entry of a given resource type.
    #[must_use]
    pub fn resource_of(&self, resource_type: &str) -> Option<&Resource> {
        self.resources.get(resource_type)
    }

    /// The response for a caller addressing a resource that is not theirs.
    #[must_use]
    pub fn access_denied(&self) -> ClientErrorResponse {
        self.access_mismatch.response()
    }
}

/// Reads the integer at the start of `raw`, after leading whitespace and an
/// optional sign, ignoring whatever follows the digits.
///
/// ```rust
/// use hierarch_core::leading_integer;
///
/// assert_eq!(leading_integer(" 42"), Some(42));
/// assert_eq!(leading_integer("-3px"), Some(-3));
/// assert_eq!(leading_integer("2beta"), Some(2));
/// assert_eq!(leading_integer("beta"), None);
/// ```
#[must_use]
pub fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.trim_start_matches(&['+', '-'][..]);
    let sign_len = trimmed.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::resource::ResourceId;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl RepresentationCodec for Note {
        const NAME: &'static str = "note";
    }

    fn note(text: &str) -> Box<dyn Representation> {
        Box::new(Note { text: text.into() })
    }

    #[test]
    fn test_single_representation() {
        let mut request = ResourceRequest::new(Method::Put.into(), 1)
            .with_payload(RequestPayload::Single(note("a")));
        assert_eq!(request.representation::<Note>().map(|n| n.text.as_str()), Some("a"));
        assert_eq!(request.representations::<Note>().count(), 1);
        assert!(!request.is_array());

        let taken = request.take_representation::<Note>();
        assert_eq!(taken, Some(Note { text: "a".into() }));
        assert!(request.payload().is_none());
    }

    #[test]
    fn test_batch_representations() {
        let mut request = ResourceRequest::new(Method::Post.into(), 1)
            .with_payload(RequestPayload::Batch(vec![note("a"), note("b")]));
        assert!(request.is_array());
        assert!(request.representation::<Note>().is_none());
        let texts: Vec<_> = request.representations::<Note>().map(|n| n.text.clone()).collect();
        assert_eq!(texts, ["a", "b"]);
        assert_eq!(request.take_representations::<Note>().len(), 2);
        assert!(request.payload().is_none());
    }

    #[test]
    fn test_resources_and_query() {
        let mut chain = ResourceChain::new();
        chain.push("users", ResourceId::new("ann"));
        let mut query = IndexMap::new();
        query.insert("age".to_string(), "30".to_string());
        let request = ResourceRequest::new(Method::Get.into(), 2)
            .with_resources(chain.with_target(true))
            .with_query(query)
            .with_identity(Some(Arc::new(Identity::new("ann", "Ann", ["user"]))), vec!["user".into()]);

        assert_eq!(request.version(), 2);
        assert_eq!(request.query("age"), Some("30"));
        assert_eq!(request.resource().map(|r| r.id().value()), Some("ann"));
        assert_eq!(request.identity().map(Identity::user_id), Some("ann"));
        assert_eq!(request.matching_roles(), ["user"]);
        assert_eq!(request.access_denied().status_code().as_u16(), 404);

        let request = request.with_access_mismatch(AccessMismatchPolicy::Forbidden);
        assert_eq!(request.access_denied().status_code().as_u16(), 403);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("30"), Some(30));
        assert_eq!(leading_integer("30abc"), Some(30));
        assert_eq!(leading_integer("  +7 "), Some(7));
        assert_eq!(leading_integer("-12.5"), Some(-12));
        assert_eq!(leading_integer("thirty"), None);
        assert_eq!(leading_integer("--1"), None);
        assert_eq!(leading_integer(""), None);
        assert_eq!(leading_integer("99999999999999999999"), None);
    }

    #[test]
    fn test_query_integer() {
        let mut query = IndexMap::new();
        query.insert("age".to_string(), "30abc".to_string());
        query.insert("limit".to_string(), "many".to_string());
        let request = ResourceRequest::new(Method::Get.into(), 1).with_query(query);
        assert_eq!(request.query_integer("age"), Some(30));
        assert_eq!(request.query_integer("limit"), None);
        assert_eq!(request.query_integer("missing"), None);
    }
}
