//! Per-request steps that do not depend on a handler.

use hierarch_core::{
    leading_integer, ClientErrorResponse, InboundBody, InboundRequest, Method, MethodKey,
    ResourceResponse, ServerErrorResponse,
};
use serde_json::Value;

/// Query parameter naming a custom method.
pub const METHOD_SELECTOR: &str = "method";

/// Request payload after envelope extraction, before parsing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WirePayload {
    Single(Value),
    Batch(Vec<Value>),
}

/// Maps the transport method and route shape to a resource method.
///
/// | Transport | Collection | Item |
/// |-----------|------------|------|
/// | GET | `GET_ALL` | `GET` |
/// | PUT | 405 | `PUT` |
/// | DELETE | 405 | `DELETE` |
/// | POST | `POST` (405 with a selector) | custom method (501 without a selector, 405 if unknown) |
pub(crate) fn resolve_method(
    http_method: &http::Method,
    item: bool,
    selector: Option<&str>,
    has_custom_method: impl Fn(&str) -> bool,
) -> Result<MethodKey, ResourceResponse> {
    let fixed = |method: Method| Ok(MethodKey::Fixed(method));

    if *http_method == http::Method::GET {
        return if item { fixed(Method::Get) } else { fixed(Method::GetAll) };
    }

    if *http_method == http::Method::POST {
        let selector = selector.filter(|name| !name.is_empty());
        return match (item, selector) {
            (false, None) => fixed(Method::Post),
            (true, None) => Err(ServerErrorResponse::not_implemented().into()),
            (true, Some(name)) if has_custom_method(name) => Ok(MethodKey::custom(name)),
            (_, Some(_)) => Err(ClientErrorResponse::method_not_allowed().into()),
        };
    }

    if item && *http_method == http::Method::PUT {
        return fixed(Method::Put);
    }
    if item && *http_method == http::Method::DELETE {
        return fixed(Method::Delete);
    }
    Err(ClientErrorResponse::method_not_allowed().into())
}

/// Accept must admit JSON; a non-empty body must be declared JSON.
pub(crate) fn negotiate(request: &InboundRequest) -> Result<(), ClientErrorResponse> {
    if !request.accepts_json() {
        return Err(ClientErrorResponse::not_acceptable());
    }
    if !request.body().is_empty() && !request.has_json_content_type() {
        return Err(ClientErrorResponse::unsupported_media_type());
    }
    Ok(())
}

/// Parses a version token such as `v2`, `V2` or `2` from its leading
/// digits, so `v2beta` is 2; anything without digits is 0.
#[must_use]
pub fn resolve_version(token: Option<&str>) -> u32 {
    let Some(token) = token else {
        return 0;
    };
    let digits = token
        .strip_prefix('v')
        .or_else(|| token.strip_prefix('V'))
        .unwrap_or(token);
    leading_integer(digits)
        .and_then(|version| u32::try_from(version).ok())
        .unwrap_or(0)
}

/// Unwraps the `{ data, isArray? }` envelope.
pub(crate) fn extract_payload(
    body: InboundBody,
    method: &MethodKey,
) -> Result<Option<WirePayload>, ClientErrorResponse> {
    let mut envelope = match body {
        InboundBody::Empty => return Ok(None),
        InboundBody::Malformed(message) => {
            return Err(ClientErrorResponse::bad_request(Some(&message)))
        }
        InboundBody::Json(Value::Object(envelope)) => envelope,
        InboundBody::Json(_) => {
            return Err(ClientErrorResponse::bad_request(Some(
                "Request body must be a JSON object",
            )))
        }
    };

    let is_array = match envelope.remove("isArray") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => flag,
        Some(_) => {
            return Err(ClientErrorResponse::bad_request(Some(
                "isArray must be a boolean",
            )))
        }
    };
    let data = envelope.remove("data").filter(|data| !data.is_null());

    if !is_array {
        return Ok(data.map(WirePayload::Single));
    }

    if *method != MethodKey::Fixed(Method::Post) {
        return Err(ClientErrorResponse::unprocessable_entity(
            "Array payloads are only accepted by POST",
        ));
    }
    match data {
        None => Ok(Some(WirePayload::Batch(Vec::new()))),
        Some(Value::Array(items)) => Ok(Some(WirePayload::Batch(items))),
        Some(_) => Err(ClientErrorResponse::unprocessable_entity(
            "isArray requires data to be an array",
        )),
    }
}

/// Whether a declared request representation must be present.
pub(crate) fn requires_representation(method: &MethodKey) -> bool {
    matches!(
        method,
        MethodKey::Fixed(Method::Put | Method::Post) | MethodKey::Custom(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{ACCEPT, CONTENT_TYPE};
    use http::HeaderValue;
    use serde_json::json;

    fn no_custom(_: &str) -> bool {
        false
    }

    #[test]
    fn test_resolve_method_fixed() {
        let get = resolve_method(&http::Method::GET, false, None, no_custom).unwrap();
        assert_eq!(get, MethodKey::Fixed(Method::GetAll));
        let get = resolve_method(&http::Method::GET, true, None, no_custom).unwrap();
        assert_eq!(get, MethodKey::Fixed(Method::Get));
        let put = resolve_method(&http::Method::PUT, true, None, no_custom).unwrap();
        assert_eq!(put, MethodKey::Fixed(Method::Put));
        let post = resolve_method(&http::Method::POST, false, None, no_custom).unwrap();
        assert_eq!(post, MethodKey::Fixed(Method::Post));
    }

    #[test]
    fn test_resolve_method_rejections() {
        let status = |result: Result<MethodKey, ResourceResponse>| {
            result.map_err(|r| r.status_code().as_u16()).unwrap_err()
        };
        assert_eq!(status(resolve_method(&http::Method::PUT, false, None, no_custom)), 405);
        assert_eq!(status(resolve_method(&http::Method::PATCH, true, None, no_custom)), 405);
        assert_eq!(status(resolve_method(&http::Method::POST, true, None, no_custom)), 501);
        assert_eq!(status(resolve_method(&http::Method::POST, true, Some(""), no_custom)), 501);
        assert_eq!(
            status(resolve_method(&http::Method::POST, true, Some("archive"), no_custom)),
            405
        );
        assert_eq!(
            status(resolve_method(&http::Method::POST, false, Some("archive"), |_| true)),
            405
        );
    }

    #[test]
    fn test_resolve_custom_method() {
        let method =
            resolve_method(&http::Method::POST, true, Some("archive"), |name| name == "archive")
                .unwrap();
        assert_eq!(method, MethodKey::custom("archive"));
    }

    #[test]
    fn test_resolve_version() {
        assert_eq!(resolve_version(Some("v1")), 1);
        assert_eq!(resolve_version(Some("V12")), 12);
        assert_eq!(resolve_version(Some("3")), 3);
        assert_eq!(resolve_version(Some("latest")), 0);
        assert_eq!(resolve_version(Some("v")), 0);
        assert_eq!(resolve_version(Some("v2beta")), 2);
        assert_eq!(resolve_version(Some("3.1")), 3);
        assert_eq!(resolve_version(Some("v-1")), 0);
        assert_eq!(resolve_version(None), 0);
    }

    #[test]
    fn test_negotiate() {
        let request = InboundRequest::new(http::Method::GET, "/v1/users")
            .with_header(ACCEPT, HeaderValue::from_static("text/html"));
        assert_eq!(negotiate(&request).unwrap_err().status_code(), 406);

        let request = InboundRequest::new(http::Method::POST, "/v1/users")
            .with_body(InboundBody::Json(json!({})))
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert_eq!(negotiate(&request).unwrap_err().status_code(), 415);

        let request = InboundRequest::new(http::Method::DELETE, "/v1/users/ann");
        assert!(negotiate(&request).is_ok());
    }

    #[test]
    fn test_extract_single() {
        let post = MethodKey::Fixed(Method::Post);
        let body = InboundBody::Json(json!({"data": {"name": "Ann"}}));
        assert_eq!(
            extract_payload(body, &post).unwrap(),
            Some(WirePayload::Single(json!({"name": "Ann"})))
        );
        assert_eq!(extract_payload(InboundBody::Empty, &post).unwrap(), None);
        assert_eq!(
            extract_payload(InboundBody::Json(json!({"data": null})), &post).unwrap(),
            None
        );
    }

    #[test]
    fn test_extract_batch() {
        let post = MethodKey::Fixed(Method::Post);
        let body = InboundBody::Json(json!({"isArray": true, "data": [{"a": 1}, {"a": 2}]}));
        assert_eq!(
            extract_payload(body, &post).unwrap(),
            Some(WirePayload::Batch(vec![json!({"a": 1}), json!({"a": 2})]))
        );
    }

    #[test]
    fn test_extract_rejections() {
        let post = MethodKey::Fixed(Method::Post);
        let put = MethodKey::Fixed(Method::Put);

        let body = InboundBody::Json(json!({"isArray": true, "data": {"a": 1}}));
        assert_eq!(extract_payload(body, &post).unwrap_err().status_code(), 422);

        let body = InboundBody::Json(json!({"isArray": true, "data": []}));
        assert_eq!(extract_payload(body, &put).unwrap_err().status_code(), 422);

        let body = InboundBody::Json(json!({"isArray": "yes", "data": {}}));
        assert_eq!(extract_payload(body, &post).unwrap_err().status_code(), 400);

        let body = InboundBody::Json(json!([1, 2]));
        assert_eq!(extract_payload(body, &post).unwrap_err().status_code(), 400);

        let body = InboundBody::Malformed("expected value at line 1 column 1".into());
        let err = extract_payload(body, &post).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "expected value at line 1 column 1");
    }

    #[test]
    fn test_requires_representation() {
        assert!(requires_representation(&Method::Put.into()));
        assert!(requires_representation(&Method::Post.into()));
        assert!(requires_representation(&MethodKey::custom("archive")));
        assert!(!requires_representation(&Method::Get.into()));
        assert!(!requires_representation(&Method::Delete.into()));
    }
}
