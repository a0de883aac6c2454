//! The built service and its per-request state machine.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use hierarch_authz::CredentialResolver;
use hierarch_core::{
    AccessMismatchPolicy, ClientErrorResponse, InboundRequest, MethodKey, OutboundResponse,
    RepresentationClass, RepresentationRegistry, RequestPayload, ResourceRequest,
    ResourceResponse, ServerErrorResponse,
};
use hierarch_router::{Params, Router};
use hierarch_telemetry::metrics::{record_request, record_validation_failure};
use hierarch_telemetry::InFlightGuard;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::Instrument;

use crate::builder::ServiceBuilder;
use crate::handler::invoke;
use crate::pipeline::{
    extract_payload, negotiate, requires_representation, resolve_method, resolve_version,
    WirePayload, METHOD_SELECTOR,
};
use crate::setup::{RegisteredResource, RouteTarget, VERSION_PARAM};

const UNMATCHED: &str = "unmatched";
/// Metrics method label when no resource method matches the request.
const UNKNOWN_METHOD: &str = "unknown";
const INTERNAL_ERROR: &str = "Internal Server Error";

type Step<T> = Result<T, ResourceResponse>;

/// A built, immutable resource service.
///
/// `Service` is `Send + Sync`; share it behind an `Arc` and call
/// [`handle`](Self::handle) concurrently.
pub struct Service {
    pub(crate) base_path: String,
    pub(crate) versions: Vec<u32>,
    pub(crate) development_mode: bool,
    pub(crate) access_mismatch: AccessMismatchPolicy,
    pub(crate) registry: RepresentationRegistry,
    pub(crate) resolver: Option<Arc<dyn CredentialResolver>>,
    pub(crate) router: Router<RouteTarget>,
    pub(crate) resources: Vec<RegisteredResource>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("base_path", &self.base_path)
            .field("versions", &self.versions)
            .field("development_mode", &self.development_mode)
            .field("routes", &self.router.patterns())
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Starts a [`ServiceBuilder`].
    #[must_use]
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    /// Registered route patterns, collection then item per resource.
    #[must_use]
    pub fn routes(&self) -> &[String] {
        self.router.patterns()
    }

    /// API versions the service answers.
    #[must_use]
    pub fn supported_versions(&self) -> &[u32] {
        &self.versions
    }

    /// Normalised route prefix; empty when mounted at the root.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Whether server error bodies carry diagnostics.
    #[must_use]
    pub fn development_mode(&self) -> bool {
        self.development_mode
    }

    /// Handles one inbound call.
    ///
    /// Never fails: every outcome, including handler errors and panics, is
    /// rendered as an envelope with its status.
    pub async fn handle(&self, request: InboundRequest) -> OutboundResponse {
        let _in_flight = InFlightGuard::new();
        let started = Instant::now();

        let matched = self
            .router
            .match_path(request.path())
            .and_then(|(target, params)| Some((*target, self.resources.get(target.resource)?, params)));
        let Some((target, resource, params)) = matched else {
            tracing::debug!(path = %request.path(), "no resource matches path");
            let response = ClientErrorResponse::not_found().into();
            return self.respond(UNMATCHED, UNMATCHED, &response, started);
        };

        let method = match resolve_method(
            request.method(),
            target.item,
            request.query_param(METHOD_SELECTOR),
            |name| resource.has_custom_method(name),
        ) {
            Ok(method) => method,
            Err(response) => {
                tracing::debug!(
                    resource = %resource.resource_type(),
                    http_method = %request.method(),
                    "no resource method for request"
                );
                return self.respond(resource.resource_type(), UNKNOWN_METHOD, &response, started);
            }
        };

        let span = tracing::info_span!(
            "resource_request",
            resource = %resource.resource_type(),
            method = %method,
            version = tracing::field::Empty,
        );
        let response = self
            .process(resource, &method, target.item, &params, request)
            .instrument(span.clone())
            .await
            .unwrap_or_else(|response| response);

        span.in_scope(|| self.respond(resource.resource_type(), method.name(), &response, started))
    }

    async fn process(
        &self,
        resource: &RegisteredResource,
        method: &MethodKey,
        item: bool,
        params: &Params,
        request: InboundRequest,
    ) -> Step<ResourceResponse> {
        let authorizer = resource
            .authorizer(method)
            .ok_or_else(ClientErrorResponse::method_not_allowed)?;
        let authorization = authorizer
            .authorize(self.resolver.as_deref(), request.bearer_token())
            .await
            .map_err(|err| {
                tracing::debug!(error = %err, "authorization refused");
                err.into_response()
            })?;

        negotiate(&request)?;

        let version = resolve_version(params.get(VERSION_PARAM));
        tracing::Span::current().record("version", version);
        let pair = resource.pair(method, version).ok_or_else(|| {
            ClientErrorResponse::bad_request(Some(&format!("Version {version} is not supported")))
        })?;

        let query = request.query().clone();
        let wire = extract_payload(request.into_body(), method)?;
        let payload = match (pair.request, wire) {
            (Some(class), Some(wire)) => self.parse_payload(resource, method, class, wire)?,
            (None, Some(_)) => {
                tracing::debug!("method declares no request representation, body ignored");
                RequestPayload::None
            }
            (_, None) => RequestPayload::None,
        };

        if pair.request.is_some() && requires_representation(method) {
            let missing = match &payload {
                RequestPayload::None => true,
                RequestPayload::Batch(items) => items.is_empty(),
                RequestPayload::Single(_) => false,
            };
            if missing {
                return Err(ClientErrorResponse::bad_request(Some("Missing representation")).into());
            }
        }

        let chain = resource.build_chain(params, item).ok_or_else(|| {
            tracing::debug!("path id does not parse under its format");
            ClientErrorResponse::not_found()
        })?;
        let path_params: IndexMap<String, String> = params
            .iter()
            .filter(|(name, _)| *name != VERSION_PARAM)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let resource_request = ResourceRequest::new(method.clone(), version)
            .with_query(query)
            .with_path_params(path_params)
            .with_payload(payload)
            .with_identity(authorization.identity, authorization.matching_roles)
            .with_resources(chain)
            .with_access_mismatch(self.access_mismatch);

        tracing::debug!("invoking handler");
        let handler = resource.handler.as_ref();
        let outcome = AssertUnwindSafe(async move { invoke(handler, method, resource_request).await })
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                tracing::error!(error = %err, "handler failed");
                return Err(ServerErrorResponse::internal(err.to_string(), Some(format!("{err:?}"))).into());
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "handler panicked");
                return Err(ServerErrorResponse::internal(INTERNAL_ERROR, Some(message)).into());
            }
        };

        if let ResourceResponse::Success(success) = &response {
            if let Err(violation) = success.check_representation(pair.response.as_ref()) {
                tracing::error!(%violation, "handler response breaks its representation contract");
                return Err(ServerErrorResponse::internal(INTERNAL_ERROR, Some(violation.to_string())).into());
            }
        }
        Ok(response)
    }

    fn parse_payload(
        &self,
        resource: &RegisteredResource,
        method: &MethodKey,
        class: RepresentationClass,
        wire: WirePayload,
    ) -> Step<RequestPayload> {
        let Some(parser) = self.registry.get(&class) else {
            tracing::error!(representation = class.name(), "request parser missing after setup");
            return Err(ServerErrorResponse::internal(INTERNAL_ERROR, None).into());
        };

        let parse = |value: Value| {
            parser.parse_request(value).map_err(|err| {
                record_validation_failure(resource.resource_type(), method.name());
                tracing::warn!(representation = class.name(), error = %err, "representation rejected");
                ClientErrorResponse::unprocessable_entity(err.to_string())
            })
        };

        match wire {
            WirePayload::Single(value) => Ok(RequestPayload::Single(parse(value)?)),
            WirePayload::Batch(items) => {
                let parsed = items.into_iter().map(parse).collect::<Result<Vec<_>, _>>()?;
                Ok(RequestPayload::Batch(parsed))
            }
        }
    }

    fn respond(
        &self,
        resource: &str,
        method: &str,
        response: &ResourceResponse,
        started: Instant,
    ) -> OutboundResponse {
        let status = response.status_code();
        match response {
            ResourceResponse::ServerError(error) => {
                tracing::error!(status = status.as_u16(), message = error.message(), "request failed");
            }
            ResourceResponse::ClientError(error) if is_caller_fault(status.as_u16()) => {
                tracing::warn!(status = status.as_u16(), message = error.message(), "request rejected");
            }
            _ => {
                tracing::debug!(status = status.as_u16(), "request completed");
            }
        }

        record_request(resource, method, status.as_u16(), started.elapsed());
        OutboundResponse::new(status, response.to_payload(self.development_mode))
    }
}

/// Client errors that point at a misbehaving caller rather than normal flow.
fn is_caller_fault(status: u16) -> bool {
    matches!(status, 400 | 405 | 406 | 415 | 422)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Service>();
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "handler panicked");
    }

    #[test]
    fn test_is_caller_fault() {
        assert!(is_caller_fault(422));
        assert!(!is_caller_fault(404));
        assert!(!is_caller_fault(401));
    }
}
