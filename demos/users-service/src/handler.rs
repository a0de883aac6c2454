//! The `users` resource.

use crate::representation::{CallEventRepresentation, UserRepresentation};
use crate::store::{CallEvent, Upsert, UserStore};
use hierarch::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Custom method recording a call on a user.
pub const ADD_CALL_EVENT: &str = "addCallEvent";

const ADMIN: &str = "admin";
const USER: &str = "user";

/// Handler for `/v{n}/users[/{userId}]`.
///
/// Anyone may sign up; listing and deleting are admin-only; everything else
/// is open to a user on their own record and to admins on any record.
#[derive(Debug, Clone)]
pub struct UsersHandler {
    store: Arc<UserStore>,
}

impl UsersHandler {
    /// Creates a handler over `store`.
    #[must_use]
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }

    /// Id of the addressed user, if the caller may act on it.
    fn owned_target(request: &ResourceRequest) -> Result<String, ClientErrorResponse> {
        let target = request
            .resource()
            .map(|resource| resource.id().value().to_string())
            .ok_or_else(ClientErrorResponse::not_found)?;
        match request.identity() {
            Some(identity) if identity.has_role(ADMIN) || identity.user_id() == target => {
                Ok(target)
            }
            _ => Err(request.access_denied()),
        }
    }
}

impl ResourceHandler for UsersHandler {
    fn resource_type(&self) -> &str {
        "users"
    }

    fn custom_methods(&self) -> Vec<String> {
        vec![ADD_CALL_EVENT.to_string()]
    }

    fn access(&self, method: &MethodKey) -> ResourceAccessInfo {
        match method {
            MethodKey::Fixed(Method::Post) => ResourceAccessInfo::public(),
            MethodKey::Fixed(Method::Delete | Method::GetAll) => {
                ResourceAccessInfo::new(true, [ADMIN])
            }
            _ => ResourceAccessInfo::new(true, [USER, ADMIN]),
        }
    }

    fn representations(&self, method: Method, _version: u32) -> Option<RepresentationPair> {
        Some(match method {
            Method::Delete => RepresentationPair::empty(),
            _ => RepresentationPair::symmetric::<UserRepresentation>(),
        })
    }

    fn custom_representations(&self, _name: &str, _version: u32) -> Option<RepresentationPair> {
        Some(RepresentationPair::of::<CallEventRepresentation, UserRepresentation>())
    }

    fn get_all<'a>(&'a self, request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            // An unparsable filter means no filter.
            let age = request.query_integer("age");
            let users: Vec<_> = self
                .store
                .list(age)
                .iter()
                .map(UserRepresentation::from_model)
                .collect();
            Ok(SuccessResponse::ok_many(users).into())
        })
    }

    fn get<'a>(&'a self, request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let username = match Self::owned_target(&request) {
                Ok(username) => username,
                Err(denied) => return Ok(denied.into()),
            };
            Ok(match self.store.get(&username) {
                Some(user) => SuccessResponse::ok(UserRepresentation::from_model(&user)).into(),
                None => ClientErrorResponse::not_found().into(),
            })
        })
    }

    fn put<'a>(&'a self, mut request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let username = match Self::owned_target(&request) {
                Ok(username) => username,
                Err(denied) => return Ok(denied.into()),
            };
            let Some(representation) = request.take_representation::<UserRepresentation>() else {
                return Ok(ClientErrorResponse::bad_request(Some("Missing representation")).into());
            };
            if representation.username != username {
                return Ok(ClientErrorResponse::conflict("Invalid username").into());
            }

            let (outcome, user) = self.store.upsert(representation.into_model());
            let body = UserRepresentation::from_model(&user);
            Ok(match outcome {
                Upsert::Created => SuccessResponse::created(body),
                Upsert::Updated => SuccessResponse::ok(body),
            }
            .into())
        })
    }

    fn post<'a>(&'a self, mut request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            if request.is_array() {
                let submitted = request.take_representations::<UserRepresentation>();
                let total = submitted.len();
                let created: Vec<_> = submitted
                    .into_iter()
                    .map(UserRepresentation::into_model)
                    .filter_map(|user| {
                        let body = UserRepresentation::from_model(&user);
                        self.store.create(user).then_some(body)
                    })
                    .collect();
                debug!(submitted = total, created = created.len(), "batch sign-up");

                let skipped = total - created.len();
                let response = SuccessResponse::created_many(created);
                return Ok(if skipped == 0 {
                    response
                } else {
                    response.with_error(format!("{skipped} username(s) not available"))
                }
                .into());
            }

            let Some(representation) = request.take_representation::<UserRepresentation>() else {
                return Ok(ClientErrorResponse::bad_request(Some("Missing representation")).into());
            };
            let user = representation.into_model();
            let body = UserRepresentation::from_model(&user);
            if !self.store.create(user) {
                return Ok(ClientErrorResponse::conflict("username not available").into());
            }
            Ok(SuccessResponse::created(body).into())
        })
    }

    fn delete<'a>(&'a self, _request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async { Ok(ClientErrorResponse::method_not_allowed().into()) })
    }

    fn custom<'a>(&'a self, name: &'a str, request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            if name != ADD_CALL_EVENT {
                return Ok(ClientErrorResponse::method_not_allowed().into());
            }
            let username = match Self::owned_target(&request) {
                Ok(username) => username,
                Err(denied) => return Ok(denied.into()),
            };
            let Some(event) = request.representation::<CallEventRepresentation>() else {
                return Ok(ClientErrorResponse::bad_request(Some("Missing representation")).into());
            };

            let event = CallEvent {
                time: event.time.clone(),
                duration: event.duration.clone(),
            };
            Ok(match self.store.add_call_event(&username, event) {
                Some(user) => SuccessResponse::ok(UserRepresentation::from_model(&user)).into(),
                None => ClientErrorResponse::not_found().into(),
            })
        })
    }
}
