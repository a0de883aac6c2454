//! The business-logic seam.
//!
//! A [`ResourceHandler`] describes one resource type (its plural name, id
//! format, custom methods, access rules and representation contracts) and
//! implements the methods it supports. Unimplemented fixed methods answer
//! 501.

use hierarch_authz::ResourceAccessInfo;
use hierarch_core::{
    BoxFuture, IdFormat, Method, MethodKey, RepresentationPair, ResourceRequest,
    ResourceResponse, ServerErrorResponse,
};

/// What a handler method returns. An `Err` becomes a 500.
pub type HandlerResult = anyhow::Result<ResourceResponse>;

/// Reference to a resource registered on a [`ServiceBuilder`](crate::ServiceBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub(crate) usize);

impl HandlerId {
    /// Registration index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Business logic for one resource type.
///
/// Setup queries ([`resource_type`](Self::resource_type),
/// [`access`](Self::access), [`representations`](Self::representations), ...)
/// are called once while the service is built; their answers are frozen.
///
/// # Example
///
/// ```rust,ignore
/// struct Greetings;
///
/// impl ResourceHandler for Greetings {
///     fn resource_type(&self) -> &str {
///         "greetings"
///     }
///
///     fn access(&self, _method: &MethodKey) -> ResourceAccessInfo {
///         ResourceAccessInfo::public()
///     }
///
///     fn representations(&self, method: Method, version: u32) -> Option<RepresentationPair> {
///         (version == 1).then(|| match method {
///             Method::Get | Method::GetAll => RepresentationPair::response_only::<Greeting>(),
///             _ => RepresentationPair::empty(),
///         })
///     }
///
///     fn get<'a>(&'a self, request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
///         Box::pin(async move {
///             let id = request.resource().map(|r| r.id().to_string()).unwrap_or_default();
///             Ok(SuccessResponse::ok(Greeting { text: format!("hello {id}") }).into())
///         })
///     }
/// }
/// ```
pub trait ResourceHandler: Send + Sync + 'static {
    /// Plural resource type name, used as the path segment (`users`).
    fn resource_type(&self) -> &str;

    /// Format of this level's path id.
    fn id_format(&self) -> IdFormat {
        IdFormat::Opaque
    }

    /// Names of the custom methods, invoked as `POST <item>?method=<name>`.
    fn custom_methods(&self) -> Vec<String> {
        Vec::new()
    }

    /// Authentication and role requirements of `method`.
    fn access(&self, method: &MethodKey) -> ResourceAccessInfo;

    /// Representation contract of a fixed method at `version`.
    ///
    /// `None` means the method does not exist at that version.
    fn representations(&self, method: Method, version: u32) -> Option<RepresentationPair>;

    /// Representation contract of a custom method at `version`.
    ///
    /// Defaults to the version's `POST` contract.
    fn custom_representations(&self, name: &str, version: u32) -> Option<RepresentationPair> {
        let _ = name;
        self.representations(Method::Post, version)
    }

    /// `GET <item>`.
    fn get<'a>(&'a self, _request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        not_implemented()
    }

    /// `GET <collection>`.
    fn get_all<'a>(&'a self, _request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        not_implemented()
    }

    /// `PUT <item>`.
    fn put<'a>(&'a self, _request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        not_implemented()
    }

    /// `POST <collection>`, single or batch.
    fn post<'a>(&'a self, _request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        not_implemented()
    }

    /// `DELETE <item>`.
    fn delete<'a>(&'a self, _request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        not_implemented()
    }

    /// `POST <item>?method=<name>`.
    fn custom<'a>(&'a self, _name: &'a str, _request: ResourceRequest) -> BoxFuture<'a, HandlerResult> {
        not_implemented()
    }
}

fn not_implemented<'a>() -> BoxFuture<'a, HandlerResult> {
    Box::pin(async { Ok(ServerErrorResponse::not_implemented().into()) })
}

/// Routes a resolved method to the matching handler entry point.
pub(crate) fn invoke<'a>(
    handler: &'a dyn ResourceHandler,
    method: &'a MethodKey,
    request: ResourceRequest,
) -> BoxFuture<'a, HandlerResult> {
    match method {
        MethodKey::Fixed(Method::Get) => handler.get(request),
        MethodKey::Fixed(Method::GetAll) => handler.get_all(request),
        MethodKey::Fixed(Method::Put) => handler.put(request),
        MethodKey::Fixed(Method::Post) => handler.post(request),
        MethodKey::Fixed(Method::Delete) => handler.delete(request),
        MethodKey::Custom(name) => handler.custom(name, request),
    }
}
