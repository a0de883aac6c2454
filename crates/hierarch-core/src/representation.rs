//! Versioned wire representations and their request parsers.
//!
//! A representation is the wire-format projection of a resource. Concrete
//! representations are plain serde types implementing
//! [`RepresentationCodec`]; the dispatcher works with them as
//! `Box<dyn Representation>` and recovers the concrete type by downcasting.
//!
//! Request parsers are registered once, during setup, in a
//! [`RepresentationRegistry`]. Registering the same class twice is a
//! [`SetupError`].
//!
//! # Example
//!
//! ```
//! use hierarch_core::representation::{RepresentationCodec, RepresentationRegistry};
//! use hierarch_core::schema::{FieldSpec, Schema, ValueKind};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Note {
//!     text: String,
//! }
//!
//! impl RepresentationCodec for Note {
//!     const NAME: &'static str = "note";
//!
//!     fn request_schema() -> Option<Schema> {
//!         Some(Schema::new().field("text", FieldSpec::required().of_kind(ValueKind::String)))
//!     }
//! }
//!
//! let mut registry = RepresentationRegistry::new();
//! registry.register::<Note>().unwrap();
//! assert!(registry.register::<Note>().is_err());
//! ```

use crate::error::{SetupError, SetupResult};
use crate::schema::{Schema, ValidationError};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::fmt;
use thiserror::Error;

/// Failure to turn request JSON into a representation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepresentationError {
    /// The value violated the representation's request schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The value passed validation but could not be decoded.
    #[error("{0}")]
    Parse(String),
}

impl From<serde_json::Error> for RepresentationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// A concrete, typed representation.
///
/// Implement this on a serde type; [`Representation`] is then provided
/// automatically. The default codec is serde itself. Override
/// [`encode`](Self::encode) to project a value differently on the wire.
pub trait RepresentationCodec:
    Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static
{
    /// Stable name used in logs and setup errors.
    const NAME: &'static str;

    /// Schema that request JSON must satisfy before decoding.
    fn request_schema() -> Option<Schema> {
        None
    }

    /// Decodes request JSON. Called only after schema validation passed.
    fn decode(value: Value) -> Result<Self, RepresentationError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Encodes this value for a response payload.
    fn encode(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|err| {
            tracing::error!(representation = Self::NAME, error = %err, "failed to encode representation");
            Value::Null
        })
    }
}

/// Object-safe view of a representation.
pub trait Representation: Send + Sync + fmt::Debug {
    /// Representation name.
    fn name(&self) -> &'static str;

    /// Class identity of the concrete type.
    fn class(&self) -> RepresentationClass;

    /// Wire JSON of this value.
    fn to_json(&self) -> Value;

    /// Upcast for downcasting by reference.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for downcasting by value.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: RepresentationCodec> Representation for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn class(&self) -> RepresentationClass {
        RepresentationClass::of::<T>()
    }

    fn to_json(&self) -> Value {
        self.encode()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl dyn Representation {
    /// Returns `true` if the concrete type is `T`.
    #[must_use]
    pub fn is<T: RepresentationCodec>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrows the concrete value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: RepresentationCodec>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Takes the concrete value if it is a `T`.
    ///
    /// The value is dropped on a type mismatch; check [`is`](Self::is)
    /// first when it must be kept.
    #[must_use]
    pub fn downcast<T: RepresentationCodec>(self: Box<Self>) -> Option<T> {
        self.into_any().downcast::<T>().ok().map(|value| *value)
    }
}

/// Identifies a representation type independently of any value.
#[derive(Clone, Copy)]
pub struct RepresentationClass {
    name: &'static str,
    type_id: TypeId,
}

impl RepresentationClass {
    /// The class of `R`.
    #[must_use]
    pub fn of<R: RepresentationCodec>() -> Self {
        Self {
            name: R::NAME,
            type_id: TypeId::of::<R>(),
        }
    }

    /// Representation name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if `value` is an instance of this class.
    #[must_use]
    pub fn matches(&self, value: &dyn Representation) -> bool {
        value.class() == *self
    }
}

impl PartialEq for RepresentationClass {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for RepresentationClass {}

impl std::hash::Hash for RepresentationClass {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for RepresentationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RepresentationClass").field(&self.name).finish()
    }
}

impl fmt::Display for RepresentationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The (request, response) representation binding for one method and version.
///
/// `None` on either side means no payload is expected in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RepresentationPair {
    /// Class of the request payload.
    pub request: Option<RepresentationClass>,
    /// Class of the success response payload.
    pub response: Option<RepresentationClass>,
}

impl RepresentationPair {
    /// Creates a pair from explicit classes.
    #[must_use]
    pub fn new(request: Option<RepresentationClass>, response: Option<RepresentationClass>) -> Self {
        Self { request, response }
    }

    /// Request and response are both `R`.
    #[must_use]
    pub fn symmetric<R: RepresentationCodec>() -> Self {
        let class = RepresentationClass::of::<R>();
        Self::new(Some(class), Some(class))
    }

    /// Request `Req`, response `Resp`.
    #[must_use]
    pub fn of<Req: RepresentationCodec, Resp: RepresentationCodec>() -> Self {
        Self::new(
            Some(RepresentationClass::of::<Req>()),
            Some(RepresentationClass::of::<Resp>()),
        )
    }

    /// No request payload; response is `R`.
    #[must_use]
    pub fn response_only<R: RepresentationCodec>() -> Self {
        Self::new(None, Some(RepresentationClass::of::<R>()))
    }

    /// No payload in either direction.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

type ParseFn = fn(Value) -> Result<Box<dyn Representation>, RepresentationError>;

fn decode_boxed<R: RepresentationCodec>(
    value: Value,
) -> Result<Box<dyn Representation>, RepresentationError> {
    Ok(Box::new(R::decode(value)?))
}

/// A registered request parser.
#[derive(Clone)]
pub struct RegisteredRepresentation {
    class: RepresentationClass,
    schema: Option<Schema>,
    parse: ParseFn,
}

impl RegisteredRepresentation {
    /// The registered class.
    #[must_use]
    pub fn class(&self) -> RepresentationClass {
        self.class
    }

    /// The request schema, if the class declares one.
    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Validates then decodes one request element.
    pub fn parse_request(&self, value: Value) -> Result<Box<dyn Representation>, RepresentationError> {
        if let Some(schema) = &self.schema {
            schema.validate(&value)?;
        }
        (self.parse)(value)
    }
}

impl fmt::Debug for RegisteredRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRepresentation")
            .field("class", &self.class)
            .field("schema", &self.schema.is_some())
            .finish()
    }
}

/// Request parsers by representation class, populated during setup.
#[derive(Debug, Clone, Default)]
pub struct RepresentationRegistry {
    entries: IndexMap<RepresentationClass, RegisteredRepresentation>,
}

impl RepresentationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `R`'s request parser and schema.
    pub fn register<R: RepresentationCodec>(&mut self) -> SetupResult<()> {
        let class = RepresentationClass::of::<R>();
        if self.entries.contains_key(&class) {
            return Err(SetupError::duplicate_representation(R::NAME));
        }
        self.entries.insert(
            class,
            RegisteredRepresentation {
                class,
                schema: R::request_schema(),
                parse: decode_boxed::<R>,
            },
        );
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<R: RepresentationCodec>(mut self) -> SetupResult<Self> {
        self.register::<R>()?;
        Ok(self)
    }

    /// Looks up the parser for `class`.
    #[must_use]
    pub fn get(&self, class: &RepresentationClass) -> Option<&RegisteredRepresentation> {
        self.entries.get(class)
    }

    /// Returns `true` if `class` is registered.
    #[must_use]
    pub fn contains(&self, class: &RepresentationClass) -> bool {
        self.entries.contains_key(class)
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, ValueKind};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Book {
        title: String,
        pages: u32,
    }

    impl RepresentationCodec for Book {
        const NAME: &'static str = "book";

        fn request_schema() -> Option<Schema> {
            Some(
                Schema::new()
                    .field("title", FieldSpec::required().of_kind(ValueKind::String))
                    .field("pages", FieldSpec::required().of_kind(ValueKind::Number)),
            )
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Tag {
        label: String,
    }

    impl RepresentationCodec for Tag {
        const NAME: &'static str = "tag";
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = RepresentationRegistry::new();
        registry.register::<Book>().expect("first registration");
        let err = registry.register::<Book>().unwrap_err();
        assert_eq!(err, SetupError::duplicate_representation("book"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_parse_request_validates_first() {
        let registry = RepresentationRegistry::new().with::<Book>().unwrap();
        let entry = registry.get(&RepresentationClass::of::<Book>()).unwrap();

        let err = entry.parse_request(json!({"title": "Dune"})).unwrap_err();
        assert_eq!(err.to_string(), "Missing property pages");
        assert!(matches!(err, RepresentationError::Validation(_)));

        let parsed = entry
            .parse_request(json!({"title": "Dune", "pages": 412}))
            .unwrap();
        assert!(parsed.is::<Book>());
        assert!(!parsed.is::<Tag>());
        assert_eq!(parsed.downcast_ref::<Book>().unwrap().pages, 412);
    }

    #[test]
    fn test_decode_error_without_schema() {
        let registry = RepresentationRegistry::new().with::<Tag>().unwrap();
        let entry = registry.get(&RepresentationClass::of::<Tag>()).unwrap();
        let err = entry.parse_request(json!({"label": 5})).unwrap_err();
        assert!(matches!(err, RepresentationError::Parse(_)));
    }

    #[test]
    fn test_downcast_by_value() {
        let boxed: Box<dyn Representation> = Box::new(Book {
            title: "Emma".into(),
            pages: 300,
        });
        let book = boxed.downcast::<Book>().unwrap();
        assert_eq!(book.title, "Emma");

        let boxed: Box<dyn Representation> = Box::new(Tag { label: "x".into() });
        assert!(boxed.downcast::<Book>().is_none());
    }

    #[test]
    fn test_class_identity() {
        let book = Book {
            title: "Emma".into(),
            pages: 300,
        };
        assert!(RepresentationClass::of::<Book>().matches(&book));
        assert!(!RepresentationClass::of::<Tag>().matches(&book));
        assert_eq!(RepresentationClass::of::<Book>().to_string(), "book");
        assert_eq!(book.to_json(), json!({"title": "Emma", "pages": 300}));
    }

    #[test]
    fn test_pair_constructors() {
        let pair = RepresentationPair::response_only::<Book>();
        assert!(pair.request.is_none());
        assert_eq!(pair.response, Some(RepresentationClass::of::<Book>()));
        assert_eq!(RepresentationPair::empty(), RepresentationPair::new(None, None));
        let pair = RepresentationPair::of::<Tag, Book>();
        assert_eq!(pair.request.map(|c| c.name()), Some("tag"));
    }
}
