//! Declarative request schemas and the recursive validator.
//!
//! A [`Schema`] maps property names to either a terminal [`FieldSpec`]
//! (mandatory flag, optional type, optional whitelist) or a nested `Schema`.
//! Validation is depth-first, stops at the first violation and never mutates
//! its input.
//!
//! # Example
//!
//! ```
//! use hierarch_core::schema::{FieldSpec, Schema, ValueKind};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("name", FieldSpec::required().of_kind(ValueKind::String))
//!     .nested("address", Schema::new().flag("line1", true).flag("line2", false))
//!     .field("age", FieldSpec::optional().of_kind(ValueKind::Number));
//!
//! let ok = json!({"name": "Ann", "address": {"line1": "1 Rd"}});
//! assert!(schema.validate(&ok).is_ok());
//!
//! let err = schema.validate(&json!({"name": "Ann", "address": {}})).unwrap_err();
//! assert_eq!(err.to_string(), "Missing property address.line1");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Runtime JSON type a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// JSON string.
    String,
    /// JSON number (integer or floating point).
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON object.
    Object,
    /// JSON array.
    Array,
}

impl ValueKind {
    /// Returns the kind of a JSON value, or `None` for `null`.
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(_) => Some(Self::Number),
            Value::String(_) => Some(Self::String),
            Value::Array(_) => Some(Self::Array),
            Value::Object(_) => Some(Self::Object),
        }
    }

    /// Lowercase name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal property descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSpec {
    mandatory: bool,
    kind: Option<ValueKind>,
    whitelist: Option<Vec<Value>>,
}

impl FieldSpec {
    /// A property that must be present.
    #[must_use]
    pub fn required() -> Self {
        Self {
            mandatory: true,
            ..Self::default()
        }
    }

    /// A property that may be absent.
    #[must_use]
    pub fn optional() -> Self {
        Self::default()
    }

    /// Requires the value, when present, to have exactly this JSON type.
    #[must_use]
    pub fn of_kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts the value, when present, to one of the given literals.
    #[must_use]
    pub fn one_of<I, V>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.whitelist = Some(allowed.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the property must be present.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// The declared type, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        self.kind
    }

    fn check(&self, value: Option<&Value>, path: &str) -> Result<(), ValidationError> {
        let Some(value) = value else {
            if self.mandatory {
                return Err(ValidationError::new(
                    ValidationErrorKind::MissingProperty,
                    path,
                    format!("Missing property {path}"),
                ));
            }
            return Ok(());
        };

        if let Some(kind) = self.kind {
            if ValueKind::of(value) != Some(kind) {
                return Err(ValidationError::new(
                    ValidationErrorKind::InvalidType,
                    path,
                    format!("Invalid value for type {kind} in {path}"),
                ));
            }
        }

        if let Some(allowed) = &self.whitelist {
            if !allowed.contains(value) {
                let listed: Vec<String> = allowed.iter().map(Value::to_string).collect();
                return Err(ValidationError::new(
                    ValidationErrorKind::NotAllowed,
                    path,
                    format!(
                        "Invalid value for {path}, allowed values are [{}]",
                        listed.join(", ")
                    ),
                ));
            }
        }

        Ok(())
    }
}

impl From<bool> for FieldSpec {
    fn from(mandatory: bool) -> Self {
        Self {
            mandatory,
            ..Self::default()
        }
    }
}

/// One entry of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaProperty {
    /// Terminal descriptor.
    Field(FieldSpec),
    /// Nested object schema; the sub-object must be present.
    Nested(Schema),
}

impl From<bool> for SchemaProperty {
    fn from(mandatory: bool) -> Self {
        Self::Field(FieldSpec::from(mandatory))
    }
}

impl From<FieldSpec> for SchemaProperty {
    fn from(spec: FieldSpec) -> Self {
        Self::Field(spec)
    }
}

impl From<Schema> for SchemaProperty {
    fn from(schema: Schema) -> Self {
        Self::Nested(schema)
    }
}

/// An ordered property-name → descriptor map.
///
/// Properties are checked in insertion order, which makes the reported
/// first failure deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    properties: IndexMap<String, SchemaProperty>,
}

impl Schema {
    /// Creates an empty schema (accepts any non-null value).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property with any descriptor.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, property: impl Into<SchemaProperty>) -> Self {
        self.properties.insert(name.into(), property.into());
        self
    }

    /// Adds a terminal descriptor.
    #[must_use]
    pub fn field(self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.property(name, spec)
    }

    /// Adds a bare mandatory flag (`true` = must be present).
    #[must_use]
    pub fn flag(self, name: impl Into<String>, mandatory: bool) -> Self {
        self.property(name, mandatory)
    }

    /// Adds a nested object schema.
    #[must_use]
    pub fn nested(self, name: impl Into<String>, schema: Schema) -> Self {
        self.property(name, schema)
    }

    /// Looks up a property descriptor.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Number of top-level properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the schema declares no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Validates `value`, returning the first violation found.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.validate_at(Some(value), "")
    }

    fn validate_at(&self, value: Option<&Value>, path: &str) -> Result<(), ValidationError> {
        let object = match value {
            None | Some(Value::Null) => return Err(ValidationError::null_object(path)),
            Some(object) => object,
        };

        for (key, property) in &self.properties {
            let key_path = join_path(path, key);
            // `null` counts as absent
            let field = object.get(key.as_str()).filter(|v| !v.is_null());
            match property {
                SchemaProperty::Nested(schema) => schema.validate_at(field, &key_path)?,
                SchemaProperty::Field(spec) => spec.check(field, &key_path)?,
            }
        }

        Ok(())
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// What kind of rule a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The object at a validated path was `null` or absent.
    NullObject,
    /// A mandatory property was absent.
    MissingProperty,
    /// A property had the wrong JSON type.
    InvalidType,
    /// A property was not one of the whitelisted literals.
    NotAllowed,
}

/// The first violation found while validating against a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    kind: ValidationErrorKind,
    path: String,
    message: String,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, path: &str, message: String) -> Self {
        Self {
            kind,
            path: path.to_string(),
            message,
        }
    }

    fn null_object(path: &str) -> Self {
        let shown = if path.is_empty() { "$" } else { path };
        Self::new(
            ValidationErrorKind::NullObject,
            path,
            format!("Invalid null object at path {shown}"),
        )
    }

    /// The violated rule.
    #[must_use]
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// Dotted path of the offending property (empty for the root).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn user_schema() -> Schema {
        Schema::new()
            .field("name", FieldSpec::required().of_kind(ValueKind::String))
            .field("username", FieldSpec::required().of_kind(ValueKind::String))
            .nested(
                "address",
                Schema::new()
                    .flag("line1", true)
                    .flag("line2", false)
                    .flag("street", true)
                    .flag("country", true)
                    .field("code", FieldSpec::required().of_kind(ValueKind::Number)),
            )
            .field("age", FieldSpec::optional().of_kind(ValueKind::Number))
    }

    fn valid_user() -> Value {
        json!({
            "name": "Ann",
            "username": "ann",
            "address": {"line1": "1 Rd", "street": true, "country": "US", "code": 1},
            "age": 30
        })
    }

    #[test]
    fn test_valid_object_passes() {
        assert!(user_schema().validate(&valid_user()).is_ok());
    }

    #[test]
    fn test_null_root_fails_before_descending() {
        let err = user_schema().validate(&Value::Null).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::NullObject);
        assert_eq!(err.to_string(), "Invalid null object at path $");
    }

    #[test]
    fn test_empty_schema_still_rejects_null() {
        assert!(Schema::new().validate(&Value::Null).is_err());
        assert!(Schema::new().validate(&json!({})).is_ok());
    }

    #[test]
    fn test_missing_nested_object() {
        let mut user = valid_user();
        user.as_object_mut().unwrap().remove("address");
        let err = user_schema().validate(&user).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::NullObject);
        assert_eq!(err.path(), "address");
        assert_eq!(err.message(), "Invalid null object at path address");
    }

    #[test]
    fn test_missing_nested_property_uses_dotted_path() {
        let mut user = valid_user();
        user["address"].as_object_mut().unwrap().remove("country");
        let err = user_schema().validate(&user).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::MissingProperty);
        assert_eq!(err.to_string(), "Missing property address.country");
    }

    #[test]
    fn test_null_property_counts_as_missing() {
        let mut user = valid_user();
        user["name"] = Value::Null;
        let err = user_schema().validate(&user).unwrap_err();
        assert_eq!(err.to_string(), "Missing property name");
    }

    #[test]
    fn test_optional_property_may_be_absent() {
        let mut user = valid_user();
        user.as_object_mut().unwrap().remove("age");
        assert!(user_schema().validate(&user).is_ok());
    }

    #[test]
    fn test_type_mismatch() {
        let mut user = valid_user();
        user["age"] = json!("thirty");
        let err = user_schema().validate(&user).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidType);
        assert_eq!(err.to_string(), "Invalid value for type number in age");
    }

    #[test]
    fn test_first_failure_only() {
        let user = json!({"name": 1, "username": 2});
        let err = user_schema().validate(&user).unwrap_err();
        assert_eq!(err.path(), "name");
    }

    #[test]
    fn test_whitelist() {
        let schema = Schema::new().field(
            "country",
            FieldSpec::required().one_of(["US", "CA"]),
        );
        assert!(schema.validate(&json!({"country": "US"})).is_ok());
        let err = schema.validate(&json!({"country": "FR"})).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::NotAllowed);
        assert_eq!(
            err.to_string(),
            r#"Invalid value for country, allowed values are ["US", "CA"]"#
        );
    }

    #[test]
    fn test_non_object_value_has_no_properties() {
        let schema = Schema::new().flag("a", true);
        let err = schema.validate(&json!("text")).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::MissingProperty);
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let user = valid_user();
        let before = user.clone();
        let _ = user_schema().validate(&user);
        let _ = user_schema().validate(&user);
        assert_eq!(user, before);
    }

    proptest! {
        #[test]
        fn prop_validation_is_deterministic(
            name in proptest::option::of("[a-z]{0,6}"),
            age in proptest::option::of(0i64..120),
            code in proptest::option::of(0i64..10),
        ) {
            let mut user = json!({"username": "u", "address": {"line1": "x", "street": true, "country": "US"}});
            if let Some(name) = name { user["name"] = json!(name); }
            if let Some(age) = age { user["age"] = json!(age); }
            if let Some(code) = code { user["address"]["code"] = json!(code); }

            let schema = user_schema();
            let first = schema.validate(&user);
            let second = schema.validate(&user);
            prop_assert_eq!(first, second);
        }
    }
}
