//! Wire representations of users and call events.

use crate::store::{Address, CallEvent, User};
use hierarch::core::{FieldSpec, RepresentationCodec, RepresentationError, Schema, ValueKind};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A call event on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEventRepresentation {
    /// Start time, epoch milliseconds.
    pub time: Number,
    /// Duration in seconds.
    pub duration: Number,
}

impl RepresentationCodec for CallEventRepresentation {
    const NAME: &'static str = "call-event";

    fn request_schema() -> Option<Schema> {
        Some(
            Schema::new()
                .field("time", FieldSpec::required().of_kind(ValueKind::Number))
                .field("duration", FieldSpec::required().of_kind(ValueKind::Number)),
        )
    }
}

impl From<&CallEvent> for CallEventRepresentation {
    fn from(event: &CallEvent) -> Self {
        Self {
            time: event.time.clone(),
            duration: event.duration.clone(),
        }
    }
}

/// Postal address on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRepresentation {
    /// First line.
    pub line1: String,
    /// Optional second line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    /// Whether `line1` is a street address.
    pub street: bool,
    /// Country code.
    pub country: String,
    /// Postal code.
    pub code: Number,
}

/// A user on the wire.
///
/// The password is accepted on requests and never sent back: responses are
/// built with [`UserRepresentation::from_model`], which leaves it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    /// Display name.
    pub name: String,
    /// Unique login; also the item id.
    pub username: String,
    /// Password, requests only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Address.
    pub address: AddressRepresentation,
    /// Age in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Number>,
    /// Recorded call events, responses only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_events: Vec<CallEventRepresentation>,
}

impl UserRepresentation {
    /// Projects a stored user, without its password.
    #[must_use]
    pub fn from_model(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            password: None,
            address: AddressRepresentation {
                line1: user.address.line1.clone(),
                line2: user.address.line2.clone(),
                street: user.address.street,
                country: user.address.country.clone(),
                code: user.address.code.clone(),
            },
            age: user.age.clone(),
            call_events: user.call_events.iter().map(Into::into).collect(),
        }
    }

    /// Converts into a stored user with no call events.
    #[must_use]
    pub fn into_model(self) -> User {
        User {
            name: self.name,
            username: self.username,
            password: self.password.unwrap_or_default(),
            address: Address {
                line1: self.address.line1,
                line2: self.address.line2,
                street: self.address.street,
                country: self.address.country,
                code: self.address.code,
            },
            age: self.age,
            call_events: Vec::new(),
        }
    }
}

impl RepresentationCodec for UserRepresentation {
    const NAME: &'static str = "user";

    fn request_schema() -> Option<Schema> {
        Some(
            Schema::new()
                .field("name", FieldSpec::required().of_kind(ValueKind::String))
                .field("username", FieldSpec::required().of_kind(ValueKind::String))
                .field("password", FieldSpec::required().of_kind(ValueKind::String))
                .nested(
                    "address",
                    Schema::new()
                        .flag("line1", true)
                        .flag("line2", false)
                        .flag("street", true)
                        .flag("country", true)
                        .field("code", FieldSpec::required().of_kind(ValueKind::Number)),
                )
                .field("age", FieldSpec::optional().of_kind(ValueKind::Number)),
        )
    }

    // Call events are only ever added through `addCallEvent`.
    fn decode(value: Value) -> Result<Self, RepresentationError> {
        let mut user: Self = serde_json::from_value(value)?;
        user.call_events.clear();
        Ok(user)
    }
}
