//! Purpose: Decode BiDi serialized values into native dynamic values.
//! Exports: `Deserializer`, `Diagnostics`, `TracingDiagnostics`, `deserialize`,
//!   `deserialize_local_value`, `deserialize_number`, `deserialize_tuple`.
//! Role: The value-mapping step between protocol results and their consumers.
//! Invariants: Pure and synchronous; the only side effect is the diagnostic sink.
//! Invariants: `UnsupportedType` is absorbed at the outer call; every other error propagates.
//! Invariants: `promise` always decodes to an empty object.
//! Invariants: Entries are decoded in payload order, so the first fault reached wins.

use crate::core::error::{Error, ErrorKind};
use crate::core::number::{NumberPayload, decode_sentinel};
use crate::core::regexp::RegExpValue;
use crate::core::value::{DateValue, DeserializedValue, MapValue, ObjectValue, SetValue};
use crate::core::wire::{DatePayload, PropertyKey, SerializedValue, WireEntry};
use num_bigint::BigInt;
use std::str::FromStr;

const NO_RESULT_MESSAGE: &str = "Service did not produce a result.";
const PROTO_KEY: &str = "__proto__";

/// Receives non-fatal decode diagnostics.
pub trait Diagnostics {
    fn debug_error(&self, message: &str);
}

/// Default sink: `tracing` debug events on the `bidival::deserializer` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn debug_error(&self, message: &str) {
        tracing::debug!(target: "bidival::deserializer", "{message}");
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn debug_error(&self, message: &str) {
        (**self).debug_error(message);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Deserializer<D = TracingDiagnostics> {
    diagnostics: D,
}

impl Deserializer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Diagnostics> Deserializer<D> {
    pub fn with_diagnostics(diagnostics: D) -> Self {
        Self { diagnostics }
    }

    /// Decodes `value`, returning `Ok(None)` for absent input or unsupported tags.
    pub fn deserialize(
        &self,
        value: Option<SerializedValue>,
    ) -> Result<Option<DeserializedValue>, Error> {
        let Some(value) = value else {
            self.diagnostics.debug_error(NO_RESULT_MESSAGE);
            return Ok(None);
        };
        match deserialize_local_value(value) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::UnsupportedType => {
                self.diagnostics
                    .debug_error(err.message().unwrap_or("unsupported type"));
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

pub fn deserialize(value: Option<SerializedValue>) -> Result<Option<DeserializedValue>, Error> {
    Deserializer::new().deserialize(value)
}

/// Recursive decode step. Unknown tags fail with `ErrorKind::UnsupportedType`.
pub fn deserialize_local_value(value: SerializedValue) -> Result<DeserializedValue, Error> {
    match value {
        SerializedValue::Array(Some(items)) => items
            .into_iter()
            .map(deserialize_local_value)
            .collect::<Result<Vec<_>, _>>()
            .map(DeserializedValue::Array),
        SerializedValue::Set(Some(items)) => {
            let mut set = SetValue::new();
            for item in items {
                set.insert(deserialize_local_value(item)?);
            }
            Ok(DeserializedValue::Set(set))
        }
        SerializedValue::Object(Some(entries)) => {
            let mut object = ObjectValue::new();
            for entry in entries {
                let (key, value) = deserialize_tuple(entry)?;
                let key = match key {
                    DeserializedValue::String(key) => key,
                    other => other.to_property_key(),
                };
                // Assigning `__proto__` on a plain object replaces its prototype, not a key.
                if key != PROTO_KEY {
                    object.insert(key, value);
                }
            }
            Ok(DeserializedValue::Object(object))
        }
        SerializedValue::Map(Some(entries)) => {
            let mut map = MapValue::new();
            for entry in entries {
                let (key, value) = deserialize_tuple(entry)?;
                map.set(key, value);
            }
            Ok(DeserializedValue::Map(map))
        }
        SerializedValue::Promise => Ok(DeserializedValue::empty_object()),
        SerializedValue::RegExp(payload) => {
            RegExpValue::new(payload.pattern, payload.flags.as_deref())
                .map(DeserializedValue::RegExp)
        }
        SerializedValue::Date(DatePayload::Text(text)) => {
            Ok(DeserializedValue::Date(DateValue::parse(&text)))
        }
        SerializedValue::Date(DatePayload::Millis(millis)) => {
            Ok(DeserializedValue::Date(DateValue::from_millis(millis)))
        }
        SerializedValue::Undefined => Ok(DeserializedValue::Undefined),
        SerializedValue::Null => Ok(DeserializedValue::Null),
        SerializedValue::Number(payload) => Ok(deserialize_number(payload)),
        SerializedValue::BigInt(digits) => deserialize_bigint(&digits),
        SerializedValue::Boolean(flag) => Ok(DeserializedValue::Boolean(flag)),
        SerializedValue::String(text) => Ok(DeserializedValue::String(text)),
        SerializedValue::Invalid { reason, .. } => Err(Error::new(ErrorKind::Malformed)
            .with_message(reason)
            .with_hint("Check the payload shape expected for this value's type.")),
        other @ (SerializedValue::Array(None)
        | SerializedValue::Set(None)
        | SerializedValue::Object(None)
        | SerializedValue::Map(None)
        | SerializedValue::Other(_)) => Err(Error::unsupported_type(other.type_name())),
    }
}

/// Maps sentinel strings to special numbers; other strings pass through unchanged.
pub fn deserialize_number(payload: NumberPayload) -> DeserializedValue {
    match payload {
        NumberPayload::Literal(value) => DeserializedValue::Number(value),
        NumberPayload::Text(text) => match decode_sentinel(&text) {
            Some(value) => DeserializedValue::Number(value),
            None => DeserializedValue::String(text),
        },
    }
}

/// Decodes one `[key, value]` entry; literal keys stay strings.
pub fn deserialize_tuple(
    (key, value): WireEntry,
) -> Result<(DeserializedValue, DeserializedValue), Error> {
    let key = match key {
        PropertyKey::Literal(key) => DeserializedValue::String(key),
        PropertyKey::Value(key) => deserialize_local_value(*key)?,
    };
    let value = deserialize_local_value(value)?;
    Ok((key, value))
}

fn deserialize_bigint(digits: &str) -> Result<DeserializedValue, Error> {
    BigInt::from_str(digits)
        .map(DeserializedValue::BigInt)
        .map_err(|err| {
            Error::new(ErrorKind::Malformed)
                .with_message(format!("Cannot convert {digits} to a BigInt"))
                .with_source(err)
        })
}
