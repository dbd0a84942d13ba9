//! Purpose: Typed model of WebDriver BiDi serialized values and their JSON shape.
//! Exports: `SerializedValue`, `PropertyKey`, `WireEntry`, `RegExpPayload`, `DatePayload`.
//! Role: Wire contract between the transport's JSON and the value codec.
//! Invariants: Envelope is `{ "type": <tag>, "value": <payload>? }`; other fields are ignored.
//! Invariants: Unknown tags parse successfully as `Other` so decoding can report them.
//! Invariants: Any JSON parses; a node whose shape does not fit its tag becomes `Invalid`
//!   and fails only when decoding reaches it, so faults surface in payload order.

use crate::core::number::{NumberPayload, as_safe_integer};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// One `[key, value]` tuple of an `object` or `map` payload.
pub type WireEntry = (PropertyKey, SerializedValue);

#[derive(Clone, Debug, PartialEq)]
pub enum SerializedValue {
    Undefined,
    Null,
    String(String),
    Number(NumberPayload),
    Boolean(bool),
    BigInt(String),
    Date(DatePayload),
    RegExp(RegExpPayload),
    Array(Option<Vec<SerializedValue>>),
    Set(Option<Vec<SerializedValue>>),
    Object(Option<Vec<WireEntry>>),
    Map(Option<Vec<WireEntry>>),
    Promise,
    /// Any tag without a local representation (`symbol`, `node`, `window`, ...).
    Other(String),
    /// A node whose envelope or payload does not match its tag, kept verbatim.
    Invalid { raw: Value, reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyKey {
    Literal(String),
    Value(Box<SerializedValue>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegExpPayload {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatePayload {
    Text(String),
    /// Milliseconds since the Unix epoch.
    Millis(f64),
}

type PayloadFault = (Option<Value>, String);

impl SerializedValue {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::BigInt(_) => "bigint",
            Self::Date(_) => "date",
            Self::RegExp(_) => "regexp",
            Self::Array(_) => "array",
            Self::Set(_) => "set",
            Self::Object(_) => "object",
            Self::Map(_) => "map",
            Self::Promise => "promise",
            Self::Other(type_name) => type_name,
            Self::Invalid { raw, .. } => {
                raw.get("type").and_then(Value::as_str).unwrap_or("invalid")
            }
        }
    }

    /// Builds the typed node for one JSON value; never fails.
    pub fn from_json_value(raw: Value) -> Self {
        let Value::Object(mut fields) = raw else {
            let reason = format!("serialized value must be an object, got {}", json_kind(&raw));
            return Self::Invalid { raw, reason };
        };
        let type_name = match fields.get("type") {
            Some(Value::String(type_name)) => type_name.clone(),
            _ => {
                return Self::Invalid {
                    raw: Value::Object(fields),
                    reason: "missing string field `type`".to_string(),
                };
            }
        };
        let value = fields.remove("value").filter(|value| !value.is_null());
        match Self::from_payload(&type_name, value) {
            Ok(parsed) => parsed,
            Err((value, reason)) => {
                if let Some(value) = value {
                    fields.insert("value".to_string(), value);
                }
                Self::Invalid {
                    raw: Value::Object(fields),
                    reason,
                }
            }
        }
    }

    fn from_payload(type_name: &str, value: Option<Value>) -> Result<Self, PayloadFault> {
        match (type_name, value) {
            ("undefined", _) => Ok(Self::Undefined),
            ("null", _) => Ok(Self::Null),
            ("promise", _) => Ok(Self::Promise),
            ("string", Some(Value::String(text))) => Ok(Self::String(text)),
            ("boolean", Some(Value::Bool(flag))) => Ok(Self::Boolean(flag)),
            ("bigint", Some(Value::String(digits))) => Ok(Self::BigInt(digits)),
            ("number", Some(Value::Number(number))) => match number.as_f64() {
                Some(value) => Ok(Self::Number(NumberPayload::Literal(value))),
                None => Err(fault(Value::Number(number), "number payload is out of range")),
            },
            ("number", Some(Value::String(text))) => Ok(Self::Number(NumberPayload::Text(text))),
            ("date", Some(Value::String(text))) => Ok(Self::Date(DatePayload::Text(text))),
            ("date", Some(Value::Number(number))) => match number.as_f64() {
                Some(millis) => Ok(Self::Date(DatePayload::Millis(millis))),
                None => Err(fault(Value::Number(number), "date payload is out of range")),
            },
            ("regexp", Some(value)) => match RegExpPayload::deserialize(&value) {
                Ok(payload) => Ok(Self::RegExp(payload)),
                Err(err) => Err((Some(value), format!("invalid regexp payload: {err}"))),
            },
            ("array", value) => list(type_name, value).map(Self::Array),
            ("set", value) => list(type_name, value).map(Self::Set),
            ("object", value) => entries(type_name, value).map(Self::Object),
            ("map", value) => entries(type_name, value).map(Self::Map),
            (
                "string" | "boolean" | "bigint" | "number" | "date" | "regexp",
                Some(value),
            ) => {
                let reason =
                    format!("{type_name} payload has the wrong shape: {}", json_kind(&value));
                Err((Some(value), reason))
            }
            ("string" | "boolean" | "bigint" | "number" | "date" | "regexp", None) => {
                Err((None, format!("missing value for type {type_name}")))
            }
            _ => Ok(Self::Other(type_name.to_string())),
        }
    }
}

fn fault(value: Value, reason: &str) -> PayloadFault {
    (Some(value), reason.to_string())
}

fn list(
    type_name: &str,
    value: Option<Value>,
) -> Result<Option<Vec<SerializedValue>>, PayloadFault> {
    match value {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .map(SerializedValue::from_json_value)
                .collect(),
        )),
        Some(other) => {
            let reason = format!("{type_name} payload must be a list, got {}", json_kind(&other));
            Err((Some(other), reason))
        }
    }
}

fn entries(type_name: &str, value: Option<Value>) -> Result<Option<Vec<WireEntry>>, PayloadFault> {
    let items = match value {
        None => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            let reason = format!("{type_name} payload must be a list, got {}", json_kind(&other));
            return Err((Some(other), reason));
        }
    };
    let is_pair = |item: &Value| matches!(item, Value::Array(pair) if pair.len() == 2);
    if let Some(position) = items.iter().position(|item| !is_pair(item)) {
        let reason = format!("{type_name} entry {position} is not a [key, value] pair");
        return Err((Some(Value::Array(items)), reason));
    }
    let entries = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Array(pair) => <[Value; 2]>::try_from(pair).ok(),
            _ => None,
        })
        .map(|[key, value]| {
            let key = match key {
                Value::String(key) => PropertyKey::Literal(key),
                other => PropertyKey::Value(Box::new(SerializedValue::from_json_value(other))),
            };
            (key, SerializedValue::from_json_value(value))
        })
        .collect();
    Ok(Some(entries))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<'de> Deserialize<'de> for SerializedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json_value)
    }
}

impl Serialize for SerializedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Self::Invalid { raw, .. } = self {
            return raw.serialize(serializer);
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.type_name())?;
        match self {
            Self::Undefined
            | Self::Null
            | Self::Promise
            | Self::Other(_)
            | Self::Invalid { .. } => {}
            Self::String(text) | Self::BigInt(text) => map.serialize_entry("value", text)?,
            Self::Number(number) => map.serialize_entry("value", number)?,
            Self::Boolean(flag) => map.serialize_entry("value", flag)?,
            Self::Date(date) => map.serialize_entry("value", date)?,
            Self::RegExp(regexp) => map.serialize_entry("value", regexp)?,
            Self::Array(items) | Self::Set(items) => {
                if let Some(items) = items {
                    map.serialize_entry("value", items)?;
                }
            }
            Self::Object(entries) | Self::Map(entries) => {
                if let Some(entries) = entries {
                    map.serialize_entry("value", entries)?;
                }
            }
        }
        map.end()
    }
}

impl Serialize for NumberPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(value) => match as_safe_integer(*value) {
                Some(integer) => serializer.serialize_i64(integer),
                None => serializer.serialize_f64(*value),
            },
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl Serialize for DatePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Millis(millis) => match as_safe_integer(*millis) {
                Some(integer) => serializer.serialize_i64(integer),
                None => serializer.serialize_f64(*millis),
            },
        }
    }
}
