//! Purpose: Native dynamic value model produced by the deserializer.
//! Exports: `DeserializedValue`, `ObjectValue`, `MapValue`, `SetValue`, `DateValue`.
//! Role: Closed enum standing in for the automation client's dynamic values.
//! Invariants: Set elements and map keys are unique under SameValueZero.
//! Invariants: Composite values never compare SameValueZero-equal (each decode is a fresh object).
//! Invariants: Object keys keep first-insertion position when reassigned.
//! Invariants: Primitive membership is hashed, so wide sets and maps build in linear time.

use crate::core::number::{self, as_safe_integer, format_number, is_negative_zero};
use crate::core::regexp::RegExpValue;
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

#[derive(Clone, Debug, PartialEq)]
pub enum DeserializedValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    BigInt(BigInt),
    Date(DateValue),
    RegExp(RegExpValue),
    Array(Vec<DeserializedValue>),
    Set(SetValue),
    Object(ObjectValue),
    Map(MapValue),
}

impl DeserializedValue {
    pub fn empty_object() -> Self {
        Self::Object(ObjectValue::new())
    }

    /// SameValueZero, as used by `Set` membership and `Map` keys.
    pub fn same_value_zero(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            _ => false,
        }
    }

    /// JS `ToPropertyKey` for values used as object keys.
    pub fn to_property_key(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Boolean(flag) => flag.to_string(),
            Self::Number(value) => format_number(*value),
            Self::String(text) => text.clone(),
            Self::BigInt(value) => value.to_string(),
            Self::Date(date) => date.to_js_string(),
            Self::RegExp(regexp) => regexp.to_string(),
            Self::Array(items) => items
                .iter()
                .map(|item| match item {
                    Self::Undefined | Self::Null => String::new(),
                    other => other.to_property_key(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Set(_) => "[object Set]".to_string(),
            Self::Object(_) => "[object Object]".to_string(),
            Self::Map(_) => "[object Map]".to_string(),
        }
    }

    /// Lifts plain JSON into native values (numbers become `f64`).
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Boolean(*flag),
            Value::Number(number) => Self::Number(number.as_f64().unwrap_or(f64::NAN)),
            Value::String(text) => Self::String(text.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => {
                let mut object = ObjectValue::new();
                for (key, value) in map {
                    object.insert(key.clone(), Self::from_json(value));
                }
                Self::Object(object)
            }
        }
    }

    /// Lossy projection onto plain JSON for display and piping.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Undefined | Self::Null => Value::Null,
            Self::Boolean(flag) => json!(flag),
            Self::Number(value) => number_json(*value),
            Self::String(text) => json!(text),
            Self::BigInt(value) => json!(value.to_string()),
            Self::Date(date) => date.to_iso_string().map_or(Value::Null, Value::String),
            Self::RegExp(regexp) => json!(regexp.to_string()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Set(set) => Value::Array(set.iter().map(Self::to_json).collect()),
            Self::Object(object) => {
                let mut map = Map::new();
                for (key, value) in object.iter() {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
            Self::Map(entries) => Value::Array(
                entries
                    .iter()
                    .map(|(key, value)| json!([key.to_json(), value.to_json()]))
                    .collect(),
            ),
        }
    }
}

fn number_json(value: f64) -> Value {
    if is_negative_zero(value) {
        return json!(number::NEGATIVE_ZERO);
    }
    if let Some(integer) = as_safe_integer(value) {
        return json!(integer);
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| json!(format_number(value)))
}

/// String-keyed mapping in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectValue {
    entries: IndexMap<String, DeserializedValue>,
}

impl ObjectValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `key`; an existing key keeps its position.
    pub fn insert(&mut self, key: String, value: DeserializedValue) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&DeserializedValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DeserializedValue)> {
        self.entries.iter()
    }
}

/// Hashable SameValueZero identity of a primitive; composites have none.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum PrimitiveKey {
    Undefined,
    Null,
    Boolean(bool),
    Number(u64),
    String(String),
    BigInt(BigInt),
}

impl PrimitiveKey {
    fn of(value: &DeserializedValue) -> Option<Self> {
        let key = match value {
            DeserializedValue::Undefined => Self::Undefined,
            DeserializedValue::Null => Self::Null,
            DeserializedValue::Boolean(flag) => Self::Boolean(*flag),
            DeserializedValue::Number(number) if number.is_nan() => {
                Self::Number(f64::NAN.to_bits())
            }
            // +0 and -0 share one identity.
            DeserializedValue::Number(number) if *number == 0.0 => Self::Number(0),
            DeserializedValue::Number(number) => Self::Number(number.to_bits()),
            DeserializedValue::String(text) => Self::String(text.clone()),
            DeserializedValue::BigInt(value) => Self::BigInt(value.clone()),
            _ => return None,
        };
        Some(key)
    }
}

/// Generic key-to-value mapping in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MapValue {
    entries: Vec<(DeserializedValue, DeserializedValue)>,
    positions: HashMap<PrimitiveKey, usize>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the value of an existing key in place, otherwise appends.
    pub fn set(&mut self, key: DeserializedValue, value: DeserializedValue) {
        let Some(identity) = PrimitiveKey::of(&key) else {
            self.entries.push((key, value));
            return;
        };
        match self.positions.get(&identity) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.positions.insert(identity, self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &DeserializedValue) -> Option<&DeserializedValue> {
        let position = self.positions.get(&PrimitiveKey::of(key)?)?;
        self.entries.get(*position).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeserializedValue, &DeserializedValue)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// Unique-element collection in insertion order.
#[derive(Clone, Debug, Default)]
pub struct SetValue {
    items: Vec<DeserializedValue>,
    primitives: HashSet<PrimitiveKey>,
}

impl SetValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an equal element is already present.
    pub fn insert(&mut self, value: DeserializedValue) -> bool {
        if let Some(identity) = PrimitiveKey::of(&value) {
            if !self.primitives.insert(identity) {
                return false;
            }
        }
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &DeserializedValue) -> bool {
        PrimitiveKey::of(value).is_some_and(|identity| self.primitives.contains(&identity))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeserializedValue> {
        self.items.iter()
    }
}

impl PartialEq for SetValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

// JS time values are limited to +/-8.64e15 ms around the epoch.
const MAX_TIME_MILLIS: f64 = 8.64e15;

/// A point in time, or the invalid date (`new Date("garbage")`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateValue {
    instant: Option<OffsetDateTime>,
}

impl DateValue {
    pub fn invalid() -> Self {
        Self { instant: None }
    }

    pub fn from_instant(instant: OffsetDateTime) -> Self {
        Self {
            instant: Some(instant.to_offset(UtcOffset::UTC)),
        }
    }

    /// Accepts RFC 3339 timestamps and `YYYY-MM-DD` (UTC midnight).
    pub fn parse(text: &str) -> Self {
        use time::format_description::well_known::Rfc3339;
        if let Ok(instant) = OffsetDateTime::parse(text, &Rfc3339) {
            return Self::from_instant(instant);
        }
        match time::Date::parse(text, format_description!("[year]-[month]-[day]")) {
            Ok(date) => Self::from_instant(date.midnight().assume_utc()),
            Err(_) => Self::invalid(),
        }
    }

    pub fn from_millis(millis: f64) -> Self {
        if !millis.is_finite() || millis.abs() > MAX_TIME_MILLIS {
            return Self::invalid();
        }
        let nanos = (millis.trunc() as i128) * 1_000_000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map(Self::from_instant)
            .unwrap_or_else(|_| Self::invalid())
    }

    pub fn is_valid(&self) -> bool {
        self.instant.is_some()
    }

    /// `Date.prototype.toISOString`, `None` for the invalid date.
    pub fn to_iso_string(&self) -> Option<String> {
        self.instant?
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
            ))
            .ok()
    }

    /// `Date.prototype.toString` rendered in UTC.
    pub fn to_js_string(&self) -> String {
        self.instant
            .and_then(|instant| {
                instant
                    .format(format_description!(
                        "[weekday repr:short] [month repr:short] [day] [year] [hour]:[minute]:[second] GMT+0000 (Coordinated Universal Time)"
                    ))
                    .ok()
            })
            .unwrap_or_else(|| "Invalid Date".to_string())
    }
}
