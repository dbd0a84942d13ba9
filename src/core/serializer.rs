//! Purpose: Encode native values back into BiDi serialized (local) values.
//! Exports: `serialize`.
//! Role: Inverse of the deserializer, used for argument encoding and round-trip checks.
//! Invariants: Special numbers always travel as sentinel strings.
//! Invariants: String map keys are emitted as literal keys; other keys are nested values.

use crate::core::error::{Error, ErrorKind};
use crate::core::number::encode_number;
use crate::core::value::DeserializedValue;
use crate::core::wire::{DatePayload, PropertyKey, RegExpPayload, SerializedValue};

pub fn serialize(value: &DeserializedValue) -> Result<SerializedValue, Error> {
    let serialized = match value {
        DeserializedValue::Undefined => SerializedValue::Undefined,
        DeserializedValue::Null => SerializedValue::Null,
        DeserializedValue::Boolean(flag) => SerializedValue::Boolean(*flag),
        DeserializedValue::Number(value) => SerializedValue::Number(encode_number(*value)),
        DeserializedValue::String(text) => SerializedValue::String(text.clone()),
        DeserializedValue::BigInt(value) => SerializedValue::BigInt(value.to_string()),
        DeserializedValue::Date(date) => {
            let text = date.to_iso_string().ok_or_else(|| {
                Error::new(ErrorKind::Unserializable)
                    .with_message("Invalid Date cannot be serialized")
            })?;
            SerializedValue::Date(DatePayload::Text(text))
        }
        DeserializedValue::RegExp(regexp) => SerializedValue::RegExp(RegExpPayload {
            pattern: regexp.pattern().to_string(),
            flags: (!regexp.flags().is_empty()).then(|| regexp.flags().to_string()),
        }),
        DeserializedValue::Array(items) => {
            SerializedValue::Array(Some(serialize_all(items.iter())?))
        }
        DeserializedValue::Set(set) => SerializedValue::Set(Some(serialize_all(set.iter())?)),
        DeserializedValue::Object(object) => SerializedValue::Object(Some(
            object
                .iter()
                .map(|(key, value)| Ok((PropertyKey::Literal(key.clone()), serialize(value)?)))
                .collect::<Result<Vec<_>, Error>>()?,
        )),
        DeserializedValue::Map(map) => SerializedValue::Map(Some(
            map.iter()
                .map(|(key, value)| {
                    let key = match key {
                        DeserializedValue::String(key) => PropertyKey::Literal(key.clone()),
                        other => PropertyKey::Value(Box::new(serialize(other)?)),
                    };
                    Ok((key, serialize(value)?))
                })
                .collect::<Result<Vec<_>, Error>>()?,
        )),
    };
    Ok(serialized)
}

fn serialize_all<'a>(
    items: impl Iterator<Item = &'a DeserializedValue>,
) -> Result<Vec<SerializedValue>, Error> {
    items.map(serialize).collect()
}
