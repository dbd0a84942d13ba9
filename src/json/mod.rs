//! Purpose: JSON boundary for wire values, evaluate results, and plain JSON input.
//! Exports: `parse` helpers plus domain decoders returning crate errors.
//! Role: Single seam where serde_json failures become `ErrorKind::Malformed`.
//! Invariants: JSON `null` at the top level is the absent value, not a parse failure.
//! Invariants: Every mapped error carries a categorized hint and the caller's context.
//! Invariants: Wire payload shape is not checked here; the deserializer reports it in order.

pub mod parse;

use crate::core::error::{Error, ErrorKind};
use crate::core::script::EvaluateResult;
use crate::core::wire::SerializedValue;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parses a serialized value; `null` yields `None`.
pub fn serialized_value_from_str(
    input: &str,
    context: &str,
) -> Result<Option<SerializedValue>, Error> {
    decode(input, context)
}

pub fn evaluate_result_from_str(input: &str, context: &str) -> Result<EvaluateResult, Error> {
    decode(input, context)
}

pub fn plain_json_from_str(input: &str, context: &str) -> Result<Value, Error> {
    decode(input, context)
}

fn decode<T: DeserializeOwned>(input: &str, context: &str) -> Result<T, Error> {
    parse::from_str(input).map_err(|err| {
        let hint = parse::hint_for_error(&err, context);
        Error::new(ErrorKind::Malformed)
            .with_message(format!("invalid {context} json"))
            .with_hint(hint)
            .with_source(err)
    })
}
