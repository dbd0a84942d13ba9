//! Purpose: Model the `script.evaluate` / `script.callFunction` result envelope.
//! Exports: `EvaluateResult`, `ExceptionDetails`, `StackTrace`, `StackFrame`.
//! Role: Feeds successful results into the deserializer; turns exceptions into errors.
//! Invariants: Envelope is tagged by `type` (`success` | `exception`).
//! Invariants: Exceptions surface as `ErrorKind::Evaluation`, never as values.

use crate::core::deserializer::{Deserializer, Diagnostics};
use crate::core::error::{Error, ErrorKind};
use crate::core::value::DeserializedValue;
use crate::core::wire::SerializedValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EvaluateResult {
    Success {
        result: SerializedValue,
        realm: String,
    },
    Exception {
        #[serde(rename = "exceptionDetails")]
        exception_details: ExceptionDetails,
        realm: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    pub column_number: u64,
    pub line_number: u64,
    pub text: String,
    pub exception: SerializedValue,
    pub stack_trace: StackTrace,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    pub call_frames: Vec<StackFrame>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub column_number: u64,
    pub line_number: u64,
    pub function_name: String,
    pub url: String,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function_name = if self.function_name.is_empty() {
            "<anonymous>"
        } else {
            &self.function_name
        };
        let url = if self.url.is_empty() { "unknown" } else { &self.url };
        write!(
            f,
            "{function_name} at {url}:{}:{}",
            self.line_number, self.column_number
        )
    }
}

impl EvaluateResult {
    pub fn realm(&self) -> &str {
        match self {
            Self::Success { realm, .. } | Self::Exception { realm, .. } => realm,
        }
    }

    pub fn into_value<D: Diagnostics>(
        self,
        deserializer: &Deserializer<D>,
    ) -> Result<Option<DeserializedValue>, Error> {
        match self {
            Self::Success { result, .. } => deserializer.deserialize(Some(result)),
            Self::Exception {
                exception_details, ..
            } => Err(exception_details.into_error()),
        }
    }
}

impl ExceptionDetails {
    fn into_error(self) -> Error {
        let err = Error::new(ErrorKind::Evaluation).with_message(format!(
            "Evaluation failed: {} ({}:{})",
            self.text, self.line_number, self.column_number
        ));
        match self.stack_trace.call_frames.first() {
            Some(frame) => err.with_hint(format!("thrown from {frame}")),
            None => err,
        }
    }
}
