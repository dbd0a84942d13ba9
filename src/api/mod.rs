//! Purpose: Define the stable public Rust API boundary for bidival.
//! Exports: Wire and native value types, the codec entry points, and errors.
//! Role: Public, additive-only surface used by the CLI and downstream clients.
//! Invariants: This module is the only public path to codec primitives.
//! Invariants: Internal helpers stay behind `core` and `json`.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::deserializer::{
    Deserializer, Diagnostics, TracingDiagnostics, deserialize, deserialize_local_value,
    deserialize_number, deserialize_tuple,
};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::number::NumberPayload;
pub use crate::core::regexp::RegExpValue;
pub use crate::core::script::{EvaluateResult, ExceptionDetails, StackFrame, StackTrace};
pub use crate::core::serializer::serialize;
pub use crate::core::value::{DateValue, DeserializedValue, MapValue, ObjectValue, SetValue};
pub use crate::core::wire::{DatePayload, PropertyKey, RegExpPayload, SerializedValue, WireEntry};
pub use crate::inspect::inspect;
pub use crate::json::{evaluate_result_from_str, plain_json_from_str, serialized_value_from_str};
