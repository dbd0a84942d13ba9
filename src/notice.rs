//! Purpose: Structured stderr notices for decode documents that produced no value.
//! Exports: `Notice`, `NoticeKind`, `notice_json`.
//! Role: Tells pipelines which input line came out absent, and the decoder's reason.
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is `{"notice": {kind, time, cmd, input, line, message}}`; additive-only.
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    /// The document was JSON `null`.
    AbsentInput,
    /// A tag somewhere in the value has no native form.
    UnsupportedType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub time: String,
    pub cmd: String,
    pub input: String,
    /// 1-based line of the document within `input`.
    pub line: usize,
    /// Diagnostic reported by the deserializer.
    pub message: String,
}

impl Notice {
    /// One-line rendering for terminals.
    pub fn summary(&self) -> String {
        format!("{} (input: {}, line {})", self.message, self.input, self.line)
    }
}

pub fn notice_json(notice: &Notice) -> Result<Value, serde_json::Error> {
    let mut outer = Map::new();
    outer.insert("notice".to_string(), serde_json::to_value(notice)?);
    Ok(Value::Object(outer))
}
