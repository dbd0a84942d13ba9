//! Purpose: Provide the runtime JSON decode entrypoints and failure categories.
//! Exports: `from_str`, `ParseFailureCategory`, `categorize_error`,
//!   `categorize_message`, `hint_for_error`.
//! Role: Parser boundary that centralizes serde_json usage details.
//! Invariants: Category labels are stable; diagnostics never echo the payload.
//! Notes: Error mapping is done by callsites so domain context stays explicit.

use serde::de::DeserializeOwned;
use serde_json::error::Category;

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(input)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Shape,
    DepthLimit,
    Io,
    Unknown,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Eof => "eof",
            Self::Shape => "shape",
            Self::DepthLimit => "depth-limit",
            Self::Io => "io",
            Self::Unknown => "unknown",
        }
    }
}

pub fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    match err.classify() {
        Category::Io => ParseFailureCategory::Io,
        Category::Eof => ParseFailureCategory::Eof,
        Category::Data => ParseFailureCategory::Shape,
        Category::Syntax => match categorize_message(&err.to_string()) {
            ParseFailureCategory::DepthLimit => ParseFailureCategory::DepthLimit,
            _ => ParseFailureCategory::Syntax,
        },
    }
}

pub fn categorize_message(message: &str) -> ParseFailureCategory {
    let message = message.to_ascii_lowercase();
    if message.contains("recursion limit") {
        ParseFailureCategory::DepthLimit
    } else if message.contains("eof while parsing") {
        ParseFailureCategory::Eof
    } else if message.contains("missing value for type")
        || message.contains("missing field")
        || message.contains("invalid type")
        || message.contains("payload")
        || message.contains("did not match any variant")
    {
        ParseFailureCategory::Shape
    } else if message.contains("expected") || message.contains("trailing characters") {
        ParseFailureCategory::Syntax
    } else {
        ParseFailureCategory::Unknown
    }
}

pub fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    format!(
        "parse category: {}; line {} column {}; context: {context}",
        categorize_error(err).label(),
        err.line(),
        err.column()
    )
}
