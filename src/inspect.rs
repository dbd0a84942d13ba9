//! Purpose: Render deserialized values in developer-tools console notation.
//! Exports: `inspect`.
//! Role: Small, pure formatter used by the CLI `decode` path.
//! Invariants: Output is a single line; strings are JSON-escaped.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use crate::core::number::{format_number, is_negative_zero};
use crate::core::value::DeserializedValue;

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_REGEXP: &str = "31";
const COLOR_DATE: &str = "35";

pub fn inspect(value: &DeserializedValue, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, use_color, &mut out);
    out
}

fn write_value(value: &DeserializedValue, use_color: bool, out: &mut String) {
    match value {
        DeserializedValue::Undefined => push_colored("undefined", COLOR_NULL, use_color, out),
        DeserializedValue::Null => push_colored("null", COLOR_NULL, use_color, out),
        DeserializedValue::Boolean(flag) => {
            let text = if *flag { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        DeserializedValue::Number(number) => {
            let text = if is_negative_zero(*number) {
                "-0".to_string()
            } else {
                format_number(*number)
            };
            push_colored(&text, COLOR_NUMBER, use_color, out);
        }
        DeserializedValue::BigInt(number) => {
            push_colored(&format!("{number}n"), COLOR_NUMBER, use_color, out)
        }
        DeserializedValue::String(text) => push_colored(&quote(text), COLOR_STRING, use_color, out),
        DeserializedValue::RegExp(regexp) => {
            push_colored(&regexp.to_string(), COLOR_REGEXP, use_color, out)
        }
        DeserializedValue::Date(date) => {
            let text = match date.to_iso_string() {
                Some(iso) => format!("Date({iso})"),
                None => "Invalid Date".to_string(),
            };
            push_colored(&text, COLOR_DATE, use_color, out);
        }
        DeserializedValue::Array(items) => {
            out.push('[');
            write_items(items.iter(), use_color, out);
            out.push(']');
        }
        DeserializedValue::Set(set) => {
            out.push_str(&format!("Set({}) {{", set.len()));
            write_items(set.iter(), use_color, out);
            out.push('}');
        }
        DeserializedValue::Object(object) => {
            out.push('{');
            for (idx, (key, value)) in object.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                let key = if is_identifier(key) {
                    key.clone()
                } else {
                    quote(key)
                };
                push_colored(&key, COLOR_KEY, use_color, out);
                out.push_str(": ");
                write_value(value, use_color, out);
            }
            out.push('}');
        }
        DeserializedValue::Map(map) => {
            out.push_str(&format!("Map({}) {{", map.len()));
            for (idx, (key, value)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_value(key, use_color, out);
                out.push_str(" => ");
                write_value(value, use_color, out);
            }
            out.push('}');
        }
    }
}

fn write_items<'a>(
    items: impl Iterator<Item = &'a DeserializedValue>,
    use_color: bool,
    out: &mut String,
) {
    for (idx, item) in items.enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_value(item, use_color, out);
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}
