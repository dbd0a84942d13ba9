//! Purpose: Numeric sentinel handling and JS-compatible number formatting.
//! Exports: `NumberPayload`, `decode_sentinel`, `encode_number`, `format_number`.
//! Role: Keeps the four reserved sentinels in one place for both codec directions.
//! Invariants: Sentinels are exactly `-0`, `NaN`, `Infinity`, `-Infinity`.
//! Invariants: `encode_number` never emits a non-finite literal or a negative-zero literal.

pub const NEGATIVE_ZERO: &str = "-0";
pub const NAN: &str = "NaN";
pub const INFINITY: &str = "Infinity";
pub const NEGATIVE_INFINITY: &str = "-Infinity";

/// Largest integer magnitude an IEEE double represents exactly.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Payload of a `number` wire value: a JSON number or a string.
#[derive(Clone, Debug, PartialEq)]
pub enum NumberPayload {
    Literal(f64),
    Text(String),
}

/// Maps a reserved sentinel to its `f64`. Returns `None` for any other text.
pub fn decode_sentinel(text: &str) -> Option<f64> {
    match text {
        NEGATIVE_ZERO => Some(-0.0),
        NAN => Some(f64::NAN),
        INFINITY => Some(f64::INFINITY),
        NEGATIVE_INFINITY => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

pub fn encode_number(value: f64) -> NumberPayload {
    if value.is_nan() {
        NumberPayload::Text(NAN.to_string())
    } else if value == f64::INFINITY {
        NumberPayload::Text(INFINITY.to_string())
    } else if value == f64::NEG_INFINITY {
        NumberPayload::Text(NEGATIVE_INFINITY.to_string())
    } else if value == 0.0 && value.is_sign_negative() {
        NumberPayload::Text(NEGATIVE_ZERO.to_string())
    } else {
        NumberPayload::Literal(value)
    }
}

pub fn is_negative_zero(value: f64) -> bool {
    value == 0.0 && value.is_sign_negative()
}

/// Integral and exactly representable, so safe to emit as a JSON integer.
pub fn as_safe_integer(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Some(value as i64)
    } else {
        None
    }
}

/// Formats like JS `Number.prototype.toString()` (radix 10).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return NAN.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            INFINITY.to_string()
        } else {
            NEGATIVE_INFINITY.to_string()
        };
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{value:e}");
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        };
    }
    if value.fract() == 0.0 {
        return integral_digits(value);
    }
    value.to_string()
}

/// Shortest round-trip digits of an integral value, zero-padded to its magnitude.
fn integral_digits(value: f64) -> String {
    let text = format!("{value:e}");
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let Ok(exponent) = exponent.parse::<usize>() else {
        return text;
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|ch| *ch != '.').collect();
    format!("{sign}{digits:0<width$}", width = exponent + 1)
}
