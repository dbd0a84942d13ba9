//! Purpose: Native regular-expression values built from `regexp` wire payloads.
//! Exports: `RegExpValue`.
//! Role: Compiles JS pattern syntax (lookaround, backreferences, `[^]`) into a matcher.
//! Invariants: Flags are stored in canonical `dgimsuvy` order; duplicates and unknown flags fail.
//! Invariants: `pattern` and `flags` are the value of record; the matcher is derived from them.

use crate::core::error::{Error, ErrorKind};
use fancy_regex::Regex;
use std::fmt;

// Canonical order of `RegExp.prototype.flags`.
const REGEXP_FLAGS: &str = "dgimsuvy";

#[derive(Clone, Debug)]
pub struct RegExpValue {
    pattern: String,
    flags: String,
    matcher: Regex,
}

impl RegExpValue {
    pub fn new(pattern: impl Into<String>, flags: Option<&str>) -> Result<Self, Error> {
        let pattern = pattern.into();
        let flags = canonical_flags(flags.unwrap_or_default())?;
        let matcher = Regex::new(&matcher_source(&pattern, &flags)).map_err(|err| {
            Error::new(ErrorKind::Malformed)
                .with_message(format!("Invalid regular expression: /{pattern}/{flags}"))
                .with_source(err)
        })?;
        Ok(Self {
            pattern,
            flags,
            matcher,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Exceeding the backtracking limit counts as no match.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.matcher.is_match(haystack).unwrap_or(false)
    }

    /// `RegExp.prototype.source`.
    pub fn source(&self) -> &str {
        if self.pattern.is_empty() {
            "(?:)"
        } else {
            &self.pattern
        }
    }
}

impl PartialEq for RegExpValue {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

impl fmt::Display for RegExpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source(), self.flags)
    }
}

fn canonical_flags(flags: &str) -> Result<String, Error> {
    let invalid = || {
        Error::new(ErrorKind::Malformed).with_message(format!(
            "Invalid flags supplied to RegExp constructor '{flags}'"
        ))
    };
    let mut seen = String::new();
    for flag in flags.chars() {
        if !REGEXP_FLAGS.contains(flag) || seen.contains(flag) {
            return Err(invalid());
        }
        seen.push(flag);
    }
    if seen.contains('u') && seen.contains('v') {
        return Err(invalid());
    }
    Ok(REGEXP_FLAGS.chars().filter(|flag| seen.contains(*flag)).collect())
}

/// Rewrites JS-only class syntax and prepends the `i`/`m`/`s` flags inline.
fn matcher_source(pattern: &str, flags: &str) -> String {
    let inline: String = flags.chars().filter(|flag| "ims".contains(*flag)).collect();
    let mut out = if inline.is_empty() {
        String::new()
    } else {
        format!("(?{inline})")
    };

    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('/') => out.push('/'),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '[' if !in_class => {
                if chars.next_if_eq(&']').is_some() {
                    // `[]` never matches.
                    out.push_str("(?!)");
                } else if chars.peek() == Some(&'^') {
                    chars.next();
                    if chars.next_if_eq(&']').is_some() {
                        // `[^]` matches any code point, line terminators included.
                        out.push_str(r"[\s\S]");
                    } else {
                        out.push_str("[^");
                        in_class = true;
                    }
                } else {
                    out.push('[');
                    in_class = true;
                }
            }
            ']' if in_class => {
                out.push(']');
                in_class = false;
            }
            // Literal inside a JS class; nesting or set operators in the matcher syntax.
            '[' | '&' | '~' if in_class => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{RegExpValue, matcher_source};
    use crate::core::error::ErrorKind;

    #[test]
    fn flags_are_validated_and_canonical() {
        let regexp = RegExpValue::new("ab+c", Some("mi")).expect("regexp");
        assert_eq!(regexp.flags(), "im");
        assert!(regexp.is_match("xABBC"));
        assert_eq!(regexp.to_string(), "/ab+c/im");

        let empty = RegExpValue::new("", None).expect("empty");
        assert_eq!(empty.to_string(), "/(?:)/");

        for flags in ["gg", "q", "uv"] {
            let err = RegExpValue::new("a", Some(flags)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Malformed, "flags {flags}");
        }
        let err = RegExpValue::new("(", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn lookaround_and_backreferences_compile() {
        let lookahead = RegExpValue::new("(?=a)a", None).expect("lookahead");
        assert!(lookahead.is_match("a"));
        let lookbehind = RegExpValue::new("(?<=a)b", None).expect("lookbehind");
        assert!(lookbehind.is_match("ab"));
        assert!(!lookbehind.is_match("cb"));
        let backref = RegExpValue::new(r"(a)\1", None).expect("backref");
        assert!(backref.is_match("aa"));
        assert!(!backref.is_match("ab"));
        let named = RegExpValue::new(r"(?<x>b)\k<x>", None).expect("named");
        assert!(named.is_match("abb"));
    }

    #[test]
    fn js_class_forms_are_rewritten() {
        assert_eq!(matcher_source("a[^]b", ""), r"a[\s\S]b");
        assert_eq!(matcher_source("[]", ""), "(?!)");
        assert_eq!(matcher_source("[[&]", "gi"), r"(?i)[\[\&]");
        assert_eq!(matcher_source(r"a\/b", "s"), "(?s)a/b");

        let any = RegExpValue::new("^[^]$", None).expect("any");
        assert!(any.is_match("\n"));
        let never = RegExpValue::new("[]", None).expect("never");
        assert!(!never.is_match("anything"));
    }
}
