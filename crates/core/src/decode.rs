//! Turns backend response bodies into JSON objects.
//!
//! The backend serializes some array values as quoted strings with every
//! internal quote doubled, e.g. `"""[{""x"":1}]"""` where `[{"x":1}]` was
//! meant. Those strings are not valid JSON, so they are repaired before
//! parsing.

use crate::{Diagnostic, Diagnostics};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::{borrow::Cow, sync::LazyLock};

static ENCODED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"""".+?""""#).expect("encoded json regex is valid"));

/// Decodes a response body into a JSON object.
///
/// An empty body decodes to an empty object. So does a body that cannot be
/// parsed as a JSON object, even after [repair]; that failure is reported to
/// `diagnostics` as a [Diagnostic::DecodeFailed].
///
/// # Examples
///
/// ```
/// use geocore::{TracingDiagnostics, decode};
///
/// let object = decode(r#"{"Items": [], "a": """[1,2]"""}"#, &TracingDiagnostics);
/// assert_eq!(object["a"], serde_json::json!([1, 2]));
/// assert!(decode("", &TracingDiagnostics).is_empty());
/// ```
pub fn decode(body: &str, diagnostics: &dyn Diagnostics) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }
    tracing::debug!("parse JSON response body");
    let repaired = repair(body);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(Value::Object(object)) => object,
        Ok(value) => {
            diagnostics.emit(Diagnostic::DecodeFailed {
                message: format!("expected a JSON object, got {}", kind(&value)),
            });
            Map::new()
        }
        Err(err) => {
            diagnostics.emit(Diagnostic::DecodeFailed {
                message: err.to_string(),
            });
            Map::new()
        }
    }
}

/// Replaces every quote-doubled, string-encoded JSON value with the JSON it encodes.
///
/// Each match has its backslash escapes unescaped, its doubled quotes
/// collapsed, and its surrounding quotes stripped. Returns the body unchanged
/// (and unallocated) if nothing matches.
///
/// # Examples
///
/// ```
/// use geocore::repair;
///
/// assert_eq!(repair(r#"{"a": """[{""x"":1}]"""}"#), r#"{"a": [{"x":1}]}"#);
/// assert_eq!(repair(r#"{"a": [1]}"#), r#"{"a": [1]}"#);
/// ```
pub fn repair(body: &str) -> Cow<'_, str> {
    ENCODED_JSON.replace_all(body, |captures: &Captures<'_>| {
        unescape(&captures[0])
            .replace("\"\"", "\"")
            .trim_matches('"')
            .to_string()
    })
}

fn unescape(s: &str) -> String {
    let mut unescaped = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        let Some(&next) = chars.peek() else {
            unescaped.push(c);
            break;
        };
        let simple = match next {
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0c}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{0b}'),
            _ => None,
        };
        if let Some(simple) = simple {
            let _ = chars.next();
            unescaped.push(simple);
            continue;
        }
        let width = match next {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => 0,
        };
        let digits: String = chars.clone().skip(1).take(width).collect();
        let decoded = (width > 0 && digits.len() == width)
            .then(|| u32::from_str_radix(&digits, 16).ok())
            .flatten()
            .and_then(char::from_u32);
        if let Some(decoded) = decoded {
            for _ in 0..=width {
                let _ = chars.next();
            }
            unescaped.push(decoded);
        } else {
            // unknown or malformed escape, kept verbatim
            unescaped.push(c);
        }
    }
    unescaped
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
