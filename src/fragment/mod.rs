//! Extraction of a single JSON value embedded at an arbitrary offset of a
//! larger string, with no guaranteed delimiter after it. A full-document
//! decoder cannot be used here: trailing content would make the document
//! invalid even though the leading value is well formed.

mod number;

use memchr::memchr2;
use serde_json::Value;

use crate::{Error, Result};

/// Extracts the single JSON value beginning at `offset`, ignoring whatever
/// follows it. Returns the value together with the number of bytes consumed
/// from `offset` (leading whitespace included).
pub fn extract(text: &str, offset: usize) -> Result<(Value, usize)> {
    let section = text
        .get(offset..)
        .ok_or_else(|| Error::decode(format!("offset {offset} is out of bounds")))?;

    for (keyword, value) in [
        ("true", Value::Bool(true)),
        ("false", Value::Bool(false)),
        ("null", Value::Null),
    ] {
        if section.starts_with(keyword) {
            return Ok((value, keyword.len()));
        }
    }

    if section
        .as_bytes()
        .first()
        .is_some_and(|byte| byte.is_ascii_digit() || *byte == b'.' || *byte == b'-')
    {
        let span = number::number_span(section, 0)?;
        let value = serde_json::from_str(span)?;
        return Ok((value, span.len()));
    }

    scan_balanced(section)
}

/// Whether a complete value can be extracted starting at `offset`.
pub fn is_partial_json(text: &str, offset: usize) -> bool {
    extract(text, offset).is_ok()
}

/// Whether the entire string decodes as one JSON document.
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

/// Bracket-depth and string-parity scan. Depth rises on `[`/`{` and on an
/// opening quote, falls on their counterparts, and is frozen inside string
/// literals. The scan stops at the first point where depth returns to zero
/// over a non-blank span, which is then strictly decoded.
fn scan_balanced(section: &str) -> Result<(Value, usize)> {
    let bytes = section.as_bytes();
    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut idx = 0;

    while idx < bytes.len() {
        if in_string {
            // Nothing inside a literal changes depth; jump to the next
            // quote or escape.
            let Some(step) = memchr2(b'"', b'\\', &bytes[idx..]) else {
                break;
            };
            idx += step;
            if bytes[idx] == b'\\' {
                // An escape consumes exactly the next character, so runs of
                // backslashes pair off and an even run leaves the following
                // quote unescaped.
                idx += 2;
                continue;
            }
            in_string = false;
            depth -= 1;
            idx += 1;
        } else {
            match bytes[idx] {
                b'"' => {
                    in_string = true;
                    depth += 1;
                    idx += 1;
                }
                b'[' | b'{' => {
                    depth += 1;
                    idx += 1;
                }
                b']' | b'}' => {
                    depth -= 1;
                    idx += 1;
                }
                byte if byte.is_ascii() => idx += 1,
                _ => idx += section[idx..].chars().next().map_or(1, char::len_utf8),
            }
        }

        if depth == 0 {
            let span = section[..idx].trim();
            if !span.is_empty() {
                let value = serde_json::from_str(span)?;
                return Ok((value, idx));
            }
        }
    }

    Err(Error::UnclosedFragment {
        fragment: section.to_string(),
    })
}
