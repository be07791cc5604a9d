//! Pulls the JSON payload out of a free-form model reply.
//!
//! Replies may wrap the object in prose or markdown fences. Every `{` is paired
//! with its matching `}` (braces inside JSON string literals do not count), and
//! the first span, in start order, that parses as a JSON object is returned.
//! The prompts ask for exactly one object; if a reply carries several, the
//! first well-formed one wins.
//!
//! Spans are found with a stack in one pass per string context instead of a
//! rescan from each `{`, so a reply full of unclosed braces stays linear.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("no JSON object found in model response")]
    NoJsonObject,

    #[error("model JSON did not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Start offset of each `{` mapped to the end (exclusive) of its balanced span.
type Spans = BTreeMap<usize, Option<usize>>;

/// Locates the first balanced `{...}` span of `text` that is a valid JSON object.
pub fn find_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut spans = Spans::new();

    // A `{` read as part of a string literal in one pass still gets its own
    // scan, where it opens an object instead.
    let mut root = text.find('{');
    while let Some(start) = root {
        scan_from(bytes, start, &mut spans);
        root = bytes[start + 1..]
            .iter()
            .enumerate()
            .find(|&(i, &b)| b == b'{' && !spans.contains_key(&(start + 1 + i)))
            .map(|(i, _)| start + 1 + i);
    }

    spans
        .into_iter()
        .filter_map(|(start, end)| end.map(|end| &text[start..end]))
        .find(|span| matches!(serde_json::from_str::<Value>(span), Ok(Value::Object(_))))
}

/// Parses the embedded JSON object of a model reply into `T`.
pub fn parse_response<T: DeserializeOwned>(text: &str) -> Result<T, ResponseError> {
    let span = find_json_object(text).ok_or(ResponseError::NoJsonObject)?;
    Ok(serde_json::from_str(span)?)
}

/// Records the span of every `{` met outside a string literal from `start` on.
///
/// Delimiters are ASCII, so byte offsets always land on char boundaries.
fn scan_from(bytes: &[u8], start: usize, spans: &mut Spans) {
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (pos, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'{' => {
                // Same lexer state as an earlier pass from here on.
                if open.is_empty() && spans.contains_key(&pos) {
                    return;
                }
                spans.entry(pos).or_insert(None);
                open.push(pos);
            }
            b'}' => {
                if let Some(opened) = open.pop() {
                    spans.insert(opened, Some(pos + 1));
                }
            }
            b'"' if !open.is_empty() => in_string = true,
            _ => {}
        }
    }
}
