//! Recovery of the JSON payload from raw judgment text
//!
//! The judgment is free text. It may be bare JSON, JSON inside a markdown
//! fence, or JSON surrounded by prose. Two strategies are tried in order:
//! the whole text as one document, then the span from the first `{` to the
//! last `}`.

use super::error::ParseFailure;
use serde_json::{Map, Value};
use tracing::debug;

/// Loosely typed judgment payload
pub type RawJudgment = Map<String, Value>;

pub fn parse_judgment(raw: &str) -> Result<RawJudgment, ParseFailure> {
    let trimmed = raw.trim();

    debug!("Parsing judgment ({} chars)", trimmed.len());

    if let Some(object) = parse_object(trimmed) {
        return Ok(object);
    }

    match outermost_braces(trimmed) {
        Some(candidate) => parse_object(candidate).ok_or_else(|| {
            ParseFailure::new("Embedded JSON object could not be parsed", raw)
        }),
        None => Err(ParseFailure::new("No JSON object found in judgment", raw)),
    }
}

/// Only top-level objects count; a bare number or array is not a judgment.
fn parse_object(text: &str) -> Option<RawJudgment> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
