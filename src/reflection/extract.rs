//! Recovery of a JSON object from free-form model output.
//!
//! Models often wrap their answer in markdown fences or surround it with
//! prose. Both strategies below pick a candidate span starting at the first
//! `{` and hand it to `serde_json`:
//!
//! * [`ExtractionMode::Greedy`] takes everything up to the last `}`. It
//!   assumes at most one top-level object and breaks when prose after the
//!   object contains another `}`.
//! * [`ExtractionMode::Balanced`] tracks brace depth, skipping braces inside
//!   string literals, and stops at the brace that closes the first object.
//!   If the braces never balance it falls back to the greedy span.
//!
//! When there is an opening brace but no closing one after it, the span
//! runs to the end of the text so truncated output reports a parse error.

use super::request::JsonObject;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SNIPPET_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    Greedy,
    #[default]
    Balanced,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor {
    mode: ExtractionMode,
}

impl JsonExtractor {
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    pub fn extract(&self, raw: &str) -> Result<JsonObject> {
        let candidate = match self.mode {
            ExtractionMode::Greedy => greedy_span(raw),
            ExtractionMode::Balanced => balanced_span(raw).or_else(|| greedy_span(raw)),
        }
        .ok_or(Error::NoJsonFound)?;

        serde_json::from_str::<JsonObject>(candidate).map_err(|e| {
            debug!("Failed to parse extracted JSON: {}", e);
            Error::JsonParse {
                message: e.to_string(),
                snippet: truncate(candidate, SNIPPET_LIMIT),
            }
        })
    }
}

/// Shorthand for extraction with the default mode.
pub fn extract_json(raw: &str) -> Result<JsonObject> {
    JsonExtractor::default().extract(raw)
}

fn greedy_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    match raw.rfind('}') {
        Some(end) if end > start => Some(&raw[start..=end]),
        _ => Some(&raw[start..]),
    }
}

fn balanced_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
