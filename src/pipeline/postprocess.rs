//! Post-processing: turn a raw model response into [`JobAdContent`].
//!
//! Models asked for JSON often wrap it in prose or code fences. Parsing runs
//! two attempts, in order:
//!
//! 1. Strict parse of the whole response.
//! 2. Parse the span from the first `{` to the last `}`.
//!
//! If both fail the response is rejected with
//! [`JobAdError::SynthesisParse`]. Nothing is retried or defaulted.
//!
//! The second attempt can capture unintended text when prose around the JSON
//! itself contains braces; that is a known limitation of the span rule.

use crate::error::JobAdError;
use crate::output::JobAdContent;
use serde_json::Value;
use tracing::debug;

/// Longest response prefix quoted in a parse error.
const EXCERPT_CHARS: usize = 120;

/// Parse a model response into a [`JobAdContent`].
pub fn parse_job_ad_response(response: &str) -> Result<JobAdContent, JobAdError> {
    let value = extract_json_object(response)?;
    serde_json::from_value(value).map_err(|e| parse_error(response, format!("unexpected field types: {e}")))
}

/// Locate and parse the JSON object in `response`.
///
/// Returns the parsed object unchanged; a value that parses but is not an
/// object (a bare list or string) is rejected.
pub fn extract_json_object(response: &str) -> Result<Value, JobAdError> {
    let value = match serde_json::from_str::<Value>(response) {
        Ok(v) => v,
        Err(strict_err) => {
            debug!("Strict JSON parse failed ({strict_err}); trying brace span");
            let span = brace_span(response).ok_or_else(|| {
                parse_error(response, "response contains no '{...}' span".to_string())
            })?;
            serde_json::from_str::<Value>(span)
                .map_err(|e| parse_error(response, format!("brace span is not valid JSON: {e}")))?
        }
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(parse_error(response, "JSON value is not an object".to_string()))
    }
}

/// The substring from the first `{` through the last `}`, if both exist in
/// that order.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_error(response: &str, detail: String) -> JobAdError {
    JobAdError::SynthesisParse {
        detail,
        excerpt: response.chars().take(EXCERPT_CHARS).collect(),
    }
}
