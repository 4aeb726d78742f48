//! Typed parsing of `/generate` response bodies.
//!
//! Success bodies look like:
//!
//! ```json
//! {
//!   "images": [{ "url": "https://...", "description": "a red fox" }],
//!   "keywords": "fox, autumn, forest"
//! }
//! ```
//!
//! `keywords` may be a comma-separated string or a list of strings, and may be
//! absent. Any other shape is logged and read as no keywords; only `images`
//! decides whether a body parses. A `null` description is replaced with a
//! placeholder.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{WorkflowError, WorkflowResult};
use crate::results::ImageResult;

/// Description used when the service has none for an image
pub const MISSING_DESCRIPTION: &str = "No description available";

/// Parsed success response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResponse {
    pub images: Vec<ImageResult>,
    /// Search keywords the service derived from the prompt (informational)
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    images: Vec<WireImage>,
    #[serde(default)]
    keywords: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireImage {
    url: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
}

/// Read the informational `keywords` field, tolerating unexpected shapes
fn keyword_list(value: Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Null => Vec::new(),
        Value::String(text) => text.split(',').map(str::to_string).collect(),
        Value::Array(items) => {
            let total = items.len();
            let strings: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            if strings.len() < total {
                warn!(dropped = total - strings.len(), "ignoring non-string keywords");
            }
            strings
        }
        other => {
            warn!(keywords = %other, "ignoring keywords of unexpected shape");
            Vec::new()
        }
    };
    raw.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Parse a success body into a [`GenerationResponse`].
///
/// Anything that is not JSON, or lacks a well-formed `images` array, is a
/// [`WorkflowError::ResponseParse`].
pub fn parse_generation_response(body: &[u8]) -> WorkflowResult<GenerationResponse> {
    let wire: WireResponse = serde_json::from_slice(body)
        .map_err(|e| WorkflowError::ResponseParse(e.to_string()))?;

    let images = wire
        .images
        .into_iter()
        .map(|img| ImageResult {
            url: img.url,
            description: img
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        })
        .collect();

    Ok(GenerationResponse {
        images,
        keywords: wire.keywords.map(keyword_list).unwrap_or_default(),
    })
}

/// Extract the `error` message from a failure body, if it has one
pub fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<WireError>(body).ok().map(|e| e.error)
}
