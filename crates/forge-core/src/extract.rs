//! Response Extractor: pull a strict `AnalyzeResult` out of free-form model output.
//!
//! Upstream replies are not guaranteed to be pure JSON; models wrap the
//! object in commentary or code fences despite the json_object directive. The
//! extractor takes the span from the first `{` to the last `}` and decodes it
//! strictly. Nested braces are covered because the span is
//! outermost-to-outermost; two independent top-level objects in one reply
//! would mis-extract, which is accepted.

use thiserror::Error;

use crate::shared::AnalyzeResult;

/// Why a raw upstream body failed to yield a result object.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No `{` ... `}` pair anywhere in the body.
    #[error("no JSON object span in upstream output")]
    NoObjectSpan,

    /// Span found but it is not a valid result object.
    #[error("result object did not parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Extract the result object from a raw upstream reply.
pub fn extract_result(raw: &str) -> Result<AnalyzeResult, ExtractError> {
    let start = raw.find('{').ok_or(ExtractError::NoObjectSpan)?;
    let end = raw.rfind('}').ok_or(ExtractError::NoObjectSpan)?;
    if end < start {
        return Err(ExtractError::NoObjectSpan);
    }
    let candidate = &raw[start..=end];
    let result: AnalyzeResult = serde_json::from_str(candidate)?;
    Ok(result)
}
