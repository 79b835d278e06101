//! Forge error taxonomy.
//!
//! Every variant is fully recovered inside the orchestrator and mapped to a
//! fixed degraded `AnalyzeResult`; nothing here ever reaches the HTTP caller
//! as a status code. The tagged type exists so library callers can still
//! branch programmatically.

use thiserror::Error;

use crate::extract::ExtractError;

/// Failure modes of one trip through the Forge pipeline.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Client exhausted its strikes for the current window.
    #[error("rate limited: {strikes} strikes in window, retry in {retry_after_secs}s")]
    RateLimited {
        /// Settled strikes counted against the client at admission time.
        strikes: usize,
        /// Seconds until the oldest in-window strike expires.
        retry_after_secs: i64,
    },

    /// No secret token configured; upstream is never contacted.
    #[error("no credential configured in server environment")]
    MissingCredential,

    /// Network-level upstream failure (connect, timeout, body read).
    #[error("upstream transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status.
    #[error("upstream status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream body did not yield a parseable result object.
    #[error("malformed upstream output: {0}")]
    MalformedOutput(#[from] ExtractError),
}
