//! Wire contract shared across the Forge pipeline.
//!
//! `AnalyzeResult` is the only shape a caller ever sees, including on every
//! failure path, where the orchestrator substitutes one of the fixed degraded
//! texts below with zeroed scores. Clients branch on the literal
//! `refined_text`, so these strings are part of the contract.

use serde::{Deserialize, Serialize};

/// Inbound body for `POST /analyze`: raw text plus a stance selector.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Stance mode: "professional" | "short" | "vibe". Unknown falls back to professional.
    #[serde(default)]
    pub mode: String,
}

/// The Forge's answer: rewritten text plus honor/stealth scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub refined_text: String,
    pub honor: i64,
    pub stealth: i64,
}

impl AnalyzeResult {
    /// Degraded result carrying a fixed placeholder text and zeroed scores.
    pub fn degraded(text: &str) -> Self {
        Self {
            refined_text: text.to_string(),
            honor: 0,
            stealth: 0,
        }
    }
}

/// No secret token in the server environment. Checked before any upstream call.
pub const NO_TOKEN_TEXT: &str = "FORGE ERROR: No Token found in server environment.";

/// Upstream transport or extraction failure.
pub const FORGE_DOWN_TEXT: &str = "THE BLADE HAS SHATTERED. RE-LINK THE FORGE.";

/// Client exhausted its strikes for the current watch.
pub const RATE_LIMITED_TEXT: &str =
    "THE FORGE RESTS. FIVE STRIKES PER WATCH - RETURN WHEN THE COALS REHEAT.";
