//! BUSHIDO FORGE — Core library.
//! Stance registry, strike ledger, payload builder, and upstream bridge for
//! the text-refinement gateway.

pub mod bridge;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod prompt;
pub mod quota;
pub mod shared;
pub mod stance;

pub use bridge::{CompletionClient, ForgeBridge, DEFAULT_ENDPOINT};
pub use config::ForgeConfig;
pub use error::ForgeError;
pub use extract::{extract_result, ExtractError};
pub use orchestrator::{degraded_result, GatewayOrchestrator};
pub use prompt::{build_chat_request, ChatRequest, DEFAULT_MODEL};
pub use quota::{Admission, StrikeLedger, UNIDENTIFIED_CLIENT};
pub use shared::{AnalyzeRequest, AnalyzeResult, FORGE_DOWN_TEXT, NO_TOKEN_TEXT, RATE_LIMITED_TEXT};
pub use stance::{Persona, Stance};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
