//! Gateway Orchestrator: Admission -> Dispatch -> Extraction -> Settlement.
//!
//! One trip through the Forge per request. Admission asks the strike ledger;
//! Dispatch requires a credential and calls the bridge; Extraction decodes the
//! reply; Settlement records the strike only when everything before it
//! succeeded. Every failure is a typed [`ForgeError`] that
//! [`degraded_result`] maps to a schema-valid placeholder, so the HTTP caller
//! always receives a well-formed `AnalyzeResult`, never a transport fault.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::bridge::{truncate_for_log, CompletionClient, ForgeBridge};
use crate::config::ForgeConfig;
use crate::error::ForgeError;
use crate::extract::extract_result;
use crate::prompt::build_chat_request;
use crate::quota::{Admission, StrikeLedger};
use crate::shared::{
    AnalyzeRequest, AnalyzeResult, FORGE_DOWN_TEXT, NO_TOKEN_TEXT, RATE_LIMITED_TEXT,
};
use crate::stance;

/// Sequences the Forge pipeline over shared ledger and transport state.
pub struct GatewayOrchestrator {
    ledger: StrikeLedger,
    /// `None` when no credential is configured: every request short-circuits
    /// to the no-token result before any upstream contact.
    transport: Option<Arc<dyn CompletionClient>>,
    model: String,
}

impl GatewayOrchestrator {
    pub fn new(
        ledger: StrikeLedger,
        transport: Option<Arc<dyn CompletionClient>>,
        model: String,
    ) -> Self {
        Self {
            ledger,
            transport,
            model,
        }
    }

    /// Wire the stock pipeline from config: bounded ledger plus a reqwest
    /// bridge when a token is present.
    pub fn from_config(config: &ForgeConfig) -> Self {
        let ledger = StrikeLedger::new(config.window, config.max_strikes, config.max_clients);
        let transport: Option<Arc<dyn CompletionClient>> = config
            .token
            .as_ref()
            .map(|t| {
                Arc::new(ForgeBridge::new(t.clone(), config.endpoint.clone()))
                    as Arc<dyn CompletionClient>
            });
        Self::new(ledger, transport, config.model.clone())
    }

    /// Handle one request end to end, converting every failure into its fixed
    /// degraded result. This is the HTTP-facing surface: it cannot fail.
    pub async fn analyze(&self, client_id: &str, request: &AnalyzeRequest) -> AnalyzeResult {
        match self.dispatch(client_id, request, Utc::now()).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    target: "forge::orchestrator",
                    client = client_id,
                    mode = %request.mode,
                    error = %err,
                    "request degraded"
                );
                degraded_result(&err)
            }
        }
    }

    /// Tagged pipeline for library callers and tests: the error carries which
    /// stage failed. `now` drives admission; settlement stamps wall-clock time.
    pub async fn dispatch(
        &self,
        client_id: &str,
        request: &AnalyzeRequest,
        now: DateTime<Utc>,
    ) -> Result<AnalyzeResult, ForgeError> {
        // Admission
        if let Admission::Denied {
            strikes,
            retry_after_secs,
        } = self.ledger.admit(client_id, now)
        {
            return Err(ForgeError::RateLimited {
                strikes,
                retry_after_secs,
            });
        }

        // Dispatch
        let transport = self
            .transport
            .as_ref()
            .ok_or(ForgeError::MissingCredential)?;
        let persona = stance::resolve(&request.mode);
        let chat = build_chat_request(persona, &request.text, &self.model);
        let raw = transport.complete(&chat).await?;

        // Extraction
        let result = match extract_result(&raw) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    target: "forge::orchestrator",
                    stance = persona.stance.as_str(),
                    body = %truncate_for_log(&raw),
                    error = %err,
                    "upstream output failed extraction"
                );
                return Err(err.into());
            }
        };

        // Settlement: only a fully successful trip consumes quota.
        self.ledger.record_strike(client_id, Utc::now());
        Ok(result)
    }
}

/// Map a pipeline failure to the fixed placeholder the caller observes.
/// Pure; callers that want to branch keep the [`ForgeError`] instead.
pub fn degraded_result(err: &ForgeError) -> AnalyzeResult {
    let text = match err {
        ForgeError::RateLimited { .. } => RATE_LIMITED_TEXT,
        ForgeError::MissingCredential => NO_TOKEN_TEXT,
        ForgeError::Transport(_)
        | ForgeError::UpstreamStatus { .. }
        | ForgeError::MalformedOutput(_) => FORGE_DOWN_TEXT,
    };
    AnalyzeResult::degraded(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::prompt::ChatRequest;

    enum ScriptedReply {
        Content(String),
        Status(u16),
    }

    /// Transport double: pops scripted replies and counts upstream contacts.
    struct ScriptedTransport {
        replies: Mutex<VecDeque<ScriptedReply>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<ScriptedReply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedTransport {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, ForgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.replies.lock().unwrap().pop_front() {
                Some(ScriptedReply::Content(s)) => Ok(s),
                Some(ScriptedReply::Status(code)) => Err(ForgeError::UpstreamStatus {
                    status: code,
                    body: "scripted failure".to_string(),
                }),
                None => Ok(String::new()),
            }
        }
    }

    fn good_reply() -> ScriptedReply {
        ScriptedReply::Content(
            r#"{"refined_text": "Respectfully, the deadline passed.", "honor": 95, "stealth": 20}"#
                .to_string(),
        )
    }

    fn orchestrator(transport: Arc<ScriptedTransport>) -> GatewayOrchestrator {
        GatewayOrchestrator::new(
            StrikeLedger::new(Duration::hours(3), 5, 100),
            Some(transport),
            "Phi-4".to_string(),
        )
    }

    fn request(mode: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            text: "the report is late".to_string(),
            mode: mode.to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_returns_extracted_result_unmodified() {
        let transport = ScriptedTransport::new(vec![good_reply()]);
        let orch = orchestrator(Arc::clone(&transport));

        let result = orch.analyze("10.0.0.1", &request("professional")).await;
        assert_eq!(result.refined_text, "Respectfully, the deadline passed.");
        assert_eq!((result.honor, result.stealth), (95, 20));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_sixth_call_rate_limited_without_upstream_contact() {
        let transport =
            ScriptedTransport::new((0..5).map(|_| good_reply()).collect());
        let orch = orchestrator(Arc::clone(&transport));

        for _ in 0..5 {
            let result = orch.analyze("10.0.0.2", &request("short")).await;
            assert_ne!(result.refined_text, RATE_LIMITED_TEXT);
        }

        let result = orch.analyze("10.0.0.2", &request("short")).await;
        assert_eq!(result, AnalyzeResult::degraded(RATE_LIMITED_TEXT));
        // The denied call never reached the transport.
        assert_eq!(transport.call_count(), 5);
    }

    #[tokio::test]
    async fn test_failed_upstream_calls_never_consume_quota() {
        let mut replies: Vec<ScriptedReply> = (0..5).map(|_| ScriptedReply::Status(502)).collect();
        replies.push(good_reply());
        let transport = ScriptedTransport::new(replies);
        let orch = orchestrator(Arc::clone(&transport));

        for _ in 0..5 {
            let result = orch.analyze("10.0.0.3", &request("vibe")).await;
            assert_eq!(result, AnalyzeResult::degraded(FORGE_DOWN_TEXT));
        }

        // Sixth call is still admitted and succeeds.
        let result = orch.analyze("10.0.0.3", &request("vibe")).await;
        assert_eq!(result.honor, 95);
        assert_eq!(transport.call_count(), 6);
    }

    #[tokio::test]
    async fn test_extraction_failure_degrades_and_spares_quota() {
        let mut replies = vec![ScriptedReply::Content("no json here".to_string())];
        replies.extend((0..5).map(|_| good_reply()));
        let transport = ScriptedTransport::new(replies);
        let orch = orchestrator(Arc::clone(&transport));

        let result = orch.analyze("10.0.0.4", &request("professional")).await;
        assert_eq!(result, AnalyzeResult::degraded(FORGE_DOWN_TEXT));

        // All five slots remain: the failed extraction settled nothing.
        for _ in 0..5 {
            let result = orch.analyze("10.0.0.4", &request("professional")).await;
            assert_ne!(result.refined_text, RATE_LIMITED_TEXT);
        }
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits_every_call() {
        let orch = GatewayOrchestrator::new(
            StrikeLedger::new(Duration::hours(3), 5, 100),
            None,
            "Phi-4".to_string(),
        );

        for mode in ["professional", "short", "vibe", "unknown"] {
            let result = orch.analyze("10.0.0.5", &request(mode)).await;
            assert_eq!(result, AnalyzeResult::degraded(NO_TOKEN_TEXT));
        }
    }

    #[test]
    fn test_degraded_result_mapping() {
        let limited = ForgeError::RateLimited {
            strikes: 5,
            retry_after_secs: 3600,
        };
        assert_eq!(degraded_result(&limited).refined_text, RATE_LIMITED_TEXT);
        assert_eq!(
            degraded_result(&ForgeError::MissingCredential).refined_text,
            NO_TOKEN_TEXT
        );
        let status = ForgeError::UpstreamStatus {
            status: 503,
            body: String::new(),
        };
        let degraded = degraded_result(&status);
        assert_eq!(degraded.refined_text, FORGE_DOWN_TEXT);
        assert_eq!((degraded.honor, degraded.stealth), (0, 0));
    }
}
