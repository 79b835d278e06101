//! Forge Bridge: the one outbound call to the chat-completions service.
//!
//! The upstream is an opaque OpenAI-compatible endpoint; the bridge owns the
//! bearer token, the bounded request timeout, and the envelope walk down to
//! `choices[0].message.content`. The orchestrator sees only the
//! [`CompletionClient`] trait, which keeps the dispatch path mockable.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ForgeError;
use crate::prompt::ChatRequest;

/// Default upstream endpoint (overridable via `FORGE_ENDPOINT`).
pub const DEFAULT_ENDPOINT: &str = "https://models.inference.ai.azure.com/chat/completions";

/// Bounded upstream timeout; expiry surfaces as a transport failure.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport seam for the upstream completion call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one chat request and return the raw assistant content string.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ForgeError>;
}

// Response envelope, optional-layered: a structurally odd reply degrades to
// MalformedOutput downstream instead of failing the whole deserialize here.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageBody>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageBody {
    content: Option<String>,
}

/// Reqwest-backed bridge to the hosted completion service.
pub struct ForgeBridge {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl ForgeBridge {
    /// Bridge with an explicit token and endpoint. The token is assumed
    /// non-empty; credential presence is the orchestrator's admission concern.
    pub fn new(token: String, endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            endpoint,
            token: token.trim().to_string(),
            client,
        }
    }
}

#[async_trait]
impl CompletionClient for ForgeBridge {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ForgeError> {
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(
                target: "forge::bridge",
                status = status.as_u16(),
                body = %truncate_for_log(&body),
                "upstream returned error status"
            );
            return Err(ForgeError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = res.json().await?;
        let content = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        Ok(content)
    }
}

/// Clamp an upstream body for log lines; diagnosis detail stays server-side.
pub(crate) fn truncate_for_log(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX).collect();
        format!("{}... [truncated]", head)
    }
}
