//! Dialogue-engine adapter
//!
//! Hands the whole utterance to a managed dialogue engine before any keyword
//! routing happens. An engine answer with displayable text short-circuits the
//! pipeline; anything else (not configured, empty answer, transport failure)
//! falls through to keyword classification.

use crate::error::RouterError;
use crate::models::{DialogueReply, DIALOGUE_PLACEHOLDER_INTENT};
use crate::probe::best_effort;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Raw answer from a dialogue engine, before the adapter applies its rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineAnswer {
    pub intent_name: Option<String>,
    pub message: Option<String>,
}

#[async_trait]
pub trait DialogueEngine: Send + Sync {
    async fn recognize_text(&self, session_id: &str, text: &str) -> Result<EngineAnswer>;
}

/// Identifiers of the bot to talk to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineTarget {
    pub bot_id: String,
    pub alias_id: String,
    pub locale_id: String,
}

impl EngineTarget {
    pub fn is_configured(&self) -> bool {
        !self.bot_id.trim().is_empty() && !self.alias_id.trim().is_empty()
    }
}

/// Fresh session per request so engine-side state never bleeds between requests
pub fn new_session_id() -> String {
    format!("web-{}", Uuid::new_v4())
}

pub struct DialogueAdapter {
    engine: Option<Arc<dyn DialogueEngine>>,
    timeout: Duration,
}

impl DialogueAdapter {
    pub fn new(engine: Option<Arc<dyn DialogueEngine>>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn is_configured(&self) -> bool {
        self.engine.is_some()
    }

    /// Ask the engine for a reply; `None` means use keyword classification
    pub async fn try_external_dialogue(&self, utterance: &str) -> Option<DialogueReply> {
        let engine = self.engine.as_ref()?;
        if utterance.trim().is_empty() {
            return None;
        }

        let session_id = new_session_id();
        debug!(%session_id, "Trying dialogue engine");

        let answer = best_effort(
            "dialogue_engine",
            self.timeout,
            engine.recognize_text(&session_id, utterance),
        )
        .await
        .into_option()?;

        let reply = answer.message.filter(|m| !m.is_empty())?;
        let intent = answer
            .intent_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DIALOGUE_PLACEHOLDER_INTENT.to_string());

        info!(%intent, "Dialogue engine answered");
        Some(DialogueReply { reply, intent })
    }
}

//
// ================= HTTP Engine =================
//

#[derive(Debug, Serialize)]
struct RecognizeTextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeTextResponse {
    #[serde(default)]
    interpretations: Vec<Interpretation>,
    #[serde(default)]
    messages: Vec<EngineMessage>,
}

#[derive(Debug, Deserialize)]
struct Interpretation {
    #[serde(default)]
    intent: Option<InterpretedIntent>,
}

#[derive(Debug, Deserialize)]
struct InterpretedIntent {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EngineMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Dialogue engine reached over a Lex V2 runtime-style REST API
pub struct HttpDialogueEngine {
    client: Client,
    base_url: String,
    target: EngineTarget,
}

impl HttpDialogueEngine {
    pub fn new(base_url: &str, target: EngineTarget, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            target,
        })
    }

    fn session_url(&self, session_id: &str) -> String {
        format!(
            "{}/bots/{}/botAliases/{}/botLocales/{}/sessions/{}/text",
            self.base_url,
            self.target.bot_id,
            self.target.alias_id,
            self.target.locale_id,
            session_id
        )
    }

    fn parse_answer(response: RecognizeTextResponse) -> EngineAnswer {
        let intent_name = response
            .interpretations
            .into_iter()
            .next()
            .and_then(|i| i.intent)
            .and_then(|i| i.name);

        let message = response
            .messages
            .into_iter()
            .next()
            .and_then(|m| m.content);

        EngineAnswer {
            intent_name,
            message,
        }
    }
}

#[async_trait]
impl DialogueEngine for HttpDialogueEngine {
    async fn recognize_text(&self, session_id: &str, text: &str) -> Result<EngineAnswer> {
        let url = self.session_url(session_id);

        let response = self
            .client
            .post(&url)
            .json(&RecognizeTextRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RouterError::service(
                "dialogue engine",
                format!("recognize_text returned {}: {}", status, error_text),
            ));
        }

        let body: RecognizeTextResponse = response.json().await?;
        Ok(Self::parse_answer(body))
    }
}
