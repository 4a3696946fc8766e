//! Routing pipeline
//!
//! INPUT → KB LOAD → DIALOGUE ENGINE? → NORMALIZE + ENRICH → CLASSIFY → SENTIMENT
//!
//! Only a missing message and an unreadable knowledge base fail a request.
//! Every optional service degrades to "absent".

use crate::classifier::{classification_input, normalize, IntentClassifier};
use crate::config::RouterConfig;
use crate::dialogue::{DialogueAdapter, HttpDialogueEngine};
use crate::error::RouterError;
use crate::knowledge::{self, open_store, KnowledgeBase, ObjectStore};
use crate::language::{HttpLanguageClient, PhraseEnricher, PhraseExtractor, SentimentAnnotator, SentimentDetector};
use crate::models::ClassificationResult;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct AssistantRouter {
    store: Option<Arc<dyn ObjectStore>>,
    kb_key: String,
    kb_timeout: Duration,
    dialogue: DialogueAdapter,
    enricher: PhraseEnricher,
    sentiment: SentimentAnnotator,
}

impl AssistantRouter {
    /// Router with a knowledge base store and every optional service disabled
    pub fn new(store: Option<Arc<dyn ObjectStore>>, kb_key: impl Into<String>, kb_timeout: Duration) -> Self {
        Self {
            store,
            kb_key: kb_key.into(),
            kb_timeout,
            dialogue: DialogueAdapter::disabled(),
            enricher: PhraseEnricher::disabled(),
            sentiment: SentimentAnnotator::disabled(),
        }
    }

    pub fn with_dialogue(mut self, dialogue: DialogueAdapter) -> Self {
        self.dialogue = dialogue;
        self
    }

    pub fn with_enricher(mut self, enricher: PhraseEnricher) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn with_sentiment(mut self, sentiment: SentimentAnnotator) -> Self {
        self.sentiment = sentiment;
        self
    }

    /// Wire up HTTP-backed services from configuration
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        let timeout = config.external_timeout;

        let store: Option<Arc<dyn ObjectStore>> = match &config.kb_location {
            Some(location) => Some(Arc::from(open_store(location, timeout)?)),
            None => None,
        };

        let mut router = Self::new(store, config.kb_key.clone(), timeout);

        if let Some(url) = config.dialogue_engine_url.as_deref().filter(|_| config.dialogue_enabled()) {
            let engine = HttpDialogueEngine::new(url, config.engine.clone(), timeout)?;
            router = router.with_dialogue(DialogueAdapter::new(Some(Arc::new(engine)), timeout));
            info!(bot_id = %config.engine.bot_id, "Dialogue engine enabled");
        }

        if let Some(url) = &config.language_service_url {
            let client = Arc::new(HttpLanguageClient::new(url, &config.language_code, timeout)?);
            let extractor: Arc<dyn PhraseExtractor> = client.clone();
            let detector: Arc<dyn SentimentDetector> = client;

            router = router
                .with_enricher(PhraseEnricher::new(Some(extractor), timeout))
                .with_sentiment(SentimentAnnotator::new(Some(detector), config.use_sentiment, timeout));
            info!(sentiment = config.use_sentiment, "Language service enabled");
        }

        Ok(router)
    }

    /// Full request path for one raw message
    pub async fn handle_message(&self, message: &str) -> Result<ClassificationResult> {
        let utterance = message.trim();
        if utterance.is_empty() {
            return Err(RouterError::MissingMessage);
        }

        let store = self
            .store
            .as_ref()
            .ok_or_else(|| RouterError::Config("KB_BUCKET not set.".to_string()))?;

        let kb = knowledge::load(store.as_ref(), &self.kb_key, self.kb_timeout).await?;

        Ok(self.route(utterance, &kb).await)
    }

    /// Decide the response for an utterance against a loaded knowledge base
    pub async fn route(&self, utterance: &str, kb: &KnowledgeBase) -> ClassificationResult {
        if let Some(dialogue) = self.dialogue.try_external_dialogue(utterance).await {
            let sentiment = self.sentiment.annotate(utterance).await;
            return ClassificationResult::from(dialogue).with_sentiment(sentiment);
        }

        let normalized = normalize(utterance);
        let (phrases, sentiment) = tokio::join!(
            self.enricher.extract_phrases(utterance),
            self.sentiment.annotate(utterance)
        );
        let input = classification_input(&normalized, &phrases);
        debug!(%input, "Keyword classification input");

        let (intent, reply) = IntentClassifier::classify(&normalized, &input, kb);
        info!(%intent, kb_fingerprint = %kb.fingerprint(), "Utterance classified");

        ClassificationResult::new(intent.label(), reply).with_sentiment(sentiment)
    }
}
