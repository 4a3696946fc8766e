//! Language service enrichments
//!
//! Key-phrase extraction widens the text the keyword rules match against, and
//! sentiment detection labels the response. Both are optional: when the
//! service is missing or misbehaves, the request proceeds without them.

use crate::error::RouterError;
use crate::probe::best_effort;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[async_trait]
pub trait PhraseExtractor: Send + Sync {
    /// Salient phrases in service order
    async fn key_phrases(&self, text: &str) -> Result<Vec<String>>;
}

#[async_trait]
pub trait SentimentDetector: Send + Sync {
    /// Sentiment label such as `POSITIVE`, if the service produced one
    async fn sentiment(&self, text: &str) -> Result<Option<String>>;
}

//
// ================= Phrase Enricher =================
//

pub struct PhraseEnricher {
    extractor: Option<Arc<dyn PhraseExtractor>>,
    timeout: Duration,
}

impl PhraseEnricher {
    pub fn new(extractor: Option<Arc<dyn PhraseExtractor>>, timeout: Duration) -> Self {
        Self { extractor, timeout }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Lower-cased phrases joined by spaces; empty on any failure
    pub async fn extract_phrases(&self, text: &str) -> String {
        let Some(extractor) = &self.extractor else {
            return String::new();
        };
        if text.is_empty() {
            return String::new();
        }

        let phrases = best_effort("key_phrases", self.timeout, extractor.key_phrases(text))
            .await
            .unwrap_or_default();

        let merged = phrases
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        debug!(phrases = %merged, "Key phrases extracted");
        merged
    }
}

//
// ================= Sentiment Annotator =================
//

pub struct SentimentAnnotator {
    detector: Option<Arc<dyn SentimentDetector>>,
    enabled: bool,
    timeout: Duration,
}

impl SentimentAnnotator {
    pub fn new(detector: Option<Arc<dyn SentimentDetector>>, enabled: bool, timeout: Duration) -> Self {
        Self {
            detector,
            enabled,
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, false, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.detector.is_some()
    }

    pub async fn annotate(&self, text: &str) -> Option<String> {
        if !self.enabled || text.is_empty() {
            return None;
        }
        let detector = self.detector.as_ref()?;

        best_effort("sentiment", self.timeout, detector.sentiment(text))
            .await
            .flatten()
            .into_option()
    }
}

//
// ================= HTTP Client =================
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectRequest<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KeyPhrasesResponse {
    #[serde(default)]
    key_phrases: Vec<KeyPhrase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KeyPhrase {
    #[serde(default)]
    text: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SentimentResponse {
    #[serde(default)]
    sentiment: Option<String>,
}

/// Connection-pooled client for a Comprehend-style language service
pub struct HttpLanguageClient {
    client: Client,
    base_url: String,
    language_code: String,
}

impl HttpLanguageClient {
    pub fn new(base_url: &str, language_code: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language_code: language_code.to_string(),
        })
    }

    async fn detect<T: for<'de> Deserialize<'de>>(&self, operation: &str, text: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, operation);
        let request = DetectRequest {
            text,
            language_code: &self.language_code,
        };

        info!(operation, "Calling language service");

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RouterError::service(
                "language service",
                format!("{} returned {}: {}", operation, status, error_text),
            ));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PhraseExtractor for HttpLanguageClient {
    async fn key_phrases(&self, text: &str) -> Result<Vec<String>> {
        let response: KeyPhrasesResponse = self.detect("detect-key-phrases", text).await?;

        Ok(response
            .key_phrases
            .into_iter()
            .filter_map(|p| p.text)
            .collect())
    }
}

#[async_trait]
impl SentimentDetector for HttpLanguageClient {
    async fn sentiment(&self, text: &str) -> Result<Option<String>> {
        let response: SentimentResponse = self.detect("detect-sentiment", text).await?;
        Ok(response.sentiment.filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedPhrases(Vec<&'static str>);

    #[async_trait]
    impl PhraseExtractor for FixedPhrases {
        async fn key_phrases(&self, _text: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Broken;

    #[async_trait]
    impl PhraseExtractor for Broken {
        async fn key_phrases(&self, _text: &str) -> Result<Vec<String>> {
            Err(RouterError::service("language service", "throttled"))
        }
    }

    #[async_trait]
    impl SentimentDetector for Broken {
        async fn sentiment(&self, _text: &str) -> Result<Option<String>> {
            Err(RouterError::service("language service", "throttled"))
        }
    }

    fn client_for(server: &MockServer) -> HttpLanguageClient {
        HttpLanguageClient::new(&server.uri(), "en", Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_phrases_are_lowercased_and_joined() {
        let enricher = PhraseEnricher::new(
            Some(Arc::new(FixedPhrases(vec!["Tuition Fees", "", "Next Term"]))),
            Duration::from_secs(1),
        );

        assert_eq!(enricher.extract_phrases("x").await, "tuition fees next term");
    }

    #[tokio::test]
    async fn test_enricher_degrades_to_empty() {
        let broken = PhraseEnricher::new(Some(Arc::new(Broken)), Duration::from_secs(1));
        assert_eq!(broken.extract_phrases("anything").await, "");

        assert_eq!(PhraseEnricher::disabled().extract_phrases("anything").await, "");
    }

    #[tokio::test]
    async fn test_sentiment_requires_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect-sentiment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Sentiment": "POSITIVE"
            })))
            .mount(&server)
            .await;

        let detector: Arc<dyn SentimentDetector> = Arc::new(client_for(&server));

        let off = SentimentAnnotator::new(Some(detector.clone()), false, Duration::from_secs(2));
        assert_eq!(off.annotate("great").await, None);

        let on = SentimentAnnotator::new(Some(detector), true, Duration::from_secs(2));
        assert_eq!(on.annotate("great").await.as_deref(), Some("POSITIVE"));
        assert_eq!(on.annotate("").await, None);
    }

    #[tokio::test]
    async fn test_sentiment_failure_is_none() {
        let annotator = SentimentAnnotator::new(Some(Arc::new(Broken)), true, Duration::from_secs(1));
        assert_eq!(annotator.annotate("hello").await, None);
    }

    #[tokio::test]
    async fn test_key_phrases_wire_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect-key-phrases"))
            .and(body_json(serde_json::json!({
                "Text": "Tuition for the Nursing Diploma",
                "LanguageCode": "en"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "KeyPhrases": [
                    {"Text": "Tuition", "Score": 0.99},
                    {"Score": 0.5},
                    {"Text": "the Nursing Diploma", "Score": 0.97}
                ]
            })))
            .mount(&server)
            .await;

        let phrases = client_for(&server)
            .key_phrases("Tuition for the Nursing Diploma")
            .await
            .unwrap();

        assert_eq!(phrases, vec!["Tuition", "the Nursing Diploma"]);
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let err = client_for(&server).key_phrases("hi").await.unwrap_err();

        match err {
            RouterError::Service { message, .. } => {
                assert!(message.contains("500"), "unexpected message: {message}");
            }
            other => panic!("Expected Service error, got: {other:?}"),
        }
    }
}
