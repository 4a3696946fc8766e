//! Knowledge base
//!
//! Maps intent labels to reply text. Loaded fresh for every request and only
//! ever read; any intent it lacks falls back to that intent's built-in reply.

pub mod store;

pub use store::{open_store, FsObjectStore, HttpObjectStore, ObjectStore};

use crate::error::RouterError;
use crate::models::Intent;
use crate::Result;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// Default object key of the knowledge base document
pub const DEFAULT_KB_KEY: &str = "knowledgebase.json";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: HashMap<String, String>,
}

impl KnowledgeBase {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Parse a knowledge base document.
    ///
    /// Invalid JSON is a load error. Valid JSON that is not an object yields an
    /// empty knowledge base, and non-string values are ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| RouterError::KnowledgeBaseLoad(format!("invalid JSON: {}", e)))?;

        let Value::Object(map) = value else {
            return Ok(Self::default());
        };

        let entries = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(reply) => Some((key, reply)),
                _ => None,
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Reply for an intent, falling back to its built-in default
    pub fn reply_for(&self, intent: Intent) -> &str {
        self.get(intent.label()).unwrap_or(intent.default_reply())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// SHA-256 of the snapshot, stable across key order
    pub fn fingerprint(&self) -> String {
        let sorted: BTreeMap<&String, &String> = self.entries.iter().collect();
        let mut hasher = Sha256::new();

        if serde_json::to_writer(&mut HashWriter(&mut hasher), &sorted).is_err() {
            return String::new();
        }

        hex::encode(hasher.finalize())
    }
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Load the knowledge base document `key` from `store`.
///
/// Every failure here is reported as [`RouterError::KnowledgeBaseLoad`]; an
/// unreadable knowledge base is never silently replaced by defaults.
pub async fn load(store: &dyn ObjectStore, key: &str, timeout: Duration) -> Result<KnowledgeBase> {
    let raw = match tokio::time::timeout(timeout, store.fetch(key)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            return Err(RouterError::KnowledgeBaseLoad(format!(
                "{}/{}: {}",
                store.location(),
                key,
                e
            )))
        }
        Err(_) => {
            return Err(RouterError::KnowledgeBaseLoad(format!(
                "{}/{}: {}",
                store.location(),
                key,
                RouterError::timeout("object store", timeout)
            )))
        }
    };

    let kb = KnowledgeBase::parse(&raw)?;
    info!(entries = kb.len(), location = %store.location(), key, "Knowledge base loaded");
    Ok(kb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedStore(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl ObjectStore for FixedStore {
        fn location(&self) -> String {
            "memory://test".to_string()
        }

        async fn fetch(&self, _key: &str) -> Result<String> {
            self.0
                .map(str::to_string)
                .map_err(|e| RouterError::service("object store", e))
        }
    }

    struct StalledStore;

    #[async_trait]
    impl ObjectStore for StalledStore {
        fn location(&self) -> String {
            "memory://stalled".to_string()
        }

        async fn fetch(&self, _key: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("{}".to_string())
        }
    }

    #[test]
    fn test_custom_reply_overrides_default() {
        let kb = KnowledgeBase::parse(r#"{"GreetingIntent": "Welcome to campus!"}"#).unwrap();

        assert_eq!(kb.reply_for(Intent::Greeting), "Welcome to campus!");
        assert_eq!(kb.reply_for(Intent::Fallback), Intent::Fallback.default_reply());
    }

    #[test]
    fn test_non_object_document_is_empty() {
        for raw in ["[]", "\"text\"", "42", "null"] {
            let kb = KnowledgeBase::parse(raw).unwrap();
            assert!(kb.is_empty(), "expected empty kb for {raw}");
        }
    }

    #[test]
    fn test_non_string_values_fall_back() {
        let kb = KnowledgeBase::parse(r#"{"ProgramInfoIntent": {"text": "nested"}, "FallbackIntent": 3}"#)
            .unwrap();

        assert!(kb.is_empty());
        assert_eq!(kb.reply_for(Intent::ProgramInfo), Intent::ProgramInfo.default_reply());
    }

    #[test]
    fn test_invalid_json_is_load_error() {
        let err = KnowledgeBase::parse("{not json").unwrap_err();
        assert!(matches!(err, RouterError::KnowledgeBaseLoad(_)));
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let a = KnowledgeBase::parse(r#"{"a": "1", "b": "2"}"#).unwrap();
        let b = KnowledgeBase::parse(r#"{"b": "2", "a": "1"}"#).unwrap();
        let c = KnowledgeBase::parse(r#"{"a": "1", "b": "3"}"#).unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_load_success() {
        let store = FixedStore(Ok(r#"{"FallbackIntent": "Try again"}"#));
        let kb = tokio_test::block_on(load(&store, DEFAULT_KB_KEY, Duration::from_secs(1))).unwrap();

        assert_eq!(kb.reply_for(Intent::Fallback), "Try again");
    }

    #[tokio::test]
    async fn test_load_failure_is_loud() {
        let store = FixedStore(Err("access denied"));
        let err = load(&store, DEFAULT_KB_KEY, Duration::from_secs(1)).await.unwrap_err();

        match err {
            RouterError::KnowledgeBaseLoad(msg) => assert!(msg.contains("access denied")),
            other => panic!("Expected KnowledgeBaseLoad, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_timeout_is_loud() {
        let err = load(&StalledStore, DEFAULT_KB_KEY, Duration::from_millis(20))
            .await
            .unwrap_err();

        match err {
            RouterError::KnowledgeBaseLoad(msg) => {
                assert!(msg.contains("object store timed out after 20ms"), "{msg}")
            }
            other => panic!("Expected KnowledgeBaseLoad, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_KB_KEY),
            r#"{"SupportServicesIntent": "Visit the wellness centre."}"#,
        )
        .unwrap();

        let location = dir.path().display().to_string();
        let store = open_store(&location, Duration::from_secs(1)).unwrap();
        let kb = load(store.as_ref(), DEFAULT_KB_KEY, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(kb.reply_for(Intent::SupportServices), "Visit the wellness centre.");
    }
}
