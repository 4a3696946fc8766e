//! Environment configuration
//!
//! Everything is read once at startup. Optional identifiers that are blank
//! after trimming count as unset.

use crate::dialogue::EngineTarget;
use crate::error::RouterError;
use crate::knowledge::DEFAULT_KB_KEY;
use crate::Result;
use std::time::Duration;

const DEFAULT_LOCALE_ID: &str = "en_US";
const DEFAULT_LANGUAGE_CODE: &str = "en";
const DEFAULT_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// KB store location; requests fail with a configuration error when unset
    pub kb_location: Option<String>,
    pub kb_key: String,
    pub use_sentiment: bool,
    pub engine: EngineTarget,
    pub dialogue_engine_url: Option<String>,
    pub language_service_url: Option<String>,
    pub language_code: String,
    pub external_timeout: Duration,
    pub port: u16,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            kb_location: None,
            kb_key: DEFAULT_KB_KEY.to_string(),
            use_sentiment: false,
            engine: EngineTarget {
                bot_id: String::new(),
                alias_id: String::new(),
                locale_id: DEFAULT_LOCALE_ID.to_string(),
            },
            dialogue_engine_url: None,
            language_service_url: None,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            external_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            port: DEFAULT_PORT,
        }
    }
}

/// `true` only for the literal token "true", ignoring case and padding
pub fn is_truthy(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

impl RouterConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| -> Option<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let external_timeout = match var("EXTERNAL_CALL_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(raw.parse().map_err(|_| {
                RouterError::Config(format!("EXTERNAL_CALL_TIMEOUT_MS is not a number: {}", raw))
            })?),
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        let port = match var("PORT").or_else(|| var("API_PORT")) {
            Some(raw) => raw
                .parse()
                .map_err(|_| RouterError::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            kb_location: var("KB_BUCKET"),
            kb_key: var("KB_KEY").unwrap_or_else(|| DEFAULT_KB_KEY.to_string()),
            use_sentiment: var("USE_SENTIMENT").map(|v| is_truthy(&v)).unwrap_or(false),
            engine: EngineTarget {
                bot_id: var("LEX_BOT_ID").unwrap_or_default(),
                alias_id: var("LEX_BOT_ALIAS_ID").unwrap_or_default(),
                locale_id: var("LEX_LOCALE_ID").unwrap_or_else(|| DEFAULT_LOCALE_ID.to_string()),
            },
            dialogue_engine_url: var("DIALOGUE_ENGINE_URL"),
            language_service_url: var("LANGUAGE_SERVICE_URL"),
            language_code: var("LANGUAGE_CODE").unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
            external_timeout,
            port,
        })
    }

    /// Engine calls need an endpoint plus both identifiers
    pub fn dialogue_enabled(&self) -> bool {
        self.dialogue_engine_url.is_some() && self.engine.is_configured()
    }
}
