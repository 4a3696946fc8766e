//! Intent Classifier
//!
//! Routes an utterance to exactly one intent with an ordered keyword rule chain.
//! Rules are evaluated top to bottom and the first match wins; the last rule
//! always matches, so classification cannot fail.
//!
//! Matching is raw substring containment, not word-boundary matching: "hi"
//! matches inside "history". Existing knowledge bases and clients rely on it.

use crate::knowledge::KnowledgeBase;
use crate::models::Intent;

/// Static keyword lists — zero allocation
const GREETING_KEYWORDS: &[&str] = &[
    "hi", "hello", "hey", "good morning", "good afternoon", "good evening",
];

const PROGRAM_KEYWORDS: &[&str] = &["program", "course", "diploma", "degree", "tuition", "fee"];

const REGISTRATION_KEYWORDS: &[&str] = &[
    "register", "registration", "enroll", "enrollment", "admission", "apply",
];

const SUPPORT_KEYWORDS: &[&str] = &["support", "counsel", "advis", "career", "help", "guidance"];

/// Which text a rule inspects and what it looks for
#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// Any keyword in the normalized utterance only
    Utterance(&'static [&'static str]),
    /// Any keyword in the utterance merged with enrichment phrases
    Enriched(&'static [&'static str]),
    Always,
}

impl Matcher {
    fn matches(self, normalized: &str, enriched: &str) -> bool {
        match self {
            Matcher::Utterance(keywords) => contains_any(normalized, keywords),
            Matcher::Enriched(keywords) => contains_any(enriched, keywords),
            Matcher::Always => true,
        }
    }
}

/// Order is load-bearing: greeting beats every topic keyword.
const RULES: &[(Intent, Matcher)] = &[
    (Intent::Greeting, Matcher::Utterance(GREETING_KEYWORDS)),
    (Intent::ProgramInfo, Matcher::Enriched(PROGRAM_KEYWORDS)),
    (Intent::RegistrationHelp, Matcher::Enriched(REGISTRATION_KEYWORDS)),
    (Intent::SupportServices, Matcher::Enriched(SUPPORT_KEYWORDS)),
    (Intent::Fallback, Matcher::Always),
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Trim and lower-case a raw utterance
pub fn normalize(utterance: &str) -> String {
    utterance.trim().to_lowercase()
}

/// Matching surface for topic rules: normalized text plus enrichment phrases
pub fn classification_input(normalized: &str, phrases: &str) -> String {
    format!("{} {}", normalized, phrases).trim().to_string()
}

/// Keyword intent classifier
pub struct IntentClassifier;

impl IntentClassifier {
    /// First intent whose rule matches
    pub fn route(normalized: &str, classification_input: &str) -> Intent {
        RULES
            .iter()
            .find(|(_, matcher)| matcher.matches(normalized, classification_input))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::Fallback)
    }

    /// Route and resolve the reply from the knowledge base
    pub fn classify(
        normalized: &str,
        classification_input: &str,
        kb: &KnowledgeBase,
    ) -> (Intent, String) {
        let intent = Self::route(normalized, classification_input);
        (intent, kb.reply_for(intent).to_string())
    }
}
