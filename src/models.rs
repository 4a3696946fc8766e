//! Core data models for the assistant router

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder intent when the dialogue engine answers without naming one
pub const DIALOGUE_PLACEHOLDER_INTENT: &str = "LexIntent";

//
// ================= Intent =================
//

/// Closed set of intents the keyword classifier can produce.
///
/// The serialized label doubles as the knowledge-base key for the intent's reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Intent {
    #[serde(rename = "GreetingIntent")]
    Greeting,
    #[serde(rename = "ProgramInfoIntent")]
    ProgramInfo,
    #[serde(rename = "RegistrationHelpIntent")]
    RegistrationHelp,
    #[serde(rename = "SupportServicesIntent")]
    SupportServices,
    #[serde(rename = "FallbackIntent")]
    Fallback,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Greeting,
        Intent::ProgramInfo,
        Intent::RegistrationHelp,
        Intent::SupportServices,
        Intent::Fallback,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Intent::Greeting => "GreetingIntent",
            Intent::ProgramInfo => "ProgramInfoIntent",
            Intent::RegistrationHelp => "RegistrationHelpIntent",
            Intent::SupportServices => "SupportServicesIntent",
            Intent::Fallback => "FallbackIntent",
        }
    }

    /// Reply used when the knowledge base has no entry for this intent
    pub fn default_reply(self) -> &'static str {
        match self {
            Intent::Greeting => "Hi! How can I help you today?",
            Intent::ProgramInfo => {
                "We offer multiple programs. Ask which field you're interested in."
            }
            Intent::RegistrationHelp => {
                "You can register via the student portal. Need step-by-step help?"
            }
            Intent::SupportServices => {
                "We provide student support services such as advising and career help."
            }
            Intent::Fallback => {
                "I'm not sure about that yet. Ask about programs, registration, or support services."
            }
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

//
// ================= Dialogue Engine =================
//

/// Answer produced by an external dialogue engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueReply {
    pub reply: String,
    pub intent: String,
}

//
// ================= Final Result =================
//

/// The single response body produced for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub reply: String,
    pub intent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
}

impl ClassificationResult {
    pub fn new(intent: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            intent: intent.into(),
            sentiment: None,
        }
    }

    pub fn with_sentiment(mut self, sentiment: Option<String>) -> Self {
        self.sentiment = sentiment;
        self
    }
}

impl From<DialogueReply> for ClassificationResult {
    fn from(dialogue: DialogueReply) -> Self {
        Self::new(dialogue.intent, dialogue.reply)
    }
}
