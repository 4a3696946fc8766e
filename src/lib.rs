//! Assistant Router
//!
//! Routes a single user utterance to a canned student-services reply:
//! - Tries an optional managed dialogue engine first
//! - Otherwise enriches the utterance with extracted key phrases
//! - Classifies it with an ordered keyword rule chain
//! - Resolves the reply from a knowledge base, with built-in defaults
//! - Optionally labels the response with the utterance's sentiment
//!
//! PIPELINE:
//! INPUT → KB LOAD → DIALOGUE ENGINE? → NORMALIZE + ENRICH → CLASSIFY → SENTIMENT

pub mod api;
pub mod classifier;
pub mod config;
pub mod dialogue;
pub mod envelope;
pub mod error;
pub mod knowledge;
pub mod language;
pub mod models;
pub mod pipeline;
pub mod probe;

pub use error::Result;

// Re-export common types
pub use classifier::IntentClassifier;
pub use config::RouterConfig;
pub use models::*;
pub use pipeline::AssistantRouter;
