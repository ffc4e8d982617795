//! Persisted writing-pattern record
//!
//! Stored as jsonb in camelCase. Every struct is `#[serde(default)]` so a
//! record written by an older build, or hand-edited, loads with the missing
//! fields completed from the defaults below.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Default for the free-form style descriptors
pub const STANDARD_STYLE: &str = "standard";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Casing {
    pub uses_capitalization: bool,
    pub capitalized_words: Vec<String>,
    pub all_caps_words: Vec<String>,
}

impl Default for Casing {
    fn default() -> Self {
        Self {
            uses_capitalization: true,
            capitalized_words: Vec::new(),
            all_caps_words: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Punctuation {
    pub ending_sentence_style: String,
    pub common_punctuation_patterns: Vec<String>,
    pub uses_periods: bool,
    pub uses_exclamation_marks: bool,
    pub multiple_exclamation_marks: bool,
    pub uses_question_marks: bool,
    pub uses_ellipsis: bool,
    pub spacing_style: String,
    pub multiple_marks: bool,
    pub gap_between_sentences: String,
}

impl Default for Punctuation {
    fn default() -> Self {
        Self {
            ending_sentence_style: STANDARD_STYLE.to_string(),
            common_punctuation_patterns: Vec::new(),
            uses_periods: true,
            uses_exclamation_marks: false,
            multiple_exclamation_marks: false,
            uses_question_marks: true,
            uses_ellipsis: false,
            spacing_style: STANDARD_STYLE.to_string(),
            multiple_marks: false,
            gap_between_sentences: STANDARD_STYLE.to_string(),
        }
    }
}

/// `None` means "not yet observed"; prompts read it as no emojis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmojiUsage {
    pub uses_emojis: Option<bool>,
    pub most_used_emojis: Vec<String>,
    pub emoji_frequency: Option<f64>,
}

impl EmojiUsage {
    pub fn uses_emojis(&self) -> bool {
        self.uses_emojis.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vocabulary {
    pub common_words: Vec<String>,
    pub unique_phrases: Vec<String>,
    pub acronyms: Vec<String>,
    pub slang_terms: Vec<String>,
    pub profanity: Vec<String>,
    pub hashtag_style: Vec<String>,
    pub common_phrases: Vec<String>,
    pub mention_style: Vec<String>,
    pub emoji_usage: EmojiUsage,
    pub technical_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequentReferences {
    pub people: Vec<String>,
    pub companies: Vec<String>,
    pub products: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentStyle {
    pub uses_threads: bool,
    pub includes_links: bool,
    pub uses_memes: bool,
    pub quote_tweets: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Content {
    pub main_topics: Vec<String>,
    pub frequent_references: FrequentReferences,
    pub content_style: ContentStyle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WritingPatterns {
    pub casing: Casing,
    pub punctuation: Punctuation,
    pub vocabulary: Vocabulary,
    pub content: Content,
}

impl WritingPatterns {
    /// Load a stored jsonb value. Anything that isn't a recognizable record
    /// (null, wrong types) yields the defaults.
    pub fn from_stored(value: serde_json::Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        match serde_json::from_value(value) {
            Ok(patterns) => patterns,
            Err(e) => {
                warn!("Stored writing patterns unreadable, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_stored(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

/// An agent's persisted style profile (one per agent)
#[derive(Debug, Clone, PartialEq)]
pub struct StyleProfile {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub patterns: WritingPatterns,
    /// Running total of samples sent to analysis
    pub training_sample_count: i32,
    pub last_updated: DateTime<Utc>,
}

impl StyleProfile {
    pub fn new_default(agent_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id,
            patterns: WritingPatterns::default(),
            training_sample_count: 0,
            last_updated: Utc::now(),
        }
    }
}
