//! Style Training
//!
//! Sends a bounded batch of writing samples to the analysis capability,
//! validates the answer and folds it into the agent's style profile.
//! A successful call writes the profile exactly once; any failure leaves
//! the stored profile untouched.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::capabilities::TextAnalyzer;
use crate::error::{MimicError, Result};
use crate::store::{SampleSource, Store};
use crate::style::{merge, parse_analysis, StyleProfile};

/// Default character budget for one analysis corpus
pub const DEFAULT_CHAR_BUDGET: usize = 10_000;

/// Samples fetched per retraining run
pub const RETRAIN_SAMPLE_LIMIT: i64 = 100;

const SAMPLE_SEPARATOR: &str = "\n\n";

pub const ANALYSIS_INSTRUCTION: &str = r#"You are a writing-style analyst. Study the posts you are given and describe how their author writes.

Respond with a single JSON object and nothing else. Use exactly these sections and camelCase keys:

{
  "casing": {
    "usesCapitalization": boolean,
    "capitalizedWords": [string],
    "allCapsWords": [string]
  },
  "punctuation": {
    "endingSentenceStyle": string,
    "commonPunctuationPatterns": [string],
    "usesPeriods": boolean,
    "usesExclamationMarks": boolean,
    "multipleExclamationMarks": boolean,
    "usesQuestionMarks": boolean,
    "usesEllipsis": boolean,
    "spacingStyle": string,
    "multipleMarks": boolean,
    "gapBetweenSentences": string
  },
  "vocabulary": {
    "commonWords": [string],
    "uniquePhrases": [string],
    "acronyms": [string],
    "slangTerms": [string],
    "profanity": [string],
    "hashtagStyle": [string],
    "commonPhrases": [string],
    "mentionStyle": [string],
    "technicalTerms": [string],
    "emojiUsage": {
      "usesEmojis": boolean,
      "mostUsedEmojis": [string],
      "emojiFrequency": number
    }
  },
  "content": {
    "mainTopics": [string],
    "frequentReferences": { "people": [string], "companies": [string], "products": [string] },
    "contentStyle": {
      "usesThreads": boolean,
      "includesLinks": boolean,
      "usesMemes": boolean,
      "quoteTweets": boolean
    }
  }
}

List at most 10 entries per list. Only report what the posts actually show."#;

pub struct TrainingCoordinator {
    store: Arc<dyn Store>,
    analyzer: Arc<dyn TextAnalyzer>,
    samples: Option<Arc<dyn SampleSource>>,
    char_budget: usize,
}

impl TrainingCoordinator {
    pub fn new(store: Arc<dyn Store>, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            store,
            analyzer,
            samples: None,
            char_budget: DEFAULT_CHAR_BUDGET,
        }
    }

    pub fn with_sample_source(mut self, samples: Arc<dyn SampleSource>) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_char_budget(mut self, char_budget: usize) -> Self {
        self.char_budget = char_budget.max(1);
        self
    }

    /// Analyze `samples` and merge the result into the agent's profile
    pub async fn train_on_samples(&self, agent_id: Uuid, samples: &[String]) -> Result<StyleProfile> {
        let (corpus, used) = bounded_corpus(samples, self.char_budget);
        if used == 0 {
            return Err(MimicError::InvalidInput(
                "no non-empty samples to train on".to_string(),
            ));
        }

        let agent = self
            .store
            .get_agent(agent_id)?
            .ok_or_else(|| MimicError::agent_not_found(agent_id))?;

        let (mut profile, is_new) = match self.store.get_style_profile(agent_id)? {
            Some(profile) => (profile, false),
            None => {
                debug!("No style profile for agent {}, starting from defaults", agent.name);
                (StyleProfile::new_default(agent_id), true)
            }
        };

        if used < samples.len() {
            debug!(
                "Training corpus for {} limited to {} of {} samples",
                agent.name,
                used,
                samples.len()
            );
        }

        let raw = self.analyzer.analyze(ANALYSIS_INSTRUCTION, &corpus).await?;
        let incoming = match parse_analysis(&raw) {
            Ok(incoming) => incoming,
            Err(e) => {
                warn!("Discarding analysis for agent {}: {}", agent.name, e);
                return Err(e);
            }
        };

        profile.patterns = merge(&profile.patterns, &incoming);
        profile.training_sample_count = profile
            .training_sample_count
            .saturating_add(i32::try_from(used).unwrap_or(i32::MAX));
        profile.last_updated = Utc::now();

        if is_new {
            self.store.insert_style_profile(&profile)?;
        } else {
            self.store.update_style_profile(&profile)?;
        }

        info!(
            "Trained style profile for {} on {} samples ({} total)",
            agent.name, used, profile.training_sample_count
        );
        Ok(profile)
    }

    /// Retrain from the newest stored samples of the agent's handle
    pub async fn retrain_from_source(&self, agent_id: Uuid) -> Result<StyleProfile> {
        let source = self.samples.as_ref().ok_or_else(|| {
            MimicError::InvalidInput("no sample source configured".to_string())
        })?;

        let agent = self
            .store
            .get_agent(agent_id)?
            .ok_or_else(|| MimicError::agent_not_found(agent_id))?;

        let samples = source.recent_samples(&agent.handle, RETRAIN_SAMPLE_LIMIT)?;
        if samples.is_empty() {
            return Err(MimicError::InvalidInput(format!(
                "no writing samples found for handle '{}'",
                agent.handle
            )));
        }

        info!(
            "Retraining {} from {} stored samples of '{}'",
            agent.name,
            samples.len(),
            agent.handle
        );
        self.train_on_samples(agent_id, &samples).await
    }
}

/// Join non-blank samples until the character budget is reached.
///
/// A first sample longer than the budget is cut at a char boundary; later
/// samples that do not fit are left out. Returns the corpus and the number
/// of samples it includes.
pub fn bounded_corpus(samples: &[String], char_budget: usize) -> (String, usize) {
    let mut corpus = String::new();
    let mut chars = 0;
    let mut used = 0;

    for sample in samples.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let len = sample.chars().count();
        if used == 0 {
            if len > char_budget {
                corpus.extend(sample.chars().take(char_budget));
                return (corpus, 1);
            }
        } else {
            let sep = SAMPLE_SEPARATOR.len();
            if chars + sep + len > char_budget {
                break;
            }
            corpus.push_str(SAMPLE_SEPARATOR);
            chars += sep;
        }
        corpus.push_str(sample);
        chars += len;
        used += 1;
    }

    (corpus, used)
}
