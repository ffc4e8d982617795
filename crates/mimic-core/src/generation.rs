//! Content Generation
//!
//! Turns an agent's stored style profile into a generation brief, asks the
//! generation capability for `count` items and splits the answer into
//! discrete posts. Failures are not retried here.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::capabilities::ContentGenerator;
use crate::error::{MimicError, Result};
use crate::models::Agent;
use crate::store::Store;
use crate::style::WritingPatterns;

pub struct GenerationCoordinator {
    store: Arc<dyn Store>,
    generator: Arc<dyn ContentGenerator>,
}

impl GenerationCoordinator {
    pub fn new(store: Arc<dyn Store>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { store, generator }
    }

    pub async fn generate(&self, agent_id: Uuid, count: usize) -> Result<Vec<String>> {
        let agent = self
            .store
            .get_agent(agent_id)?
            .ok_or_else(|| MimicError::agent_not_found(agent_id))?;
        let profile = self
            .store
            .get_style_profile(agent_id)?
            .ok_or_else(|| MimicError::profile_not_found(agent_id))?;

        if count == 0 {
            return Ok(Vec::new());
        }

        let brief = style_brief(&agent, &profile.patterns);
        debug!("Generation brief for {} is {} chars", agent.name, brief.len());

        let raw = self.generator.generate(&brief, count).await?;
        let items = split_items(&raw);
        if items.is_empty() {
            return Err(MimicError::Generation("empty output".to_string()));
        }

        info!("Generated {} item(s) for agent {}", items.len(), agent.name);
        Ok(items)
    }
}

/// Non-empty trimmed lines
pub fn split_items(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "(none observed)".to_string()
    } else {
        items.join(", ")
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Render every style field as an explicit instruction
pub fn style_brief(agent: &Agent, patterns: &WritingPatterns) -> String {
    let casing = &patterns.casing;
    let punct = &patterns.punctuation;
    let vocab = &patterns.vocabulary;
    let emoji = &vocab.emoji_usage;
    let content = &patterns.content;
    let refs = &content.frequent_references;
    let structure = &content.content_style;

    let mut brief = String::from(
        "You write short social posts that must replicate one person's writing style exactly.\n\n",
    );

    brief.push_str("CAPITALIZATION\n");
    brief.push_str(if casing.uses_capitalization {
        "- Use standard capitalization.\n"
    } else {
        "- Write in lowercase; do not capitalize sentence starts.\n"
    });
    brief.push_str(&format!(
        "- Words they capitalize: {}\n- Words they write in ALL CAPS (only these): {}\n\n",
        list(&casing.capitalized_words),
        list(&casing.all_caps_words)
    ));

    brief.push_str("PUNCTUATION\n");
    brief.push_str(&format!(
        "- Sentence endings: {}\n- Periods: {}\n- Exclamation marks: {}\n\
         - Repeated exclamation marks: {}\n- Question marks: {}\n- Ellipsis: {}\n\
         - Repeated marks of any kind: {}\n- Spacing: {}\n- Gap between sentences: {}\n",
        punct.ending_sentence_style,
        yes_no(punct.uses_periods),
        yes_no(punct.uses_exclamation_marks),
        yes_no(punct.multiple_exclamation_marks),
        yes_no(punct.uses_question_marks),
        yes_no(punct.uses_ellipsis),
        yes_no(punct.multiple_marks),
        punct.spacing_style,
        punct.gap_between_sentences
    ));
    if !punct.common_punctuation_patterns.is_empty() {
        brief.push_str(&format!(
            "- Recurring punctuation patterns: {}\n",
            list(&punct.common_punctuation_patterns)
        ));
    }
    brief.push('\n');

    brief.push_str("VOCABULARY\n");
    brief.push_str(&format!(
        "- Common words: {}\n- Unique phrases: {}\n- Common phrases: {}\n\
         - Slang: {}\n- Acronyms: {}\n- Profanity: {}\n- Technical terms: {}\n\
         - Hashtags: {}\n- Mentions: {}\n",
        list(&vocab.common_words),
        list(&vocab.unique_phrases),
        list(&vocab.common_phrases),
        list(&vocab.slang_terms),
        list(&vocab.acronyms),
        list(&vocab.profanity),
        list(&vocab.technical_terms),
        list(&vocab.hashtag_style),
        list(&vocab.mention_style)
    ));
    if emoji.uses_emojis() {
        brief.push_str(&format!(
            "- Emojis: yes, favourites {}",
            list(&emoji.most_used_emojis)
        ));
        if let Some(freq) = emoji.emoji_frequency {
            brief.push_str(&format!(" (frequency {})", freq));
        }
        brief.push('\n');
    } else {
        brief.push_str("- Emojis: do not use emojis\n");
    }
    brief.push('\n');

    brief.push_str("CONTENT\n");
    brief.push_str(&format!(
        "- Main topics: {}\n- People they reference: {}\n- Companies they reference: {}\n\
         - Products they reference: {}\n\n",
        list(&content.main_topics),
        list(&refs.people),
        list(&refs.companies),
        list(&refs.products)
    ));

    brief.push_str("STRUCTURE\n");
    brief.push_str(&format!(
        "- Format: {}\n- Links: {}\n- Memes: {}\n- Quote posts: {}\n\n",
        if structure.uses_threads {
            "creates threads"
        } else {
            "single posts"
        },
        if structure.includes_links {
            "includes links"
        } else {
            "rarely links"
        },
        yes_no(structure.uses_memes),
        yes_no(structure.quote_tweets)
    ));

    brief.push_str(&format!(
        "PERSONALITY: {}\nCHARACTER: {}\n",
        agent.personality, agent.character
    ));
    if !agent.language_style.is_empty() {
        brief.push_str(&format!("LANGUAGE STYLE: {}\n", agent.language_style));
    }

    brief.push_str(
        "\nMatch their typical post length. Output one post per line with no numbering.",
    );
    brief
}
