//! Cleanup and validation of text-analysis output
//!
//! The analysis capability answers with free text that should hold one JSON
//! object. `parse_analysis` strips code fences, checks the object shape and
//! coerces every field into `NormalizedPatterns`. Scalars the model left out
//! stay `None` so the merge keeps the stored value.

use serde_json::Value;
use std::collections::HashSet;

use crate::error::MimicError;
use crate::style::patterns::FrequentReferences;

/// Maximum entries kept per list field of one analysis round
pub const MAX_LIST_LEN: usize = 10;

const REQUIRED_SECTIONS: [&str; 4] = ["casing", "punctuation", "vocabulary", "content"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomingCasing {
    pub uses_capitalization: Option<bool>,
    pub capitalized_words: Vec<String>,
    pub all_caps_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomingPunctuation {
    pub ending_sentence_style: Option<String>,
    pub uses_periods: Option<bool>,
    pub uses_exclamation_marks: Option<bool>,
    pub multiple_exclamation_marks: Option<bool>,
    pub uses_question_marks: Option<bool>,
    pub uses_ellipsis: Option<bool>,
    pub spacing_style: Option<String>,
    pub multiple_marks: Option<bool>,
    pub gap_between_sentences: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomingEmojiUsage {
    pub uses_emojis: Option<bool>,
    pub most_used_emojis: Vec<String>,
    pub emoji_frequency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomingVocabulary {
    pub common_words: Vec<String>,
    pub unique_phrases: Vec<String>,
    pub acronyms: Vec<String>,
    pub slang_terms: Vec<String>,
    pub profanity: Vec<String>,
    pub hashtag_style: Vec<String>,
    pub common_phrases: Vec<String>,
    pub emoji_usage: IncomingEmojiUsage,
    pub technical_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomingContentStyle {
    pub uses_threads: Option<bool>,
    pub includes_links: Option<bool>,
    pub uses_memes: Option<bool>,
    pub quote_tweets: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomingContent {
    pub main_topics: Vec<String>,
    pub frequent_references: FrequentReferences,
    pub content_style: IncomingContentStyle,
}

/// One round of analysis output, typed and capped
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedPatterns {
    pub casing: IncomingCasing,
    pub punctuation: IncomingPunctuation,
    pub vocabulary: IncomingVocabulary,
    pub content: IncomingContent,
}

/// Strip markdown code fences and surrounding whitespace
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse and normalize a raw analysis response
pub fn parse_analysis(raw: &str) -> Result<NormalizedPatterns, MimicError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(MimicError::MalformedAnalysis("empty response".to_string()));
    }
    if !cleaned.starts_with('{') || !cleaned.ends_with('}') {
        return Err(MimicError::MalformedAnalysis(
            "response is not a JSON object".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| MimicError::MalformedAnalysis(format!("invalid JSON: {}", e)))?;

    let missing: Vec<&str> = REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|section| !value[*section].is_object())
        .collect();
    if !missing.is_empty() {
        return Err(MimicError::MalformedAnalysis(format!(
            "missing required sections: {}",
            missing.join(", ")
        )));
    }

    Ok(normalize(&value))
}

fn normalize(value: &Value) -> NormalizedPatterns {
    let casing = &value["casing"];
    let punctuation = &value["punctuation"];
    let vocabulary = &value["vocabulary"];
    let content = &value["content"];
    let emoji = &vocabulary["emojiUsage"];
    let references = &content["frequentReferences"];
    let content_style = &content["contentStyle"];

    NormalizedPatterns {
        casing: IncomingCasing {
            uses_capitalization: truthy(&casing["usesCapitalization"]),
            capitalized_words: capped_list(&casing["capitalizedWords"]),
            all_caps_words: capped_list(&casing["allCapsWords"]),
        },
        punctuation: IncomingPunctuation {
            ending_sentence_style: text(&punctuation["endingSentenceStyle"]),
            uses_periods: truthy(&punctuation["usesPeriods"]),
            uses_exclamation_marks: truthy(&punctuation["usesExclamationMarks"]),
            multiple_exclamation_marks: truthy(&punctuation["multipleExclamationMarks"]),
            uses_question_marks: truthy(&punctuation["usesQuestionMarks"]),
            uses_ellipsis: truthy(&punctuation["usesEllipsis"]),
            spacing_style: text(&punctuation["spacingStyle"]),
            multiple_marks: truthy(&punctuation["multipleMarks"]),
            gap_between_sentences: text(&punctuation["gapBetweenSentences"]),
        },
        vocabulary: IncomingVocabulary {
            common_words: capped_list(&vocabulary["commonWords"]),
            unique_phrases: capped_list(&vocabulary["uniquePhrases"]),
            acronyms: capped_list(&vocabulary["acronyms"]),
            slang_terms: capped_list(&vocabulary["slangTerms"]),
            profanity: capped_list(&vocabulary["profanity"]),
            hashtag_style: capped_list(&vocabulary["hashtagStyle"]),
            common_phrases: capped_list(&vocabulary["commonPhrases"]),
            emoji_usage: IncomingEmojiUsage {
                uses_emojis: truthy(&emoji["usesEmojis"]),
                most_used_emojis: capped_list(first_present(
                    &emoji["mostUsedEmojis"],
                    &vocabulary["mostUsedEmojis"],
                )),
                emoji_frequency: number(first_present(
                    &emoji["emojiFrequency"],
                    &vocabulary["emojiFrequency"],
                )),
            },
            technical_terms: capped_list(&vocabulary["technicalTerms"]),
        },
        content: IncomingContent {
            main_topics: capped_list(&content["mainTopics"]),
            frequent_references: FrequentReferences {
                people: capped_list(&references["people"]),
                companies: capped_list(&references["companies"]),
                products: capped_list(&references["products"]),
            },
            content_style: IncomingContentStyle {
                uses_threads: truthy(&content_style["usesThreads"]),
                includes_links: truthy(&content_style["includesLinks"]),
                uses_memes: truthy(&content_style["usesMemes"]),
                quote_tweets: truthy(&content_style["quoteTweets"]),
            },
        },
    }
}

fn first_present<'a>(primary: &'a Value, fallback: &'a Value) -> &'a Value {
    if primary.is_null() {
        fallback
    } else {
        primary
    }
}

/// Boolean coercion by truthiness. Absent and null stay `None`.
fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Deduplicate (first occurrence wins) and cap at `MAX_LIST_LEN`
pub fn limit_list<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .take(MAX_LIST_LEN)
        .collect()
}

fn capped_list(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    limit_list(items.iter().filter_map(|item| match item {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}
