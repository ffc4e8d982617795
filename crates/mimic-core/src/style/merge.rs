//! Style profile merge
//!
//! Rules:
//! - scalar preferences: incoming wins when present, else existing is kept
//! - lists: existing entries first, then new incoming entries, duplicates
//!   dropped; no cap is re-applied here
//! - emoji flag and frequency: existing wins unless not yet observed
//! - `mentionStyle` and `commonPunctuationPatterns`: always existing

use std::collections::HashSet;

use crate::style::normalize::NormalizedPatterns;
use crate::style::patterns::{
    Casing, Content, ContentStyle, EmojiUsage, FrequentReferences, Punctuation, Vocabulary,
    WritingPatterns,
};

/// Union preserving first-occurrence order, existing side first
pub fn union_dedup(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(existing.len() + incoming.len());
    existing
        .iter()
        .chain(incoming.iter())
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

pub fn merge(existing: &WritingPatterns, incoming: &NormalizedPatterns) -> WritingPatterns {
    WritingPatterns {
        casing: merge_casing(&existing.casing, incoming),
        punctuation: merge_punctuation(&existing.punctuation, incoming),
        vocabulary: merge_vocabulary(&existing.vocabulary, incoming),
        content: merge_content(&existing.content, incoming),
    }
}

fn merge_casing(old: &Casing, incoming: &NormalizedPatterns) -> Casing {
    let new = &incoming.casing;
    Casing {
        uses_capitalization: new.uses_capitalization.unwrap_or(old.uses_capitalization),
        capitalized_words: union_dedup(&old.capitalized_words, &new.capitalized_words),
        all_caps_words: union_dedup(&old.all_caps_words, &new.all_caps_words),
    }
}

fn merge_punctuation(old: &Punctuation, incoming: &NormalizedPatterns) -> Punctuation {
    let new = &incoming.punctuation;
    Punctuation {
        ending_sentence_style: new
            .ending_sentence_style
            .clone()
            .unwrap_or_else(|| old.ending_sentence_style.clone()),
        common_punctuation_patterns: old.common_punctuation_patterns.clone(),
        uses_periods: new.uses_periods.unwrap_or(old.uses_periods),
        uses_exclamation_marks: new
            .uses_exclamation_marks
            .unwrap_or(old.uses_exclamation_marks),
        // Analysis usually reports only the generic "multipleMarks" flag
        multiple_exclamation_marks: new
            .multiple_exclamation_marks
            .or(new.multiple_marks)
            .unwrap_or(old.multiple_exclamation_marks),
        uses_question_marks: new.uses_question_marks.unwrap_or(old.uses_question_marks),
        uses_ellipsis: new.uses_ellipsis.unwrap_or(old.uses_ellipsis),
        spacing_style: new
            .spacing_style
            .clone()
            .unwrap_or_else(|| old.spacing_style.clone()),
        multiple_marks: new.multiple_marks.unwrap_or(old.multiple_marks),
        gap_between_sentences: new
            .gap_between_sentences
            .clone()
            .unwrap_or_else(|| old.gap_between_sentences.clone()),
    }
}

fn merge_vocabulary(old: &Vocabulary, incoming: &NormalizedPatterns) -> Vocabulary {
    let new = &incoming.vocabulary;
    Vocabulary {
        common_words: union_dedup(&old.common_words, &new.common_words),
        unique_phrases: union_dedup(&old.unique_phrases, &new.unique_phrases),
        acronyms: union_dedup(&old.acronyms, &new.acronyms),
        slang_terms: union_dedup(&old.slang_terms, &new.slang_terms),
        profanity: union_dedup(&old.profanity, &new.profanity),
        hashtag_style: union_dedup(&old.hashtag_style, &new.hashtag_style),
        common_phrases: union_dedup(&old.common_phrases, &new.common_phrases),
        mention_style: old.mention_style.clone(),
        emoji_usage: EmojiUsage {
            uses_emojis: old.emoji_usage.uses_emojis.or(new.emoji_usage.uses_emojis),
            most_used_emojis: union_dedup(
                &old.emoji_usage.most_used_emojis,
                &new.emoji_usage.most_used_emojis,
            ),
            emoji_frequency: old
                .emoji_usage
                .emoji_frequency
                .or(new.emoji_usage.emoji_frequency),
        },
        technical_terms: union_dedup(&old.technical_terms, &new.technical_terms),
    }
}

fn merge_content(old: &Content, incoming: &NormalizedPatterns) -> Content {
    let new = &incoming.content;
    let old_refs = &old.frequent_references;
    let new_refs = &new.frequent_references;
    Content {
        main_topics: union_dedup(&old.main_topics, &new.main_topics),
        frequent_references: FrequentReferences {
            people: union_dedup(&old_refs.people, &new_refs.people),
            companies: union_dedup(&old_refs.companies, &new_refs.companies),
            products: union_dedup(&old_refs.products, &new_refs.products),
        },
        content_style: ContentStyle {
            uses_threads: new
                .content_style
                .uses_threads
                .unwrap_or(old.content_style.uses_threads),
            includes_links: new
                .content_style
                .includes_links
                .unwrap_or(old.content_style.includes_links),
            uses_memes: new
                .content_style
                .uses_memes
                .unwrap_or(old.content_style.uses_memes),
            quote_tweets: new
                .content_style
                .quote_tweets
                .unwrap_or(old.content_style.quote_tweets),
        },
    }
}
