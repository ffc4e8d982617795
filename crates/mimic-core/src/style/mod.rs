//! Style profiles
//!
//! - patterns: the persisted record and its defaults
//! - normalize: cleanup and validation of analysis output
//! - merge: folding a new analysis round into a stored profile

mod merge;
mod normalize;
mod patterns;

pub use merge::{merge, union_dedup};
pub use normalize::{
    limit_list, parse_analysis, strip_code_fences, IncomingCasing, IncomingContent,
    IncomingContentStyle, IncomingEmojiUsage, IncomingPunctuation, IncomingVocabulary,
    NormalizedPatterns, MAX_LIST_LEN,
};
pub use patterns::{
    Casing, Content, ContentStyle, EmojiUsage, FrequentReferences, Punctuation, StyleProfile,
    Vocabulary, WritingPatterns, STANDARD_STYLE,
};
