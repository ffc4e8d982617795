//! Capability fakes shared by the unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::capabilities::{ContentGenerator, TextAnalyzer};
use crate::error::MimicError;
use crate::store::MemoryStore;

pub struct FakeAnalyzer {
    response: Result<String, MimicError>,
    corpora: Mutex<Vec<String>>,
}

impl FakeAnalyzer {
    pub fn replying(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            corpora: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(MimicError::Analysis(message.into())),
            corpora: Mutex::new(Vec::new()),
        }
    }

    /// Every corpus passed to `analyze`, in call order
    pub fn corpora(&self) -> Vec<String> {
        self.corpora.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _instruction: &str, corpus: &str) -> Result<String, MimicError> {
        self.corpora.lock().unwrap().push(corpus.to_string());
        self.response.clone()
    }
}

pub struct FakeGenerator {
    output: String,
    /// Fail whenever the brief contains this text
    fail_on: Option<(String, String)>,
    /// Take this store down during the call
    outage: Option<Arc<MemoryStore>>,
    calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn replying(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            fail_on: None,
            outage: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::replying("").fail_when("", message)
    }

    pub fn fail_when(mut self, brief_marker: impl Into<String>, message: impl Into<String>) -> Self {
        self.fail_on = Some((brief_marker.into(), message.into()));
        self
    }

    pub fn dropping_store(mut self, store: Arc<MemoryStore>) -> Self {
        self.outage = Some(store);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, style_brief: &str, _count: usize) -> Result<String, MimicError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(store) = &self.outage {
            store.set_available(false);
        }
        match &self.fail_on {
            Some((marker, message)) if style_brief.contains(marker.as_str()) => {
                Err(MimicError::Generation(message.clone()))
            }
            _ => Ok(self.output.clone()),
        }
    }
}

/// Signals `started` when called, then waits for `release`
pub struct GatedGenerator {
    output: String,
    pub started: Notify,
    pub release: Notify,
}

impl GatedGenerator {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            started: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl ContentGenerator for GatedGenerator {
    async fn generate(&self, _style_brief: &str, _count: usize) -> Result<String, MimicError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.output.clone())
    }
}

/// A well-formed analysis response
pub fn analysis_json() -> String {
    serde_json::json!({
        "casing": {
            "usesCapitalization": false,
            "capitalizedWords": ["Rust"],
            "allCapsWords": ["LFG"]
        },
        "punctuation": {
            "endingSentenceStyle": "none",
            "usesPeriods": false,
            "usesEllipsis": true,
            "commonPunctuationPatterns": ["..."]
        },
        "vocabulary": {
            "commonWords": ["ship"],
            "slangTerms": ["ngl", "fr"],
            "acronyms": ["IMO"],
            "mentionStyle": ["@handle"],
            "emojiUsage": {
                "usesEmojis": true,
                "mostUsedEmojis": ["🦀"],
                "emojiFrequency": 0.3
            }
        },
        "content": {
            "mainTopics": ["compilers"],
            "frequentReferences": { "people": ["ferris"] },
            "contentStyle": { "usesThreads": true }
        }
    })
    .to_string()
}
