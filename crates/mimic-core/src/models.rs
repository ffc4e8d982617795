//! Agent and post-record types shared by the store, the coordinators and
//! the scheduler.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use crate::error::MimicError;

/// Hours of the agent's local day during which it may post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PostingWindow {
    Anytime,
    /// Inclusive on both ends. `start > end` matches nothing.
    Hours { start: u8, end: u8 },
}

impl PostingWindow {
    pub fn hours(start: u8, end: u8) -> Result<Self, MimicError> {
        if start > 23 || end > 23 {
            return Err(MimicError::InvalidInput(format!(
                "posting hours must be 0-23, got {}-{}",
                start, end
            )));
        }
        Ok(PostingWindow::Hours { start, end })
    }

    pub fn contains(&self, hour: u32) -> bool {
        match *self {
            PostingWindow::Anytime => true,
            PostingWindow::Hours { start, end } => hour >= start as u32 && hour <= end as u32,
        }
    }
}

/// A configured persona with a posting cadence and window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    /// Identity whose writing samples train this agent
    pub handle: String,
    pub personality: String,
    pub character: String,
    pub language_style: String,
    pub is_active: bool,
    pub tweets_per_day: u32,
    /// IANA zone name, e.g. "America/New_York"
    pub timezone: String,
    pub window: PostingWindow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// The agent's zone, falling back to UTC for unknown identifiers
    pub fn tz(&self) -> Tz {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                warn!(
                    "Agent {} has unknown timezone '{}', using UTC",
                    self.id, self.timezone
                );
                Tz::UTC
            }
        }
    }
}

/// Fields needed to create an agent
#[derive(Debug, Clone)]
pub struct NewAgent {
    pub name: String,
    pub handle: String,
    pub personality: String,
    pub character: String,
    pub language_style: String,
    pub is_active: bool,
    pub tweets_per_day: u32,
    pub timezone: String,
    pub window: PostingWindow,
}

impl NewAgent {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            personality: String::new(),
            character: String::new(),
            language_style: String::new(),
            is_active: true,
            tweets_per_day: 1,
            timezone: "UTC".to_string(),
            window: PostingWindow::Anytime,
        }
    }

    pub fn with_cadence(mut self, tweets_per_day: u32) -> Self {
        self.tweets_per_day = tweets_per_day;
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_window(mut self, window: PostingWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_persona(
        mut self,
        personality: impl Into<String>,
        character: impl Into<String>,
    ) -> Self {
        self.personality = personality.into();
        self.character = character.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn validate(&self) -> Result<(), MimicError> {
        if self.tweets_per_day < 1 {
            return Err(MimicError::InvalidInput(
                "tweets_per_day must be at least 1".to_string(),
            ));
        }
        if let PostingWindow::Hours { start, end } = self.window {
            PostingWindow::hours(start, end)?;
        }
        Ok(())
    }
}

/// Outcome of one post attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Success,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Success => "success",
            PostStatus::Failed => "failed",
        }
    }
}

impl FromStr for PostStatus {
    type Err = MimicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(PostStatus::Success),
            "failed" => Ok(PostStatus::Failed),
            _ => Err(MimicError::Storage(format!("Invalid post status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: i32,
    pub reposts: i32,
    pub replies: i32,
}

/// Append-only log entry for one attempted post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub agent_id: Uuid,
    /// Empty on failure
    pub content: String,
    pub status: PostStatus,
    pub error: Option<String>,
    pub engagement: Option<Engagement>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPostRecord {
    pub agent_id: Uuid,
    pub content: String,
    pub status: PostStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPostRecord {
    pub fn success(agent_id: Uuid, content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            agent_id,
            content: content.into(),
            status: PostStatus::Success,
            error: None,
            created_at: at,
        }
    }

    pub fn failed(agent_id: Uuid, error: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            agent_id,
            content: String::new(),
            status: PostStatus::Failed,
            error: Some(error.into()),
            created_at: at,
        }
    }
}

/// An active agent together with its newest post record, if any
#[derive(Debug, Clone)]
pub struct AgentWithLastPost {
    pub agent: Agent,
    pub last_post: Option<PostRecord>,
}
