//! Persistence for agents, style profiles and post records
//!
//! `Store` is the seam the coordinators and the scheduler depend on.
//! `PgStore` backs it with PostgreSQL; `MemoryStore` keeps everything in
//! process and can simulate an outage.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Agent, AgentWithLastPost, NewAgent, NewPostRecord, PostRecord};
use crate::style::StyleProfile;

pub trait Store: Send + Sync {
    /// Establish (or re-establish) the backing connection
    fn connect(&self) -> Result<()>;

    /// Release the backing connection
    fn disconnect(&self) -> Result<()>;

    /// Insert an agent together with a default style profile, atomically
    fn create_agent(&self, agent: NewAgent) -> Result<Agent>;

    fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>>;

    /// Every active agent with its newest post record (at most one)
    fn active_agents_with_last_post(&self) -> Result<Vec<AgentWithLastPost>>;

    fn get_style_profile(&self, agent_id: Uuid) -> Result<Option<StyleProfile>>;

    fn insert_style_profile(&self, profile: &StyleProfile) -> Result<()>;

    /// Replace the patterns, sample count and timestamp of a stored profile
    fn update_style_profile(&self, profile: &StyleProfile) -> Result<()>;

    fn append_post(&self, post: NewPostRecord) -> Result<PostRecord>;

    /// Newest first
    fn recent_posts(&self, agent_id: Uuid, limit: i64) -> Result<Vec<PostRecord>>;
}

/// Historical writing samples, keyed by source handle
pub trait SampleSource: Send + Sync {
    /// Newest first
    fn recent_samples(&self, handle: &str, limit: i64) -> Result<Vec<String>>;
}
