//! Mimic Core Library
//!
//! Style-profile training, content generation and the posting scheduler
//! for autonomous social agents.

pub mod capabilities;
pub mod config;
pub mod connection;
pub mod error;
pub mod generation;
pub mod health;
pub mod models;
pub mod scheduler;
pub mod schema;
pub mod store;
pub mod style;
pub mod training;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types for convenience
pub use capabilities::{ChatAnalyzer, ChatGenerator, ContentGenerator, TextAnalyzer};
pub use config::Config;
pub use connection::ConnectionHealth;
pub use error::{MimicError, Result};
pub use generation::GenerationCoordinator;
pub use models::{Agent, NewAgent, NewPostRecord, PostRecord, PostStatus, PostingWindow};
pub use scheduler::{
    should_post, PostingScheduler, SchedulerConfig, SchedulerState, TickOutcome, TickReport,
};
pub use store::{MemoryStore, PgStore, SampleSource, Store};
pub use style::{merge, StyleProfile, WritingPatterns};
pub use training::TrainingCoordinator;

use diesel_migrations::{embed_migrations, EmbeddedMigrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
