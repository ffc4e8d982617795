//! In-process store
//!
//! Same contract as `PgStore`. `set_available(false)` simulates an outage:
//! the connection drops and every call fails with `Connectivity` until the
//! store is available again and `connect` succeeds.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::{SampleSource, Store};
use crate::error::{MimicError, Result};
use crate::models::{Agent, AgentWithLastPost, NewAgent, NewPostRecord, PostRecord};
use crate::style::StyleProfile;

#[derive(Default)]
struct MemoryState {
    agents: Vec<Agent>,
    profiles: HashMap<Uuid, StyleProfile>,
    posts: Vec<PostRecord>,
    samples: HashMap<String, Vec<(DateTime<Utc>, String)>>,
}

pub struct MemoryStore {
    state: Mutex<MemoryState>,
    available: AtomicBool,
    connected: AtomicBool,
    profile_writes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A reachable, already connected store
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            available: AtomicBool::new(true),
            connected: AtomicBool::new(true),
            profile_writes: AtomicUsize::new(0),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
        if !available {
            self.connected.store(false, Ordering::SeqCst);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Number of style profile inserts and updates so far
    pub fn profile_writes(&self) -> usize {
        self.profile_writes.load(Ordering::SeqCst)
    }

    /// All post records of an agent in insertion order
    pub fn posts_for(&self, agent_id: Uuid) -> Vec<PostRecord> {
        self.lock()
            .map(|state| {
                state
                    .posts
                    .iter()
                    .filter(|p| p.agent_id == agent_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn add_samples<I, S>(&self, handle: &str, samples: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.lock()?;
        let entry = state.samples.entry(handle.to_string()).or_default();
        for sample in samples {
            entry.push((Utc::now(), sample.into()));
        }
        Ok(())
    }

    pub fn delete_style_profile(&self, agent_id: Uuid) -> Result<()> {
        self.lock()?.profiles.remove(&agent_id);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| MimicError::Storage(format!("Lock error: {}", e)))
    }

    /// Lock the state after checking the simulated connection
    fn conn(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(MimicError::Connectivity("store unavailable".to_string()));
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(MimicError::Connectivity("not connected".to_string()));
        }
        self.lock()
    }
}

impl Store for MemoryStore {
    fn connect(&self) -> Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(MimicError::Connectivity(
                "connection refused".to_string(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn create_agent(&self, agent: NewAgent) -> Result<Agent> {
        agent.validate()?;
        let mut state = self.conn()?;

        let now = Utc::now();
        let created = Agent {
            id: Uuid::new_v4(),
            name: agent.name,
            handle: agent.handle,
            personality: agent.personality,
            character: agent.character,
            language_style: agent.language_style,
            is_active: agent.is_active,
            tweets_per_day: agent.tweets_per_day,
            timezone: agent.timezone,
            window: agent.window,
            created_at: now,
            updated_at: now,
        };

        state
            .profiles
            .insert(created.id, StyleProfile::new_default(created.id));
        state.agents.push(created.clone());
        Ok(created)
    }

    fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>> {
        let state = self.conn()?;
        Ok(state.agents.iter().find(|a| a.id == agent_id).cloned())
    }

    fn active_agents_with_last_post(&self) -> Result<Vec<AgentWithLastPost>> {
        let state = self.conn()?;
        Ok(state
            .agents
            .iter()
            .filter(|a| a.is_active)
            .map(|agent| {
                // max_by_key keeps the last of equal keys, i.e. the newest insert
                let last_post = state
                    .posts
                    .iter()
                    .filter(|p| p.agent_id == agent.id)
                    .max_by_key(|p| p.created_at)
                    .cloned();
                AgentWithLastPost {
                    agent: agent.clone(),
                    last_post,
                }
            })
            .collect())
    }

    fn get_style_profile(&self, agent_id: Uuid) -> Result<Option<StyleProfile>> {
        let state = self.conn()?;
        Ok(state.profiles.get(&agent_id).cloned())
    }

    fn insert_style_profile(&self, profile: &StyleProfile) -> Result<()> {
        let mut state = self.conn()?;
        if state.profiles.contains_key(&profile.agent_id) {
            return Err(MimicError::Storage(format!(
                "style profile for agent {} already exists",
                profile.agent_id
            )));
        }
        state.profiles.insert(profile.agent_id, profile.clone());
        self.profile_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn update_style_profile(&self, profile: &StyleProfile) -> Result<()> {
        let mut state = self.conn()?;
        match state.profiles.get_mut(&profile.agent_id) {
            Some(stored) => {
                stored.patterns = profile.patterns.clone();
                stored.training_sample_count = profile.training_sample_count;
                stored.last_updated = profile.last_updated;
                self.profile_writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(MimicError::profile_not_found(profile.agent_id)),
        }
    }

    fn append_post(&self, post: NewPostRecord) -> Result<PostRecord> {
        let mut state = self.conn()?;
        let record = PostRecord {
            id: Uuid::new_v4(),
            agent_id: post.agent_id,
            content: post.content,
            status: post.status,
            error: post.error,
            engagement: None,
            created_at: post.created_at,
        };
        state.posts.push(record.clone());
        Ok(record)
    }

    fn recent_posts(&self, agent_id: Uuid, limit: i64) -> Result<Vec<PostRecord>> {
        let state = self.conn()?;
        let mut posts: Vec<PostRecord> = state
            .posts
            .iter()
            .filter(|p| p.agent_id == agent_id)
            .cloned()
            .collect();
        posts.reverse();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit.max(0) as usize);
        Ok(posts)
    }
}

impl SampleSource for MemoryStore {
    fn recent_samples(&self, handle: &str, limit: i64) -> Result<Vec<String>> {
        let state = self.conn()?;
        let mut samples: Vec<(DateTime<Utc>, String)> =
            state.samples.get(handle).cloned().unwrap_or_default();
        samples.reverse();
        samples.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(samples
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, content)| content)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_create_agent_attaches_default_profile() {
        let store = MemoryStore::new();
        let agent = store.create_agent(NewAgent::new("a", "h")).unwrap();
        let profile = store.get_style_profile(agent.id).unwrap().unwrap();
        assert_eq!(profile.training_sample_count, 0);
        assert_eq!(profile.patterns, crate::style::WritingPatterns::default());
    }

    #[test]
    fn test_last_post_is_newest() {
        let store = MemoryStore::new();
        let agent = store.create_agent(NewAgent::new("a", "h")).unwrap();
        let t0 = Utc::now();
        store
            .append_post(NewPostRecord::success(agent.id, "old", t0 - Duration::hours(2)))
            .unwrap();
        store
            .append_post(NewPostRecord::failed(agent.id, "boom", t0))
            .unwrap();
        store
            .append_post(NewPostRecord::success(agent.id, "older", t0 - Duration::hours(5)))
            .unwrap();

        let rows = store.active_agents_with_last_post().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_post.as_ref().unwrap().error.as_deref(), Some("boom"));

        let recent = store.recent_posts(agent.id, 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].content, "old");
    }

    #[test]
    fn test_inactive_agents_are_skipped() {
        let store = MemoryStore::new();
        store.create_agent(NewAgent::new("on", "h")).unwrap();
        store.create_agent(NewAgent::new("off", "h").inactive()).unwrap();
        let rows = store.active_agents_with_last_post().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].agent.name, "on");
    }

    #[test]
    fn test_outage_requires_reconnect() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(store.active_agents_with_last_post().unwrap_err().is_connectivity());
        assert!(store.connect().is_err());

        store.set_available(true);
        assert!(store.active_agents_with_last_post().unwrap_err().is_connectivity());
        store.connect().unwrap();
        assert!(store.active_agents_with_last_post().is_ok());
    }

    #[test]
    fn test_samples_newest_first() {
        let store = MemoryStore::new();
        store.add_samples("h", ["first", "second", "third"]).unwrap();
        let samples = store.recent_samples("h", 2).unwrap();
        assert_eq!(samples, vec!["third".to_string(), "second".to_string()]);
        assert!(store.recent_samples("nobody", 10).unwrap().is_empty());
    }
}
