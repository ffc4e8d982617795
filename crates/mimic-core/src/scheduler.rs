//! Posting Scheduler
//!
//! One scheduler drives every active agent. Each tick fetches the agents
//! with their newest post record, decides per agent whether a post is due
//! and records the outcome of each attempt. A failure for one agent never
//! stops the others, including a store that rejects one agent's record.
//! Losing the store connection ends the tick, marks the connection down
//! and the next tick reconnects first.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::connection::ConnectionHealth;
use crate::error::{MimicError, Result};
use crate::generation::GenerationCoordinator;
use crate::models::{Agent, AgentWithLastPost, NewPostRecord, PostRecord};
use crate::store::Store;

// ============================================================================
// Eligibility
// ============================================================================

/// Whether `agent` should post at `now`.
///
/// The hour of `now` in the agent's zone must fall inside its posting
/// window, and at least `24 / tweets_per_day` hours must have passed since
/// its last post record (successful or not).
pub fn should_post(agent: &Agent, last: Option<&PostRecord>, now: DateTime<Utc>) -> bool {
    let local_hour = now.with_timezone(&agent.tz()).hour();
    if !agent.window.contains(local_hour) {
        return false;
    }

    let last = match last {
        Some(last) => last,
        None => return true,
    };
    if agent.tweets_per_day == 0 {
        return false;
    }

    let hours_since_last = (now - last.created_at).num_milliseconds() as f64 / 3_600_000.0;
    let required_gap = 24.0 / agent.tweets_per_day as f64;
    hours_since_last >= required_gap
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerState::Stopped => "stopped",
            SchedulerState::Starting => "starting",
            SchedulerState::Running => "running",
            SchedulerState::Stopping => "stopping",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    /// Connect attempts before `start` gives up
    pub connect_attempts: u32,
    pub retry_delay: Duration,
    /// Pause after a failed tick before the next one may run
    pub failure_backoff: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
            connect_attempts: 5,
            retry_delay: Duration::from_secs(5),
            failure_backoff: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub agents_checked: usize,
    pub posted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Skipped(String),
    Completed(TickReport),
    Failed(String),
}

struct LoopHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

struct Inner {
    store: Arc<dyn Store>,
    generation: Arc<GenerationCoordinator>,
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
    health: Mutex<ConnectionHealth>,
    ticking: AtomicBool,
    task: tokio::sync::Mutex<Option<LoopHandle>>,
}

/// Resets the reentrancy flag even if the tick future is dropped
struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// Scheduler
// ============================================================================

#[derive(Clone)]
pub struct PostingScheduler {
    inner: Arc<Inner>,
}

impl PostingScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        generation: Arc<GenerationCoordinator>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                generation,
                config,
                state: Mutex::new(SchedulerState::Stopped),
                health: Mutex::new(ConnectionHealth::Down),
                ticking: AtomicBool::new(false),
                task: tokio::sync::Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.inner
            .state
            .lock()
            .map(|s| *s)
            .unwrap_or(SchedulerState::Stopped)
    }

    pub fn health(&self) -> ConnectionHealth {
        self.inner
            .health
            .lock()
            .map(|h| *h)
            .unwrap_or(ConnectionHealth::Down)
    }

    fn set_state(&self, state: SchedulerState) {
        if let Ok(mut current) = self.inner.state.lock() {
            debug!("Scheduler {} -> {}", current.as_str(), state.as_str());
            *current = state;
        }
    }

    fn set_health(&self, health: ConnectionHealth) {
        if let Ok(mut current) = self.inner.health.lock() {
            *current = health;
        }
    }

    /// Connect to the store and begin ticking. No-op while running.
    ///
    /// Fails with `Connectivity` once every connect attempt is used up.
    pub async fn start(&self) -> Result<()> {
        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            debug!("Scheduler already running");
            return Ok(());
        }

        self.set_state(SchedulerState::Starting);
        if let Err(e) = self.connect_with_retry().await {
            self.set_state(SchedulerState::Stopped);
            return Err(e);
        }

        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(self.clone(), rx));
        *task = Some(LoopHandle { shutdown, handle });
        self.set_state(SchedulerState::Running);

        info!(
            "Posting scheduler started (tick every {}s)",
            self.inner.config.tick_interval.as_secs()
        );
        Ok(())
    }

    /// Stop ticking and release the store. Waits for an in-flight tick.
    pub async fn stop(&self) -> Result<()> {
        let mut task = self.inner.task.lock().await;
        let running = match task.take() {
            Some(running) => running,
            None => {
                debug!("Scheduler already stopped");
                return Ok(());
            }
        };

        self.set_state(SchedulerState::Stopping);
        let _ = running.shutdown.send(true);
        if let Err(e) = running.handle.await {
            warn!("Scheduler loop ended abnormally: {}", e);
        }

        let result = self.inner.store.disconnect();
        self.set_health(ConnectionHealth::Down);
        self.set_state(SchedulerState::Stopped);
        info!("Posting scheduler stopped");
        result
    }

    async fn connect_with_retry(&self) -> Result<()> {
        let attempts = self.inner.config.connect_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            self.set_health(self.health().begin_reconnect());
            match self.inner.store.connect() {
                Ok(()) => {
                    self.set_health(ConnectionHealth::Up);
                    info!("Connected to store");
                    return Ok(());
                }
                Err(e) => {
                    self.set_health(ConnectionHealth::Down);
                    warn!(
                        "Store connection failed: {} ({} attempt(s) remaining)",
                        e,
                        attempts - attempt
                    );
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.inner.config.retry_delay).await;
                    }
                }
            }
        }

        error!("Giving up on store after {} attempts", attempts);
        Err(MimicError::Connectivity(format!(
            "no connection after {} attempts: {}",
            attempts, last_error
        )))
    }

    /// Run one scheduling pass at `now`.
    ///
    /// Skipped when another pass is still running or the store cannot be
    /// reached. Never returns an error; failures are logged and reported in
    /// the outcome.
    pub async fn tick(&self, now: DateTime<Utc>) -> TickOutcome {
        if self
            .inner
            .ticking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Previous tick still running, skipping");
            return TickOutcome::Skipped("previous tick still running".to_string());
        }
        let _guard = TickGuard(&self.inner.ticking);

        if !self.health().is_up() {
            self.set_health(self.health().begin_reconnect());
            let reconnect = self.inner.store.connect();
            self.set_health(ConnectionHealth::Reconnecting.settle(reconnect.is_ok()));
            match reconnect {
                Ok(()) => info!("Store connection restored"),
                Err(e) => {
                    warn!("Reconnect failed, skipping tick: {}", e);
                    return TickOutcome::Skipped(format!("store unreachable: {}", e));
                }
            }
        }

        match self.process_agents(now).await {
            Ok(report) => {
                debug!(
                    "Tick done: {} checked, {} posted, {} failed",
                    report.agents_checked, report.posted, report.failed
                );
                TickOutcome::Completed(report)
            }
            Err(e) => {
                self.set_health(self.health().mark_down());
                error!("Tick failed, connection marked down: {}", e);
                tokio::time::sleep(self.inner.config.failure_backoff).await;
                TickOutcome::Failed(e.to_string())
            }
        }
    }

    async fn process_agents(&self, now: DateTime<Utc>) -> Result<TickReport> {
        let agents = self.inner.store.active_agents_with_last_post()?;
        let mut report = TickReport {
            agents_checked: agents.len(),
            ..TickReport::default()
        };

        for AgentWithLastPost { agent, last_post } in agents {
            if !should_post(&agent, last_post.as_ref(), now) {
                continue;
            }

            let error = match self.compose(&agent).await {
                Ok(content) => {
                    match self
                        .inner
                        .store
                        .append_post(NewPostRecord::success(agent.id, content.clone(), now))
                    {
                        Ok(_) => {
                            report.posted += 1;
                            info!("Agent {} posted: {}", agent.name, content);
                            continue;
                        }
                        Err(e) if e.is_connectivity() => return Err(e),
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };

            let message = error.to_string();
            self.inner
                .store
                .append_post(NewPostRecord::failed(agent.id, message.clone(), now))?;
            report.failed += 1;
            warn!("Agent {} failed to post: {}", agent.name, message);
        }

        Ok(report)
    }

    async fn compose(&self, agent: &Agent) -> Result<String> {
        self.inner
            .generation
            .generate(agent.id, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MimicError::Generation("empty output".to_string()))
    }
}

async fn run_loop(scheduler: PostingScheduler, mut shutdown: watch::Receiver<bool>) {
    let period = scheduler
        .inner
        .config
        .tick_interval
        .max(Duration::from_millis(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = interval.tick() => {
                match scheduler.tick(Utc::now()).await {
                    TickOutcome::Completed(_) => {}
                    TickOutcome::Skipped(reason) => debug!("Tick skipped: {}", reason),
                    TickOutcome::Failed(message) => error!("Tick error: {}", message),
                }
            }
        }
    }

    debug!("Scheduler loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewAgent, PostStatus, PostingWindow};
    use crate::store::MemoryStore;
    use crate::test_support::{FakeGenerator, GatedGenerator};
    use chrono::{Duration as ChronoDuration, TimeZone};
    use uuid::Uuid;

    fn agent(tweets_per_day: u32, window: PostingWindow, timezone: &str) -> Agent {
        let now = Utc::now();
        Agent {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            handle: "test".to_string(),
            personality: String::new(),
            character: String::new(),
            language_style: String::new(),
            is_active: true,
            tweets_per_day,
            timezone: timezone.to_string(),
            window,
            created_at: now,
            updated_at: now,
        }
    }

    fn post_at(agent: &Agent, at: DateTime<Utc>) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            agent_id: agent.id,
            content: "x".to_string(),
            status: PostStatus::Success,
            error: None,
            engagement: None,
            created_at: at,
        }
    }

    fn instant_config() -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_secs(3600),
            connect_attempts: 3,
            retry_delay: Duration::ZERO,
            failure_backoff: Duration::ZERO,
        }
    }

    fn scheduler(store: Arc<MemoryStore>, generator: FakeGenerator) -> PostingScheduler {
        let generation = Arc::new(GenerationCoordinator::new(store.clone(), Arc::new(generator)));
        PostingScheduler::new(store, generation, instant_config())
    }

    #[test]
    fn test_anytime_ignores_hour() {
        let a = agent(24, PostingWindow::Anytime, "UTC");
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        for hour in 0..24 {
            assert!(should_post(&a, None, base + ChronoDuration::hours(hour)));
        }
    }

    #[test]
    fn test_first_post_only_needs_window() {
        let window = PostingWindow::hours(9, 17).unwrap();
        for tweets_per_day in [1, 3, 48] {
            let a = agent(tweets_per_day, window, "UTC");
            let inside = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
            let edge = Utc.with_ymd_and_hms(2026, 3, 1, 17, 59, 0).unwrap();
            let outside = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
            assert!(should_post(&a, None, inside));
            assert!(should_post(&a, None, edge));
            assert!(!should_post(&a, None, outside));
        }
    }

    #[test]
    fn test_gap_boundary() {
        let a = agent(6, PostingWindow::Anytime, "UTC");
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let recent = post_at(&a, now - ChronoDuration::minutes(3 * 60 + 59));
        assert!(!should_post(&a, Some(&recent), now));

        let due = post_at(&a, now - ChronoDuration::hours(4));
        assert!(should_post(&a, Some(&due), now));
    }

    #[test]
    fn test_window_uses_agent_timezone() {
        let a = agent(1, PostingWindow::hours(9, 10).unwrap(), "America/New_York");
        // 14:00 UTC is 09:00 in New York (EST)
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap();
        assert!(should_post(&a, None, now));
        let utc_nine = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        assert!(!should_post(&a, None, utc_nine));
    }

    #[test]
    fn test_cross_midnight_window_matches_nothing() {
        let a = agent(1, PostingWindow::hours(22, 2).unwrap(), "UTC");
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 3, 1, 1, 0, 0).unwrap();
        assert!(!should_post(&a, None, late));
        assert!(!should_post(&a, None, early));
    }

    #[test]
    fn test_unknown_timezone_uses_utc() {
        let a = agent(1, PostingWindow::hours(9, 9).unwrap(), "Mars/Olympus");
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        assert!(should_post(&a, None, now));
    }

    #[tokio::test]
    async fn test_daily_agent_posts_once_per_day() {
        let store = Arc::new(MemoryStore::new());
        let a = store.create_agent(NewAgent::new("A", "a")).unwrap();
        let s = scheduler(store.clone(), FakeGenerator::replying("gm everyone"));

        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let first = s.tick(t0).await;
        assert_eq!(
            first,
            TickOutcome::Completed(TickReport {
                agents_checked: 1,
                posted: 1,
                failed: 0
            })
        );
        let posts = store.posts_for(a.id);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].status, PostStatus::Success);
        assert_eq!(posts[0].content, "gm everyone");

        s.tick(t0 + ChronoDuration::minutes(30)).await;
        assert_eq!(store.posts_for(a.id).len(), 1);

        s.tick(t0 + ChronoDuration::hours(25)).await;
        assert_eq!(store.posts_for(a.id).len(), 2);
    }

    #[tokio::test]
    async fn test_one_agent_failing_does_not_block_others() {
        let store = Arc::new(MemoryStore::new());
        let b = store
            .create_agent(NewAgent::new("B", "b").with_persona("grumpy", "cursed"))
            .unwrap();
        let c = store
            .create_agent(NewAgent::new("C", "c").with_persona("cheerful", "blessed"))
            .unwrap();
        let generator =
            FakeGenerator::replying("hello world").fail_when("CHARACTER: cursed", "model overloaded");
        let s = scheduler(store.clone(), generator);

        let outcome = s.tick(Utc::now()).await;
        assert_eq!(
            outcome,
            TickOutcome::Completed(TickReport {
                agents_checked: 2,
                posted: 1,
                failed: 1
            })
        );

        let b_posts = store.posts_for(b.id);
        assert_eq!(b_posts.len(), 1);
        assert_eq!(b_posts[0].status, PostStatus::Failed);
        assert!(b_posts[0].error.as_deref().unwrap().contains("model overloaded"));

        let c_posts = store.posts_for(c.id);
        assert_eq!(c_posts.len(), 1);
        assert_eq!(c_posts[0].status, PostStatus::Success);
        assert_eq!(c_posts[0].content, "hello world");
    }

    #[tokio::test]
    async fn test_failed_attempt_counts_as_last_post() {
        let store = Arc::new(MemoryStore::new());
        let a = store.create_agent(NewAgent::new("A", "a")).unwrap();
        let s = scheduler(store.clone(), FakeGenerator::failing("nope"));

        let t0 = Utc::now();
        s.tick(t0).await;
        s.tick(t0 + ChronoDuration::hours(1)).await;
        let posts = store.posts_for(a.id);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].status, PostStatus::Failed);
    }

    #[tokio::test]
    async fn test_store_drop_mid_tick() {
        let store = Arc::new(MemoryStore::new());
        let a = store.create_agent(NewAgent::new("A", "a")).unwrap();
        let generator = FakeGenerator::replying("hi").dropping_store(store.clone());
        let s = scheduler(store.clone(), generator);

        let outcome = s.tick(Utc::now()).await;
        assert!(matches!(outcome, TickOutcome::Failed(msg) if msg.contains("unreachable")));
        assert_eq!(s.health(), ConnectionHealth::Down);

        // still unavailable: the reconnect fails and nothing is queried
        let outcome = s.tick(Utc::now()).await;
        assert!(matches!(outcome, TickOutcome::Skipped(_)));
        assert_eq!(s.health(), ConnectionHealth::Down);
        assert!(store.posts_for(a.id).is_empty());

        store.set_available(true);
        let outcome = s.tick(Utc::now()).await;
        assert!(matches!(outcome, TickOutcome::Failed(_) | TickOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_reconnect_before_query() {
        let store = Arc::new(MemoryStore::new());
        let a = store.create_agent(NewAgent::new("A", "a")).unwrap();
        let s = scheduler(store.clone(), FakeGenerator::replying("back online"));

        // never started, so the first tick has to connect
        store.disconnect().unwrap();
        let outcome = s.tick(Utc::now()).await;
        assert!(matches!(outcome, TickOutcome::Completed(ref r) if r.posted == 1));
        assert!(store.is_connected());
        assert_eq!(s.health(), ConnectionHealth::Up);
        assert_eq!(store.posts_for(a.id).len(), 1);
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let s = scheduler(store.clone(), FakeGenerator::replying("hi"));

        assert_eq!(s.state(), SchedulerState::Stopped);
        s.stop().await.unwrap();
        assert_eq!(s.state(), SchedulerState::Stopped);

        s.start().await.unwrap();
        assert_eq!(s.state(), SchedulerState::Running);
        assert_eq!(s.health(), ConnectionHealth::Up);
        s.start().await.unwrap();
        assert_eq!(s.state(), SchedulerState::Running);

        s.stop().await.unwrap();
        assert_eq!(s.state(), SchedulerState::Stopped);
        assert!(!store.is_connected());
        s.stop().await.unwrap();
        assert_eq!(s.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn test_start_gives_up_after_retries() {
        let store = Arc::new(MemoryStore::new());
        store.set_available(false);
        let s = scheduler(store.clone(), FakeGenerator::replying("hi"));

        let err = s.start().await.unwrap_err();
        assert!(err.is_connectivity());
        assert!(err.to_string().contains("3 attempts"));
        assert_eq!(s.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn test_running_loop_ticks_immediately() {
        let store = Arc::new(MemoryStore::new());
        let a = store.create_agent(NewAgent::new("A", "a")).unwrap();
        let s = scheduler(store.clone(), FakeGenerator::replying("from the loop"));

        s.start().await.unwrap();
        for _ in 0..100 {
            if !store.posts_for(a.id).is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        s.stop().await.unwrap();

        let posts = store.posts_for(a.id);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content, "from the loop");
    }

    #[tokio::test]
    async fn test_concurrent_tick_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let a = store.create_agent(NewAgent::new("A", "a")).unwrap();
        let generator = Arc::new(GatedGenerator::new("slow post"));
        let generation = Arc::new(GenerationCoordinator::new(store.clone(), generator.clone()));
        let s = PostingScheduler::new(store.clone(), generation, instant_config());

        let in_flight = tokio::spawn({
            let s = s.clone();
            async move { s.tick(Utc::now()).await }
        });
        generator.started.notified().await;

        let overlapping = s.tick(Utc::now()).await;
        assert!(matches!(overlapping, TickOutcome::Skipped(_)));

        generator.release.notify_one();
        let first = in_flight.await.unwrap();
        assert!(matches!(first, TickOutcome::Completed(ref r) if r.posted == 1));
        assert_eq!(store.posts_for(a.id).len(), 1);

        // guard released once the first tick finished
        let later = s.tick(Utc::now()).await;
        assert!(matches!(later, TickOutcome::Completed(_)));
    }

    /// Rejects successful posts of one agent the way Postgres rejects bad rows
    struct RejectingStore {
        inner: Arc<MemoryStore>,
        reject: Uuid,
    }

    impl Store for RejectingStore {
        fn connect(&self) -> Result<()> {
            self.inner.connect()
        }

        fn disconnect(&self) -> Result<()> {
            self.inner.disconnect()
        }

        fn create_agent(&self, agent: NewAgent) -> Result<Agent> {
            self.inner.create_agent(agent)
        }

        fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>> {
            self.inner.get_agent(agent_id)
        }

        fn active_agents_with_last_post(&self) -> Result<Vec<AgentWithLastPost>> {
            self.inner.active_agents_with_last_post()
        }

        fn get_style_profile(&self, agent_id: Uuid) -> Result<Option<crate::style::StyleProfile>> {
            self.inner.get_style_profile(agent_id)
        }

        fn insert_style_profile(&self, profile: &crate::style::StyleProfile) -> Result<()> {
            self.inner.insert_style_profile(profile)
        }

        fn update_style_profile(&self, profile: &crate::style::StyleProfile) -> Result<()> {
            self.inner.update_style_profile(profile)
        }

        fn append_post(&self, post: NewPostRecord) -> Result<PostRecord> {
            if post.agent_id == self.reject && post.status == PostStatus::Success {
                return Err(MimicError::Storage(
                    "invalid byte sequence for encoding \"UTF8\": 0x00".to_string(),
                ));
            }
            self.inner.append_post(post)
        }

        fn recent_posts(&self, agent_id: Uuid, limit: i64) -> Result<Vec<PostRecord>> {
            self.inner.recent_posts(agent_id, limit)
        }
    }

    #[tokio::test]
    async fn test_rejected_post_is_recorded_as_failure() {
        let memory = Arc::new(MemoryStore::new());
        let b = memory.create_agent(NewAgent::new("B", "b")).unwrap();
        let c = memory.create_agent(NewAgent::new("C", "c")).unwrap();
        let store = Arc::new(RejectingStore {
            inner: memory.clone(),
            reject: b.id,
        });
        let generation = Arc::new(GenerationCoordinator::new(
            store.clone(),
            Arc::new(FakeGenerator::replying("good")),
        ));
        let s = PostingScheduler::new(store, generation, instant_config());

        let outcome = s.tick(Utc::now()).await;
        assert_eq!(
            outcome,
            TickOutcome::Completed(TickReport {
                agents_checked: 2,
                posted: 1,
                failed: 1
            })
        );
        assert_eq!(s.health(), ConnectionHealth::Up);

        let b_posts = memory.posts_for(b.id);
        assert_eq!(b_posts.len(), 1);
        assert_eq!(b_posts[0].status, PostStatus::Failed);
        assert!(b_posts[0].error.as_deref().unwrap().contains("0x00"));

        let c_posts = memory.posts_for(c.id);
        assert_eq!(c_posts.len(), 1);
        assert_eq!(c_posts[0].status, PostStatus::Success);
    }
}
