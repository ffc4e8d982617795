//! PostgreSQL store using Diesel

use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Array, Uuid as DieselUuid};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{SampleSource, Store};
use crate::error::{MimicError, Result};
use crate::models::{
    Agent, AgentWithLastPost, Engagement, NewAgent, NewPostRecord, PostRecord, PostStatus,
    PostingWindow,
};
use crate::schema::{agents, post_records, style_profiles, writing_samples};
use crate::style::{StyleProfile, WritingPatterns};

// ============================================================================
// Rows
// ============================================================================

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = agents)]
struct AgentRow {
    id: Uuid,
    name: String,
    handle: String,
    personality: String,
    character: String,
    language_style: String,
    is_active: bool,
    tweets_per_day: i32,
    timezone: String,
    post_24_hours: bool,
    posting_start_hour: i32,
    posting_end_hour: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AgentRow> for Agent {
    type Error = MimicError;

    fn try_from(row: AgentRow) -> Result<Self> {
        let window = if row.post_24_hours {
            PostingWindow::Anytime
        } else {
            let start = u8::try_from(row.posting_start_hour).map_err(|_| {
                MimicError::Storage(format!("agent {} has bad start hour", row.id))
            })?;
            let end = u8::try_from(row.posting_end_hour)
                .map_err(|_| MimicError::Storage(format!("agent {} has bad end hour", row.id)))?;
            PostingWindow::hours(start, end)?
        };

        Ok(Agent {
            id: row.id,
            name: row.name,
            handle: row.handle,
            personality: row.personality,
            character: row.character,
            language_style: row.language_style,
            is_active: row.is_active,
            tweets_per_day: row.tweets_per_day.max(1) as u32,
            timezone: row.timezone,
            window,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = agents)]
struct NewAgentRow<'a> {
    id: Uuid,
    name: &'a str,
    handle: &'a str,
    personality: &'a str,
    character: &'a str,
    language_style: &'a str,
    is_active: bool,
    tweets_per_day: i32,
    timezone: &'a str,
    post_24_hours: bool,
    posting_start_hour: i32,
    posting_end_hour: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = style_profiles)]
struct StyleProfileRow {
    id: Uuid,
    agent_id: Uuid,
    writing_patterns: serde_json::Value,
    training_sample_count: i32,
    last_updated: DateTime<Utc>,
}

impl From<StyleProfileRow> for StyleProfile {
    fn from(row: StyleProfileRow) -> Self {
        StyleProfile {
            id: row.id,
            agent_id: row.agent_id,
            patterns: WritingPatterns::from_stored(row.writing_patterns),
            training_sample_count: row.training_sample_count,
            last_updated: row.last_updated,
        }
    }
}

impl From<&StyleProfile> for StyleProfileRow {
    fn from(profile: &StyleProfile) -> Self {
        StyleProfileRow {
            id: profile.id,
            agent_id: profile.agent_id,
            writing_patterns: profile.patterns.to_stored(),
            training_sample_count: profile.training_sample_count,
            last_updated: profile.last_updated,
        }
    }
}

#[derive(Queryable, Selectable, QueryableByName, Debug)]
#[diesel(table_name = post_records)]
struct PostRow {
    id: Uuid,
    agent_id: Uuid,
    content: String,
    status: String,
    error: Option<String>,
    likes: Option<i32>,
    reposts: Option<i32>,
    replies: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for PostRecord {
    type Error = MimicError;

    fn try_from(row: PostRow) -> Result<Self> {
        let engagement = if row.likes.is_some() || row.reposts.is_some() || row.replies.is_some()
        {
            Some(Engagement {
                likes: row.likes.unwrap_or(0),
                reposts: row.reposts.unwrap_or(0),
                replies: row.replies.unwrap_or(0),
            })
        } else {
            None
        };

        Ok(PostRecord {
            id: row.id,
            agent_id: row.agent_id,
            content: row.content,
            status: row.status.parse::<PostStatus>()?,
            error: row.error,
            engagement,
            created_at: row.created_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = post_records)]
struct NewPostRow<'a> {
    id: Uuid,
    agent_id: Uuid,
    content: &'a str,
    status: &'a str,
    error: Option<&'a str>,
    created_at: DateTime<Utc>,
}

// ============================================================================
// Store
// ============================================================================

fn map_query_error(e: DieselError) -> MimicError {
    match e {
        DieselError::DatabaseError(
            kind @ (DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand),
            info,
        ) => MimicError::Connectivity(format!("{:?}: {}", kind, info.message())),
        DieselError::BrokenTransactionManager => {
            MimicError::Connectivity("broken transaction manager".to_string())
        }
        other => MimicError::Storage(other.to_string()),
    }
}

/// PostgreSQL-backed store. Starts disconnected; call `connect` first.
pub struct PgStore {
    database_url: String,
    conn: Mutex<Option<PgConnection>>,
}

impl PgStore {
    pub fn new(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            conn: Mutex::new(None),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut PgConnection) -> std::result::Result<T, DieselError>,
    ) -> Result<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| MimicError::Storage(format!("Lock error: {}", e)))?;
        let conn = guard
            .as_mut()
            .ok_or_else(|| MimicError::Connectivity("not connected".to_string()))?;
        f(conn).map_err(map_query_error)
    }
}

impl Store for PgStore {
    fn connect(&self) -> Result<()> {
        let conn = PgConnection::establish(&self.database_url)
            .map_err(|e| MimicError::Connectivity(e.to_string()))?;
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| MimicError::Storage(format!("Lock error: {}", e)))?;
        *guard = Some(conn);
        info!("Connected to database");
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| MimicError::Storage(format!("Lock error: {}", e)))?;
        if guard.take().is_some() {
            info!("Disconnected from database");
        }
        Ok(())
    }

    fn create_agent(&self, agent: NewAgent) -> Result<Agent> {
        agent.validate()?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        let (post_24_hours, start, end) = match agent.window {
            PostingWindow::Anytime => (true, 0, 23),
            PostingWindow::Hours { start, end } => (false, start as i32, end as i32),
        };
        let row = NewAgentRow {
            id,
            name: &agent.name,
            handle: &agent.handle,
            personality: &agent.personality,
            character: &agent.character,
            language_style: &agent.language_style,
            is_active: agent.is_active,
            tweets_per_day: agent.tweets_per_day as i32,
            timezone: &agent.timezone,
            post_24_hours,
            posting_start_hour: start,
            posting_end_hour: end,
            created_at: now,
            updated_at: now,
        };
        let profile = StyleProfileRow::from(&StyleProfile::new_default(id));

        self.with_conn(|conn| {
            conn.transaction::<_, DieselError, _>(|conn| {
                diesel::insert_into(agents::table)
                    .values(&row)
                    .execute(conn)?;
                diesel::insert_into(style_profiles::table)
                    .values(&profile)
                    .execute(conn)?;
                Ok(())
            })
        })?;

        debug!("Created agent {} with default style profile", id);

        Ok(Agent {
            id,
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
        })
    }

    fn get_agent(&self, agent_id: Uuid) -> Result<Option<Agent>> {
        let row: Option<AgentRow> = self.with_conn(|conn| {
            agents::table
                .filter(agents::id.eq(agent_id))
                .select(AgentRow::as_select())
                .first(conn)
                .optional()
        })?;

        row.map(Agent::try_from).transpose()
    }

    fn active_agents_with_last_post(&self) -> Result<Vec<AgentWithLastPost>> {
        let (agent_rows, post_rows) = self.with_conn(|conn| {
            let agent_rows: Vec<AgentRow> = agents::table
                .filter(agents::is_active.eq(true))
                .order(agents::created_at.asc())
                .select(AgentRow::as_select())
                .load(conn)?;

            let ids: Vec<Uuid> = agent_rows.iter().map(|a| a.id).collect();
            if ids.is_empty() {
                return Ok((agent_rows, Vec::new()));
            }

            let post_rows: Vec<PostRow> = diesel::sql_query(
                "SELECT DISTINCT ON (agent_id) \
                 id, agent_id, content, status, error, likes, reposts, replies, created_at \
                 FROM post_records WHERE agent_id = ANY($1) \
                 ORDER BY agent_id, created_at DESC",
            )
            .bind::<Array<DieselUuid>, _>(ids)
            .load(conn)?;

            Ok((agent_rows, post_rows))
        })?;

        let mut last_posts: HashMap<Uuid, PostRecord> = HashMap::with_capacity(post_rows.len());
        for row in post_rows {
            let post = PostRecord::try_from(row)?;
            last_posts.insert(post.agent_id, post);
        }

        agent_rows
            .into_iter()
            .map(|row| {
                let agent = Agent::try_from(row)?;
                let last_post = last_posts.remove(&agent.id);
                Ok(AgentWithLastPost { agent, last_post })
            })
            .collect()
    }

    fn get_style_profile(&self, agent_id: Uuid) -> Result<Option<StyleProfile>> {
        let row: Option<StyleProfileRow> = self.with_conn(|conn| {
            style_profiles::table
                .filter(style_profiles::agent_id.eq(agent_id))
                .select(StyleProfileRow::as_select())
                .first(conn)
                .optional()
        })?;

        Ok(row.map(StyleProfile::from))
    }

    fn insert_style_profile(&self, profile: &StyleProfile) -> Result<()> {
        let row = StyleProfileRow::from(profile);
        self.with_conn(|conn| {
            diesel::insert_into(style_profiles::table)
                .values(&row)
                .execute(conn)
        })?;
        Ok(())
    }

    fn update_style_profile(&self, profile: &StyleProfile) -> Result<()> {
        let patterns = profile.patterns.to_stored();
        let updated = self.with_conn(|conn| {
            diesel::update(style_profiles::table)
                .filter(style_profiles::agent_id.eq(profile.agent_id))
                .set((
                    style_profiles::writing_patterns.eq(&patterns),
                    style_profiles::training_sample_count.eq(profile.training_sample_count),
                    style_profiles::last_updated.eq(profile.last_updated),
                ))
                .execute(conn)
        })?;

        if updated == 0 {
            return Err(MimicError::profile_not_found(profile.agent_id));
        }
        Ok(())
    }

    fn append_post(&self, post: NewPostRecord) -> Result<PostRecord> {
        let id = Uuid::new_v4();
        let row = NewPostRow {
            id,
            agent_id: post.agent_id,
            content: &post.content,
            status: post.status.as_str(),
            error: post.error.as_deref(),
            created_at: post.created_at,
        };

        self.with_conn(|conn| {
            diesel::insert_into(post_records::table)
                .values(&row)
                .execute(conn)
        })?;

        Ok(PostRecord {
            id,
            agent_id: post.agent_id,
            content: post.content,
            status: post.status,
            error: post.error,
            engagement: None,
            created_at: post.created_at,
        })
    }

    fn recent_posts(&self, agent_id: Uuid, limit: i64) -> Result<Vec<PostRecord>> {
        let rows: Vec<PostRow> = self.with_conn(|conn| {
            post_records::table
                .filter(post_records::agent_id.eq(agent_id))
                .order(post_records::created_at.desc())
                .limit(limit)
                .select(PostRow::as_select())
                .load(conn)
        })?;

        rows.into_iter().map(PostRecord::try_from).collect()
    }
}

impl SampleSource for PgStore {
    fn recent_samples(&self, handle: &str, limit: i64) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            writing_samples::table
                .filter(writing_samples::handle.eq(handle))
                .order(writing_samples::created_at.desc())
                .limit(limit)
                .select(writing_samples::content)
                .load(conn)
        })
    }
}
