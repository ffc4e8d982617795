use anyhow::{Context, Result};
use std::time::Duration;

use crate::scheduler::SchedulerConfig;
use crate::training::DEFAULT_CHAR_BUDGET;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,

    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub analysis_model: String,
    pub generation_model: String,

    pub health_port: u16,

    pub scheduler_tick_secs: u64,
    pub scheduler_connect_attempts: u32,
    pub scheduler_retry_delay_secs: u64,
    pub scheduler_failure_backoff_secs: u64,

    /// Max characters of sample text per analysis call
    pub analysis_char_budget: usize,
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .ok()
            .with_context(|| format!("{} must be a valid number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,

            llm_api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            llm_api_key: std::env::var("LLM_API_KEY").ok(),
            analysis_model: std::env::var("ANALYSIS_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            generation_model: std::env::var("GENERATION_MODEL").unwrap_or_else(|_| {
                std::env::var("ANALYSIS_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
            }),

            health_port: parsed("HEALTH_PORT", 8080)?,

            scheduler_tick_secs: parsed("SCHEDULER_TICK_SECS", 60)?,
            scheduler_connect_attempts: parsed("SCHEDULER_CONNECT_ATTEMPTS", 5)?,
            scheduler_retry_delay_secs: parsed("SCHEDULER_RETRY_DELAY_SECS", 5)?,
            scheduler_failure_backoff_secs: parsed("SCHEDULER_FAILURE_BACKOFF_SECS", 5)?,

            analysis_char_budget: parsed("ANALYSIS_CHAR_BUDGET", DEFAULT_CHAR_BUDGET)?,
        })
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_secs(self.scheduler_tick_secs.max(1)),
            connect_attempts: self.scheduler_connect_attempts.max(1),
            retry_delay: Duration::from_secs(self.scheduler_retry_delay_secs),
            failure_backoff: Duration::from_secs(self.scheduler_failure_backoff_secs),
        }
    }

    pub fn llm_api_key(&self) -> Result<&str> {
        self.llm_api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("LLM_API_KEY not set"))
    }
}
