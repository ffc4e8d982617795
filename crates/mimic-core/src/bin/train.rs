//! Retrain an agent's style profile from its stored writing samples.
//!
//! Usage:
//!   cargo run --bin mimic-train -- <agent-id>

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use mimic_core::{ChatAnalyzer, Config, PgStore, Store, TrainingCoordinator};
use mimic_tools::ChatClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mimic=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let agent_id: Uuid = args
        .get(1)
        .context("usage: mimic-train <agent-id>")?
        .parse()
        .context("agent id must be a UUID")?;

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let store = Arc::new(PgStore::new(&config.database_url));
    store.connect()?;

    let client = ChatClient::new(&config.llm_api_url, config.llm_api_key()?)?;
    let analyzer = Arc::new(ChatAnalyzer::new(client, config.analysis_model.clone()));
    let coordinator = TrainingCoordinator::new(store.clone(), analyzer)
        .with_sample_source(store.clone())
        .with_char_budget(config.analysis_char_budget);

    let result = coordinator.retrain_from_source(agent_id).await;
    store.disconnect()?;
    let profile = result?;

    info!(
        "Profile for agent {} now trained on {} samples",
        agent_id, profile.training_sample_count
    );
    Ok(())
}
