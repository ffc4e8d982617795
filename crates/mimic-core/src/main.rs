use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mimic_core::{
    health, ChatGenerator, Config, GenerationCoordinator, PgStore, PostingScheduler, MIGRATIONS,
};
use mimic_tools::ChatClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mimic=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Mimic starting up...");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Configuration loaded");
    info!("  LLM API: {}", config.llm_api_url);
    info!("  Generation model: {}", config.generation_model);

    // Run database migrations first
    {
        use diesel::prelude::*;
        use diesel_migrations::MigrationHarness;

        let mut conn = diesel::PgConnection::establish(&config.database_url)
            .context("Failed to connect to database for migrations")?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
        info!("Database migrations applied");
    }

    let store = Arc::new(PgStore::new(&config.database_url));

    let client = ChatClient::new(&config.llm_api_url, config.llm_api_key()?)?;
    let generator = Arc::new(ChatGenerator::new(client, config.generation_model.clone()));
    let generation = Arc::new(GenerationCoordinator::new(store.clone(), generator));

    let scheduler = PostingScheduler::new(store, generation, config.scheduler_config());
    scheduler
        .start()
        .await
        .context("Posting scheduler could not reach the database")?;

    // Start HTTP health check server
    let health_router = health::router(scheduler.clone());
    let health_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.health_port))
        .await
        .with_context(|| format!("Failed to bind health port {}", config.health_port))?;
    let health_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(health_listener, health_router).await {
            error!("Health check server error: {}", e);
        }
    });
    info!("Health check server listening on port {}", config.health_port);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    if let Err(e) = scheduler.stop().await {
        error!("Error while stopping scheduler: {}", e);
    }
    health_handle.abort();
    info!("Mimic has shut down.");

    Ok(())
}
