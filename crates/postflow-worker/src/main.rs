use std::time::Duration;

use postflow_core::WorkerConfig;
use postflow_db::PostRepository;
use postflow_engine::SchedulerService;
use postflow_worker::run_scheduling_sweep;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "postflow=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.base.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.base.db_timeout_seconds))
        .connect(&config.base.database_url)
        .await?;

    sqlx::migrate!("../postflow-db/migrations").run(&pool).await?;

    let scheduler = SchedulerService::new(pool.clone());
    let posts = PostRepository::new(pool);

    tracing::info!(
        tick_interval_secs = config.scheduler_tick_interval_secs,
        environment = %config.base.environment,
        "Starting scheduling worker"
    );

    let mut tick = tokio::time::interval(Duration::from_secs(config.scheduler_tick_interval_secs));
    loop {
        tick.tick().await;

        match run_scheduling_sweep(&scheduler, &posts, config.scheduler_max_conflict_retries).await
        {
            Ok(scheduled) => {
                tracing::info!(scheduled, "Scheduling sweep completed");
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduling sweep failed");
            }
        }
    }
}
