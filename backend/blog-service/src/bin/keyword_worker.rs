//! Keyword extraction worker
//!
//! Pops keyword jobs from the Redis queue and stores the extracted keywords on
//! the post. Runs until SIGTERM or Ctrl+C; the job in flight is finished first.

use anyhow::Context;
use blog_service::config::Config;
use blog_service::jobs::keywords::KeywordWorker;
use db_pool::create_pool;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            std::process::exit(1);
        }
    };

    let db_pool = create_pool(config.database.clone())
        .await
        .context("Failed to create database pool")?;

    let redis_client =
        redis::Client::open(config.queue.redis_url.as_str()).context("Invalid REDIS_URL")?;
    let redis = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;

    let worker = KeywordWorker::new(
        db_pool.clone(),
        redis,
        config.queue.keyword_queue.clone(),
        Duration::from_secs(config.queue.poll_timeout_secs),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, finishing current job");
        let _ = shutdown_tx.send(true);
    });

    worker.run(shutdown_rx).await;

    db_pool.close().await;
    Ok(())
}
