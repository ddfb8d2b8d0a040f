use actix_web::{middleware::Logger, middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use blog_service::config::Config;
use blog_service::db::MIGRATOR;
use blog_service::handlers;
use blog_service::jobs::keywords::RedisKeywordQueue;
use blog_service::middleware::IdentityVerifier;
use blog_service::search::{wait_until_available, ElasticsearchIndex, SearchIndex};
use blog_service::storage::ObjectStore;
use blog_service::AppState;
use db_pool::create_pool;
use redis::aio::ConnectionManager;
use s3_utils::S3Client;
use std::sync::Arc;
use std::time::Duration;
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

/// Blog Service
///
/// HTTP API for posts, comments, favorites, media upload and search.
///
/// Startup order: configuration, PostgreSQL and migrations, Elasticsearch
/// (waits until it answers, then creates the index), object store bucket,
/// Redis keyword queue. Any failure along the way exits non-zero.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
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

    tracing::info!(
        "Starting blog-service v{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.app.env
    );

    let verifier = match config.auth.jwt_public_key_pem.as_deref() {
        Some(pem) => IdentityVerifier::from_rsa_pem(pem).context("Invalid JWT public key")?,
        None => {
            tracing::warn!("No JWT public key configured, every authenticated request will be rejected");
            IdentityVerifier::unconfigured()
        }
    };

    config.database.log_config();
    let db_pool = create_pool(config.database.clone())
        .await
        .context("Failed to create database pool")?;

    MIGRATOR
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let search = ElasticsearchIndex::new(
        &config.search.url,
        &config.search.index,
        &config.search.analyzer,
    )
    .context("Invalid Elasticsearch configuration")?;
    wait_until_available(
        &search,
        Duration::from_secs(config.search.wait_interval_secs),
        config.search.wait_attempts,
    )
    .await
    .context("Elasticsearch did not become available")?;
    search
        .ensure_index()
        .await
        .context("Failed to create search index")?;
    let search: Arc<dyn SearchIndex> = Arc::new(search);

    let objects = S3Client::with_config(config.storage.clone()).await.operations();
    ObjectStore::ensure_bucket(&objects)
        .await
        .context("Failed to prepare media bucket")?;
    let objects: Arc<dyn ObjectStore> = Arc::new(objects);

    let redis_client =
        redis::Client::open(config.queue.redis_url.as_str()).context("Invalid REDIS_URL")?;
    let redis = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;
    let keywords = Arc::new(RedisKeywordQueue::new(redis, config.queue.keyword_queue.clone()));

    let state = web::Data::new(AppState {
        db: db_pool.clone(),
        search,
        objects,
        keywords,
        media: config.media.clone(),
    });
    let verifier = web::Data::new(verifier);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(verifier.clone())
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    let result = tokio::select! {
        result = &mut server_task => result,
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            server_task.await
        }
    };

    db_pool.close().await;
    tracing::info!("Blog-service shut down");

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(anyhow::Error::new(e).context("HTTP server error")),
        Err(e) => Err(anyhow::Error::new(e).context("HTTP server task failed")),
    }
}
