use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod repository;
pub mod service;
pub mod state;
#[cfg(test)]
mod test_support;

use config::Config;
use engine::{ContainerEngine, PodmanEngine};
use repository::{JobRepository, PgJobRepository};
use service::{Deployer, Teardown};
use state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quartz_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quartz Orchestrator...");

    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Invalid configuration");

    tracing::info!("Connecting to database...");

    // Create database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Database connection pool created");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let podman = PodmanEngine::new(
        config.engine_binary.clone(),
        config.engine_timeout,
        config.template.recipe.clone(),
    );
    podman
        .check_available()
        .await
        .expect("Container engine is not available");

    if let Err(e) = config.template.check_assets().await {
        tracing::warn!("{}; every deployment will fail until it is fixed", e);
    }

    tokio::fs::create_dir_all(&config.staging_dir)
        .await
        .expect("Failed to create staging directory");

    let engine: Arc<dyn ContainerEngine> = Arc::new(podman);
    let jobs: Arc<dyn JobRepository> = Arc::new(PgJobRepository::new(pool));
    let teardown = Arc::new(Teardown::new(engine.clone(), jobs.clone()));
    let deployer = Arc::new(Deployer::new(
        engine,
        jobs.clone(),
        teardown.clone(),
        config.staging_dir.clone(),
        config.template.clone(),
    ));

    let state = AppState {
        deployer,
        teardown,
        jobs,
    };

    // Build router with all API endpoints
    let app = api::create_router(state, config.max_upload_bytes);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
