mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_core::{
    load_config, validate_config, CompositeCoordinator, HttpInstanceStorage, HttpItemStorage,
    HttpReferenceResolver, IngestPipeline, InstanceStorage, ItemStorage, JobStore,
    ReferenceResolver,
};

use api::create_router;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("INVENTORY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Storage base URL: {}", config.storage.base_url);

    let request_timeout = Duration::from_secs(config.storage.request_timeout_secs);
    let lookup_timeout = Duration::from_secs(config.storage.lookup_timeout_secs);

    // Storage and reference clients
    let items: Arc<dyn ItemStorage> = Arc::new(
        HttpItemStorage::new(request_timeout).context("Failed to create item storage client")?,
    );
    let instances: Arc<dyn InstanceStorage> = Arc::new(
        HttpInstanceStorage::new(request_timeout)
            .context("Failed to create instance storage client")?,
    );
    let resolver: Arc<dyn ReferenceResolver> = Arc::new(
        HttpReferenceResolver::new(request_timeout)
            .context("Failed to create reference resolver")?,
    );

    let coordinator = CompositeCoordinator::new(Arc::clone(&resolver), lookup_timeout);

    // Background ingest pipeline
    let store = Arc::new(JobStore::new());
    let pipeline = Arc::new(IngestPipeline::start(
        Arc::clone(&store),
        Arc::clone(&items),
        Arc::clone(&instances),
        Arc::clone(&resolver),
        config.ingest.clone(),
    ));
    info!("Ingest pipeline started");

    let state = Arc::new(AppState::new(
        config.clone(),
        items,
        instances,
        coordinator,
        Arc::clone(&pipeline),
    ));

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    pipeline.stop().await;
    info!("Ingest pipeline stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
