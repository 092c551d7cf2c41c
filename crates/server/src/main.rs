use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hirewire_core::{
    load_config, validate_config, Assistant, AssistantBackend, CachedCatalog, FreelancerCatalog,
    HttpAssistantBackend, HttpCatalogClient, ProbeConfig,
};
use hirewire_server::{
    api::create_router,
    state::{spawn_session_reaper, AppState},
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
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
    let config_path = std::env::var("HIREWIRE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        "HireWire {} configuration loaded (hash {})",
        VERSION,
        &config_hash[..16]
    );
    info!("Assistant backend: {}", config.assistant.base_url);
    info!("Catalog: {}", config.catalog.base_url);

    if config.assistant.dev_mode {
        warn!("Development mode: the assistant is reported available regardless of backend status");
    }

    // Create assistant backend
    let backend: Arc<dyn AssistantBackend> = Arc::new(
        HttpAssistantBackend::new(&config.assistant)
            .context("Failed to create assistant backend client")?,
    );

    // Create catalog client and cache
    let catalog_client: Arc<dyn FreelancerCatalog> = Arc::new(
        HttpCatalogClient::new(&config.catalog).context("Failed to create catalog client")?,
    );
    let catalog = CachedCatalog::new(catalog_client, config.catalog.refresh_interval());
    info!(
        "Catalog cache refresh interval: {}s",
        config.catalog.refresh_secs
    );

    let assistant = Arc::new(Assistant::new(
        backend,
        catalog,
        ProbeConfig {
            dev_mode: config.assistant.dev_mode,
        },
    ));

    // Create app state
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let idle_timeout = config.server.session_idle_timeout();
    let state = Arc::new(AppState::new(config, assistant));

    // Start idle session eviction
    match idle_timeout {
        Some(idle) => {
            let period = (idle / 4).max(Duration::from_secs(1));
            spawn_session_reaper(Arc::clone(&state), idle, period);
            info!("Chat sessions expire after {}s idle", idle.as_secs());
        }
        None => info!("Idle chat session eviction disabled"),
    }

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

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
