//! Order Engine Server Entry Point

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use order_engine_agent::OrderEngine;
use order_engine_config::{load_settings, PersistenceBackend, Settings};
use order_engine_persistence::PersistenceLayer;
use order_engine_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("ORDER_ENGINE_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        },
    };

    init_tracing(&config);

    tracing::info!("Starting Order Engine Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let store = init_persistence(&config).await?;
    let engine = Arc::new(
        OrderEngine::from_settings(&config, store).context("Failed to build order engine")?,
    );

    let mut state = AppState::new(config.clone(), engine.clone());
    if config.observability.metrics_enabled {
        let handle = init_metrics().context("Failed to install metrics recorder")?;
        state = state.with_metrics(handle);
        tracing::info!("Initialized Prometheus metrics at /metrics");
    }

    let purge = tokio::spawn(purge_loop(
        engine,
        Duration::from_secs(config.session.cleanup_interval_secs),
    ));

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.host))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn init_persistence(config: &Settings) -> anyhow::Result<PersistenceLayer> {
    match config.persistence.backend {
        PersistenceBackend::Memory => {
            tracing::info!("Using in-memory stores");
            Ok(PersistenceLayer::in_memory())
        },
        PersistenceBackend::File => {
            let store = PersistenceLayer::with_data_dir(&config.persistence.data_dir)
                .await
                .with_context(|| {
                    format!("Failed to open file stores in {}", config.persistence.data_dir)
                })?;
            tracing::info!(data_dir = %config.persistence.data_dir, "Using file stores");
            Ok(store)
        },
    }
}

/// Drop expired location options on a fixed interval
async fn purge_loop(engine: Arc<OrderEngine>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // first tick fires immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match engine.purge_expired().await {
            Ok(0) => {},
            Ok(purged) => tracing::debug!(purged, "Purged expired location options"),
            Err(e) => tracing::warn!(error = %e, "Scratch purge failed"),
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("order_engine={level},tower_http=debug").into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
