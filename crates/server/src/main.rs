mod bootstrap;
mod docs;
mod error;
mod health;
mod payload;
mod products;
mod routes;

use std::{future::IntoFuture, sync::Arc, time::Duration};

use anyhow::Result;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vitrine_core::config::{AppConfig, LoadOptions};
use vitrine_db::repositories::{ProductRepository, SqlProductRepository};

fn init_logging(config: &AppConfig) {
    use vitrine_core::config::LogFormat::*;

    // RUST_LOG, when set, wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // A missing .env file is fine; the process environment still applies.
    let _ = dotenvy::dotenv();

    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let address = app.config.server.listen_address();
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);

    let products: Arc<dyn ProductRepository> =
        Arc::new(SqlProductRepository::new(app.db_pool.clone()));
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        bind_address = %address,
        "product API listening"
    );

    let shutdown = Arc::new(Notify::new());
    let signal = Arc::clone(&shutdown);
    let server = axum::serve(listener, routes::app(products, app.db_pool.clone()))
        .with_graceful_shutdown(async move { signal.notified().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        () = wait_for_shutdown() => {
            info!(
                event_name = "system.server.stopping",
                grace_secs = grace.as_secs(),
                "draining in-flight requests"
            );
            shutdown.notify_one();
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    event_name = "system.server.drain_timeout",
                    "in-flight requests still running after grace period"
                ),
            }
        }
    }

    app.db_pool.close().await;
    info!(event_name = "system.server.stopped", "product API stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(
            event_name = "system.server.signal_error",
            error = %error,
            "could not listen for ctrl-c, shutting down"
        );
    }
}
