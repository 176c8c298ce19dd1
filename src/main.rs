use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use wingo::cli::{self, Cli, Commands};
use wingo::config::AppConfig;
use wingo::logging::{init_logging, init_logging_simple};
use wingo::persistence::FileStore;
use wingo::services::{AppState, DrawPoller, HealthState, HttpServer, Metrics};
use wingo::WingoFeedClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;

    match &cli.command {
        None | Some(Commands::Run) => {
            init_logging(&config.logging);
            run_service(config).await?;
        }
        Some(Commands::Fetch { limit, json }) => {
            init_logging_simple();
            cli::fetch_draws(&config, *limit, *json).await?;
        }
        Some(Commands::Predict { json }) => {
            init_logging_simple();
            cli::predict_from_history(&config, *json)?;
        }
        Some(Commands::History { limit, json }) => {
            init_logging_simple();
            cli::show_history(&config, *limit, *json)?;
        }
        Some(Commands::Config) => {
            cli::show_config(&config)?;
        }
    }

    Ok(())
}

async fn run_service(config: AppConfig) -> anyhow::Result<()> {
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("config: {}", e);
        }
        anyhow::bail!("invalid configuration ({} problems)", errors.len());
    }

    let metrics = Arc::new(Metrics::new());
    // Three missed polls' worth of silence, never below the fetch timeout
    let staleness = (config.poller.interval_ms.max(config.poller.backoff_ms) * 3 / 1000)
        .max(config.feed.timeout_secs * 2);
    let health = Arc::new(HealthState::new().with_staleness_threshold(staleness));

    let feed = Arc::new(WingoFeedClient::new(&config.feed)?);
    let store = Arc::new(FileStore::new(&config.history.path));
    info!(
        feed = %feed.url(),
        history = %store.path().display(),
        capacity = config.history.capacity,
        "starting wingo"
    );

    let poller = DrawPoller::new(&config, feed, store, metrics.clone(), health.clone());
    let server = HttpServer::new(
        AppState {
            snapshot: poller.subscribe(),
            health,
            metrics,
        },
        &config.server.host,
        config.server.port,
    )?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut poller_task = tokio::spawn(poller.run(shutdown_rx));
    let mut server_task = tokio::spawn(server.run());

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        r = &mut server_task => {
            match r {
                Ok(Err(e)) => error!("HTTP server stopped: {}", e),
                Err(e) => error!("HTTP server task panicked: {}", e),
                Ok(Ok(())) => warn!("HTTP server exited"),
            }
        }
        r = &mut poller_task => {
            if let Err(e) = r {
                error!("Poller task panicked: {}", e);
            }
        }
    }

    let _ = shutdown_tx.send(true);
    if !poller_task.is_finished() {
        if let Err(e) = poller_task.await {
            warn!("Poller task ended abnormally: {}", e);
        }
    }
    server_task.abort();

    info!("wingo stopped");
    Ok(())
}
