mod bootstrap;
mod health;
mod webhook;

use std::time::Duration;

use anyhow::Result;
use hembi_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use hembi_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config);

    spawn_sweep_task(&app);

    let router = webhook::router(webhook::WebhookState {
        processor: app.processor.clone(),
        verify_token: app.config.whatsapp.verify_token.clone(),
    })
    .merge(health::router(app.processor.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "hembi-server started"
    );

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "system.server.stopped", "hembi-server stopped");
    Ok(())
}

/// Fixed-interval expiry sweep, independent of any single conversation's
/// TTL, so no stale record outlives the TTL by more than one interval.
fn spawn_sweep_task(app: &bootstrap::App) {
    let processor = app.processor.clone();
    let interval = Duration::from_secs(app.config.conversation.sweep_interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately, skip it
        loop {
            ticker.tick().await;
            processor.engine().run_expiry_sweep();
        }
    });
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            error = %error,
            "could not listen for shutdown signal"
        );
    }
}
