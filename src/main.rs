//! `freight-quote` service binary.

use anyhow::Context;
use freight_quote::api::rest::create_router;
use freight_quote::bootstrap::{self, Stores};
use freight_quote::config::AppConfig;
use freight_quote::infrastructure::notifications::{ChannelOutbox, OutboxWorker};
use freight_quote::telemetry;
use std::sync::Arc;
use std::time::Duration;

/// Time the outbox gets to drain on shutdown.
const OUTBOX_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    telemetry::init_tracing(&config.logging)?;

    let stores = Stores::in_memory();
    let registry = bootstrap::provider_registry(&config, Arc::clone(&stores.contracts));

    let sender = bootstrap::email_sender(&config).context("building e-mail sender")?;
    let (outbox, receiver) = ChannelOutbox::new(config.email.outbox_capacity);
    let worker = OutboxWorker::new(receiver, sender, config.email.retry_policy()).spawn();

    let state = bootstrap::app_state(&config, stores, registry, Arc::new(outbox));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("binding {}", config.server.bind_address))?;
    tracing::info!(
        address = %config.server.bind_address,
        payment_policy = %config.payments.confirmation_policy,
        email_mode = ?config.email.mode,
        "freight-quote listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    // The router owned the last outbox sender; the worker stops once drained.
    match tokio::time::timeout(OUTBOX_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("outbox drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "outbox worker failed"),
        Err(_) => tracing::warn!("outbox not drained before shutdown"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
