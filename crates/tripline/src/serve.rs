// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` command: the long-running report bot.
//!
//! Wires the Telegram channel, the LLM extraction backend, the
//! lazily-connected MongoDB trip store, and the dialogue engine together,
//! then drives the agent loop until a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use tracing::{error, info, warn};

use tripline_agent::{shutdown, AgentLoop, DialogueEngine, ReportOrchestrator};
use tripline_config::model::TriplineConfig;
use tripline_core::error::TriplineError;
use tripline_core::traits::ReportChannel;
use tripline_extract::{IntentExtractor, LlmClient, PeriodResolver};
use tripline_report::ReportEngine;
use tripline_store::{MongoTripStore, StoreHandle};
use tripline_telegram::TelegramChannel;

/// Brings every subsystem up from the validated config and enters the
/// agent loop. Returns once a shutdown signal lands or the channel closes.
pub async fn run_serve(config: TriplineConfig) -> Result<(), TriplineError> {
    init_tracing(&config.agent.log_level);

    info!("starting tripline serve");

    let tz: Tz = config.report.timezone.parse().map_err(|_| {
        TriplineError::Config(format!("unknown timezone '{}'", config.report.timezone))
    })?;

    // Make sure generated workbooks have somewhere to land.
    tokio::fs::create_dir_all(&config.report.output_dir)
        .await
        .map_err(|e| TriplineError::Report {
            message: format!("cannot create report output dir {}", config.report.output_dir),
            source: Some(Box::new(e)),
        })?;
    info!(
        categories = config.report.categories.len(),
        areas = config.report.areas.len(),
        timezone = %tz,
        output_dir = config.report.output_dir.as_str(),
        "report catalog loaded"
    );

    // Trip store: a lazily-connected handle, torn down when idle.
    let connection_string = config.store.connection_string.clone().ok_or_else(|| {
        eprintln!(
            "error: MongoDB connection string required. Set store.connection_string in tripline.toml or TRIPLINE_STORE_CONNECTION_STRING."
        );
        TriplineError::Config("store.connection_string is required".into())
    })?;
    let store_handle = Arc::new(StoreHandle::new(
        connection_string,
        config.store.max_workers,
        Duration::from_secs(config.store.idle_timeout_secs),
    ));
    let trip_store = Arc::new(MongoTripStore::new(store_handle.clone(), tz));
    let report_engine = ReportEngine::new(trip_store, config.store.max_workers);
    info!(
        max_workers = config.store.max_workers,
        idle_timeout_secs = config.store.idle_timeout_secs,
        "trip store handle ready"
    );

    // LLM extraction backend, shared by intent and period prompts.
    let api_key = config.extractor.api_key.clone().ok_or_else(|| {
        eprintln!(
            "error: extractor API key required. Set extractor.api_key in tripline.toml or TRIPLINE_EXTRACTOR_API_KEY."
        );
        TriplineError::Config("extractor.api_key is required".into())
    })?;
    let llm = Arc::new(
        LlmClient::new(&api_key, &config.extractor.base_url, &config.extractor.model).map_err(
            |e| {
                error!(error = %e, "failed to initialize extraction backend");
                e
            },
        )?,
    );
    let extractor = IntentExtractor::new(
        llm.clone(),
        &config.report.categories,
        &config.report.areas,
    );
    let resolver = PeriodResolver::new(llm, tz);
    info!(
        model = config.extractor.model.as_str(),
        "extraction backend ready"
    );

    // Telegram channel. Connect while still owned mutably, then share.
    let mut telegram = TelegramChannel::new(config.telegram.clone()).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram channel");
        eprintln!(
            "error: Telegram bot token required. Set telegram.bot_token in tripline.toml or TRIPLINE_TELEGRAM_BOT_TOKEN."
        );
        e
    })?;
    telegram.connect().await?;
    let channel: Arc<dyn ReportChannel> = Arc::new(telegram);
    info!(
        allowed_chats = config.telegram.allowed_chats.len(),
        "telegram channel connected"
    );

    // Dialogue engine over the report orchestrator.
    let orchestrator = ReportOrchestrator::new(
        report_engine,
        channel.clone(),
        config.report.categories.clone(),
        config.report.areas.clone(),
        PathBuf::from(&config.report.output_dir),
    );
    let engine = DialogueEngine::new(
        extractor,
        resolver,
        orchestrator,
        channel.clone(),
        config.report.categories.clone(),
        config.report.areas.clone(),
        Duration::from_secs(config.agent.dialogue_timeout_secs),
        tz,
    );

    let cancel = shutdown::install_signal_handler();

    // The idle watcher also force-closes the store client on shutdown.
    let watcher = store_handle.spawn_idle_watcher(cancel.clone());

    let mut agent_loop = AgentLoop::new(channel.clone(), engine);
    agent_loop.run(cancel.clone()).await?;

    // The loop can also end on a closed channel; make sure the watcher stops.
    cancel.cancel();
    if let Err(e) = watcher.await {
        warn!(error = %e, "store idle watcher did not shut down cleanly");
    }
    if let Err(e) = channel.disconnect().await {
        warn!(error = %e, "telegram disconnect failed");
    }

    info!("tripline serve shutdown complete");
    Ok(())
}

/// Tracing subscriber honoring `RUST_LOG` over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // One bare prefix directive covers every tripline_* crate target.
    let default = format!("tripline={log_level},warn");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
