use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tracing::info;

mod config;
mod models;
mod parsers;
mod runner;
mod scrapers;
mod storage;
mod utils;
mod whatsapp;

use crate::config::Config;
use crate::models::EMOJI_WAIT;
use crate::runner::Runner;
use crate::scrapers::BocScraper;
use crate::storage::JsonFileStore;
use crate::whatsapp::TwilioNotifier;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("boc_monitor=info".parse()?),
        )
        .init();

    // Pick up a local .env when present
    dotenvy::dotenv().ok();

    info!("Starting BOC Monitor");

    // Fails fast on missing credentials, before the first pass runs
    let config = Arc::new(Config::load()?);

    let client = utils::http::create_client(&config.user_agent, config.http_timeout)?;

    let runner = Runner::new(
        config.clone(),
        client.clone(),
        Box::new(BocScraper::new(config.clone())),
        Arc::new(JsonFileStore::new(&config.memory_path)),
        Arc::new(TwilioNotifier::new(client, config.twilio.clone())),
    );

    if config.run_once {
        info!("Single run (test mode)");
        let report = runner.run_pass().await;
        info!(
            "Run finished: {} candidates, {} new, {} sent, {} failed",
            report.candidates, report.new, report.sent, report.failed
        );
        return Ok(());
    }

    info!(
        "Starting in loop mode (every {} seconds)",
        config.poll_interval.as_secs()
    );

    loop {
        info!(
            "--- Starting new pass at {} ---",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let report = runner.run_pass().await;

        info!(
            "Pass completed: {} candidates, {} new, {} sent, {} failed",
            report.candidates, report.new, report.sent, report.failed
        );
        info!(
            "{} Waiting {} seconds until the next pass",
            EMOJI_WAIT,
            config.poll_interval.as_secs()
        );

        tokio::time::sleep(config.poll_interval).await;
    }
}
