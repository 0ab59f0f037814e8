// ABOUTME: Pierre workout sync CLI uploading exported health store workouts to the backend
// ABOUTME: Wires the file-backed ledger, HTTP client, export source, and batch orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Upload every workout in an export
//! pierre-workout-sync upload --export workouts.json
//!
//! # Re-upload workouts that previously went up without heart rate
//! pierre-workout-sync upload --export workouts.json --retry-heart-rate
//!
//! # Upload a single workout, bypassing the ledger
//! pierre-workout-sync upload --export workouts.json --workout 3f2a... --force
//!
//! # Show which workouts the ledger knows about
//! pierre-workout-sync status
//!
//! # Forget all upload history (logout)
//! pierre-workout-sync clear
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use pierre_workout_sync::{
    batch::BatchUploadOrchestrator,
    client::{HttpUploadClient, UploadClient},
    clock::{Clock, SystemClock},
    config::SyncConfig,
    coordinator::UploadCoordinator,
    health::{HealthDataCollector, JsonExportSource},
    logging::LoggingConfig,
    models::UploadOptions,
    notifications::BroadcastNotificationBus,
    registry::TaskRegistry,
    store::{JsonFileStore, KeyValueStore},
    summary_cache::WorkoutSummaryCache,
    tracker::UploadTracker,
    validation::DataQualityValidator,
};

#[derive(Parser)]
#[command(
    name = "pierre-workout-sync",
    about = "Pierre workout upload pipeline",
    long_about = "Uploads device-recorded workouts exactly once, collecting and validating health channels first."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Ledger file override
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Upload workouts from a JSON export
    Upload {
        /// Export file produced from the health store
        #[arg(long)]
        export: PathBuf,

        /// Upload only this workout id
        #[arg(long)]
        workout: Option<String>,

        /// Re-upload even if the ledger says the workout is uploaded
        #[arg(long)]
        force: bool,

        /// Re-upload workouts previously uploaded without heart rate
        #[arg(long)]
        retry_heart_rate: bool,
    },

    /// Show the upload ledger
    Status,

    /// Clear upload history
    #[command(alias = "logout")]
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    let mut config = SyncConfig::from_env()?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn KeyValueStore> = Arc::new(
        JsonFileStore::open(&config.store_path)
            .await
            .with_context(|| format!("opening ledger {}", config.store_path.display()))?,
    );
    let tracker = UploadTracker::new(Arc::clone(&store), Arc::clone(&clock));
    let summaries = WorkoutSummaryCache::new(Arc::clone(&store));

    match cli.command {
        Command::Upload {
            export,
            workout,
            force,
            retry_heart_rate,
        } => {
            let source = Arc::new(
                JsonExportSource::load(&export)
                    .await
                    .with_context(|| format!("loading export {}", export.display()))?,
            );
            let workouts = source.workouts().to_vec();
            let client: Arc<dyn UploadClient> = Arc::new(HttpUploadClient::new(
                &config.transport.api_base_url,
                config.transport.api_token.clone(),
                config.transport.timeout,
                config.transport.connect_timeout,
            )?);

            let coordinator = UploadCoordinator::new(
                HealthDataCollector::new(source, Arc::clone(&clock), config.retry),
                DataQualityValidator::new(config.validation_mode),
                tracker,
                Arc::new(TaskRegistry::new()),
                client,
                Arc::clone(&clock),
            )
            .with_settling_delay(config.settling_delay)
            .with_summary_cache(summaries);

            if let Some(workout_id) = workout {
                let record = workouts
                    .iter()
                    .find(|candidate| candidate.id() == workout_id)
                    .with_context(|| format!("workout {workout_id} not found in export"))?;
                let outcome = coordinator
                    .upload_workout(record, UploadOptions { force })
                    .await?;
                println!(
                    "{}: {:?} (heart rate: {})",
                    outcome.workout_id, outcome.status, outcome.has_heart_rate
                );
                return Ok(());
            }

            let bus = Arc::new(BroadcastNotificationBus::new());
            let orchestrator = BatchUploadOrchestrator::new(
                coordinator,
                Arc::new(TaskRegistry::new()),
                bus,
                clock,
            )
            .with_pacing(config.batch_pacing)
            .with_notify_delay(config.notify_delay);

            let summary = orchestrator
                .upload_batch(workouts, force, retry_heart_rate)
                .await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Status => {
            let ids = tracker.uploaded_ids().await?;
            info!(count = ids.len(), "Upload ledger loaded");
            for id in ids {
                let heart_rate = tracker.has_heart_rate(&id).await;
                let uploaded_at = tracker
                    .uploaded_at(&id)
                    .await
                    .map_or_else(|| "unknown".to_owned(), |at| at.to_rfc3339());
                let source = summaries
                    .get(&id)
                    .await?
                    .and_then(|summary| summary.source)
                    .unwrap_or_else(|| "unknown".to_owned());
                println!("{id}  uploaded_at={uploaded_at}  heart_rate={heart_rate}  source={source}");
            }
        }
        Command::Clear => {
            tracker.clear().await?;
            let removed = summaries.clear().await?;
            println!("Cleared upload history ({removed} summaries)");
        }
    }

    Ok(())
}
