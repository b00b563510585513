//! gitmaxer daemon — sweeps active profiles on an interval and tops each
//! user's repository up to their daily contribution minimum.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use gm_content::GeminiGenerator;
use gm_core::config::Config;
use gm_core::store::SqliteStore;

mod sweep;

use sweep::SweepRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_err) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    if config.general.log_json {
        gm_telemetry::init_logging_json("gm-daemon", &config.general.log_level);
    } else {
        gm_telemetry::init_logging("gm-daemon", &config.general.log_level);
    }

    if let Some(err) = config_err {
        warn!(error = %err, "failed to load config, using defaults");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "gitmaxer daemon starting");

    // Ensure the data directory exists, expanding ~ in the db path.
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    std::fs::create_dir_all(std::path::Path::new(&home).join(".gitmaxer")).ok();

    let mut db_path = config.general.db_path.clone();
    if db_path.starts_with("~/") {
        db_path = db_path.replacen('~', &home, 1);
    }

    let store = Arc::new(
        SqliteStore::new(&db_path)
            .await
            .with_context(|| format!("failed to open database at {db_path}"))?,
    );

    let gemini = std::env::var(&config.generators.gemini_key_env)
        .ok()
        .filter(|key| !key.is_empty())
        .map(|key| {
            Arc::new(
                GeminiGenerator::new(key)
                    .with_base_url(config.generators.gemini_api_base.clone())
                    .with_models(config.generators.gemini_models.clone()),
            )
        });
    if gemini.is_none() {
        info!(
            key_env = %config.generators.gemini_key_env,
            "no Gemini key in environment, AI generation disabled"
        );
    }

    let sweep_interval = Duration::from_secs(config.reconciler.sweep_interval_secs);
    let runner = SweepRunner::new(store, Arc::new(config), gemini);

    let mut interval = tokio::time::interval(sweep_interval);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            _ = interval.tick() => {
                if let Err(err) = runner.run_sweep().await {
                    warn!(error = %err, "sweep failed");
                }
            }
        }
    }

    info!("gitmaxer daemon stopped");
    Ok(())
}
