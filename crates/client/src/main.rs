//! `questrunner` binary.
//!
//! Runs a scenario file headlessly and logs every dispatcher decision.
//!
//! ```bash
//! cargo run -p quest-client -- crates/client/scenarios/demo.ron
//! RUST_LOG=runtime=debug cargo run -p quest-client -- --tick-ms 20 demo.ron
//! ```
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quest_client::{ClientConfig, Scenario, logging, run_scenario};

/// Run a quest scenario against the scripted world
#[derive(Parser, Debug)]
#[command(name = "questrunner", version, about, long_about = None)]
struct Cli {
    /// Scenario file (RON); overrides QUEST_SCENARIO
    scenario: Option<PathBuf>,

    /// Frame length in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Engine tunables (TOML)
    #[arg(long, env = "QUEST_ENGINE_CONFIG")]
    engine_config: Option<PathBuf>,

    /// Session identifier for the log directory
    #[arg(long)]
    session: Option<String>,

    /// Log directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut ClientConfig) {
        if let Some(scenario) = self.scenario {
            config.scenario = Some(scenario);
        }
        if let Some(millis) = self.tick_ms {
            config.tick = std::time::Duration::from_millis(millis.max(1));
        }
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = max_ticks.max(1);
        }
        if let Some(path) = self.engine_config {
            config.engine_config = Some(path);
        }
        if let Some(session) = self.session {
            config.session_id = Some(session);
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = Some(dir);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = ClientConfig::from_env();
    Cli::parse().apply(&mut config);

    let session_id = config
        .session_id
        .clone()
        .unwrap_or_else(logging::generate_session_id);
    let log_dir = config.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    let _guard = logging::setup_logging(&session_id, &log_dir)?;

    let scenario_path = config
        .scenario
        .clone()
        .context("no scenario given (pass a path or set QUEST_SCENARIO)")?;
    let scenario = Scenario::load_from_file(&scenario_path)?;
    let engine = config.load_engine_config()?;

    tracing::info!("Starting questrunner");
    tracing::info!("Scenario: {}", scenario_path.display());
    tracing::info!("Tick: {:?}, max ticks: {}", config.tick, config.max_ticks);

    let summary = run_scenario(scenario, engine, &config).await?;
    println!(
        "{}: {} after {} ticks ({:.1}s simulated)",
        scenario_path.display(),
        summary.state,
        summary.ticks,
        summary.elapsed.as_secs_f32()
    );
    Ok(())
}
