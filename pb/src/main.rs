//! Planboard entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, warn};

use planboard::board;
use planboard::cli::Cli;
use planboard::config::Config;
use plansvc::{HttpPlannerClient, PlannerError, ProviderSlot, Session};

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("planboard")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to a log file, not stdout/stderr - the terminal belongs to the board
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("planboard.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // CLI flags override file configuration
    let mut board_config = config.board.clone();
    if cli.read_only {
        board_config.read_only = true;
    }
    if cli.target_plan.is_some() {
        board_config.target_plan_id = cli.target_plan.clone();
    }

    info!(
        "Planboard starting: base_url={}, read_only={}, target_plan={:?}",
        config.service.base_url, board_config.read_only, board_config.target_plan_id
    );

    // A missing token just means signed out: the board renders empty and
    // issues no network calls until a session appears in the slot
    let slot = match HttpPlannerClient::from_config(&config.service) {
        Ok(client) => ProviderSlot::with_session(Arc::new(Session::signed_in(Arc::new(client)))),
        Err(PlannerError::NotSignedIn) => {
            warn!("No credential in ${}; starting signed out", config.service.token_env);
            ProviderSlot::empty()
        }
        Err(e) => return Err(e).context("Failed to create planner client"),
    };

    board::run(slot, &board_config).await
}
