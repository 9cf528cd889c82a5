//! FIQScore - unified CLI
//!
//! Serves the reference question endpoint or plays a game in the terminal.

#![warn(missing_docs)]

mod cli;
mod console;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use fiqscore::{GameConfig, HttpQuestionSupply, QuestionBank, SelectionForm, SessionController};
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fiqscore=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port, bank } => run_server(host, port, bank).await,
        Command::Play {
            config,
            supply_url,
            tournament,
            mix,
        } => run_console(config, supply_url, tournament, mix).await,
    }
}

/// Run the reference question endpoint
#[instrument]
async fn run_server(host: String, port: u16, bank: Option<PathBuf>) -> Result<()> {
    let bank = match bank {
        Some(path) => QuestionBank::from_file(&path)
            .with_context(|| format!("loading question bank {}", path.display()))?,
        None => QuestionBank::builtin(),
    };
    info!(questions = bank.len(), "Starting question endpoint");
    fiqscore::serve(&host, port, bank).await
}

/// Play in the terminal
#[instrument]
async fn run_console(
    config: Option<PathBuf>,
    supply_url: Option<String>,
    tournament: Option<String>,
    mix: Option<Vec<String>>,
) -> Result<()> {
    let config = match config {
        Some(path) => GameConfig::from_file(&path)?,
        None => GameConfig::default(),
    }
    .with_supply_url(supply_url.or_else(|| std::env::var("FIQSCORE_SUPPLY_URL").ok()));

    let form = match (tournament, mix) {
        (Some(name), _) => SelectionForm::single(name),
        (None, Some(pair)) => match pair.as_slice() {
            [first, second] => SelectionForm::custom(first.clone(), second.clone()),
            _ => SelectionForm::default(),
        },
        (None, None) => SelectionForm::default(),
    };

    match config.supply_url().clone() {
        Some(url) => {
            let (controller, expiries) =
                SessionController::new(HttpQuestionSupply::new(url), config)?;
            console::run(controller, expiries, form).await
        }
        None => {
            info!("No supply URL, using the built-in question bank");
            let (controller, expiries) =
                SessionController::new(QuestionBank::builtin(), config)?;
            console::run(controller, expiries, form).await
        }
    }
}
