use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use epistula_core::config;
use epistula_e2e::config::{DEFAULT_BASE_URL, DEFAULT_WORKERS, E2eConfig, default_state_file};
use epistula_e2e::state::StateFile;
use epistula_e2e::{E2eError, LOG_TARGET};
use epistula_util_error::WhateverResult;
use snafu::{FromString as _, ResultExt as _, Snafu, Whatever};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(transparent)]
    E2e { source: E2eError },
    #[snafu(display("Logging initialization failed"))]
    Logging { source: Whatever },
}

pub type CliResult<T> = std::result::Result<T, CliError>;

/// Epistula E2E harness - seeds a live backend and checks the rendered UI
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the UI under test
    #[arg(long, env = "EPISTULA_E2E_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Number of UI checks running at once
    #[arg(long, env = "EPISTULA_E2E_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Run the UI checks (needs a running UI)
    #[arg(long, env = "EPISTULA_E2E_UI")]
    pub ui: bool,

    /// Where setup leaves the session and the fixture for later steps
    #[arg(long, env = "EPISTULA_E2E_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Backend base URL [default: $NEXT_PUBLIC_BACKEND_URL, $BACKEND_URL or
    /// http://localhost:8000]
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Root account email [default: $NEXT_PUBLIC_ROOT_EMAIL,
    /// $EPISTULA_ROOT_EMAIL or root@localhost.localdomain]
    #[arg(long)]
    pub root_email: Option<String>,

    /// Root account password
    #[arg(long, env = "EPISTULA_ROOT_PASSWORD", hide_env_values = true)]
    pub root_password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in as root and seed the fixture
    Setup,
    /// Check the seeded deployment
    Run,
    /// Remove the fixture and the saved session
    Teardown,
    /// Setup, run and teardown in one go
    All,
}

impl Opts {
    fn config(&self) -> E2eConfig {
        E2eConfig {
            base_url: self.base_url.clone(),
            backend_url: self
                .backend_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or_else(config::backend_url_from_env),
            root_email: self
                .root_email
                .clone()
                .unwrap_or_else(config::root_email_from_env),
            root_password: self.root_password.clone(),
            workers: self.workers,
            ui_enabled: self.ui,
        }
    }

    fn state_file(&self) -> StateFile {
        StateFile::new(self.state_file.clone().unwrap_or_else(default_state_file))
    }
}

#[snafu::report]
#[tokio::main]
async fn main() -> CliResult<()> {
    init_logging().context(LoggingSnafu)?;

    let opts = Opts::parse();
    let config = opts.config();
    let state_file = opts.state_file();

    match opts.command {
        Command::Setup => {
            epistula_e2e::setup(&config, &state_file).await?;
        }
        Command::Run => {
            let reports = epistula_e2e::run(&config, &state_file).await?;
            info!(target: LOG_TARGET, passed = reports.len(), "All checks passed");
        }
        Command::Teardown => {
            epistula_e2e::teardown(&config, &state_file).await?;
        }
        Command::All => {
            epistula_e2e::setup(&config, &state_file).await?;
            let res = epistula_e2e::run(&config, &state_file).await;
            // Clean up even when checks fail
            epistula_e2e::teardown(&config, &state_file).await?;
            let reports = res?;
            info!(target: LOG_TARGET, passed = reports.len(), "All checks passed");
        }
    }

    Ok(())
}

fn init_logging() -> WhateverResult<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|_| Whatever::without_source("Failed to initialize logging".to_string()))?;

    Ok(())
}
