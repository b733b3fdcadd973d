//! CLI for fetching machine config archives.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mcfetch_core::config::{self, McfetchConfig};
use mcfetch_core::credential::{ACCESS_KEY_ENV, SECRET_KEY_ENV};
use mcfetch_core::logging::{self, LogConfig, LogLevel};
use mcfetch_core::{Credential, CredentialProvider, CurlApi, StaticCredentials};
use std::path::PathBuf;

use commands::{run_checksum, run_download, run_download_all, run_hosts, run_token};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mcfetch")]
#[command(about = "Fetch machine provisioning config archives from a Rancher-style API", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Connection and logging options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// API root without `/v1`, e.g. https://rancher.example/api.
    #[arg(long, global = true, env = "RANCHER_URL", value_name = "URL")]
    pub url: Option<String>,

    /// API access key.
    #[arg(long, global = true, env = "RANCHER_ACCESS_KEY", value_name = "KEY")]
    pub access_key: Option<String>,

    /// API secret key.
    #[arg(
        long,
        global = true,
        env = "RANCHER_SECRET_KEY",
        hide_env_values = true,
        value_name = "SECRET"
    )]
    pub secret_key: Option<String>,

    /// Minimum level to log: error, warning, info, verbose, debug.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List hosts known to the API.
    Hosts {
        /// Only hosts in this project.
        #[arg(long)]
        project: Option<String>,
        /// Only hosts in this state (e.g. active).
        #[arg(long)]
        state: Option<String>,
    },

    /// Acquire a registration token for a project and print it.
    Token {
        /// Project identifier.
        #[arg(long)]
        project: String,
        /// Token name (default: 8 random hex characters).
        #[arg(long)]
        name: Option<String>,
    },

    /// Download config archives; each --host pairs with the --project at the same position.
    Download {
        /// Host identifier (repeatable).
        #[arg(long = "host", value_name = "HOST_ID", required = true)]
        hosts: Vec<String>,
        /// Project identifier (repeatable).
        #[arg(long = "project", value_name = "PROJECT_ID", required = true)]
        projects: Vec<String>,
        /// Directory to write archives into.
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// Download config archives for every listed host (optionally filtered).
    DownloadAll {
        /// Only hosts in this project.
        #[arg(long)]
        project: Option<String>,
        /// Only hosts in this state (e.g. active).
        #[arg(long)]
        state: Option<String>,
        /// Directory to write archives into.
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// Compute SHA-256 of a downloaded archive.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        init_logging(&cli.global, &cfg);
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Hosts { project, state } => {
                let api = connect(&cli.global, &cfg)?;
                run_hosts(&api, project.as_deref(), state.as_deref())?;
            }
            CliCommand::Token { project, name } => {
                let api = connect(&cli.global, &cfg)?;
                run_token(&api, &project, name.as_deref(), &cfg.poll_policy())?;
            }
            CliCommand::Download {
                hosts,
                projects,
                dest,
            } => {
                let dest = download_dir(dest, &cfg)?;
                let api = connect(&cli.global, &cfg)?;
                run_download(&api, &hosts, &projects, &dest, &cfg.poll_policy())?;
            }
            CliCommand::DownloadAll {
                project,
                state,
                dest,
            } => {
                let dest = download_dir(dest, &cfg)?;
                let api = connect(&cli.global, &cfg)?;
                run_download_all(
                    &api,
                    project.as_deref(),
                    state.as_deref(),
                    &dest,
                    &cfg.poll_policy(),
                )?;
            }
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

/// Command-line level beats the config file.
fn log_level(global: &GlobalArgs, cfg: &McfetchConfig) -> LogLevel {
    global.log_level.unwrap_or(cfg.log_level)
}

/// File logging falls back to stderr when the state dir is unusable.
fn init_logging(global: &GlobalArgs, cfg: &McfetchConfig) {
    let log_cfg = LogConfig::new(log_level(global, cfg));
    if cfg.log_to_file {
        if let Err(e) = logging::init_logging(&log_cfg) {
            logging::init_logging_stderr(&log_cfg);
            tracing::warn!("file logging unavailable, using stderr: {:#}", e);
        }
    } else {
        logging::init_logging_stderr(&log_cfg);
    }
}

/// Each key comes from its own flag, which clap fills from the matching
/// env var when the flag is absent.
fn credential_provider(global: &GlobalArgs) -> Result<StaticCredentials> {
    let username = global
        .access_key
        .clone()
        .with_context(|| format!("no access key: pass --access-key or set {ACCESS_KEY_ENV}"))?;
    let secret = global
        .secret_key
        .clone()
        .with_context(|| format!("no secret key: pass --secret-key or set {SECRET_KEY_ENV}"))?;
    Ok(StaticCredentials(Credential::new(username, secret)))
}

/// `--url` (or `RANCHER_URL`), then config `base_url`.
fn base_url(global: &GlobalArgs, cfg: &McfetchConfig) -> Result<String> {
    global
        .url
        .clone()
        .or_else(|| cfg.base_url.clone())
        .context("no API URL: pass --url, set RANCHER_URL, or set base_url in config.toml")
}

fn connect(global: &GlobalArgs, cfg: &McfetchConfig) -> Result<CurlApi> {
    let url = base_url(global, cfg)?;
    let credential = credential_provider(global)?
        .credential()
        .context("missing API credentials")?;
    let api = CurlApi::new(&url, credential, cfg.api_options())
        .with_context(|| format!("invalid API URL {url:?}"))?;
    tracing::debug!(url = %api.base_url(), "using API");
    Ok(api)
}

/// `--dest`, then config `download_dir`, then the working directory.
fn download_dir(dest: Option<PathBuf>, cfg: &McfetchConfig) -> Result<PathBuf> {
    match dest.or_else(|| cfg.download_dir.clone()) {
        Some(d) => Ok(d),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests;
