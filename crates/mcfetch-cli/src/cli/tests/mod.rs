//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::sync::Mutex;

/// Serializes tests that set `RANCHER_*` env vars.
pub(super) static ENV_LOCK: Mutex<()> = Mutex::new(());

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

pub(super) fn parse_cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}
