mod cli;

use crate::cli::CliCommand;

fn main() {
    // Parse CLI, set up logging from config + flags, dispatch.
    if let Err(err) = CliCommand::run_from_args() {
        tracing::error!("{:#}", err);
        eprintln!("mcfetch error: {:#}", err);
        std::process::exit(1);
    }
}
