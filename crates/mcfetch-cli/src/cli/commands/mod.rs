//! CLI command handlers. Each command is in its own file.

mod checksum;
mod download;
mod hosts;
mod token;

pub use checksum::run_checksum;
pub use download::{run_download, run_download_all};
pub use hosts::{host_filter, run_hosts};
pub use token::run_token;
