//! `mcfetch download` and `mcfetch download-all` – save machine config archives.

use anyhow::{Context, Result};
use mcfetch_core::{ConfigDownloader, DownloadedConfig, PollPolicy, RancherApi};
use std::path::Path;

use super::host_filter;

pub fn run_download<A: RancherApi + ?Sized>(
    api: &A,
    hosts: &[String],
    projects: &[String],
    dest: &Path,
    policy: &PollPolicy,
) -> Result<()> {
    let saved = ConfigDownloader::new(api, *policy)
        .download_configs(hosts, projects, dest)
        .with_context(|| format!("downloading machine configs into {}", dest.display()))?;
    print_saved(&saved);
    Ok(())
}

pub fn run_download_all<A: RancherApi + ?Sized>(
    api: &A,
    project: Option<&str>,
    state: Option<&str>,
    dest: &Path,
    policy: &PollPolicy,
) -> Result<()> {
    let saved = ConfigDownloader::new(api, *policy)
        .download_all(host_filter(project, state), dest)
        .with_context(|| format!("downloading machine configs into {}", dest.display()))?;
    if saved.is_empty() {
        println!("No matching hosts.");
    }
    print_saved(&saved);
    Ok(())
}

/// One `sha256  path` line per archive, like `sha256sum`.
fn print_saved(saved: &[DownloadedConfig]) {
    for d in saved {
        println!("{}  {}", d.sha256, d.path.display());
    }
}
