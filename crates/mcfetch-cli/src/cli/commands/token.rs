//! `mcfetch token` – register a token for a project and print its value.

use anyhow::{Context, Result};
use mcfetch_core::{acquire_token, PollPolicy, RancherApi};

pub fn run_token<A: RancherApi + ?Sized>(
    api: &A,
    project: &str,
    name: Option<&str>,
    policy: &PollPolicy,
) -> Result<()> {
    let token = acquire_token(api, project, name, policy)
        .with_context(|| format!("acquiring registration token for project {project}"))?;
    println!("{token}");
    Ok(())
}
