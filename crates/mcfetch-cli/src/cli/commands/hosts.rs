//! `mcfetch hosts` – list hosts known to the API.

use anyhow::Result;
use mcfetch_core::api::Host;
use mcfetch_core::{hosts, RancherApi};

/// Accepts hosts matching every filter given; no filters accepts all.
pub fn host_filter<'a>(
    project: Option<&'a str>,
    state: Option<&'a str>,
) -> impl Fn(&Host) -> bool + 'a {
    let by_project = project.map(|p| hosts::in_project(p));
    let by_state = state.map(|s| hosts::in_state(s));
    move |h: &Host| {
        by_project.as_ref().map_or(true, |f| f(h)) && by_state.as_ref().map_or(true, |f| f(h))
    }
}

pub fn run_hosts<A: RancherApi + ?Sized>(
    api: &A,
    project: Option<&str>,
    state: Option<&str>,
) -> Result<()> {
    let hosts = hosts::list_hosts(api, host_filter(project, state))?;
    if hosts.is_empty() {
        println!("No hosts found.");
        return Ok(());
    }
    println!("{:<12} {:<12} {:<14} {}", "ID", "PROJECT", "STATE", "NAME");
    for h in &hosts {
        println!(
            "{:<12} {:<12} {:<14} {}",
            h.id,
            h.project_id,
            h.state.as_deref().unwrap_or("-"),
            h.display_name()
        );
    }
    Ok(())
}
