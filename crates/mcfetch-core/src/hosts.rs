//! Host enumeration with caller-supplied filtering.

use crate::api::{Host, RancherApi};
use crate::error::Result;

/// Fetches the full host list and keeps the hosts `predicate` accepts, in
/// server order.
pub fn list_hosts<A, P>(api: &A, mut predicate: P) -> Result<Vec<Host>>
where
    A: RancherApi + ?Sized,
    P: FnMut(&Host) -> bool,
{
    let hosts = api.list_hosts()?;
    let total = hosts.len();
    let kept: Vec<Host> = hosts.into_iter().filter(|h| predicate(h)).collect();
    tracing::debug!(total, kept = kept.len(), "listed hosts");
    Ok(kept)
}

/// Every host, unfiltered.
pub fn list_all_hosts<A: RancherApi + ?Sized>(api: &A) -> Result<Vec<Host>> {
    list_hosts(api, |_| true)
}

/// Accepts hosts in `project_id`.
pub fn in_project(project_id: &str) -> impl Fn(&Host) -> bool + '_ {
    move |h: &Host| h.project_id == project_id
}

/// Accepts hosts whose state equals `state`, ignoring case. Hosts without
/// a state never match.
pub fn in_state(state: &str) -> impl Fn(&Host) -> bool + '_ {
    move |h: &Host| {
        h.state
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(state))
    }
}
