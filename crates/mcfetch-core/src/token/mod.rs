//! Registration token provisioning.
//!
//! Creates a named registration token in a project, then polls the token
//! list until the server moves it out of `registering` and hands back the
//! token value.

mod cache;
mod name;
mod policy;

pub use cache::TokenCache;
pub use name::{generate_token_name, generate_token_name_with, TOKEN_NAME_LEN};
pub use policy::{PollDecision, PollPolicy};

use crate::api::{RancherApi, RegistrationToken};
use crate::error::{ProvisionError, Result};

/// State the server reports once a token is usable.
const STATE_ACTIVE: &str = "active";

/// Requests a registration token for `project_id` and waits until it is usable.
///
/// A random 8-hex-character name is generated when `token_name` is `None`.
/// Any state other than `registering` ends the poll and is treated as
/// success; states other than `active` are logged but not rejected.
pub fn acquire_token<A: RancherApi + ?Sized>(
    api: &A,
    project_id: &str,
    token_name: Option<&str>,
    policy: &PollPolicy,
) -> Result<String> {
    let name = match token_name {
        Some(n) => n.to_string(),
        None => generate_token_name(),
    };
    tracing::info!(project_id, token = %name, "requesting registration token");

    let created = api.create_registration_token(project_id, &name)?;
    if created.name != name {
        return Err(ProvisionError::UnexpectedResponse {
            requested: name,
            received: created.name,
        });
    }
    if !created.is_registering() {
        return Err(ProvisionError::Registration {
            name,
            state: created.state,
        });
    }

    let ready = poll_until_registered(api, &name, policy)?;
    if !ready.state.eq_ignore_ascii_case(STATE_ACTIVE) {
        tracing::warn!(
            token = %name,
            state = %ready.state,
            "registration token left registering in an unexpected state; using it anyway"
        );
    }

    let value = ready.token_value();
    if value.is_empty() {
        return Err(ProvisionError::EmptyToken { name });
    }
    tracing::info!(project_id, token = %name, "registration token ready");
    Ok(value.to_string())
}

/// Lists tokens until the entry named `name` is present and no longer
/// registering. An entry missing from the list counts as still registering.
fn poll_until_registered<A: RancherApi + ?Sized>(
    api: &A,
    name: &str,
    policy: &PollPolicy,
) -> Result<RegistrationToken> {
    let mut attempt = 1u32;
    loop {
        let found = api
            .list_registration_tokens()?
            .into_iter()
            .find(|t| t.name == name);
        match found {
            Some(t) if !t.is_registering() => return Ok(t),
            Some(_) => tracing::debug!(token = name, attempt, "still registering"),
            None => tracing::debug!(token = name, attempt, "not listed yet"),
        }

        match policy.decide(attempt) {
            PollDecision::GiveUp => {
                return Err(ProvisionError::PollExhausted {
                    name: name.to_string(),
                    attempts: attempt,
                })
            }
            PollDecision::PollAfter(delay) => {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                attempt = attempt.saturating_add(1);
            }
        }
    }
}
