//! Access to the orchestration v1 API.
//!
//! Provisioning logic only depends on the [`RancherApi`] trait; [`CurlApi`]
//! is the blocking libcurl implementation bound to one base URL and one
//! credential.

mod client;
mod parse;
pub mod schema;

pub use client::{ApiOptions, CurlApi};
pub use parse::ResponseHead;
pub use schema::{ConfigArchive, Host, RegistrationToken};

use crate::error::Result;

/// State a registration token reports until the server has finished creating it.
pub const STATE_REGISTERING: &str = "registering";

/// Operations the provisioning flow needs from the remote API.
pub trait RancherApi {
    /// `POST /v1/projects/{project_id}/registrationTokens` with `{"name": name}`.
    fn create_registration_token(&self, project_id: &str, name: &str)
        -> Result<RegistrationToken>;

    /// `GET /v1/registrationTokens`.
    fn list_registration_tokens(&self) -> Result<Vec<RegistrationToken>>;

    /// `GET /v1/hosts`. No pagination: the endpoint returns the full set.
    fn list_hosts(&self) -> Result<Vec<Host>>;

    /// `GET /v1/projects/{project_id}/machines/{host_id}/config?token=..&projectId=..`.
    fn fetch_machine_config(
        &self,
        project_id: &str,
        host_id: &str,
        token: &str,
    ) -> Result<ConfigArchive>;
}

impl<A: RancherApi + ?Sized> RancherApi for &A {
    fn create_registration_token(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<RegistrationToken> {
        (**self).create_registration_token(project_id, name)
    }

    fn list_registration_tokens(&self) -> Result<Vec<RegistrationToken>> {
        (**self).list_registration_tokens()
    }

    fn list_hosts(&self) -> Result<Vec<Host>> {
        (**self).list_hosts()
    }

    fn fetch_machine_config(
        &self,
        project_id: &str,
        host_id: &str,
        token: &str,
    ) -> Result<ConfigArchive> {
        (**self).fetch_machine_config(project_id, host_id, token)
    }
}
