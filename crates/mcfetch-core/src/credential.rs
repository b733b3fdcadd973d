//! API credentials and the providers that supply them.
//!
//! The core never prompts; callers inject a [`CredentialProvider`].

use anyhow::{Context, Result};
use std::fmt;

/// Environment variable holding the API access key.
pub const ACCESS_KEY_ENV: &str = "RANCHER_ACCESS_KEY";
/// Environment variable holding the API secret key.
pub const SECRET_KEY_ENV: &str = "RANCHER_SECRET_KEY";

/// Access key + secret, sent as HTTP basic auth on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub secret: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Source of the credential used for API calls.
pub trait CredentialProvider {
    fn credential(&self) -> Result<Credential>;
}

/// Credential supplied directly by the caller.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credential);

impl CredentialProvider for StaticCredentials {
    fn credential(&self) -> Result<Credential> {
        Ok(self.0.clone())
    }
}

/// Reads `RANCHER_ACCESS_KEY` / `RANCHER_SECRET_KEY` from the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn credential(&self) -> Result<Credential> {
        let username = std::env::var(ACCESS_KEY_ENV)
            .with_context(|| format!("{} is not set", ACCESS_KEY_ENV))?;
        let secret = std::env::var(SECRET_KEY_ENV)
            .with_context(|| format!("{} is not set", SECRET_KEY_ENV))?;
        Ok(Credential { username, secret })
    }
}
