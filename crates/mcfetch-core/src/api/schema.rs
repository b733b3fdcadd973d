//! Typed response schemas for the v1 API.
//!
//! Only the fields the provisioning flow reads are typed; hosts keep the
//! rest of their payload as an opaque JSON map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{ "data": [...] }` wrapper used by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    pub data: Vec<T>,
}

/// Body of the token-creation POST.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTokenRequest<'a> {
    pub name: &'a str,
}

/// Registration token as returned by create and list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationToken {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub state: String,
    /// Missing and `null` both decode as `None`.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "accountId")]
    pub account_id: Option<String>,
}

impl RegistrationToken {
    pub fn is_registering(&self) -> bool {
        self.state.eq_ignore_ascii_case(super::STATE_REGISTERING)
    }

    /// Token value, or `""` when the server sent none.
    pub fn token_value(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }
}

/// Host descriptor from `/v1/hosts`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Host {
    pub id: String,
    /// Project the host belongs to.
    #[serde(rename = "accountId")]
    pub project_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Host {
    /// Name for display: `name`, then `hostname`, then the id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.hostname.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.id)
    }
}

/// Machine config response: raw archive bytes plus the filename hint.
#[derive(Debug, Clone)]
pub struct ConfigArchive {
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}
