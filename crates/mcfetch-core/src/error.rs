//! Error taxonomy for token provisioning, host listing and config download.

use std::path::PathBuf;

/// Errors returned by the provisioning core.
///
/// Every variant is fatal to the current invocation; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Token creation answered with a different name than the one requested.
    #[error("unexpected response: requested token {requested:?}, server returned {received:?}")]
    UnexpectedResponse { requested: String, received: String },

    /// Freshly created token was not in the `registering` state.
    #[error("registration token {name:?} is in state {state:?}, expected \"registering\"")]
    Registration { name: String, state: String },

    /// Token left the `registering` state without a token value.
    #[error("registration token {name:?} has an empty token value")]
    EmptyToken { name: String },

    /// Poll policy gave up before the token left the `registering` state.
    #[error("registration token {name:?} still registering after {attempts} polls")]
    PollExhausted { name: String, attempts: u32 },

    /// Host and project id lists were not the same length.
    #[error("{hosts} host id(s) but {projects} project id(s); lists must pair up")]
    MismatchedRequests { hosts: usize, projects: usize },

    /// Non-2xx HTTP status.
    #[error("{url} returned HTTP {status}")]
    Http { status: u32, url: String },

    /// libcurl failure (connect, timeout, TLS, ...).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    /// Response body did not match the expected schema.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
