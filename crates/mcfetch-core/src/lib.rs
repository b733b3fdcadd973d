pub mod api;
pub mod checksum;
pub mod config;
pub mod credential;
pub mod download;
pub mod error;
pub mod hosts;
pub mod logging;
pub mod token;

pub use api::{ApiOptions, CurlApi, RancherApi};
pub use credential::{Credential, CredentialProvider, EnvCredentials, StaticCredentials};
pub use download::{ConfigDownloader, DownloadRequest, DownloadedConfig};
pub use error::ProvisionError;
pub use token::{acquire_token, PollPolicy};

#[cfg(test)]
pub(crate) mod test_support;
