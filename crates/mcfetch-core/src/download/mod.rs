//! Machine config download.
//!
//! Walks (host, project) pairs in order, acquiring one registration token per
//! distinct project and reusing it for every host in that project, then
//! saves each host's config archive under the destination directory.

mod filename;

pub use filename::{
    fallback_filename, filename_from_disposition, sanitize_filename, ARCHIVE_SUFFIX,
};

use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{ConfigArchive, Host, RancherApi};
use crate::checksum;
use crate::error::{ProvisionError, Result};
use crate::hosts;
use crate::token::{acquire_token, PollPolicy, TokenCache};

/// One host whose config should be fetched, with the project it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub host_id: String,
    pub project_id: String,
}

impl DownloadRequest {
    pub fn new(host_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            project_id: project_id.into(),
        }
    }
}

impl From<&Host> for DownloadRequest {
    fn from(h: &Host) -> Self {
        Self::new(h.id.clone(), h.project_id.clone())
    }
}

/// Pairs host and project ids by position. Lengths must match.
pub fn pair_requests<H, P>(host_ids: &[H], project_ids: &[P]) -> Result<Vec<DownloadRequest>>
where
    H: AsRef<str>,
    P: AsRef<str>,
{
    if host_ids.len() != project_ids.len() {
        return Err(ProvisionError::MismatchedRequests {
            hosts: host_ids.len(),
            projects: project_ids.len(),
        });
    }
    Ok(host_ids
        .iter()
        .zip(project_ids)
        .map(|(h, p)| DownloadRequest::new(h.as_ref(), p.as_ref()))
        .collect())
}

/// A config archive written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedConfig {
    pub host_id: String,
    pub project_id: String,
    pub path: PathBuf,
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the written bytes.
    pub sha256: String,
    /// True when the filename came from `Content-Disposition`.
    pub name_from_header: bool,
}

/// Downloads machine configs through one API, polling tokens with `policy`.
pub struct ConfigDownloader<'a, A: ?Sized> {
    api: &'a A,
    policy: PollPolicy,
}

impl<'a, A: RancherApi + ?Sized> ConfigDownloader<'a, A> {
    pub fn new(api: &'a A, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    /// Downloads configs for positionally paired host and project ids.
    ///
    /// Mismatched lengths are rejected before any request is made.
    pub fn download_configs<H, P>(
        &self,
        host_ids: &[H],
        project_ids: &[P],
        destination: &Path,
    ) -> Result<Vec<DownloadedConfig>>
    where
        H: AsRef<str>,
        P: AsRef<str>,
    {
        let requests = pair_requests(host_ids, project_ids)?;
        self.download_requests(&requests, destination)
    }

    /// Lists hosts accepted by `predicate` and downloads each one's config
    /// using the host's own project.
    pub fn download_all<F>(&self, predicate: F, destination: &Path) -> Result<Vec<DownloadedConfig>>
    where
        F: FnMut(&Host) -> bool,
    {
        let requests: Vec<DownloadRequest> = hosts::list_hosts(self.api, predicate)?
            .iter()
            .map(DownloadRequest::from)
            .collect();
        self.download_requests(&requests, destination)
    }

    /// Processes `requests` strictly in order; the first failure aborts the
    /// batch. Tokens are cached per project for the duration of the call.
    pub fn download_requests(
        &self,
        requests: &[DownloadRequest],
        destination: &Path,
    ) -> Result<Vec<DownloadedConfig>> {
        if requests.is_empty() {
            tracing::info!("no hosts to download");
            return Ok(Vec::new());
        }
        fs::create_dir_all(destination).map_err(|source| ProvisionError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

        let mut tokens = TokenCache::new();
        let mut saved = Vec::with_capacity(requests.len());
        for req in requests {
            let token = tokens.get_or_try_insert_with(&req.project_id, || {
                acquire_token(self.api, &req.project_id, None, &self.policy)
            })?;
            let archive = self
                .api
                .fetch_machine_config(&req.project_id, &req.host_id, token)?;
            saved.push(save_archive(destination, req, archive)?);
        }
        tracing::info!(
            hosts = saved.len(),
            projects = tokens.len(),
            dest = %destination.display(),
            "machine config download complete"
        );
        Ok(saved)
    }
}

/// Writes the archive body directly to its final path, replacing any
/// existing file.
fn save_archive(
    destination: &Path,
    req: &DownloadRequest,
    archive: ConfigArchive,
) -> Result<DownloadedConfig> {
    let header_name = archive
        .content_disposition
        .as_deref()
        .and_then(filename_from_disposition);
    let name_from_header = header_name.is_some();
    let filename = header_name.unwrap_or_else(|| {
        tracing::info!(
            host_id = %req.host_id,
            header = archive.content_disposition.as_deref().unwrap_or("-"),
            "no filename in Content-Disposition; naming archive after host id"
        );
        fallback_filename(&req.host_id)
    });

    let path = destination.join(&filename);
    fs::write(&path, &archive.body).map_err(|source| ProvisionError::Io {
        path: path.clone(),
        source,
    })?;

    let saved = DownloadedConfig {
        host_id: req.host_id.clone(),
        project_id: req.project_id.clone(),
        bytes: archive.body.len() as u64,
        sha256: checksum::sha256_bytes(&archive.body),
        path,
        name_from_header,
    };
    tracing::info!(
        host_id = %saved.host_id,
        path = %saved.path.display(),
        bytes = saved.bytes,
        "saved machine config"
    );
    Ok(saved)
}
