//! Blocking libcurl client for the v1 API.
//!
//! One `Easy` handle per request, HTTP basic auth from the bound credential,
//! redirects followed. Runs in the calling thread.

use std::str;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use super::parse::{parse_headers, ResponseHead};
use super::schema::{Collection, ConfigArchive, CreateTokenRequest, Host, RegistrationToken};
use super::RancherApi;
use crate::credential::Credential;
use crate::error::{ProvisionError, Result};

/// Per-request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiOptions {
    pub connect_timeout: Duration,
    /// Whole-request limit; `None` lets a request run until the server answers.
    pub timeout: Option<Duration>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Collected response: final headers and the full body.
struct RawResponse {
    head: ResponseHead,
    body: Vec<u8>,
}

/// [`RancherApi`] over libcurl, bound to one base URL and credential.
#[derive(Debug, Clone)]
pub struct CurlApi {
    base: Url,
    credential: Credential,
    options: ApiOptions,
}

impl CurlApi {
    /// `base_url` is the API root without the `/v1` suffix,
    /// e.g. `https://rancher.example/api`.
    pub fn new(base_url: &str, credential: Credential, options: ApiOptions) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self {
            base,
            credential,
            options,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/v1/{segments...}`; each segment is percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            path.pop_if_empty().push("v1").extend(segments);
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let resp = self.perform(url, None)?;
        Ok(serde_json::from_slice(&resp.body)?)
    }

    fn post_json<T: DeserializeOwned>(&self, url: &Url, body: &[u8]) -> Result<T> {
        let resp = self.perform(url, Some(body))?;
        Ok(serde_json::from_slice(&resp.body)?)
    }

    /// GET (or POST when `post_body` is set) and collect headers and body.
    fn perform(&self, url: &Url, post_body: Option<&[u8]>) -> Result<RawResponse> {
        let shown = redacted(url);
        let method = if post_body.is_some() { "POST" } else { "GET" };
        tracing::trace!(method, url = %shown, "api request");

        let mut headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.username(&self.credential.username)?;
        easy.password(&self.credential.secret)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        if let Some(timeout) = self.options.timeout {
            easy.timeout(timeout)?;
        }

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json, */*")?;
        if let Some(data) = post_body {
            easy.post(true)?;
            easy.post_fields_copy(data)?;
            list.append("Content-Type: application/json")?;
        }
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            return Err(ProvisionError::Http {
                status,
                url: shown.to_string(),
            });
        }

        tracing::trace!(status, bytes = body.len(), url = %shown, "api response");
        Ok(RawResponse {
            head: parse_headers(&headers),
            body,
        })
    }
}

/// URL without its query string; config fetches carry the token there.
fn redacted(url: &Url) -> Url {
    let mut shown = url.clone();
    shown.set_query(None);
    shown
}

impl RancherApi for CurlApi {
    fn create_registration_token(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<RegistrationToken> {
        let url = self.endpoint(&["projects", project_id, "registrationTokens"])?;
        let body = serde_json::to_vec(&CreateTokenRequest { name })?;
        self.post_json(&url, &body)
    }

    fn list_registration_tokens(&self) -> Result<Vec<RegistrationToken>> {
        let url = self.endpoint(&["registrationTokens"])?;
        let list: Collection<RegistrationToken> = self.get_json(&url)?;
        Ok(list.data)
    }

    fn list_hosts(&self) -> Result<Vec<Host>> {
        let url = self.endpoint(&["hosts"])?;
        let list: Collection<Host> = self.get_json(&url)?;
        Ok(list.data)
    }

    fn fetch_machine_config(
        &self,
        project_id: &str,
        host_id: &str,
        token: &str,
    ) -> Result<ConfigArchive> {
        let mut url = self.endpoint(&["projects", project_id, "machines", host_id, "config"])?;
        url.query_pairs_mut()
            .append_pair("token", token)
            .append_pair("projectId", project_id);
        let resp = self.perform(&url, None)?;
        tracing::debug!(
            host_id,
            content_type = resp.head.content_type.as_deref().unwrap_or("-"),
            content_length = ?resp.head.content_length,
            "machine config response"
        );
        Ok(ConfigArchive {
            content_disposition: resp.head.content_disposition,
            body: resp.body,
        })
    }
}
