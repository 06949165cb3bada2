use std::future::Future;

use log::{debug, trace};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::errors::FetchError;
use crate::profile::ProfileRecord;
use crate::{CertError, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str =
    concat!("gh-certificate/", env!("CARGO_PKG_VERSION"));

/// Something that can look a profile up by its identifier.
pub trait ProfileSource {
    fn fetch_profile(
        &self,
        identifier: &str,
    ) -> impl Future<Output = std::result::Result<ProfileRecord, FetchError>>
           + Send;
}

/// Something that can download the bytes of a remote image.
pub trait ImageSource {
    fn fetch_image(
        &self,
        url: &Url,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, FetchError>> + Send;
}

/// Client for the public GitHub users API.
///
/// Unauthenticated, so it is subject to GitHub's anonymous rate limit.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_base_url: Url,
}

impl GithubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut header = HeaderMap::new();
        header.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        let client = reqwest::Client::builder()
            .default_headers(header)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| CertError::Config(e.to_string()))?;
        Ok(Self::with_client(client, config.api_base_url.clone()))
    }

    pub fn with_client(client: reqwest::Client, api_base_url: Url) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    /// `{base}/users/{identifier}`, with the identifier as one path segment.
    pub fn profile_url(
        &self,
        identifier: &str,
    ) -> std::result::Result<Url, FetchError> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FetchError::Transport(format!(
                    "{} cannot be used as an API base",
                    self.api_base_url
                ))
            })?
            .pop_if_empty()
            .push("users")
            .push(identifier);
        Ok(url)
    }
}

impl ProfileSource for GithubClient {
    async fn fetch_profile(
        &self,
        identifier: &str,
    ) -> std::result::Result<ProfileRecord, FetchError> {
        let url = self.profile_url(identifier)?;
        trace!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("Profile lookup for {} answered {}", identifier, status);
            return Err(FetchError::NotFound);
        }

        let document: Value = response.json().await?;
        Ok(ProfileRecord::new(document))
    }
}

impl ImageSource for GithubClient {
    async fn fetch_image(
        &self,
        url: &Url,
    ) -> std::result::Result<Vec<u8>, FetchError> {
        trace!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!(
                "HTTP {} for {}",
                status, url
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
