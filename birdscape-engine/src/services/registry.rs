//! Shared HTTP plumbing for the observation registry
//!
//! Both registry clients authenticate with the same static API-key header
//! and map failures identically: 401/403 is a permanent credential fault,
//! everything else non-success (including transport errors) is treated as
//! the registry being unavailable.

use birdscape_common::{Error, Result, Settings};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-eBirdApiToken";
const USER_AGENT: &str = concat!("birdscape/", env!("CARGO_PKG_VERSION"));

/// Authenticated GET-JSON transport shared by the registry clients
#[derive(Debug, Clone)]
pub(crate) struct RegistryHttp {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RegistryHttp {
    pub(crate) fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    /// GET `{base_url}{path}` with query parameters, parsing a JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(url = %url, "Querying observation registry");

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::RegistryUnavailable(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::RegistryAuth(format!(
                "registry returned {} for {}",
                status.as_u16(),
                path
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RegistryUnavailable(format!(
                "registry returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }
}
