//! Audio synthesis service client
//!
//! Wraps the external audio-generation capability: given a species name and
//! a duration, produce representative audio. All failures here are
//! per-species; the soundscape orchestrator decides whether they are fatal.

use super::SpeciesAudioSource;
use crate::models::SpeciesSummary;
use async_trait::async_trait;
use birdscape_common::{Error, Result, Settings};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("birdscape/", env!("CARGO_PKG_VERSION"));

/// Request body for the synthesis endpoint
#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    species: &'a str,
    scientific_name: &'a str,
    duration_seconds: f64,
    format: &'a str,
}

/// HTTP client for the audio synthesis service
pub struct AudioSynthClient {
    http: reqwest::Client,
    base_url: String,
    format: String,
}

impl AudioSynthClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.audio_url.trim_end_matches('/').to_string(),
            format: settings.audio_format.clone(),
        })
    }
}

#[async_trait]
impl SpeciesAudioSource for AudioSynthClient {
    async fn synthesize(
        &self,
        species: &SpeciesSummary,
        duration_secs: f64,
        output_path: &Path,
    ) -> Result<()> {
        let url = format!("{}/generate", self.base_url);
        let request = SynthesisRequest {
            species: &species.com_name,
            scientific_name: &species.sci_name,
            duration_seconds: duration_secs,
            format: &self.format,
        };

        tracing::debug!(
            species = %species.com_name,
            duration_secs,
            url = %url,
            "Requesting audio synthesis"
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::AudioBackendUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::AudioBackendUnavailable(format!(
                "synthesis service returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::AudioBackendUnavailable(e.to_string()))?;

        tokio::fs::write(output_path, &bytes).await?;

        tracing::info!(
            species = %species.com_name,
            path = %output_path.display(),
            bytes = bytes.len(),
            "Wrote synthesized segment"
        );

        Ok(())
    }
}
