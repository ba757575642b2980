//! External collaborator clients and their trait seams
//!
//! The pipeline and orchestrator are generic over these traits so the
//! composition root injects real HTTP clients and tests inject fakes,
//! without process-wide state.

pub mod audio_synth_client;
pub mod hotspot_client;
pub mod observation_client;
mod registry;

pub use audio_synth_client::AudioSynthClient;
pub use hotspot_client::EbirdHotspotClient;
pub use observation_client::{aggregate_species, EbirdObservationClient};

use crate::models::{Hotspot, SpeciesSummary};
use async_trait::async_trait;
use birdscape_common::Result;
use std::path::Path;

/// Nearby-hotspot and hotspot-detail lookups
#[async_trait]
pub trait HotspotSource: Send + Sync {
    /// List hotspots near a coordinate
    ///
    /// `radius_km` is capped upstream at 500; `back_days` (1-30), when set,
    /// restricts results to hotspots with activity in that window. Result
    /// order is the registry's own ranking.
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: u16,
        back_days: Option<u8>,
    ) -> Result<Vec<Hotspot>>;

    /// Fetch full detail for one hotspot id
    async fn info(&self, loc_id: &str) -> Result<Hotspot>;
}

/// Recent-observation lookup with species deduplication
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Recent species at a hotspot, deduplicated by species code
    ///
    /// Result order is first-occurrence order, not ranked; ranking is the
    /// caller's responsibility.
    async fn recent_species(&self, loc_id: &str, back_days: u8) -> Result<Vec<SpeciesSummary>>;
}

/// The external audio-generation capability
#[async_trait]
pub trait SpeciesAudioSource: Send + Sync {
    /// Produce a generated audio segment for one species
    ///
    /// Writes the segment to `output_path`. Failures are per-species; the
    /// orchestrator decides whether they are fatal.
    async fn synthesize(
        &self,
        species: &SpeciesSummary,
        duration_secs: f64,
        output_path: &Path,
    ) -> Result<()>;
}
