//! Species aggregation pipeline
//!
//! Composes the hotspot client, selector, and observation client into the
//! coordinate -> ranked-species-list core entry point. Registry faults
//! propagate unchanged; no retry is applied here.

pub mod selector;

use crate::models::{Hotspot, SpeciesSummary};
use crate::services::{HotspotSource, ObservationSource};
use birdscape_common::{Error, Result};

/// Check coordinate bounds
pub fn validate_coordinate(lat: f64, lng: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(Error::InvalidCoordinate { lat, lng });
    }
    Ok(())
}

/// Coordinate -> ranked species list
///
/// Clients are injected at construction so tests can substitute fakes.
pub struct SpeciesAggregationPipeline<H, O> {
    hotspots: H,
    observations: O,
    /// Cap on per-hotspot detail lookups during checklist enrichment
    max_hotspots: usize,
}

impl<H: HotspotSource, O: ObservationSource> SpeciesAggregationPipeline<H, O> {
    pub fn new(hotspots: H, observations: O, max_hotspots: usize) -> Self {
        Self {
            hotspots,
            observations,
            max_hotspots,
        }
    }

    /// Run the full pipeline for one coordinate
    ///
    /// Result is sorted by `observation_count` descending; ties keep their
    /// first-occurrence order (stable sort, no secondary key).
    pub async fn run(
        &self,
        lat: f64,
        lng: f64,
        radius_km: u16,
        back_days: u8,
    ) -> Result<Vec<SpeciesSummary>> {
        validate_coordinate(lat, lng)?;

        let mut hotspots = self
            .hotspots
            .nearby(lat, lng, radius_km, Some(back_days))
            .await?;

        // Empty search is a recoverable user-facing condition, not a crash
        if hotspots.is_empty() {
            return Err(Error::NoHotspotsFound);
        }

        // The geo listing omits checklist counts; without them every
        // hotspot ties at zero and selection is meaningless
        if hotspots.iter().all(|h| h.num_checklists == 0) {
            self.enrich_checklist_counts(&mut hotspots).await;
        }

        let winner = selector::pick_most_active(&hotspots)?;
        tracing::info!(
            loc_id = %winner.loc_id,
            name = %winner.name,
            num_checklists = winner.num_checklists,
            "Selected most active hotspot"
        );

        let mut species = self
            .observations
            .recent_species(&winner.loc_id, back_days)
            .await?;

        species.sort_by(|a, b| b.observation_count.cmp(&a.observation_count));

        Ok(species)
    }

    /// Fetch per-hotspot detail to fill in checklist counts
    ///
    /// Capped at `max_hotspots` lookups. A failed lookup keeps the
    /// unenriched entry; one bad hotspot must not sink the whole search.
    async fn enrich_checklist_counts(&self, hotspots: &mut [Hotspot]) {
        let cap = self.max_hotspots.min(hotspots.len());
        tracing::debug!(count = cap, "Enriching hotspots with checklist counts");

        for hotspot in hotspots.iter_mut().take(cap) {
            match self.hotspots.info(&hotspot.loc_id).await {
                Ok(detail) => {
                    hotspot.num_checklists = detail.num_checklists;
                    hotspot.is_hotspot = detail.is_hotspot;
                }
                Err(e) => {
                    tracing::warn!(
                        loc_id = %hotspot.loc_id,
                        error = %e,
                        "Hotspot detail lookup failed, keeping unenriched entry"
                    );
                }
            }
        }
    }
}
