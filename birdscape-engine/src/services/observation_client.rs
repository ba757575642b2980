//! Observation registry recent-observations client
//!
//! Wraps the recent-observations-by-location endpoint and folds raw
//! observations into per-species summaries.

use super::registry::RegistryHttp;
use super::ObservationSource;
use crate::models::{Observation, SpeciesSummary};
use async_trait::async_trait;
use birdscape_common::{Result, Settings};
use std::collections::HashMap;

/// HTTP client for the registry's recent-observations endpoint
pub struct EbirdObservationClient {
    registry: RegistryHttp,
}

impl EbirdObservationClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            registry: RegistryHttp::new(settings)?,
        })
    }
}

#[async_trait]
impl ObservationSource for EbirdObservationClient {
    async fn recent_species(&self, loc_id: &str, back_days: u8) -> Result<Vec<SpeciesSummary>> {
        let path = format!("/data/obs/{}/recent", loc_id);
        let query = vec![
            ("back", back_days.to_string()),
            ("fmt", "json".to_string()),
        ];

        let observations: Vec<Observation> = self.registry.get_json(&path, &query).await?;
        let summaries = aggregate_species(&observations);

        tracing::info!(
            loc_id,
            back_days,
            observations = observations.len(),
            species = summaries.len(),
            "Aggregated recent observations"
        );

        Ok(summaries)
    }
}

/// Fold raw observations into one summary per distinct species code
///
/// The first occurrence of a code seeds the summary metadata; every
/// occurrence (including the first) counts toward `observation_count`.
/// Output order is first-occurrence order.
pub fn aggregate_species(observations: &[Observation]) -> Vec<SpeciesSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<SpeciesSummary> = Vec::new();

    for obs in observations {
        match index.get(obs.species_code.as_str()) {
            Some(&i) => summaries[i].observation_count += 1,
            None => {
                index.insert(obs.species_code.as_str(), summaries.len());
                summaries.push(SpeciesSummary::from_first_observation(obs));
            }
        }
    }

    summaries
}
