//! Domain models for the observation registry and species aggregation
//!
//! Field names follow the registry's wire format via serde renames. The
//! nearby-hotspots (geo) endpoint and the hotspot-info endpoint label some
//! fields differently (`locName`/`lat`/`lng` vs `name`/`latitude`/
//! `longitude`), so [`Hotspot`] carries aliases and parses from either.

use serde::Deserialize;

/// One birding location known to the observation registry
///
/// Created fresh per query; never cached across pipeline runs.
#[derive(Debug, Clone, Deserialize)]
pub struct Hotspot {
    /// Opaque stable location identifier
    #[serde(rename = "locId")]
    pub loc_id: String,
    /// Display name
    #[serde(rename = "name", alias = "locName")]
    pub name: String,
    #[serde(rename = "latitude", alias = "lat")]
    pub latitude: f64,
    #[serde(rename = "longitude", alias = "lng")]
    pub longitude: f64,
    /// Submitted checklist volume, the activity/reliability proxy
    ///
    /// The geo listing omits this; only the info endpoint carries it.
    #[serde(rename = "numChecklists", default)]
    pub num_checklists: u32,
    #[serde(rename = "countryCode", default)]
    pub country_code: String,
    #[serde(rename = "subnational1Code", default)]
    pub subnational1_code: String,
    #[serde(rename = "subnational2Code", default)]
    pub subnational2_code: String,
    /// Curated hotspot vs arbitrary personal location
    ///
    /// The geo listing only ever contains curated hotspots, so the default
    /// when the field is absent is true.
    #[serde(rename = "isHotspot", default = "default_is_hotspot")]
    pub is_hotspot: bool,
}

fn default_is_hotspot() -> bool {
    true
}

/// One recorded sighting event at a location
///
/// Multiple observations may share a `species_code`; they exist only as
/// input to the aggregation fold and are never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    /// Stable taxonomic key, the deduplication key
    #[serde(rename = "speciesCode")]
    pub species_code: String,
    #[serde(rename = "comName")]
    pub com_name: String,
    #[serde(rename = "sciName")]
    pub sci_name: String,
    /// Taxonomic rank/category tag (absent in simple-detail payloads)
    #[serde(default)]
    pub category: String,
    /// Taxonomic sequence sort key (absent in simple-detail payloads)
    #[serde(rename = "taxonOrder", default)]
    pub taxon_order: i64,
}

/// Aggregated, deduplicated result per species at a hotspot
///
/// Exactly one per distinct `species_code` within an aggregation run.
#[derive(Debug, Clone)]
pub struct SpeciesSummary {
    pub species_code: String,
    pub com_name: String,
    pub sci_name: String,
    pub category: String,
    pub taxon_order: i64,
    /// Number of raw observations collapsed into this entry (>= 1)
    pub observation_count: u32,
}

impl SpeciesSummary {
    /// Seed a summary from the first observation of a species code
    ///
    /// Species metadata is assumed stable across observations sharing a
    /// code within one lookback window; it is not re-validated.
    pub fn from_first_observation(obs: &Observation) -> Self {
        Self {
            species_code: obs.species_code.clone(),
            com_name: obs.com_name.clone(),
            sci_name: obs.sci_name.clone(),
            category: obs.category.clone(),
            taxon_order: obs.taxon_order,
            observation_count: 1,
        }
    }
}
