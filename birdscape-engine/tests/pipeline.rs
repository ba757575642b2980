//! End-to-end pipeline tests against in-process fakes

use async_trait::async_trait;
use birdscape_common::{Error, Result};
use birdscape_engine::{
    Hotspot, HotspotSource, ObservationSource, SpeciesAggregationPipeline, SpeciesSummary,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn hotspot(loc_id: &str, num_checklists: u32) -> Hotspot {
    Hotspot {
        loc_id: loc_id.to_string(),
        name: format!("Hotspot {}", loc_id),
        latitude: 6.24,
        longitude: -75.58,
        num_checklists,
        country_code: "CO".to_string(),
        subnational1_code: "CO-ANT".to_string(),
        subnational2_code: String::new(),
        is_hotspot: true,
    }
}

fn summary(code: &str, name: &str, count: u32) -> SpeciesSummary {
    SpeciesSummary {
        species_code: code.to_string(),
        com_name: name.to_string(),
        sci_name: format!("{} scientificus", name),
        category: "species".to_string(),
        taxon_order: 0,
        observation_count: count,
    }
}

/// Fake hotspot source serving a fixed nearby list plus per-id detail
///
/// Detail lookups are recorded through the shared `info_calls` handle so
/// tests can assert on them after handing the fake to the pipeline.
struct FakeHotspots {
    nearby: Vec<Hotspot>,
    details: HashMap<String, Hotspot>,
    info_calls: Arc<Mutex<Vec<String>>>,
}

impl FakeHotspots {
    fn new(nearby: Vec<Hotspot>) -> Self {
        Self {
            nearby,
            details: HashMap::new(),
            info_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_details(mut self, details: Vec<Hotspot>) -> Self {
        for detail in details {
            self.details.insert(detail.loc_id.clone(), detail);
        }
        self
    }

    fn info_calls_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.info_calls)
    }
}

#[async_trait]
impl HotspotSource for FakeHotspots {
    async fn nearby(
        &self,
        _lat: f64,
        _lng: f64,
        _radius_km: u16,
        _back_days: Option<u8>,
    ) -> Result<Vec<Hotspot>> {
        Ok(self.nearby.clone())
    }

    async fn info(&self, loc_id: &str) -> Result<Hotspot> {
        self.info_calls.lock().unwrap().push(loc_id.to_string());
        self.details
            .get(loc_id)
            .cloned()
            .ok_or_else(|| Error::RegistryUnavailable(format!("no detail for {}", loc_id)))
    }
}

/// Fake observation source recording which hotspot it was asked about
struct FakeObservations {
    species: Vec<SpeciesSummary>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl FakeObservations {
    fn new(species: Vec<SpeciesSummary>) -> Self {
        Self {
            species,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requested_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requested)
    }
}

#[async_trait]
impl ObservationSource for FakeObservations {
    async fn recent_species(&self, loc_id: &str, _back_days: u8) -> Result<Vec<SpeciesSummary>> {
        self.requested.lock().unwrap().push(loc_id.to_string());
        Ok(self.species.clone())
    }
}

#[tokio::test]
async fn end_to_end_selects_most_active_and_ranks_species() {
    // Two hotspots with checklist counts {12, 47}; observations at the
    // winner fold to Robin x2 then Cardinal x1
    let hotspots = FakeHotspots::new(vec![hotspot("L1", 12), hotspot("L2", 47)]);
    let observations = FakeObservations::new(vec![
        summary("norcar", "Northern Cardinal", 1),
        summary("amerob", "American Robin", 2),
    ]);

    let pipeline = SpeciesAggregationPipeline::new(hotspots, observations, 50);
    let species = pipeline.run(6.24, -75.58, 25, 30).await.unwrap();

    assert_eq!(species.len(), 2);
    assert_eq!(species[0].com_name, "American Robin");
    assert_eq!(species[0].observation_count, 2);
    assert_eq!(species[1].com_name, "Northern Cardinal");
    assert_eq!(species[1].observation_count, 1);
}

#[tokio::test]
async fn pipeline_queries_the_selected_hotspot() {
    let hotspots = FakeHotspots::new(vec![hotspot("L1", 12), hotspot("L2", 47)]);
    let observations = FakeObservations::new(vec![summary("amerob", "American Robin", 1)]);
    let requested = observations.requested_handle();

    let pipeline = SpeciesAggregationPipeline::new(hotspots, observations, 50);
    pipeline.run(6.24, -75.58, 25, 30).await.unwrap();

    assert_eq!(*requested.lock().unwrap(), vec!["L2".to_string()]);
}

#[tokio::test]
async fn ranking_is_descending_with_stable_ties() {
    let hotspots = FakeHotspots::new(vec![hotspot("L1", 5)]);
    let observations = FakeObservations::new(vec![
        summary("a", "A", 1),
        summary("b", "B", 3),
        summary("c", "C", 1),
        summary("d", "D", 3),
    ]);

    let pipeline = SpeciesAggregationPipeline::new(hotspots, observations, 50);
    let species = pipeline.run(0.0, 0.0, 25, 30).await.unwrap();

    for pair in species.windows(2) {
        assert!(pair[0].observation_count >= pair[1].observation_count);
    }
    // ties keep original order: B before D, A before C
    let codes: Vec<&str> = species.iter().map(|s| s.species_code.as_str()).collect();
    assert_eq!(codes, vec!["b", "d", "a", "c"]);
}

#[tokio::test]
async fn empty_nearby_surfaces_no_hotspots_found() {
    let hotspots = FakeHotspots::new(Vec::new());
    let observations = FakeObservations::new(Vec::new());

    let pipeline = SpeciesAggregationPipeline::new(hotspots, observations, 50);
    let result = pipeline.run(6.24, -75.58, 25, 30).await;

    assert!(matches!(result, Err(Error::NoHotspotsFound)));
}

#[tokio::test]
async fn invalid_coordinate_rejected_before_any_lookup() {
    let hotspots = FakeHotspots::new(vec![hotspot("L1", 12)]);
    let observations = FakeObservations::new(Vec::new());

    let pipeline = SpeciesAggregationPipeline::new(hotspots, observations, 50);
    let result = pipeline.run(90.5, 0.0, 25, 30).await;

    assert!(matches!(result, Err(Error::InvalidCoordinate { .. })));
}

#[tokio::test]
async fn zero_count_listing_is_enriched_via_detail_lookups() {
    // Geo listing carries no checklist counts; detail lookups fill them in
    // and selection follows the enriched counts
    let hotspots = FakeHotspots::new(vec![hotspot("L1", 0), hotspot("L2", 0)])
        .with_details(vec![hotspot("L1", 12), hotspot("L2", 47)]);
    let info_calls = hotspots.info_calls_handle();
    let observations = FakeObservations::new(vec![summary("amerob", "American Robin", 1)]);
    let requested = observations.requested_handle();

    let pipeline = SpeciesAggregationPipeline::new(hotspots, observations, 50);
    pipeline.run(6.24, -75.58, 25, 30).await.unwrap();

    assert_eq!(
        *info_calls.lock().unwrap(),
        vec!["L1".to_string(), "L2".to_string()]
    );
    assert_eq!(*requested.lock().unwrap(), vec!["L2".to_string()]);
}

#[tokio::test]
async fn failed_detail_lookup_keeps_unenriched_entry() {
    // Detail exists only for L2; L1's failure must not sink the search
    let hotspots = FakeHotspots::new(vec![hotspot("L1", 0), hotspot("L2", 0)])
        .with_details(vec![hotspot("L2", 47)]);
    let observations = FakeObservations::new(vec![summary("amerob", "American Robin", 1)]);
    let requested = observations.requested_handle();

    let pipeline = SpeciesAggregationPipeline::new(hotspots, observations, 50);
    pipeline.run(6.24, -75.58, 25, 30).await.unwrap();

    assert_eq!(*requested.lock().unwrap(), vec!["L2".to_string()]);
}

#[tokio::test]
async fn enrichment_respects_max_hotspots_cap() {
    let hotspots = FakeHotspots::new(vec![
        hotspot("L1", 0),
        hotspot("L2", 0),
        hotspot("L3", 0),
    ])
    .with_details(vec![hotspot("L1", 5), hotspot("L2", 9), hotspot("L3", 99)]);
    let info_calls = hotspots.info_calls_handle();
    let observations = FakeObservations::new(vec![summary("amerob", "American Robin", 1)]);

    // cap of 2: L3 is never enriched, so L2 wins
    let pipeline = SpeciesAggregationPipeline::new(hotspots, observations, 2);
    pipeline.run(6.24, -75.58, 25, 30).await.unwrap();

    assert_eq!(
        *info_calls.lock().unwrap(),
        vec!["L1".to_string(), "L2".to_string()]
    );
}

#[tokio::test]
async fn registry_faults_propagate_unchanged() {
    struct FailingHotspots;

    #[async_trait]
    impl HotspotSource for FailingHotspots {
        async fn nearby(
            &self,
            _lat: f64,
            _lng: f64,
            _radius_km: u16,
            _back_days: Option<u8>,
        ) -> Result<Vec<Hotspot>> {
            Err(Error::RegistryAuth("registry returned 403".to_string()))
        }

        async fn info(&self, _loc_id: &str) -> Result<Hotspot> {
            Err(Error::RegistryAuth("registry returned 403".to_string()))
        }
    }

    let observations = FakeObservations::new(Vec::new());
    let pipeline = SpeciesAggregationPipeline::new(FailingHotspots, observations, 50);
    let result = pipeline.run(6.24, -75.58, 25, 30).await;

    assert!(matches!(result, Err(Error::RegistryAuth(_))));
}
