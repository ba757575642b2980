//! birdscape-engine library interface
//!
//! Turns a geographic coordinate into a ranked list of recently observed
//! bird species and a generated ambient soundscape:
//!
//! coordinate -> nearby hotspots -> most active hotspot -> recent species
//! (deduplicated, ranked) -> per-species synthesized audio -> combined track
//!
//! Clients are injected explicitly through the trait seams in [`services`];
//! nothing here holds process-wide state.

pub mod models;
pub mod pipeline;
pub mod services;
pub mod soundscape;

pub use models::{Hotspot, Observation, SpeciesSummary};
pub use pipeline::{validate_coordinate, SpeciesAggregationPipeline};
pub use services::{
    AudioSynthClient, EbirdHotspotClient, EbirdObservationClient, HotspotSource,
    ObservationSource, SpeciesAudioSource,
};
pub use soundscape::{SoundscapeArtifact, SoundscapeOrchestrator, SpeciesSegment};
