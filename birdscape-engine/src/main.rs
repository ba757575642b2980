//! birdscape - location-driven bird soundscape generator
//!
//! One-shot lookup: takes a coordinate, finds the most active nearby
//! birding hotspot, prints the ranked recent-species list, and builds an
//! ambient soundscape from per-species synthesized audio.
//!
//! This binary is the composition root: clients are constructed here once
//! and injected explicitly into the pipeline and orchestrator.

use anyhow::Result;
use birdscape_common::{Error, Settings};
use birdscape_engine::{
    AudioSynthClient, EbirdHotspotClient, EbirdObservationClient, SoundscapeOrchestrator,
    SpeciesAggregationPipeline, SpeciesSummary,
};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "birdscape",
    version,
    about = "Generate a bird soundscape for a location",
    allow_negative_numbers = true
)]
struct Args {
    /// Latitude of the search center (-90..=90)
    lat: f64,

    /// Longitude of the search center (-180..=180)
    lng: f64,

    /// Search radius in kilometers (0..=500)
    #[arg(long)]
    radius_km: Option<u16>,

    /// Lookback window in days (1..=30)
    #[arg(long)]
    back: Option<u8>,

    /// Total soundscape duration in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Print the ranked species list only; skip audio generation
    #[arg(long)]
    species_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    if let Some(radius) = args.radius_km {
        settings.search_radius_km = radius;
    }
    if let Some(back) = args.back {
        settings.lookback_days = back;
    }
    if let Err(e) = settings.validate() {
        exit_with(&e);
    }

    info!(
        lat = args.lat,
        lng = args.lng,
        radius_km = settings.search_radius_km,
        back = settings.lookback_days,
        "Starting birdscape lookup"
    );

    let hotspot_client = match EbirdHotspotClient::new(&settings) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };
    let observation_client = match EbirdObservationClient::new(&settings) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };

    let pipeline =
        SpeciesAggregationPipeline::new(hotspot_client, observation_client, settings.max_hotspots);

    let species = match pipeline
        .run(
            args.lat,
            args.lng,
            settings.search_radius_km,
            settings.lookback_days,
        )
        .await
    {
        Ok(species) => species,
        Err(e) => exit_with(&e),
    };

    print_species_table(&species);

    if species.is_empty() {
        println!("No species observed at the selected hotspot in the lookback window.");
        return Ok(());
    }

    if args.species_only {
        return Ok(());
    }

    let duration = args.duration.unwrap_or(settings.default_duration_secs);
    let synth_client = match AudioSynthClient::new(&settings) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };
    let orchestrator = SoundscapeOrchestrator::new(synth_client, settings);

    let artifact = match orchestrator.build(&species, duration).await {
        Ok(artifact) => artifact,
        Err(e) => exit_with(&e),
    };

    for skipped in &artifact.skipped {
        println!("Skipped (synthesis failed): {}", skipped);
    }
    if let Some(path) = &artifact.combined_path {
        println!("\nSoundscape written to: {}", path.display());
    }

    Ok(())
}

fn print_species_table(species: &[SpeciesSummary]) {
    println!("\nSpecies observed (ranked by observation count):\n");
    println!(
        "{:<30} {:<30} {:>5}",
        "Common Name", "Scientific Name", "Count"
    );
    println!("{}", "-".repeat(67));
    for summary in species {
        println!(
            "{:<30} {:<30} {:>5}",
            summary.com_name, summary.sci_name, summary.observation_count
        );
    }
}

/// Render each error kind as a distinct human-readable message and exit
fn exit_with(err: &Error) -> ! {
    eprintln!("{}", friendly_message(err));
    std::process::exit(1);
}

fn friendly_message(err: &Error) -> String {
    match err {
        Error::InvalidCoordinate { lat, lng } => format!(
            "Invalid coordinate ({}, {}): latitude must be within [-90, 90] and longitude within [-180, 180].",
            lat, lng
        ),
        Error::NoHotspotsFound => {
            "No birding activity found near this location. Try a larger search radius.".to_string()
        }
        Error::RegistryUnavailable(detail) => format!(
            "The bird observation registry is currently unavailable; please try again later. ({})",
            detail
        ),
        Error::RegistryAuth(detail) => format!(
            "The bird observation registry rejected your API key; check BIRDSCAPE_API_KEY or your config file. ({})",
            detail
        ),
        Error::AudioBackendUnavailable(detail) => format!(
            "Audio generation failed for every species; is the synthesis service running? ({})",
            detail
        ),
        other => other.to_string(),
    }
}
