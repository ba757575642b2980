//! Configuration loading and validation
//!
//! Settings resolution priority order:
//! 1. Environment variables (`BIRDSCAPE_*`, highest priority)
//! 2. TOML config file (`~/.config/birdscape/config.toml`)
//! 3. Compiled defaults (fallback)
//!
//! The composition root must handle the `Result` from [`Settings::load`]
//! before constructing any clients; there is no nullable fallback state.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Registry caps on the lookback window (days)
pub const MIN_LOOKBACK_DAYS: u8 = 1;
pub const MAX_LOOKBACK_DAYS: u8 = 30;

/// Registry cap on the nearby-hotspot search radius (km)
pub const MAX_SEARCH_RADIUS_KM: u16 = 500;

/// How `total_duration_secs` is distributed across species
///
/// The reference behavior gives every species the full duration, so
/// `PerSpecies` is the default. `SharedBudget` divides the total evenly
/// instead, bounding the sum of segment lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationMode {
    /// Every species gets the full soundscape duration (segments overlaid)
    PerSpecies,
    /// The duration is split evenly across species (segments concatenated)
    SharedBudget,
}

impl Default for DurationMode {
    fn default() -> Self {
        DurationMode::PerSpecies
    }
}

impl std::str::FromStr for DurationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "per-species" => Ok(DurationMode::PerSpecies),
            "shared-budget" => Ok(DurationMode::SharedBudget),
            other => Err(format!(
                "expected \"per-species\" or \"shared-budget\", got \"{}\"",
                other
            )),
        }
    }
}

/// Resolved application settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Observation registry API key (`X-eBirdApiToken`)
    pub api_key: String,
    /// Observation registry base URL
    pub api_url: String,
    /// Audio synthesis service base URL
    pub audio_url: String,
    /// Nearby-hotspot search radius in km (0-500)
    pub search_radius_km: u16,
    /// Recent-activity lookback window in days (1-30)
    pub lookback_days: u8,
    /// Maximum hotspots to enrich with per-hotspot detail lookups
    pub max_hotspots: usize,
    /// Soundscape duration when the caller does not specify one
    pub default_duration_secs: f64,
    /// Hard ceiling on requested soundscape duration
    pub max_duration_secs: f64,
    /// Duration distribution policy
    pub duration_mode: DurationMode,
    /// Directory receiving per-species segments and the combined track
    pub output_dir: PathBuf,
    /// Format requested from the audio synthesis service (segment files)
    ///
    /// The combined track is always WAV at `sample_rate`, stereo, regardless
    /// of the segment format.
    pub audio_format: String,
    /// Sample rate of the combined track in Hz
    pub sample_rate: u32,
    /// Timeout applied to each outbound HTTP request, in seconds
    pub request_timeout_secs: u64,
    /// Concurrent audio synthesis requests (bounded worker pool width)
    pub synth_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.ebird.org/v2".to_string(),
            audio_url: "http://127.0.0.1:8750".to_string(),
            search_radius_km: 25,
            lookback_days: 30,
            max_hotspots: 50,
            default_duration_secs: 60.0,
            max_duration_secs: 300.0,
            duration_mode: DurationMode::default(),
            output_dir: default_output_dir(),
            audio_format: "mp3".to_string(),
            sample_rate: 44100,
            request_timeout_secs: 30,
            synth_concurrency: 4,
        }
    }
}

/// Partial settings as they appear in the TOML file
///
/// Every field is optional; absent fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    api_url: Option<String>,
    audio_url: Option<String>,
    search_radius_km: Option<u16>,
    lookback_days: Option<u8>,
    max_hotspots: Option<usize>,
    default_duration_secs: Option<f64>,
    max_duration_secs: Option<f64>,
    duration_mode: Option<DurationMode>,
    output_dir: Option<PathBuf>,
    audio_format: Option<String>,
    sample_rate: Option<u32>,
    request_timeout_secs: Option<u64>,
    synth_concurrency: Option<usize>,
}

impl Settings {
    /// Load settings from the platform config path, environment, and defaults
    ///
    /// Creates the output directory if missing.
    pub fn load() -> Result<Self> {
        let path = default_config_path();
        Self::load_from(path.as_deref())
    }

    /// Load settings, reading the TOML file at `config_file` if it exists
    pub fn load_from(config_file: Option<&Path>) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(path) = config_file {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let file: FileConfig = toml::from_str(&content).map_err(|e| {
                    Error::Config(format!("failed to parse {}: {}", path.display(), e))
                })?;
                settings.apply_file(file);
                tracing::info!(path = %path.display(), "Loaded config file");
            }
        }

        settings.apply_env()?;
        settings.validate()?;
        std::fs::create_dir_all(&settings.output_dir)?;

        Ok(settings)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.api_key {
            self.api_key = v;
        }
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        if let Some(v) = file.audio_url {
            self.audio_url = v;
        }
        if let Some(v) = file.search_radius_km {
            self.search_radius_km = v;
        }
        if let Some(v) = file.lookback_days {
            self.lookback_days = v;
        }
        if let Some(v) = file.max_hotspots {
            self.max_hotspots = v;
        }
        if let Some(v) = file.default_duration_secs {
            self.default_duration_secs = v;
        }
        if let Some(v) = file.max_duration_secs {
            self.max_duration_secs = v;
        }
        if let Some(v) = file.duration_mode {
            self.duration_mode = v;
        }
        if let Some(v) = file.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = file.audio_format {
            self.audio_format = v;
        }
        if let Some(v) = file.sample_rate {
            self.sample_rate = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file.synth_concurrency {
            self.synth_concurrency = v;
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var("BIRDSCAPE_API_KEY") {
            self.api_key = v;
        }
        if let Ok(v) = std::env::var("BIRDSCAPE_API_URL") {
            self.api_url = v;
        }
        if let Ok(v) = std::env::var("BIRDSCAPE_AUDIO_URL") {
            self.audio_url = v;
        }
        if let Ok(v) = std::env::var("BIRDSCAPE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("BIRDSCAPE_AUDIO_FORMAT") {
            self.audio_format = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_SEARCH_RADIUS_KM")? {
            self.search_radius_km = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_LOOKBACK_DAYS")? {
            self.lookback_days = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_MAX_HOTSPOTS")? {
            self.max_hotspots = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_DEFAULT_DURATION_SECS")? {
            self.default_duration_secs = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_MAX_DURATION_SECS")? {
            self.max_duration_secs = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_DURATION_MODE")? {
            self.duration_mode = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_SAMPLE_RATE")? {
            self.sample_rate = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout_secs = v;
        }
        if let Some(v) = env_parsed("BIRDSCAPE_SYNTH_CONCURRENCY")? {
            self.synth_concurrency = v;
        }
        Ok(())
    }

    /// Validate ranges and required fields
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(
                "registry API key not configured. Set one of:\n\
                 1. Environment: BIRDSCAPE_API_KEY=your-key-here\n\
                 2. TOML config: ~/.config/birdscape/config.toml (api_key = \"your-key\")\n\
                 \n\
                 Obtain an API key at: https://ebird.org/api/keygen"
                    .to_string(),
            ));
        }
        if self.search_radius_km > MAX_SEARCH_RADIUS_KM {
            return Err(Error::Config(format!(
                "search_radius_km must be 0-{}, got {}",
                MAX_SEARCH_RADIUS_KM, self.search_radius_km
            )));
        }
        if self.lookback_days < MIN_LOOKBACK_DAYS || self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(Error::Config(format!(
                "lookback_days must be {}-{}, got {}",
                MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS, self.lookback_days
            )));
        }
        if self.default_duration_secs <= 0.0 || self.max_duration_secs <= 0.0 {
            return Err(Error::Config(
                "soundscape durations must be positive".to_string(),
            ));
        }
        if self.default_duration_secs > self.max_duration_secs {
            return Err(Error::Config(format!(
                "default_duration_secs ({}) exceeds max_duration_secs ({})",
                self.default_duration_secs, self.max_duration_secs
            )));
        }
        if self.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be non-zero".to_string()));
        }
        if self.synth_concurrency == 0 {
            return Err(Error::Config(
                "synth_concurrency must be at least 1".to_string(),
            ));
        }
        if self.audio_format.trim().is_empty() {
            return Err(Error::Config("audio_format must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Read and parse one environment variable, absent meaning "keep default"
///
/// A set-but-unparseable value is a configuration error, not a silent
/// fallback.
fn env_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid value for {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

/// Platform config file path (`~/.config/birdscape/config.toml` on Linux)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("birdscape").join("config.toml"))
}

/// Platform default output directory (`~/.local/share/birdscape/output` on Linux)
fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("birdscape").join("output"))
        .unwrap_or_else(|| PathBuf::from("./birdscape_output"))
}
