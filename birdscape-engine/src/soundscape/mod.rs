//! Soundscape orchestration
//!
//! Consumes the ranked species list, fans out one synthesis request per
//! species through a bounded worker pool, tolerates per-species failures,
//! and mixes the surviving segments into one combined track. A partial
//! soundscape from N-k of N species is preferred over total failure.

pub mod mixer;

use crate::models::SpeciesSummary;
use crate::services::SpeciesAudioSource;
use birdscape_common::{DurationMode, Error, Result, Settings};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use mixer::MixLayout;

/// One successfully synthesized per-species segment
#[derive(Debug, Clone)]
pub struct SpeciesSegment {
    pub species_code: String,
    pub com_name: String,
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Output descriptor of a soundscape build
#[derive(Debug, Clone)]
pub struct SoundscapeArtifact {
    pub run_id: Uuid,
    /// Combined track path; `None` only for an empty species list
    pub combined_path: Option<PathBuf>,
    /// Surviving segments, in ranking order
    pub segments: Vec<SpeciesSegment>,
    /// Common names of species whose synthesis failed and was skipped
    pub skipped: Vec<String>,
}

struct SynthJob {
    index: usize,
    species: SpeciesSummary,
    duration_secs: f64,
    path: PathBuf,
}

/// Builds a combined soundscape from a ranked species list
pub struct SoundscapeOrchestrator<S> {
    synth: S,
    settings: Settings,
}

impl<S: SpeciesAudioSource> SoundscapeOrchestrator<S> {
    pub fn new(synth: S, settings: Settings) -> Self {
        Self { synth, settings }
    }

    /// Build the soundscape
    ///
    /// An empty species list yields an empty artifact, never an error
    /// ("no birds found" is a valid real-world outcome). Per-species
    /// synthesis failures are logged and skipped; `AudioBackendUnavailable`
    /// is raised only when every request fails.
    pub async fn build(
        &self,
        species: &[SpeciesSummary],
        total_duration_secs: f64,
    ) -> Result<SoundscapeArtifact> {
        let max = self.settings.max_duration_secs;
        if !(total_duration_secs > 0.0 && total_duration_secs <= max) {
            return Err(Error::InvalidDuration {
                seconds: total_duration_secs,
                max,
            });
        }

        let run_id = Uuid::new_v4();

        if species.is_empty() {
            tracing::info!(%run_id, "No species to synthesize, returning empty soundscape");
            return Ok(SoundscapeArtifact {
                run_id,
                combined_path: None,
                segments: Vec::new(),
                skipped: Vec::new(),
            });
        }

        let segment_duration = match self.settings.duration_mode {
            DurationMode::PerSpecies => total_duration_secs,
            DurationMode::SharedBudget => total_duration_secs / species.len() as f64,
        };

        tracing::info!(
            %run_id,
            species = species.len(),
            total_duration_secs,
            segment_duration,
            mode = ?self.settings.duration_mode,
            "Building soundscape"
        );

        let jobs: Vec<SynthJob> = species
            .iter()
            .enumerate()
            .map(|(index, summary)| SynthJob {
                index,
                species: summary.clone(),
                duration_secs: segment_duration,
                path: self.segment_path(summary),
            })
            .collect();

        let planned: Vec<SpeciesSegment> = jobs
            .iter()
            .map(|job| SpeciesSegment {
                species_code: job.species.species_code.clone(),
                com_name: job.species.com_name.clone(),
                path: job.path.clone(),
                duration_secs: job.duration_secs,
            })
            .collect();

        // Bounded fan-out with a per-request timeout. Results are
        // reassembled by input index so completion order never affects
        // the final segment ordering, and one failure never aborts
        // siblings already in flight.
        let request_timeout = Duration::from_secs(self.settings.request_timeout_secs);
        let mut results: Vec<(usize, Result<()>)> = stream::iter(jobs.into_iter().map(|job| {
            let synth = &self.synth;
            async move {
                let outcome = match tokio::time::timeout(
                    request_timeout,
                    synth.synthesize(&job.species, job.duration_secs, &job.path),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::AudioBackendUnavailable(format!(
                        "synthesis timed out after {}s",
                        request_timeout.as_secs()
                    ))),
                };
                (job.index, outcome)
            }
        }))
        .buffer_unordered(self.settings.synth_concurrency)
        .collect()
        .await;

        results.sort_by_key(|(index, _)| *index);

        let mut segments = Vec::new();
        let mut skipped = Vec::new();
        for (index, outcome) in results {
            match outcome {
                Ok(()) => segments.push(planned[index].clone()),
                Err(e) => {
                    tracing::warn!(
                        species = %planned[index].com_name,
                        error = %e,
                        "Skipping species after synthesis failure"
                    );
                    skipped.push(planned[index].com_name.clone());
                }
            }
        }

        if segments.is_empty() {
            return Err(Error::AudioBackendUnavailable(format!(
                "all {} synthesis requests failed",
                species.len()
            )));
        }

        let combined_path = self.mix(&segments, total_duration_secs).await?;

        tracing::info!(
            %run_id,
            combined = %combined_path.display(),
            segments = segments.len(),
            skipped = skipped.len(),
            "Soundscape complete"
        );

        Ok(SoundscapeArtifact {
            run_id,
            combined_path: Some(combined_path),
            segments,
            skipped,
        })
    }

    /// Mix surviving segments into the combined track
    ///
    /// Overlay in per-species mode (every segment spans the full window),
    /// concatenation in shared-budget mode. Decode and resample are
    /// CPU-bound, so the mixdown runs on the blocking pool.
    async fn mix(&self, segments: &[SpeciesSegment], total_duration_secs: f64) -> Result<PathBuf> {
        let layout = match self.settings.duration_mode {
            DurationMode::PerSpecies => MixLayout::Overlay,
            DurationMode::SharedBudget => MixLayout::Concat,
        };

        let combined_path = self.settings.output_dir.join(format!(
            "soundscape_{}.wav",
            chrono::Utc::now().format("%Y%m%d%H%M%S")
        ));

        let paths: Vec<PathBuf> = segments.iter().map(|s| s.path.clone()).collect();
        let sample_rate = self.settings.sample_rate;
        let output = combined_path.clone();

        tokio::task::spawn_blocking(move || {
            mixer::mix_segments(&paths, layout, sample_rate, total_duration_secs, &output)
        })
        .await
        .map_err(|e| Error::Audio(format!("mixdown task failed: {}", e)))??;

        Ok(combined_path)
    }

    /// Per-species artifact path: spaces become underscores
    fn segment_path(&self, species: &SpeciesSummary) -> PathBuf {
        self.settings.output_dir.join(format!(
            "{}.{}",
            species_file_stem(&species.com_name),
            self.settings.audio_format
        ))
    }
}

/// Turn a species common name into a filesystem-safe file stem
///
/// Whitespace becomes underscores; path-hostile characters are dropped.
pub fn species_file_stem(name: &str) -> String {
    name.chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_alphanumeric() || c == '_' || c == '-' || c == '\'' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}
