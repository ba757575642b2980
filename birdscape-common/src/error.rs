//! Common error types for Birdscape

use thiserror::Error;

/// Common result type for Birdscape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the species pipeline and soundscape stages
///
/// Registry faults are split into two kinds: `RegistryUnavailable` may be
/// transient, `RegistryAuth` is a permanent configuration fault. Callers
/// adding retry must apply it only to the former.
#[derive(Error, Debug)]
pub enum Error {
    /// Coordinate outside [-90,90] x [-180,180]
    #[error("coordinate out of range: latitude {lat}, longitude {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// Search succeeded but returned no hotspots (recoverable, user-facing)
    #[error("no birding hotspots with recent activity near this location")]
    NoHotspotsFound,

    /// Observation registry returned a non-success response or was unreachable
    #[error("observation registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Observation registry rejected the configured API key (401/403)
    #[error("observation registry rejected credentials: {0}")]
    RegistryAuth(String),

    /// Every per-species audio synthesis request failed
    #[error("audio backend unavailable: {0}")]
    AudioBackendUnavailable(String),

    /// Requested soundscape duration outside (0, max]
    #[error("soundscape duration must be in (0, {max}] seconds, got {seconds}")]
    InvalidDuration { seconds: f64, max: f64 },

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to parse an upstream response body
    #[error("parse error: {0}")]
    Parse(String),

    /// Audio decode, resample, or mixdown error
    #[error("audio processing error: {0}")]
    Audio(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
