//! Common error and configuration types for Birdscape

pub mod config;
pub mod error;

pub use config::{DurationMode, Settings};
pub use error::{Error, Result};
