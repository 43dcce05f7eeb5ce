//! Error types for the engine's control-side operations.
//!
//! The audio path has no error channel; everything here comes from
//! parameter lookup, state loading and preset files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from parameter, state and preset operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No parameter matches the given name or string ID
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// State blob is not valid JSON
    #[error("failed to parse state: {0}")]
    StateParse(#[from] serde_json::Error),

    /// State blob is JSON but not an ezfx state
    #[error("invalid state: {0}")]
    StateFormat(String),

    /// State blob was written by a newer format version
    #[error("unsupported state version {found} (expected {expected})")]
    UnsupportedStateVersion {
        /// Version found in the blob.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },

    /// Failed to parse a preset
    #[error("failed to parse preset: {0}")]
    PresetParse(#[from] toml::de::Error),

    /// Failed to serialize a preset
    #[error("failed to serialize preset: {0}")]
    PresetSerialize(#[from] toml::ser::Error),

    /// Failed to read or write a preset file
    #[error("preset file '{path}': {source}")]
    PresetIo {
        /// Path of the preset file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Slope value is not one of 12, 24, 36 or 48 dB/oct
    #[error("invalid slope for '{param}': {value} (expected 12, 24, 36 or 48)")]
    InvalidSlope {
        /// Parameter string ID.
        param: String,
        /// Rejected value.
        value: f32,
    },
}

impl EngineError {
    /// Create a preset I/O error.
    pub fn preset_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::PresetIo {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
