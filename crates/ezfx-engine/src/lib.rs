//! Host-facing engine for the ezfx EQ + reverb chain.
//!
//! This crate provides:
//!
//! - **Processing**: [`EffectProcessor`] runs low-cut, peak and high-cut
//!   filters per channel into a stereo reverb, planar or interleaved
//! - **Parameters**: [`SharedParams`], a lock-free store read once per block
//!   as a [`ParameterSnapshot`]
//! - **Analyzer taps**: [`AnalyzerReader`] pulls post-EQ blocks written
//!   wait-free by the audio thread
//! - **Persistence**: JSON state blobs and TOML [`Preset`] files
//!
//! ## Quick Start
//!
//! ```rust
//! use ezfx_engine::{ChannelLayout, EffectProcessor, SharedParams};
//!
//! let params = SharedParams::new();
//! let mut fx = EffectProcessor::new(params.clone(), ChannelLayout::Stereo);
//! fx.prepare(48000.0, 512);
//!
//! fx.set_parameter("Peak Gain", 6.0).unwrap();
//! fx.set_parameter("LowCut Slope", 24.0).unwrap();
//!
//! let mut interleaved = vec![0.0f32; 2 * 1024];
//! fx.process_interleaved(&mut interleaved, 2);
//!
//! let blob = fx.serialize_state();
//! fx.deserialize_state(&blob).unwrap();
//! ```

pub mod analyzer;
pub mod error;
pub mod params;
pub mod preset;
pub mod processor;
pub mod state;

pub use analyzer::{AnalyzerBlock, AnalyzerFifo, AnalyzerReader};
pub use error::{EngineError, Result};
pub use params::{PARAM_COUNT, Param, ParameterSnapshot, SharedParams, descriptors};
pub use preset::Preset;
pub use processor::{ChannelLayout, EffectProcessor};
