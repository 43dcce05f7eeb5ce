//! ezfx Core - DSP primitives for the ezfx effect chain
//!
//! This crate provides the building blocks the EQ and reverb stages are made
//! of, designed for real-time audio processing with zero allocation in the
//! audio path.
//!
//! # Core Abstractions
//!
//! ## Filters
//!
//! - [`CoefficientSet`] - Normalized coefficients of one second-order section
//! - [`Biquad`] - Transposed direct form II biquad whose state survives
//!   coefficient replacement
//! - [`coefficients`] - Coefficient factory: peaking EQ and Butterworth
//!   low-cut/high-cut banks with selectable [`Slope`]
//!
//! ## Delay
//!
//! - [`DelayLine`] - Fixed-length circular delay the reverb's combs and
//!   allpasses are built on
//!
//! ## Parameters
//!
//! - [`ParamDescriptor`] - Range, default, unit and stable ID of a control
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ezfx-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod coefficients;
pub mod delay;
pub mod math;
pub mod param_info;

pub use biquad::{Biquad, CoefficientSet};
pub use coefficients::{
    CutCoefficients, MAX_CUT_SECTIONS, Slope, clamp_to_nyquist, make_high_cut, make_low_cut,
    make_peak,
};
pub use delay::DelayLine;
pub use math::{db_to_linear, flush_denormal, linear_to_db};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamUnit};
