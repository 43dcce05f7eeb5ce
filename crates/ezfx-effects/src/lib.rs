//! ezfx Effects - EQ chain and reverb stages
//!
//! This crate assembles the ezfx-core primitives into the stages of the
//! effect chain:
//!
//! - [`FilterStage`] - One bypassable biquad owned by a chain slot
//! - [`CutFilterBank`] - Four cascaded stages with selectable slope
//! - [`ChannelChain`] - Low-cut, peak and high-cut in series for one channel
//! - [`ReverbStage`] - Freeverb-style stereo reverb driven by
//!   [`ReverbParameters`]
//!
//! ## Example
//!
//! ```rust
//! use ezfx_effects::{ChainCoefficients, ChainSettings, ChannelChain};
//!
//! let settings = ChainSettings::default();
//! let coefficients = ChainCoefficients::design(&settings, 48000.0);
//!
//! let mut left = ChannelChain::new();
//! let mut right = ChannelChain::new();
//! left.apply(&coefficients);
//! right.apply(&coefficients);
//!
//! let mut block = [0.25f32; 64];
//! left.process(&mut block);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod channel_chain;
pub mod cut_bank;
pub mod filter_stage;
pub mod reverb;
mod tank;

pub use channel_chain::{
    ChainCoefficients, ChainPosition, ChainSettings, ChainStage, ChannelChain, StageCoefficients,
};
pub use cut_bank::CutFilterBank;
pub use filter_stage::FilterStage;
pub use reverb::{ReverbParameters, ReverbStage};
