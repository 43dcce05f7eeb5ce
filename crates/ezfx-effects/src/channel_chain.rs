//! Per-channel EQ chain: low-cut, peak, high-cut.
//!
//! Coefficients are designed once per block into a [`ChainCoefficients`]
//! bundle and handed by reference to every channel's [`ChannelChain`]. The
//! bundle is plain `Copy` data; each chain keeps its own filter state, so
//! the channels never share anything mutable.
//!
//! # Signal Flow
//!
//! ```text
//! input -> [LowCut bank] -> [Peak] -> [HighCut bank] -> output
//! ```
//!
//! Stages are addressed through [`ChainPosition`] and driven through the
//! [`ChainStage`] trait, so the chain walks an ordered list instead of
//! hard-coding each call.

use ezfx_core::{CoefficientSet, CutCoefficients, Slope, make_high_cut, make_low_cut, make_peak};

use crate::{CutFilterBank, FilterStage};

/// Stable addresses of the three chain stages, in signal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainPosition {
    /// High-pass bank at the head of the chain
    LowCut,
    /// Peaking EQ section
    Peak,
    /// Low-pass bank at the tail of the chain
    HighCut,
}

impl ChainPosition {
    /// All positions in processing order.
    pub const ALL: [ChainPosition; 3] = [
        ChainPosition::LowCut,
        ChainPosition::Peak,
        ChainPosition::HighCut,
    ];
}

/// Coefficients for one chain stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageCoefficients {
    /// A single second-order section
    Single(CoefficientSet),
    /// A cut bank design
    Cut(CutCoefficients),
}

/// Capability shared by every stage a [`ChannelChain`] holds.
pub trait ChainStage {
    /// Installs new coefficients without clearing filter state.
    ///
    /// A stage ignores a [`StageCoefficients`] variant it cannot use.
    fn apply_coefficients(&mut self, coefficients: &StageCoefficients);

    /// Filters `buffer` in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]);

    /// Clears filter state.
    fn reset(&mut self);
}

impl ChainStage for FilterStage {
    fn apply_coefficients(&mut self, coefficients: &StageCoefficients) {
        if let StageCoefficients::Single(set) = coefficients {
            self.update_coefficients(*set);
        }
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        FilterStage::process_block_inplace(self, buffer);
    }

    fn reset(&mut self) {
        FilterStage::reset(self);
    }
}

impl ChainStage for CutFilterBank {
    fn apply_coefficients(&mut self, coefficients: &StageCoefficients) {
        if let StageCoefficients::Cut(cut) = coefficients {
            self.apply(cut);
        }
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        CutFilterBank::process_block_inplace(self, buffer);
    }

    fn reset(&mut self) {
        CutFilterBank::reset(self);
    }
}

/// EQ settings a chain is designed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    /// Low-cut corner in Hz
    pub lowcut_freq: f32,
    /// Low-cut steepness
    pub lowcut_slope: Slope,
    /// Peak center in Hz
    pub peak_freq: f32,
    /// Peak gain in dB
    pub peak_gain_db: f32,
    /// Peak Q
    pub peak_q: f32,
    /// High-cut corner in Hz
    pub highcut_freq: f32,
    /// High-cut steepness
    pub highcut_slope: Slope,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            lowcut_freq: 20.0,
            lowcut_slope: Slope::Db12,
            peak_freq: 750.0,
            peak_gain_db: 0.0,
            peak_q: 1.0,
            highcut_freq: 10000.0,
            highcut_slope: Slope::Db12,
        }
    }
}

/// Coefficient bundle for a whole chain, computed once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainCoefficients {
    /// Low-cut bank design
    pub low_cut: CutCoefficients,
    /// Peak section
    pub peak: CoefficientSet,
    /// High-cut bank design
    pub high_cut: CutCoefficients,
}

impl ChainCoefficients {
    /// Designs every stage from `settings`.
    pub fn design(settings: &ChainSettings, sample_rate: f32) -> Self {
        Self {
            low_cut: make_low_cut(settings.lowcut_freq, settings.lowcut_slope, sample_rate),
            peak: make_peak(
                settings.peak_freq,
                settings.peak_q,
                settings.peak_gain_db,
                sample_rate,
            ),
            high_cut: make_high_cut(settings.highcut_freq, settings.highcut_slope, sample_rate),
        }
    }

    /// Coefficients for the stage at `position`.
    pub fn for_position(&self, position: ChainPosition) -> StageCoefficients {
        match position {
            ChainPosition::LowCut => StageCoefficients::Cut(self.low_cut),
            ChainPosition::Peak => StageCoefficients::Single(self.peak),
            ChainPosition::HighCut => StageCoefficients::Cut(self.high_cut),
        }
    }

    /// Combined magnitude response of the whole chain (linear).
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        self.low_cut.magnitude_at(frequency, sample_rate)
            * self.peak.magnitude_at(frequency, sample_rate)
            * self.high_cut.magnitude_at(frequency, sample_rate)
    }
}

/// The EQ chain for one audio channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelChain {
    low_cut: CutFilterBank,
    peak: FilterStage,
    high_cut: CutFilterBank,
}

impl ChannelChain {
    /// Creates a chain with pass-through coefficients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage at `position` as a trait object.
    pub fn stage_mut(&mut self, position: ChainPosition) -> &mut dyn ChainStage {
        match position {
            ChainPosition::LowCut => &mut self.low_cut,
            ChainPosition::Peak => &mut self.peak,
            ChainPosition::HighCut => &mut self.high_cut,
        }
    }

    /// Low-cut bank.
    pub fn low_cut(&self) -> &CutFilterBank {
        &self.low_cut
    }

    /// Peak stage.
    pub fn peak(&self) -> &FilterStage {
        &self.peak
    }

    /// High-cut bank.
    pub fn high_cut(&self) -> &CutFilterBank {
        &self.high_cut
    }

    /// Installs a coefficient bundle on every stage.
    pub fn apply(&mut self, coefficients: &ChainCoefficients) {
        for position in ChainPosition::ALL {
            self.stage_mut(position)
                .apply_coefficients(&coefficients.for_position(position));
        }
    }

    /// Filters `buffer` in place through low-cut, peak and high-cut.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for position in ChainPosition::ALL {
            self.stage_mut(position).process_block_inplace(buffer);
        }
    }

    /// Clears all filter state.
    pub fn reset(&mut self) {
        for position in ChainPosition::ALL {
            self.stage_mut(position).reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| libm::sinf(2.0 * core::f32::consts::PI * freq * n as f32 / SR))
            .collect()
    }

    fn rms(buffer: &[f32]) -> f32 {
        libm::sqrtf(buffer.iter().map(|x| x * x).sum::<f32>() / buffer.len() as f32)
    }

    #[test]
    fn test_defaults_transparent_in_band() {
        let coefficients = ChainCoefficients::design(&ChainSettings::default(), SR);

        for freq in [200.0, 1000.0] {
            let mut chain = ChannelChain::new();
            chain.apply(&coefficients);

            let input = sine(freq, 9600);
            let mut output = input.clone();
            chain.process(&mut output);

            // Skip the settling transient of the 20 Hz high-pass
            let ratio = rms(&output[4800..]) / rms(&input[4800..]);
            assert!((ratio - 1.0).abs() < 0.01, "{freq} Hz ratio {ratio}");
        }
    }

    #[test]
    fn test_chain_order_matches_positions() {
        let mut chain = ChannelChain::new();
        let settings = ChainSettings {
            lowcut_slope: Slope::Db48,
            highcut_slope: Slope::Db24,
            ..ChainSettings::default()
        };
        chain.apply(&ChainCoefficients::design(&settings, SR));

        assert_eq!(chain.low_cut().slope(), Slope::Db48);
        assert_eq!(chain.high_cut().slope(), Slope::Db24);
    }

    #[test]
    fn test_peak_change_keeps_cut_state() {
        let mut settings = ChainSettings {
            lowcut_freq: 200.0,
            lowcut_slope: Slope::Db24,
            highcut_freq: 4000.0,
            ..ChainSettings::default()
        };
        let mut chain = ChannelChain::new();
        chain.apply(&ChainCoefficients::design(&settings, SR));

        let mut block = sine(440.0, 256);
        chain.process(&mut block);

        let low_state = chain.low_cut().stage(0).map(FilterStage::state);
        let high_state = chain.high_cut().stage(0).map(FilterStage::state);

        settings.peak_gain_db = 9.0;
        chain.apply(&ChainCoefficients::design(&settings, SR));

        assert_eq!(chain.low_cut().stage(0).map(FilterStage::state), low_state);
        assert_eq!(chain.high_cut().stage(0).map(FilterStage::state), high_state);
        assert_ne!(low_state, Some((0.0, 0.0)));
    }

    #[test]
    fn test_identical_coefficients_across_channels() {
        let coefficients = ChainCoefficients::design(&ChainSettings::default(), SR);
        let mut left = ChannelChain::new();
        let mut right = ChannelChain::new();
        left.apply(&coefficients);
        right.apply(&coefficients);

        let mut l = sine(300.0, 512);
        let mut r = l.clone();
        left.process(&mut l);
        right.process(&mut r);
        assert_eq!(l, r);

        // Independent state: driving only the left chain leaves the right untouched
        let before = right.peak().state();
        left.process(&mut sine(900.0, 128));
        assert_eq!(right.peak().state(), before);
    }

    #[test]
    fn test_mismatched_coefficients_ignored() {
        let mut stage = FilterStage::new();
        let before = *stage.coefficients();
        ChainStage::apply_coefficients(
            &mut stage,
            &StageCoefficients::Cut(CutCoefficients::IDENTITY),
        );
        assert_eq!(*stage.coefficients(), before);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut chain = ChannelChain::new();
        chain.apply(&ChainCoefficients::design(&ChainSettings::default(), SR));
        chain.process(&mut sine(100.0, 256));

        chain.reset();
        assert_eq!(chain.peak().state(), (0.0, 0.0));
        assert_eq!(chain.low_cut().stage(0).map(FilterStage::state), Some((0.0, 0.0)));
    }
}
