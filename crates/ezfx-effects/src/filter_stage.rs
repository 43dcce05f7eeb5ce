//! A single bypassable second-order section.

use ezfx_core::{Biquad, CoefficientSet};

/// One biquad slot in a chain.
///
/// A bypassed stage passes audio through untouched and neither reads nor
/// writes its delay-line state, so re-enabling it resumes from where it
/// stopped.
#[derive(Debug, Clone, Default)]
pub struct FilterStage {
    biquad: Biquad,
    bypassed: bool,
}

impl FilterStage {
    /// Creates an active stage with pass-through coefficients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the coefficients. Delay-line state is kept.
    #[inline]
    pub fn update_coefficients(&mut self, coefficients: CoefficientSet) {
        self.biquad.set_coefficients(coefficients);
    }

    /// Current coefficients.
    #[inline]
    pub fn coefficients(&self) -> &CoefficientSet {
        self.biquad.coefficients()
    }

    /// Current delay-line state `(s1, s2)`.
    #[inline]
    pub fn state(&self) -> (f32, f32) {
        self.biquad.state()
    }

    /// Enables or disables bypass.
    #[inline]
    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    /// Returns `true` if the stage is bypassed.
    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Filters `buffer` in place. No-op when bypassed.
    #[inline]
    pub fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        if !self.bypassed {
            self.biquad.process_block_inplace(buffer);
        }
    }

    /// Clears delay-line state.
    pub fn reset(&mut self) {
        self.biquad.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezfx_core::make_peak;

    #[test]
    fn test_bypassed_stage_freezes_state() {
        let mut stage = FilterStage::new();
        stage.update_coefficients(make_peak(1000.0, 1.0, 12.0, 48000.0));

        let mut block = [0.5f32; 32];
        stage.process_block_inplace(&mut block);
        let state = stage.state();

        stage.set_bypassed(true);
        let mut block = [0.9f32; 32];
        stage.process_block_inplace(&mut block);

        assert_eq!(block, [0.9f32; 32]);
        assert_eq!(stage.state(), state);
    }

    #[test]
    fn test_update_keeps_state() {
        let mut stage = FilterStage::new();
        stage.update_coefficients(make_peak(1000.0, 1.0, 12.0, 48000.0));
        let mut block = [0.5f32; 32];
        stage.process_block_inplace(&mut block);
        let state = stage.state();

        stage.update_coefficients(make_peak(2000.0, 2.0, -6.0, 48000.0));
        assert_eq!(stage.state(), state);

        stage.reset();
        assert_eq!(stage.state(), (0.0, 0.0));
    }
}
