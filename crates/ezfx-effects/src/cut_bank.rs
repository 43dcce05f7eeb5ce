//! Selectable-order low-cut / high-cut cascade.
//!
//! A [`CutFilterBank`] always owns [`MAX_CUT_SECTIONS`] stages. The current
//! [`Slope`] decides how many of them are in the signal path:
//!
//! ```text
//! Db12:  [S0] -> (S1) -> (S2) -> (S3)
//! Db24:  [S0] -> [S1] -> (S2) -> (S3)
//! Db36:  [S0] -> [S1] -> [S2] -> (S3)
//! Db48:  [S0] -> [S1] -> [S2] -> [S3]
//!                                    ( ) = bypassed, state frozen
//! ```

use ezfx_core::{CutCoefficients, MAX_CUT_SECTIONS, Slope};

use crate::FilterStage;

/// Four cascaded [`FilterStage`]s with a selectable slope.
#[derive(Debug, Clone)]
pub struct CutFilterBank {
    stages: [FilterStage; MAX_CUT_SECTIONS],
    slope: Slope,
}

impl CutFilterBank {
    /// Creates a 12 dB/oct bank with pass-through coefficients.
    pub fn new() -> Self {
        let mut bank = Self {
            stages: core::array::from_fn(|_| FilterStage::new()),
            slope: Slope::Db12,
        };
        bank.set_slope(Slope::Db12);
        bank
    }

    /// Selects which stages are active. Coefficients are not touched.
    pub fn set_slope(&mut self, slope: Slope) {
        self.slope = slope;
        let active = slope.stage_count();
        for (i, stage) in self.stages.iter_mut().enumerate() {
            stage.set_bypassed(i >= active);
        }
    }

    /// Current slope.
    #[inline]
    pub fn slope(&self) -> Slope {
        self.slope
    }

    /// Number of stages currently in the signal path.
    pub fn active_stages(&self) -> usize {
        self.stages.iter().filter(|s| !s.is_bypassed()).count()
    }

    /// Installs designed coefficients and selects the matching slope.
    ///
    /// Only the active sections are written; inactive stages keep their
    /// previous coefficients along with their frozen state. A design with
    /// no active sections (degenerate sample rate) writes pass-through
    /// coefficients to every stage and keeps the current slope.
    pub fn apply(&mut self, coefficients: &CutCoefficients) {
        let active = coefficients.active();
        if active == 0 {
            for (stage, set) in self.stages.iter_mut().zip(coefficients.sections()) {
                stage.update_coefficients(*set);
            }
            return;
        }
        for (stage, set) in self
            .stages
            .iter_mut()
            .zip(coefficients.sections())
            .take(active)
        {
            stage.update_coefficients(*set);
        }
        self.set_slope(Slope::from_index(active - 1));
    }

    /// Runs the active stages over `buffer` in order.
    #[inline]
    pub fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for stage in &mut self.stages {
            stage.process_block_inplace(buffer);
        }
    }

    /// Stage at `index`, or `None` past [`MAX_CUT_SECTIONS`].
    pub fn stage(&self, index: usize) -> Option<&FilterStage> {
        self.stages.get(index)
    }

    /// Mutable stage at `index`.
    pub fn stage_mut(&mut self, index: usize) -> Option<&mut FilterStage> {
        self.stages.get_mut(index)
    }

    /// Clears every stage's delay-line state.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

impl Default for CutFilterBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezfx_core::{make_high_cut, make_low_cut};

    const SR: f32 = 48000.0;

    fn noise(len: usize) -> Vec<f32> {
        let mut seed = 0x1234_5678u32;
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                (seed as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_active_stages_follow_slope() {
        let mut bank = CutFilterBank::new();
        for slope in Slope::ALL {
            bank.set_slope(slope);
            assert_eq!(bank.active_stages(), slope.stage_count());
        }
    }

    #[test]
    fn test_apply_selects_slope() {
        let mut bank = CutFilterBank::new();
        bank.apply(&make_low_cut(200.0, Slope::Db36, SR));
        assert_eq!(bank.slope(), Slope::Db36);
        assert_eq!(bank.active_stages(), 3);
    }

    #[test]
    fn test_set_slope_keeps_coefficients() {
        let mut bank = CutFilterBank::new();
        let design = make_high_cut(5000.0, Slope::Db48, SR);
        bank.apply(&design);

        bank.set_slope(Slope::Db12);
        for (i, set) in design.sections().iter().enumerate() {
            assert_eq!(bank.stage(i).map(|s| *s.coefficients()), Some(*set));
        }
    }

    #[test]
    fn test_all_bypassed_is_bit_exact() {
        let mut bank = CutFilterBank::new();
        bank.apply(&make_low_cut(500.0, Slope::Db48, SR));
        for i in 0..MAX_CUT_SECTIONS {
            if let Some(stage) = bank.stage_mut(i) {
                stage.set_bypassed(true);
            }
        }

        let input = noise(512);
        let mut buffer = input.clone();
        bank.process_block_inplace(&mut buffer);

        for (a, b) in input.iter().zip(&buffer) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_inactive_stage_state_frozen() {
        let mut bank = CutFilterBank::new();
        bank.apply(&make_low_cut(500.0, Slope::Db48, SR));
        let mut buffer = noise(256);
        bank.process_block_inplace(&mut buffer);
        let frozen = bank.stage(3).map(FilterStage::state);

        bank.apply(&make_low_cut(500.0, Slope::Db12, SR));
        let mut buffer = noise(256);
        bank.process_block_inplace(&mut buffer);

        assert_eq!(bank.stage(3).map(FilterStage::state), frozen);
    }

    #[test]
    fn test_steeper_slope_attenuates_more() {
        let mut energies = Vec::new();
        for slope in Slope::ALL {
            let mut bank = CutFilterBank::new();
            bank.apply(&make_low_cut(1000.0, slope, SR));
            // 500 Hz sine, one octave below cutoff
            let mut buffer: Vec<f32> = (0..4800)
                .map(|n| libm::sinf(2.0 * core::f32::consts::PI * 500.0 * n as f32 / SR))
                .collect();
            bank.process_block_inplace(&mut buffer);
            let energy: f32 = buffer[2400..].iter().map(|x| x * x).sum();
            energies.push(energy);
        }
        for pair in energies.windows(2) {
            assert!(pair[1] < pair[0], "energies {energies:?}");
        }
    }
}
