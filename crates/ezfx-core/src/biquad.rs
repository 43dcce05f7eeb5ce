//! Biquad (bi-quadratic) filter structure.
//!
//! Splits a second-order IIR section into its two halves:
//!
//! - [`CoefficientSet`] - the five normalized coefficients, a plain `Copy`
//!   value that can be handed to any number of filters
//! - [`Biquad`] - the running filter, which owns its delay-line state
//!
//! Replacing a filter's coefficients never touches its state, so parameter
//! changes do not click.

use core::f32::consts::PI;
use libm::{cosf, sinf, sqrtf};

/// Normalized coefficients for one second-order section.
///
/// Stored with `a0` divided out:
/// ```text
/// H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSet {
    /// Feedforward coefficients
    pub b0: f32,
    /// Feedforward coefficient for x[n-1]
    pub b1: f32,
    /// Feedforward coefficient for x[n-2]
    pub b2: f32,
    /// Feedback coefficient for y[n-1]
    pub a1: f32,
    /// Feedback coefficient for y[n-2]
    pub a2: f32,
}

impl CoefficientSet {
    /// Pass-through coefficients: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Builds a set from raw cookbook coefficients, normalizing by `a0`.
    ///
    /// Falls back to [`IDENTITY`](Self::IDENTITY) if normalization would
    /// produce non-finite values.
    pub fn from_raw(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        let set = Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        };
        if set.is_finite() { set } else { Self::IDENTITY }
    }

    /// Returns `true` if every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// Returns `true` if both poles lie strictly inside the unit circle.
    ///
    /// Uses the stability triangle for a second-order denominator:
    /// `|a2| < 1` and `|a1| < 1 + a2`.
    pub fn is_stable(&self) -> bool {
        self.is_finite() && self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    /// Magnitude of the frequency response at `frequency` Hz (linear).
    ///
    /// Evaluates `|H(e^jw)|` directly; intended for analysis and tests, not
    /// for the audio path.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        let w = 2.0 * PI * frequency / sample_rate;
        let (c1, s1) = (cosf(w), sinf(w));
        let (c2, s2) = (cosf(2.0 * w), sinf(2.0 * w));

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        sqrtf((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im))
    }
}

impl Default for CoefficientSet {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Second-order IIR filter in transposed direct form II.
///
/// ```text
/// y[n]  = b0*x[n] + s1
/// s1'   = b1*x[n] - a1*y[n] + s2
/// s2'   = b2*x[n] - a2*y[n]
/// ```
///
/// Two state variables per instance. Each audio channel must own its own
/// `Biquad`; only the [`CoefficientSet`] may be shared, by value.
///
/// # Example
///
/// ```rust
/// use ezfx_core::{Biquad, make_peak};
///
/// let mut biquad = Biquad::new();
/// biquad.set_coefficients(make_peak(1000.0, 1.0, 6.0, 48000.0));
/// let output = biquad.process(0.5);
/// assert!(output.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    coefficients: CoefficientSet,
    s1: f32,
    s2: f32,
}

impl Biquad {
    /// Creates a new biquad with pass-through coefficients and silent state.
    pub fn new() -> Self {
        Self {
            coefficients: CoefficientSet::IDENTITY,
            s1: 0.0,
            s2: 0.0,
        }
    }

    /// Replaces the coefficients. Delay-line state is preserved.
    #[inline]
    pub fn set_coefficients(&mut self, coefficients: CoefficientSet) {
        self.coefficients = coefficients;
    }

    /// Current coefficients.
    #[inline]
    pub fn coefficients(&self) -> &CoefficientSet {
        &self.coefficients
    }

    /// Current delay-line state `(s1, s2)`.
    #[inline]
    pub fn state(&self) -> (f32, f32) {
        (self.s1, self.s2)
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let output = c.b0 * input + self.s1;
        self.s1 = c.b1 * input - c.a1 * output + self.s2;
        self.s2 = c.b2 * input - c.a2 * output;
        output
    }

    /// Processes a block of samples in place.
    #[inline]
    pub fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clears the delay-line state without changing coefficients.
    pub fn clear(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biquad_passthrough() {
        let mut biquad = Biquad::new();

        for i in 0..10 {
            let input = i as f32 * 0.1;
            assert_eq!(biquad.process(input), input);
        }
    }

    #[test]
    fn test_biquad_clear() {
        let mut biquad = Biquad::new();
        biquad.set_coefficients(CoefficientSet::from_raw(0.2, 0.4, 0.2, 1.0, -0.5, 0.2));

        for _ in 0..10 {
            biquad.process(1.0);
        }
        assert_ne!(biquad.state(), (0.0, 0.0));

        biquad.clear();
        assert_eq!(biquad.state(), (0.0, 0.0));
    }

    #[test]
    fn test_set_coefficients_preserves_state() {
        let mut biquad = Biquad::new();
        biquad.set_coefficients(CoefficientSet::from_raw(0.2, 0.4, 0.2, 1.0, -0.5, 0.2));
        for _ in 0..16 {
            biquad.process(0.7);
        }
        let before = biquad.state();

        biquad.set_coefficients(CoefficientSet::from_raw(0.1, 0.2, 0.1, 1.0, -0.8, 0.3));
        assert_eq!(biquad.state(), before);
    }

    #[test]
    fn test_from_raw_normalizes() {
        let set = CoefficientSet::from_raw(2.0, 4.0, 2.0, 2.0, 1.0, 0.5);
        assert_eq!(set.b0, 1.0);
        assert_eq!(set.b1, 2.0);
        assert_eq!(set.a1, 0.5);
        assert_eq!(set.a2, 0.25);
    }

    #[test]
    fn test_from_raw_rejects_zero_a0() {
        let set = CoefficientSet::from_raw(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(set, CoefficientSet::IDENTITY);
    }

    #[test]
    fn test_identity_magnitude_is_unity() {
        for freq in [20.0, 1000.0, 15000.0] {
            let mag = CoefficientSet::IDENTITY.magnitude_at(freq, 48000.0);
            assert!((mag - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stability_triangle() {
        assert!(CoefficientSet::IDENTITY.is_stable());
        let unstable = CoefficientSet {
            a2: 1.2,
            ..CoefficientSet::IDENTITY
        };
        assert!(!unstable.is_stable());
    }
}
