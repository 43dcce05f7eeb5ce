//! Coefficient factory for the EQ stages.
//!
//! Pure functions from {frequency, Q, gain, slope, sample rate} to
//! [`CoefficientSet`]s. Nothing here holds state, so the same call made for
//! the left and right channel yields bit-identical coefficients.
//!
//! # Totality
//!
//! Every function returns finite coefficients for any input:
//!
//! - frequencies are clamped into `[1 Hz, 0.475 * sample_rate]`
//! - Q is floored at [`MIN_Q`]
//! - a non-positive or non-finite sample rate yields
//!   [`CoefficientSet::IDENTITY`]
//!
//! # Cut filters
//!
//! Low-cut and high-cut are Butterworth filters of order `N = 2 * stages`,
//! realized as `stages` cascaded second-order sections. Section `k` uses
//!
//! ```text
//! Q_k = 1 / (2 * cos((2k + 1) * pi / (2N)))
//! ```
//!
//! so the cascade has a maximally flat passband and rolls off at
//! 12 dB/oct per section.
//!
//! Reference: Robert Bristow-Johnson, "Cookbook formulae for audio EQ biquad
//! filter coefficients".

use core::f32::consts::PI;
use libm::{cosf, sinf, sqrtf};

use crate::CoefficientSet;
use crate::math::db_to_linear;

/// Number of second-order sections in a cut filter bank.
pub const MAX_CUT_SECTIONS: usize = 4;

/// Upper frequency bound as a fraction of the sample rate (95% of Nyquist).
pub const NYQUIST_GUARD: f32 = 0.475;

/// Smallest Q accepted by the designers.
pub const MIN_Q: f32 = 0.01;

/// Cut filter steepness.
///
/// The discriminant is the bank index: `Db12 = 0` activates one section,
/// `Db48 = 3` activates all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slope {
    /// 12 dB/oct, one section
    #[default]
    Db12 = 0,
    /// 24 dB/oct, two sections
    Db24 = 1,
    /// 36 dB/oct, three sections
    Db36 = 2,
    /// 48 dB/oct, four sections
    Db48 = 3,
}

impl Slope {
    /// All slopes in ascending steepness.
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Slope for a bank index, saturating above 3.
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Slope::Db12,
            1 => Slope::Db24,
            2 => Slope::Db36,
            _ => Slope::Db48,
        }
    }

    /// Bank index `0..=3`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of active second-order sections.
    #[inline]
    pub const fn stage_count(self) -> usize {
        self.index() + 1
    }

    /// Roll-off in dB per octave.
    pub const fn db_per_octave(self) -> u32 {
        12 * self.stage_count() as u32
    }

    /// Slope for an exact dB/oct figure (12, 24, 36 or 48).
    pub const fn from_db_per_octave(db: u32) -> Option<Self> {
        match db {
            12 => Some(Slope::Db12),
            24 => Some(Slope::Db24),
            36 => Some(Slope::Db36),
            48 => Some(Slope::Db48),
            _ => None,
        }
    }
}

/// Coefficients for every slot of a cut filter bank.
///
/// All [`MAX_CUT_SECTIONS`] slots are always populated; slots at or past
/// `active` hold identity coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutCoefficients {
    sections: [CoefficientSet; MAX_CUT_SECTIONS],
    active: usize,
}

impl CutCoefficients {
    /// A bank with no active sections.
    pub const IDENTITY: Self = Self {
        sections: [CoefficientSet::IDENTITY; MAX_CUT_SECTIONS],
        active: 0,
    };

    /// All section coefficients, active ones first.
    #[inline]
    pub fn sections(&self) -> &[CoefficientSet; MAX_CUT_SECTIONS] {
        &self.sections
    }

    /// Number of sections carrying a designed response.
    #[inline]
    pub fn active(&self) -> usize {
        self.active
    }

    /// Combined magnitude response of the active sections (linear).
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        self.sections[..self.active]
            .iter()
            .map(|s| s.magnitude_at(frequency, sample_rate))
            .product()
    }
}

impl Default for CutCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[inline]
fn valid_sample_rate(sample_rate: f32) -> bool {
    sample_rate.is_finite() && sample_rate > 0.0
}

/// Clamps `frequency` into `[1 Hz, 0.475 * sample_rate]`.
///
/// Non-finite frequencies map to the lower bound.
#[inline]
pub fn clamp_to_nyquist(frequency: f32, sample_rate: f32) -> f32 {
    let upper = (sample_rate * NYQUIST_GUARD).max(1.0);
    if frequency.is_finite() {
        frequency.clamp(1.0, upper)
    } else {
        1.0
    }
}

#[inline]
fn sanitize_q(q: f32) -> f32 {
    if q.is_finite() { q.max(MIN_Q) } else { MIN_Q }
}

/// Shared cookbook intermediates: (cos w0, alpha).
#[inline]
fn omega_terms(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    (cosf(omega), sinf(omega) / (2.0 * q))
}

fn lowpass(frequency: f32, q: f32, sample_rate: f32) -> CoefficientSet {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    CoefficientSet::from_raw(
        (1.0 - cos_omega) / 2.0,
        1.0 - cos_omega,
        (1.0 - cos_omega) / 2.0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

fn highpass(frequency: f32, q: f32, sample_rate: f32) -> CoefficientSet {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    CoefficientSet::from_raw(
        (1.0 + cos_omega) / 2.0,
        -(1.0 + cos_omega),
        (1.0 + cos_omega) / 2.0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

/// RBJ peaking EQ section.
///
/// `gain_db` of zero yields a unity-magnitude response at every frequency.
pub fn make_peak(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> CoefficientSet {
    if !valid_sample_rate(sample_rate) {
        return CoefficientSet::IDENTITY;
    }
    let frequency = clamp_to_nyquist(frequency, sample_rate);
    let q = sanitize_q(q);
    let gain_db = if gain_db.is_finite() { gain_db } else { 0.0 };

    let a = sqrtf(db_to_linear(gain_db));
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);

    CoefficientSet::from_raw(
        1.0 + alpha * a,
        -2.0 * cos_omega,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_omega,
        1.0 - alpha / a,
    )
}

/// Q of Butterworth section `k` in a cascade of `stages` sections.
#[inline]
pub fn butterworth_q(k: usize, stages: usize) -> f32 {
    let order = (2 * stages) as f32;
    1.0 / (2.0 * cosf((2 * k + 1) as f32 * PI / (2.0 * order)))
}

fn design_cut(
    frequency: f32,
    slope: Slope,
    sample_rate: f32,
    section: fn(f32, f32, f32) -> CoefficientSet,
) -> CutCoefficients {
    if !valid_sample_rate(sample_rate) {
        return CutCoefficients::IDENTITY;
    }
    let frequency = clamp_to_nyquist(frequency, sample_rate);
    let stages = slope.stage_count();

    let mut out = CutCoefficients {
        sections: [CoefficientSet::IDENTITY; MAX_CUT_SECTIONS],
        active: stages,
    };
    for (k, slot) in out.sections.iter_mut().take(stages).enumerate() {
        *slot = section(frequency, butterworth_q(k, stages), sample_rate);
    }
    out
}

/// Butterworth high-pass bank: attenuates below `frequency`.
pub fn make_low_cut(frequency: f32, slope: Slope, sample_rate: f32) -> CutCoefficients {
    design_cut(frequency, slope, sample_rate, highpass)
}

/// Butterworth low-pass bank: attenuates above `frequency`.
pub fn make_high_cut(frequency: f32, slope: Slope, sample_rate: f32) -> CutCoefficients {
    design_cut(frequency, slope, sample_rate, lowpass)
}
