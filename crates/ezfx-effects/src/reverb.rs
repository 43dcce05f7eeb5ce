//! Freeverb-style stereo reverb.
//!
//! Eight parallel damped comb filters feed four series allpass filters per
//! channel. The right channel's delay lines are 23 samples longer than the
//! left's, which decorrelates the two tails.
//!
//! # Signal Flow
//!
//! ```text
//!             +-> comb x8 (parallel, summed) -> allpass x4 -> outL
//! (L+R)*gain -+
//!             +-> comb x8 (+23 spread)       -> allpass x4 -> outR
//!
//! L' = outL*wet1 + outR*wet2 + L*dry
//! R' = outR*wet1 + outL*wet2 + R*dry
//! ```
//!
//! `wet1`/`wet2` split the wet level by stereo width; `dry` is the dry
//! level as given, so `wet_level + dry_level == 1` is an equal-sum
//! crossfade.
//!
//! Reference: Jezar at Dreampoint, "Freeverb" (public domain, 2000).

use crate::tank::{REFERENCE_RATE, Tank};

/// Extra delay applied to the right channel.
const STEREO_SPREAD: usize = 23;

const INPUT_GAIN: f32 = 0.015;
const WET_SCALE: f32 = 3.0;
const ROOM_SCALE: f32 = 0.28;
const ROOM_OFFSET: f32 = 0.7;
const DAMP_SCALE: f32 = 0.4;

fn usable_rate(sample_rate: f32) -> f32 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        REFERENCE_RATE
    }
}

fn build_tanks(sample_rate: f32) -> [Tank; 2] {
    [
        Tank::new(sample_rate, 0),
        Tank::new(sample_rate, STEREO_SPREAD),
    ]
}

/// User-level reverb settings, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    /// Room size; longer tails as it grows
    pub room_size: f32,
    /// High-frequency absorption
    pub damping: f32,
    /// Wet level
    pub wet_level: f32,
    /// Dry level
    pub dry_level: f32,
    /// Stereo width of the wet signal
    pub width: f32,
    /// Hold the current tail indefinitely and stop feeding new input
    pub freeze: bool,
}

impl ReverbParameters {
    /// Derives every setting from a single 0-100 "amount" control.
    ///
    /// Room size, damping, width and wet level all equal `amount / 100`;
    /// dry level is `1 - wet`; freeze is off.
    ///
    /// ```rust
    /// use ezfx_effects::ReverbParameters;
    ///
    /// let p = ReverbParameters::from_amount(40.0);
    /// assert_eq!(p.wet_level, 0.4);
    /// assert!((p.wet_level + p.dry_level - 1.0).abs() < 1e-6);
    /// ```
    pub fn from_amount(amount: f32) -> Self {
        let value = if amount.is_finite() {
            amount.clamp(0.0, 100.0) / 100.0
        } else {
            0.0
        };
        Self {
            room_size: value,
            damping: value,
            wet_level: value,
            dry_level: 1.0 - value,
            width: value,
            freeze: false,
        }
    }
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self::from_amount(0.0)
    }
}

/// Stereo reverb stage.
///
/// Gains and comb settings are recomputed in
/// [`set_parameters`](Self::set_parameters); processing itself never
/// allocates.
///
/// # Example
///
/// ```rust
/// use ezfx_effects::{ReverbParameters, ReverbStage};
///
/// let mut reverb = ReverbStage::new(48000.0);
/// reverb.set_parameters(ReverbParameters::from_amount(30.0));
///
/// let mut left = [0.0f32; 128];
/// let mut right = [0.0f32; 128];
/// left[0] = 1.0;
/// right[0] = 1.0;
/// reverb.process_stereo(&mut left, &mut right);
/// assert!((left[0] - 0.7).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct ReverbStage {
    tanks: [Tank; 2],
    params: ReverbParameters,
    sample_rate: f32,
    gain: f32,
    wet1: f32,
    wet2: f32,
    dry: f32,
}

impl ReverbStage {
    /// Creates a silent reverb at `sample_rate` with amount 0.
    pub fn new(sample_rate: f32) -> Self {
        let rate = usable_rate(sample_rate);
        let mut stage = Self {
            tanks: build_tanks(rate),
            params: ReverbParameters::default(),
            sample_rate: rate,
            gain: INPUT_GAIN,
            wet1: 0.0,
            wet2: 0.0,
            dry: 1.0,
        };
        stage.update();
        stage
    }

    /// Rebuilds every delay line for `sample_rate`. Allocates; call only
    /// while audio is stopped.
    ///
    /// Non-positive or non-finite rates fall back to the 44.1 kHz tunings.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = usable_rate(sample_rate);
        self.tanks = build_tanks(self.sample_rate);
        self.update();
    }

    /// Sample rate the delay lines are tuned for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Applies new settings. Tail state is kept.
    pub fn set_parameters(&mut self, params: ReverbParameters) {
        self.params = params;
        self.update();
    }

    /// Current settings.
    pub fn parameters(&self) -> &ReverbParameters {
        &self.params
    }

    fn update(&mut self) {
        let p = &self.params;
        let wet = p.wet_level.clamp(0.0, 1.0) * WET_SCALE;
        let width = p.width.clamp(0.0, 1.0);
        self.wet1 = 0.5 * wet * (1.0 + width);
        self.wet2 = 0.5 * wet * (1.0 - width);
        self.dry = p.dry_level.clamp(0.0, 1.0);

        let feedback = p.room_size.clamp(0.0, 1.0) * ROOM_SCALE + ROOM_OFFSET;
        let damp = p.damping.clamp(0.0, 1.0) * DAMP_SCALE;
        self.gain = if p.freeze { 0.0 } else { INPUT_GAIN };
        for tank in &mut self.tanks {
            if p.freeze {
                tank.freeze();
            } else {
                tank.set_decay(feedback, damp);
            }
        }
    }

    /// Processes a stereo pair in place. Extra samples in the longer slice
    /// are left untouched.
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        let [tank_l, tank_r] = &mut self.tanks;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let input = (*l + *r) * self.gain;
            let out_l = tank_l.process(input);
            let out_r = tank_r.process(input);
            *l = out_l * self.wet1 + out_r * self.wet2 + *l * self.dry;
            *r = out_r * self.wet1 + out_l * self.wet2 + *r * self.dry;
        }
    }

    /// Processes a single channel in place using the left tank.
    pub fn process_mono(&mut self, buffer: &mut [f32]) {
        let tank = &mut self.tanks[0];
        for sample in buffer.iter_mut() {
            let out = tank.process(*sample * self.gain);
            *sample = out * self.wet1 + *sample * self.dry;
        }
    }

    /// Silences every delay line.
    pub fn reset(&mut self) {
        for tank in &mut self.tanks {
            tank.clear();
        }
    }
}
