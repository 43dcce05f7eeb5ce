//! One channel of the Freeverb network.
//!
//! Eight damped feedback combs run in parallel and their sum passes through
//! four Schroeder allpasses in series. All combs in a tank share one
//! feedback and one damping value, so they are stored once on the tank and
//! the combs themselves are just delay lines plus a one-pole lowpass state.
//!
//! ```text
//! comb:    y = d[n]           lp = y*(1-damp) + lp*damp     d <- x + lp*feedback
//! allpass: y = d[n] - x                                     d <- x + d[n]*0.5
//! ```

use ezfx_core::{DelayLine, flush_denormal};

/// Comb delay times at the 44.1 kHz reference rate.
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass delay times at the 44.1 kHz reference rate.
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];

const ALLPASS_FEEDBACK: f32 = 0.5;

/// Rate the delay tunings are specified at.
pub(crate) const REFERENCE_RATE: f32 = 44100.0;

/// Rescales a 44.1 kHz delay length to `sample_rate`, never below one sample.
fn scale_to_rate(samples: usize, sample_rate: f32) -> usize {
    (libm::roundf(samples as f32 * sample_rate / REFERENCE_RATE) as usize).max(1)
}

#[derive(Debug, Clone)]
pub(crate) struct Tank {
    combs: [DelayLine; 8],
    lowpass: [f32; 8],
    allpasses: [DelayLine; 4],
    feedback: f32,
    damp: f32,
}

impl Tank {
    /// Builds a tank tuned for `sample_rate`, with every delay `spread`
    /// samples longer than the reference tuning before rescaling.
    pub(crate) fn new(sample_rate: f32, spread: usize) -> Self {
        Self {
            combs: core::array::from_fn(|i| {
                DelayLine::new(scale_to_rate(COMB_TUNINGS_44K[i] + spread, sample_rate))
            }),
            lowpass: [0.0; 8],
            allpasses: core::array::from_fn(|i| {
                DelayLine::new(scale_to_rate(ALLPASS_TUNINGS_44K[i] + spread, sample_rate))
            }),
            feedback: 0.0,
            damp: 0.0,
        }
    }

    /// Sets comb feedback and damping, both clamped to `[0, 1]`.
    pub(crate) fn set_decay(&mut self, feedback: f32, damp: f32) {
        self.feedback = feedback.clamp(0.0, 1.0);
        self.damp = damp.clamp(0.0, 1.0);
    }

    /// Unity feedback with no damping: whatever is circulating in the combs
    /// repeats unchanged until the decay is set again.
    pub(crate) fn freeze(&mut self) {
        self.set_decay(1.0, 0.0);
    }

    #[inline]
    pub(crate) fn process(&mut self, input: f32) -> f32 {
        let feedback = self.feedback;
        let damp = self.damp;

        let mut out = 0.0;
        for (line, lp) in self.combs.iter_mut().zip(self.lowpass.iter_mut()) {
            let delayed = line.read();
            *lp = flush_denormal(delayed * (1.0 - damp) + *lp * damp);
            line.write(input + *lp * feedback);
            out += delayed;
        }

        for line in &mut self.allpasses {
            let delayed = line.read();
            line.write(flush_denormal(out + delayed * ALLPASS_FEEDBACK));
            out = delayed - out;
        }
        out
    }

    pub(crate) fn clear(&mut self) {
        for line in self.combs.iter_mut().chain(self.allpasses.iter_mut()) {
            line.clear();
        }
        self.lowpass = [0.0; 8];
    }
}
