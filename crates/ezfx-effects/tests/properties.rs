//! Property-based tests for the EQ chain and reverb stages.
//!
//! Any settings inside the documented control ranges must keep both the
//! chain and the reverb finite and bounded.

use ezfx_core::Slope;
use ezfx_effects::{ChainCoefficients, ChainSettings, ChannelChain, ReverbParameters, ReverbStage};
use proptest::prelude::*;

fn settings_strategy() -> impl Strategy<Value = ChainSettings> {
    (
        20.0f32..=2000.0,
        0usize..4,
        20.0f32..=10000.0,
        -24.0f32..=24.0,
        0.1f32..=10.0,
        2000.0f32..=10000.0,
        0usize..4,
    )
        .prop_map(
            |(lowcut_freq, lo, peak_freq, peak_gain_db, peak_q, highcut_freq, hi)| ChainSettings {
                lowcut_freq,
                lowcut_slope: Slope::from_index(lo),
                peak_freq,
                peak_gain_db,
                peak_q,
                highcut_freq,
                highcut_slope: Slope::from_index(hi),
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The EQ chain stays finite for any in-range settings.
    #[test]
    fn chain_finite_output(
        settings in settings_strategy(),
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut chain = ChannelChain::new();
        chain.apply(&ChainCoefficients::design(&settings, 48000.0));

        for _ in 0..64 {
            let mut block = input;
            chain.process(&mut block);
            for &out in &block {
                prop_assert!(out.is_finite(), "{:?} produced {}", settings, out);
            }
        }
    }

    /// Redesigning mid-stream never produces non-finite output.
    #[test]
    fn chain_survives_parameter_jumps(
        a in settings_strategy(),
        b in settings_strategy(),
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut chain = ChannelChain::new();
        for round in 0..32 {
            let settings = if round % 2 == 0 { a } else { b };
            chain.apply(&ChainCoefficients::design(&settings, 44100.0));
            let mut block = input;
            chain.process(&mut block);
            prop_assert!(block.iter().all(|x| x.is_finite()));
        }
    }

    /// The reverb stays finite and bounded across the amount range.
    #[test]
    fn reverb_bounded(
        amount in 0.0f32..=100.0,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut reverb = ReverbStage::new(48000.0);
        reverb.set_parameters(ReverbParameters::from_amount(amount));

        for _ in 0..128 {
            let mut left = input;
            let mut right = input;
            reverb.process_stereo(&mut left, &mut right);
            for (&l, &r) in left.iter().zip(&right) {
                prop_assert!(l.is_finite() && r.is_finite());
                prop_assert!(l.abs() < 1000.0 && r.abs() < 1000.0, "l={} r={}", l, r);
            }
        }
    }
}
