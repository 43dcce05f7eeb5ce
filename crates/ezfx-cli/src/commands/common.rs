//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use ezfx_engine::{Param, Preset, SharedParams};
use std::path::Path;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, f32), String> {
    let Some((key, value)) = s.split_once('=') else {
        return Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        ));
    };
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid value for '{}': '{}'", key, value))?;
    Ok((key.trim().to_string(), value))
}

/// Builds a parameter store from an optional preset file plus `key=value`
/// overrides given in user-facing units (slopes in dB/oct).
pub fn build_params(
    preset: Option<&Path>,
    overrides: &[(String, f32)],
) -> anyhow::Result<SharedParams> {
    let params = SharedParams::new();

    if let Some(path) = preset {
        let preset = Preset::load(path)?;
        preset
            .apply_to(&params)
            .with_context(|| format!("failed to apply preset '{}'", preset.name))?;
        tracing::info!(name = %preset.name, path = %path.display(), "loaded preset");
    }

    for (key, value) in overrides {
        let param = Param::lookup(key)?;
        let applied = params.set(param, param.stored_value(*value)?);
        if param.user_value(applied) != *value {
            tracing::warn!(
                param = param.descriptor().string_id,
                requested = *value,
                applied = %param.format_value(applied),
                "value clamped into range"
            );
        }
    }

    Ok(params)
}

/// RMS level of a sample slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Absolute peak of a sample slice.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezfx_core::Slope;

    #[test]
    fn parses_key_value() {
        assert_eq!(
            parse_key_val("peak_gain=-3.5").unwrap(),
            ("peak_gain".to_string(), -3.5)
        );
        assert!(parse_key_val("peak_gain").is_err());
        assert!(parse_key_val("peak_gain=loud").is_err());
    }

    #[test]
    fn overrides_use_user_units() {
        let params = build_params(
            None,
            &[
                ("lowcut_slope".to_string(), 36.0),
                ("Peak Freq".to_string(), 1200.0),
            ],
        )
        .unwrap();
        assert_eq!(params.slope(Param::LowCutSlope), Slope::Db36);
        assert_eq!(params.get(Param::PeakFreq), 1200.0);
    }

    #[test]
    fn bad_override_fails() {
        assert!(build_params(None, &[("drive".to_string(), 1.0)]).is_err());
        assert!(build_params(None, &[("highcut_slope".to_string(), 6.0)]).is_err());
    }

    #[test]
    fn levels() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(peak(&[0.1, -0.7, 0.3]), 0.7);
        assert!((rms(&[0.5, -0.5]) - 0.5).abs() < 1e-6);
    }
}
