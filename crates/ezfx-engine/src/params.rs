//! Shared parameter store and per-block snapshot.
//!
//! Values are `f32` bit-cast into `AtomicU32`, one slot per [`Param`].
//! A control thread writes through [`SharedParams::set`]; the audio thread
//! reads everything once per block through [`SharedParams::snapshot`].
//! Each slot is read atomically, but a snapshot taken while a control
//! thread is writing several values may see some old and some new.
//!
//! Slope parameters store the choice index `0..=3` (12, 24, 36, 48 dB/oct).

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use ezfx_core::{ParamDescriptor, ParamFlags, ParamId, ParamUnit, Slope};
use ezfx_effects::{ChainSettings, ReverbParameters};

use crate::error::{EngineError, Result};

/// Number of user-facing parameters.
pub const PARAM_COUNT: usize = 8;

const STEPPED: ParamFlags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);

static DESCRIPTORS: [ParamDescriptor; PARAM_COUNT] = [
    ParamDescriptor::frequency_hz("LowCut Freq", "LoCut", 20.0, 2000.0, 20.0)
        .with_id(ParamId(100), "lowcut_freq"),
    ParamDescriptor::frequency_hz("HighCut Freq", "HiCut", 2000.0, 10000.0, 10000.0)
        .with_id(ParamId(101), "highcut_freq"),
    ParamDescriptor::frequency_hz("Peak Freq", "PkFreq", 20.0, 10000.0, 750.0)
        .with_id(ParamId(102), "peak_freq"),
    ParamDescriptor::gain_db("Peak Gain", "PkGain", -24.0, 24.0, 0.0)
        .with_id(ParamId(103), "peak_gain"),
    ParamDescriptor::custom("Peak Width", "PkWidth", ParamUnit::None, 0.1, 10.0, 1.0, 0.05)
        .with_id(ParamId(104), "peak_width"),
    ParamDescriptor::custom("Reverb Value", "Reverb", ParamUnit::Percent, 0.0, 100.0, 0.0, 1.0)
        .with_id(ParamId(105), "reverb_value"),
    ParamDescriptor::custom(
        "LowCut Slope",
        "LoSlope",
        ParamUnit::DecibelsPerOctave,
        0.0,
        3.0,
        0.0,
        1.0,
    )
    .with_id(ParamId(106), "lowcut_slope")
    .with_flags(STEPPED),
    ParamDescriptor::custom(
        "HighCut Slope",
        "HiSlope",
        ParamUnit::DecibelsPerOctave,
        0.0,
        3.0,
        0.0,
        1.0,
    )
    .with_id(ParamId(107), "highcut_slope")
    .with_flags(STEPPED),
];

/// The user-facing controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    /// Low-cut corner frequency
    LowCutFreq,
    /// High-cut corner frequency
    HighCutFreq,
    /// Peak center frequency
    PeakFreq,
    /// Peak gain in dB
    PeakGain,
    /// Peak Q
    PeakWidth,
    /// Reverb amount, 0-100
    ReverbValue,
    /// Low-cut slope choice
    LowCutSlope,
    /// High-cut slope choice
    HighCutSlope,
}

impl Param {
    /// Every parameter in storage order.
    pub const ALL: [Param; PARAM_COUNT] = [
        Param::LowCutFreq,
        Param::HighCutFreq,
        Param::PeakFreq,
        Param::PeakGain,
        Param::PeakWidth,
        Param::ReverbValue,
        Param::LowCutSlope,
        Param::HighCutSlope,
    ];

    /// Storage slot.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Static metadata.
    #[inline]
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// Returns `true` for the two slope choices.
    pub const fn is_slope(self) -> bool {
        matches!(self, Param::LowCutSlope | Param::HighCutSlope)
    }

    /// Looks up a parameter by display name (case-insensitive) or string ID.
    ///
    /// ```rust
    /// use ezfx_engine::Param;
    ///
    /// assert_eq!(Param::from_name("peak gain"), Some(Param::PeakGain));
    /// assert_eq!(Param::from_name("reverb_value"), Some(Param::ReverbValue));
    /// assert_eq!(Param::from_name("drive"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Param> {
        let name = name.trim();
        Param::ALL.into_iter().find(|p| {
            let desc = p.descriptor();
            desc.string_id == name || desc.name.eq_ignore_ascii_case(name)
        })
    }

    /// Like [`from_name`](Self::from_name) but reports unknown names.
    pub fn lookup(name: &str) -> Result<Param> {
        Param::from_name(name).ok_or_else(|| EngineError::UnknownParameter(name.to_string()))
    }

    /// Converts a user-facing value to the stored representation.
    ///
    /// Slopes are given in dB/oct and must be exactly 12, 24, 36 or 48;
    /// every other parameter passes through unchanged.
    pub fn stored_value(self, value: f32) -> Result<f32> {
        if !self.is_slope() {
            return Ok(value);
        }
        let slope = (value.is_finite() && value.fract() == 0.0 && value >= 0.0)
            .then(|| Slope::from_db_per_octave(value as u32))
            .flatten()
            .ok_or_else(|| EngineError::InvalidSlope {
                param: self.descriptor().string_id.to_string(),
                value,
            })?;
        Ok(slope.index() as f32)
    }

    /// Converts a stored value to its user-facing form (dB/oct for slopes).
    pub fn user_value(self, stored: f32) -> f32 {
        if self.is_slope() {
            Slope::from_index(stored as usize).db_per_octave() as f32
        } else {
            stored
        }
    }

    /// Formats a stored value for display.
    ///
    /// ```rust
    /// use ezfx_engine::Param;
    ///
    /// assert_eq!(Param::LowCutSlope.format_value(1.0), "24 dB/oct");
    /// assert_eq!(Param::PeakGain.format_value(-3.5), "-3.5 dB");
    /// ```
    pub fn format_value(self, stored: f32) -> String {
        let desc = self.descriptor();
        let suffix = desc.unit.suffix();
        match desc.unit {
            ParamUnit::DecibelsPerOctave => format!("{}{suffix}", self.user_value(stored)),
            ParamUnit::Hertz | ParamUnit::Percent => format!("{stored:.0}{suffix}"),
            ParamUnit::Decibels => format!("{stored:.1}{suffix}"),
            ParamUnit::None => format!("{stored:.2}{suffix}"),
        }
    }
}

/// Every parameter descriptor in storage order.
pub fn descriptors() -> &'static [ParamDescriptor; PARAM_COUNT] {
    &DESCRIPTORS
}

/// Lock-free parameter store shared between control and audio threads.
///
/// Cloning is cheap and every clone sees the same values.
#[derive(Clone)]
pub struct SharedParams {
    values: Arc<[AtomicU32; PARAM_COUNT]>,
}

impl SharedParams {
    /// Creates a store holding every default.
    pub fn new() -> Self {
        Self {
            values: Arc::new(core::array::from_fn(|i| {
                AtomicU32::new(DESCRIPTORS[i].default.to_bits())
            })),
        }
    }

    /// Current value (lock-free).
    #[inline]
    pub fn get(&self, param: Param) -> f32 {
        f32::from_bits(self.values[param.index()].load(Ordering::Acquire))
    }

    /// Writes a value (lock-free), clamped into range. Stepped parameters
    /// are rounded to the nearest choice.
    ///
    /// Non-finite values are ignored. Returns the value now stored.
    pub fn set(&self, param: Param, value: f32) -> f32 {
        if !value.is_finite() {
            tracing::warn!(
                param = param.descriptor().string_id,
                value,
                "ignoring non-finite value"
            );
            return self.get(param);
        }
        let clamped = param.descriptor().clamp(value);
        self.values[param.index()].store(clamped.to_bits(), Ordering::Release);
        tracing::debug!(param = param.descriptor().string_id, value = clamped, "parameter set");
        clamped
    }

    /// Reads a parameter by display name or string ID, in user-facing
    /// units (slopes in dB/oct).
    pub fn get_by_name(&self, name: &str) -> Result<f32> {
        let param = Param::lookup(name)?;
        Ok(param.user_value(self.get(param)))
    }

    /// Writes a parameter by display name or string ID from its user-facing
    /// value (slopes in dB/oct), clamping into range.
    ///
    /// Returns the user-facing value now stored.
    pub fn set_by_name(&self, name: &str, value: f32) -> Result<f32> {
        let param = Param::lookup(name).inspect_err(|_| {
            tracing::warn!(name, "unknown parameter");
        })?;
        let stored = self.set(param, param.stored_value(value)?);
        Ok(param.user_value(stored))
    }

    /// Current slope choice of a slope parameter; `Db12` for any other.
    pub fn slope(&self, param: Param) -> Slope {
        if param.is_slope() {
            Slope::from_index(self.get(param) as usize)
        } else {
            Slope::Db12
        }
    }

    /// Selects a slope choice.
    pub fn set_slope(&self, param: Param, slope: Slope) {
        if param.is_slope() {
            self.set(param, slope.index() as f32);
        }
    }

    /// Restores every parameter to its default.
    pub fn reset_to_defaults(&self) {
        for (slot, desc) in self.values.iter().zip(DESCRIPTORS.iter()) {
            slot.store(desc.default.to_bits(), Ordering::Release);
        }
    }

    /// Stores a full set of values at once. Values must already be in range.
    pub(crate) fn store_all(&self, values: &[f32; PARAM_COUNT]) {
        for (slot, value) in self.values.iter().zip(values) {
            slot.store(value.to_bits(), Ordering::Release);
        }
    }

    /// Reads every parameter once.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            lowcut_freq: self.get(Param::LowCutFreq),
            highcut_freq: self.get(Param::HighCutFreq),
            peak_freq: self.get(Param::PeakFreq),
            peak_gain_db: self.get(Param::PeakGain),
            peak_width: self.get(Param::PeakWidth),
            reverb_amount: self.get(Param::ReverbValue),
            lowcut_slope: self.slope(Param::LowCutSlope),
            highcut_slope: self.slope(Param::HighCutSlope),
        }
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for param in Param::ALL {
            map.entry(&param.descriptor().string_id, &self.get(param));
        }
        map.finish()
    }
}

/// Immutable copy of every control, taken once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    /// Low-cut corner in Hz
    pub lowcut_freq: f32,
    /// High-cut corner in Hz
    pub highcut_freq: f32,
    /// Peak center in Hz
    pub peak_freq: f32,
    /// Peak gain in dB
    pub peak_gain_db: f32,
    /// Peak Q
    pub peak_width: f32,
    /// Reverb amount, 0-100
    pub reverb_amount: f32,
    /// Low-cut slope
    pub lowcut_slope: Slope,
    /// High-cut slope
    pub highcut_slope: Slope,
}

impl ParameterSnapshot {
    /// EQ part of the snapshot.
    pub fn chain_settings(&self) -> ChainSettings {
        ChainSettings {
            lowcut_freq: self.lowcut_freq,
            lowcut_slope: self.lowcut_slope,
            peak_freq: self.peak_freq,
            peak_gain_db: self.peak_gain_db,
            peak_q: self.peak_width,
            highcut_freq: self.highcut_freq,
            highcut_slope: self.highcut_slope,
        }
    }

    /// Reverb settings derived from the amount control.
    pub fn reverb_parameters(&self) -> ReverbParameters {
        ReverbParameters::from_amount(self.reverb_amount)
    }
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        SharedParams::new().snapshot()
    }
}
