//! Parameter metadata for discoverable controls.
//!
//! Each user-facing control is described by a [`ParamDescriptor`] carrying
//! its display name, range, default, unit and two stable identities:
//!
//! - [`ParamId`] - numeric ID for hosts and automation
//! - `string_id` - snake_case key used by saved state and presets
//!
//! Descriptors are `Copy` and `'static`, so a full table of them can live in
//! a `const` and be consulted from the audio thread.
//!
//! # Example
//!
//! ```rust
//! use ezfx_core::{ParamDescriptor, ParamId};
//!
//! let cutoff = ParamDescriptor::frequency_hz("LowCut Freq", "LoCut", 20.0, 2000.0, 20.0)
//!     .with_id(ParamId(100), "lowcut_freq");
//!
//! assert_eq!(cutoff.clamp(5.0), 20.0);
//! assert_eq!(cutoff.string_id, "lowcut_freq");
//! ```

/// Stable parameter identifier that survives reordering.
///
/// Once assigned, a `ParamId` must never change for a given parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub u32);

/// Parameter capability flags.
///
/// Use [`union`](Self::union) to combine.
///
/// ```rust
/// use ezfx_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!ParamFlags::AUTOMATABLE.contains(ParamFlags::STEPPED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// Host can automate this parameter (default for all params).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps; values snap to the nearest step.
    pub const STEPPED: Self = Self(1 << 1);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB)
    Decibels,
    /// Hertz (Hz)
    Hertz,
    /// Percentage (%)
    Percent,
    /// Filter slope choice, displayed as dB per octave
    DecibelsPerOctave,
    /// No unit - for dimensionless values such as Q
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use ezfx_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Percent => "%",
            ParamUnit::DecibelsPerOctave => " dB/oct",
            ParamUnit::None => "",
        }
    }
}

/// Metadata for one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g., "Peak Gain").
    pub name: &'static str,

    /// Short name for narrow displays, max 8 characters.
    pub short_name: &'static str,

    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,

    /// Minimum allowed value.
    pub min: f32,

    /// Maximum allowed value.
    pub max: f32,

    /// Value after construction or reset. Always within `[min, max]`.
    pub default: f32,

    /// Recommended step increment. For [`ParamFlags::STEPPED`] parameters
    /// this is also the snapping grid used by [`clamp`](Self::clamp).
    pub step: f32,

    /// Stable numeric ID. Default: `ParamId(0)` (unassigned).
    pub id: ParamId,

    /// Stable snake_case key for saved state and presets.
    pub string_id: &'static str,

    /// Capability flags. Default: [`ParamFlags::AUTOMATABLE`].
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Frequency parameter in Hz.
    pub const fn frequency_hz(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Hertz,
            min,
            max,
            default,
            step: 1.0,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Gain parameter in decibels.
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Decibels,
            min,
            max,
            default,
            step: 0.5,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Parameter with an arbitrary unit and step.
    pub const fn custom(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
        step: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            step,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Sets the stable parameter ID and string ID.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the parameter flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns `true` for parameters that snap to `step`.
    #[inline]
    pub const fn is_stepped(&self) -> bool {
        self.flags.contains(ParamFlags::STEPPED)
    }

    /// Clamps a value to this parameter's valid range.
    ///
    /// Stepped parameters are additionally rounded to the nearest step.
    ///
    /// ```rust
    /// use ezfx_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::gain_db("Peak Gain", "Gain", -24.0, 24.0, 0.0);
    /// assert_eq!(desc.clamp(-100.0), -24.0);
    /// assert_eq!(desc.clamp(100.0), 24.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        let value = if self.is_stepped() && self.step > 0.0 {
            self.min + libm::roundf((value - self.min) / self.step) * self.step
        } else {
            value
        };
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}
