//! TOML presets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::params::{Param, SharedParams};

/// A named set of parameter values.
///
/// Values are user-facing: slopes in dB/oct, everything else in the
/// parameter's own unit. Parameters not listed keep their current value
/// when the preset is applied.
///
/// # TOML Format
///
/// ```toml
/// name = "Warm Room"
/// description = "Gentle low cut into a medium room"
///
/// [params]
/// lowcut_freq = 80.0
/// lowcut_slope = 24
/// reverb_value = 30.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Values keyed by parameter string ID.
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

impl Preset {
    /// Create a new empty preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: BTreeMap::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a user-facing value.
    pub fn with_param(mut self, param: Param, value: f32) -> Self {
        self.params.insert(param.descriptor().string_id.to_string(), value);
        self
    }

    /// Capture every current value of `params`.
    pub fn from_params(name: impl Into<String>, params: &SharedParams) -> Self {
        Param::ALL.into_iter().fold(Self::new(name), |preset, p| {
            preset.with_param(p, p.user_value(params.get(p)))
        })
    }

    /// Load and validate a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::preset_io(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let preset: Preset = toml::from_str(toml_str)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::preset_io(parent, e))?;
        }

        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| EngineError::preset_io(path, e))?;
        tracing::info!(path = %path.display(), name = %self.name, "preset saved");
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every key names a parameter and every slope is a valid choice.
    pub fn validate(&self) -> Result<()> {
        for (key, &value) in &self.params {
            Param::lookup(key)?.stored_value(value)?;
        }
        Ok(())
    }

    /// Writes every listed value into `params`, clamping into range.
    ///
    /// Validates first; on error nothing is written.
    pub fn apply_to(&self, params: &SharedParams) -> Result<()> {
        let mut staged = Vec::with_capacity(self.params.len());
        for (key, &value) in &self.params {
            let param = Param::lookup(key)?;
            staged.push((param, param.stored_value(value)?));
        }
        for (param, stored) in staged {
            params.set(param, stored);
        }
        tracing::debug!(name = %self.name, count = self.params.len(), "preset applied");
        Ok(())
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
