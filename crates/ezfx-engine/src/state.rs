//! Persisted processor state.
//!
//! State format: JSON object keyed by parameter string ID, wrapped with a
//! format tag and version.
//!
//! ```json
//! {"format": "ezfx", "version": 1,
//!  "params": {"lowcut_freq": 100.0, "lowcut_slope": 1.0, ...}}
//! ```
//!
//! Values are stored in their stored representation (slope choice index,
//! not dB/oct). Stable numeric IDs (`"100"`) are accepted as keys too, so
//! hand-edited blobs keyed by [`ParamId`](ezfx_core::ParamId) still load.
//!
//! Loading is all-or-nothing: a blob that fails to parse or has the wrong
//! shape resets every parameter to its default and reports the error.

use serde_json::{Map, Value};

use crate::error::{EngineError, Result};
use crate::params::{PARAM_COUNT, Param, SharedParams};

/// Format tag written into every blob.
pub const STATE_FORMAT: &str = "ezfx";

/// Version written by this build.
pub const STATE_VERSION: u32 = 1;

/// Serializes every parameter.
pub fn serialize(params: &SharedParams) -> Result<Vec<u8>> {
    let mut values = Map::new();
    for param in Param::ALL {
        values.insert(
            param.descriptor().string_id.to_string(),
            Value::from(f64::from(params.get(param))),
        );
    }

    let state = serde_json::json!({
        "format": STATE_FORMAT,
        "version": STATE_VERSION,
        "params": values,
    });
    Ok(serde_json::to_vec(&state)?)
}

/// Restores parameters from a blob produced by [`serialize`].
///
/// Unknown keys and non-numeric values are ignored, missing keys take their
/// defaults and out-of-range values clamp. On any error every parameter is
/// reset to its default before the error is returned.
pub fn deserialize(params: &SharedParams, bytes: &[u8]) -> Result<()> {
    match parse(bytes) {
        Ok(values) => {
            params.store_all(&values);
            tracing::debug!(?params, "state loaded");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejecting state, restoring defaults");
            params.reset_to_defaults();
            Err(e)
        }
    }
}

fn parse(bytes: &[u8]) -> Result<[f32; PARAM_COUNT]> {
    let value: Value = serde_json::from_slice(bytes)?;

    let Some(obj) = value.as_object() else {
        return Err(EngineError::StateFormat("state is not a JSON object".into()));
    };

    match obj.get("format").and_then(Value::as_str) {
        Some(STATE_FORMAT) => {}
        Some(other) => {
            return Err(EngineError::StateFormat(format!("unexpected format '{other}'")));
        }
        None => return Err(EngineError::StateFormat("missing 'format' tag".into())),
    }

    let version = obj
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| EngineError::StateFormat("missing 'version'".into()))?;
    if version != u64::from(STATE_VERSION) {
        return Err(EngineError::UnsupportedStateVersion {
            found: u32::try_from(version).unwrap_or(u32::MAX),
            expected: STATE_VERSION,
        });
    }

    let Some(entries) = obj.get("params").and_then(Value::as_object) else {
        return Err(EngineError::StateFormat("missing 'params' object".into()));
    };

    let mut values: [f32; PARAM_COUNT] =
        core::array::from_fn(|i| Param::ALL[i].descriptor().default);
    for (key, val) in entries {
        let Some(param) = param_for_key(key) else {
            continue;
        };
        let Some(v) = val.as_f64().map(|v| v as f32) else {
            continue;
        };
        if v.is_finite() {
            values[param.index()] = param.descriptor().clamp(v);
        }
    }
    Ok(values)
}

fn param_for_key(key: &str) -> Option<Param> {
    if let Ok(id) = key.parse::<u32>() {
        return Param::ALL.into_iter().find(|p| p.descriptor().id.0 == id);
    }
    Param::ALL
        .into_iter()
        .find(|p| p.descriptor().string_id == key)
}
