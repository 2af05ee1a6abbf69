// src/config.rs

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WayfindError;
use crate::navigation::DEFAULT_HEADING_SMOOTHING;

/// Runtime knobs for the search and guidance loops.
///
/// The arrival radius and the low-accuracy threshold are constants, see
/// [`crate::navigation::ARRIVAL_THRESHOLD_M`] and
/// [`crate::location::LOW_ACCURACY_THRESHOLD_M`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WayfindConfig {
    /// Quiet period before a typed query is evaluated.
    pub search_debounce_ms: u64,
    /// Display refresh period; heading samples are applied once per frame.
    pub frame_interval_ms: u64,
    /// EMA factor for device headings (1.0 disables smoothing).
    pub heading_smoothing: f64,
}

impl Default for WayfindConfig {
    fn default() -> Self {
        WayfindConfig {
            search_debounce_ms: 300,
            frame_interval_ms: 16,
            heading_smoothing: DEFAULT_HEADING_SMOOTHING,
        }
    }
}

impl WayfindConfig {
    /// Parses a JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, WayfindError> {
        let config: WayfindConfig = serde_json::from_str(json)?;
        config.validate()
    }

    /// Builds a config from a loose parameter map, e.g. one fetched from a
    /// remote settings endpoint. Unknown keys are ignored.
    pub fn from_params(params: &HashMap<String, Value>) -> Result<Self, WayfindError> {
        let mut config = WayfindConfig::default();
        if let Some(value) = get_param(params, "search_debounce_ms")? {
            config.search_debounce_ms = value;
        }
        if let Some(value) = get_param(params, "frame_interval_ms")? {
            config.frame_interval_ms = value;
        }
        if let Some(value) = get_param(params, "heading_smoothing")? {
            config.heading_smoothing = value;
        }
        config.validate()
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    fn validate(self) -> Result<Self, WayfindError> {
        if self.search_debounce_ms == 0 {
            return Err(WayfindError::InvalidConfig(
                "search_debounce_ms must be greater than zero".to_string(),
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(WayfindError::InvalidConfig(
                "frame_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.heading_smoothing) {
            return Err(WayfindError::InvalidConfig(format!(
                "heading_smoothing must be within [0, 1], got {}",
                self.heading_smoothing
            )));
        }
        Ok(self)
    }
}

/// Retrieves a parameter by name and deserializes it into the requested type.
fn get_param<T: serde::de::DeserializeOwned>(
    params: &HashMap<String, Value>,
    key: &str,
) -> Result<Option<T>, WayfindError> {
    params
        .get(key)
        .map(|value| {
            serde_json::from_value(value.clone()).map_err(|e| {
                WayfindError::InvalidConfig(format!("parameter {}: {}", key, e))
            })
        })
        .transpose()
}
