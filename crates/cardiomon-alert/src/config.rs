use crate::window::MetricFamily;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the trend rule accumulates evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMode {
    /// Re-scan the whole lookback window on every pass.
    #[default]
    Stateless,
    /// Carry a run-length counter per patient and metric across passes.
    Incremental,
}

impl std::fmt::Display for TrendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendMode::Stateless => write!(f, "stateless"),
            TrendMode::Incremental => write!(f, "incremental"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Alert config: invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Tunables for the built-in rule set. Every field has a default, so an
/// empty `[alert]` table yields the standard clinical configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_blood_pressure_window_secs")]
    pub blood_pressure_window_secs: u64,
    #[serde(default = "default_saturation_window_secs")]
    pub saturation_window_secs: u64,
    #[serde(default = "default_cardiac_window_secs")]
    pub cardiac_window_secs: u64,
    #[serde(default = "default_hypoxemia_window_secs")]
    pub hypoxemia_window_secs: u64,
    #[serde(default)]
    pub trend_mode: TrendMode,
    /// Minimum step between consecutive readings for a trend, in metric units.
    #[serde(default = "default_trend_min_delta")]
    pub trend_min_delta: f64,
    /// Saturation drop between consecutive readings, in percent, that counts as rapid.
    #[serde(default = "default_rapid_drop_percent")]
    pub rapid_drop_percent: f64,
    #[serde(default = "default_ecg_window_size")]
    pub ecg_window_size: usize,
    #[serde(default = "default_ecg_multiplier")]
    pub ecg_multiplier: f64,
}

fn default_blood_pressure_window_secs() -> u64 {
    24 * 60 * 60
}

fn default_saturation_window_secs() -> u64 {
    10 * 60
}

fn default_cardiac_window_secs() -> u64 {
    60 * 60
}

fn default_hypoxemia_window_secs() -> u64 {
    100
}

fn default_trend_min_delta() -> f64 {
    10.0
}

fn default_rapid_drop_percent() -> f64 {
    5.0
}

fn default_ecg_window_size() -> usize {
    5
}

fn default_ecg_multiplier() -> f64 {
    1.5
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            blood_pressure_window_secs: default_blood_pressure_window_secs(),
            saturation_window_secs: default_saturation_window_secs(),
            cardiac_window_secs: default_cardiac_window_secs(),
            hypoxemia_window_secs: default_hypoxemia_window_secs(),
            trend_mode: TrendMode::default(),
            trend_min_delta: default_trend_min_delta(),
            rapid_drop_percent: default_rapid_drop_percent(),
            ecg_window_size: default_ecg_window_size(),
            ecg_multiplier: default_ecg_multiplier(),
        }
    }
}

impl AlertConfig {
    pub fn lookback(&self, family: MetricFamily) -> Duration {
        let secs = match family {
            MetricFamily::BloodPressure => self.blood_pressure_window_secs,
            MetricFamily::Saturation => self.saturation_window_secs,
            MetricFamily::HypotensiveHypoxemia => self.hypoxemia_window_secs,
            MetricFamily::Cardiac => self.cardiac_window_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ecg_window_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ecg_window_size",
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, value) in [
            ("trend_min_delta", self.trend_min_delta),
            ("rapid_drop_percent", self.rapid_drop_percent),
            ("ecg_multiplier", self.ecg_multiplier),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("expected a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}
