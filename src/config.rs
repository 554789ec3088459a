//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `FLUXBOUND_*` environment variables (`__` separates sections, e.g.
//! `FLUXBOUND_ANALYSIS__PREDICTION_INTERVAL_PCT=99`).
//!
//! Values are only loaded here; range and ordering checks belong to
//! [`AnalysisParams::validate`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chart::ChartSettings;
use crate::error::Result;
use crate::regression::{AnalysisParams, DEFAULT_PREDICTION_INTERVAL_PCT};

pub const ENV_PREFIX: &str = "FLUXBOUND";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub chart: ChartSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub prediction_interval_pct: f64,
    pub min_ele_flow: Option<f64>,
    pub max_ele_flow: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            prediction_interval_pct: DEFAULT_PREDICTION_INTERVAL_PCT,
            min_ele_flow: None,
            max_ele_flow: None,
        }
    }
}

impl AnalysisConfig {
    /// Request parameters, or None while either Ele.Flow limit is unset.
    pub fn params(&self) -> Option<AnalysisParams> {
        Some(
            AnalysisParams::new(self.min_ele_flow?, self.max_ele_flow?)
                .with_prediction_interval(self.prediction_interval_pct),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load defaults, the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings =
            config::Config::builder().add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }
}
