//! Regression engine: OLS fit of Ele.Flow on F.S.Flux with per-observation
//! prediction intervals.

pub mod models;
pub mod params;

pub use models::{fit_with_prediction_interval, FitResult, PredictionRow, PredictionSummary, RegressionFit};
pub use params::{AnalysisParams, DEFAULT_PREDICTION_INTERVAL_PCT};
