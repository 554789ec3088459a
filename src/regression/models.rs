use linregress::{FormulaRegressionBuilder, RegressionDataBuilder};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use super::params::validate_confidence;
use crate::common::types::{Observations, MIN_OBSERVATIONS};
use crate::error::{ComputationError, InputError, Result};

/// Ordinary least-squares fit of Ele.Flow on F.S.Flux.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl FitResult {
    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Prediction summary for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRow {
    /// The observation's F.S.Flux.
    pub x: f64,
    /// Fitted Ele.Flow at `x`.
    pub mean: f64,
    /// Standard error of the fitted mean.
    pub mean_se: f64,
    /// Confidence interval of the mean.
    pub mean_ci_lower: f64,
    pub mean_ci_upper: f64,
    /// Prediction interval for a new observation at `x`.
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl PredictionRow {
    /// True when `y` lies inside the prediction interval (inclusive).
    pub fn contains(&self, y: f64) -> bool {
        y >= self.lower_bound && y <= self.upper_bound
    }

    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}

/// Per-observation prediction intervals, in observation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSummary {
    /// Coverage of the interval in percent.
    pub prediction_interval_pct: f64,
    pub rows: Vec<PredictionRow>,
}

impl PredictionSummary {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn x(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.x).collect()
    }

    pub fn lower_bounds(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.lower_bound).collect()
    }

    pub fn upper_bounds(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.upper_bound).collect()
    }

    /// Mean prediction-interval width across observations.
    pub fn mean_width(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.rows.iter().map(PredictionRow::width).sum::<f64>() / self.rows.len() as f64
    }

    /// For each observation, whether its y lies inside its interval.
    pub fn inside_mask(&self, y: &[f64]) -> Vec<bool> {
        self.rows
            .iter()
            .zip(y)
            .map(|(row, &yi)| row.contains(yi))
            .collect()
    }
}

/// Everything the regression engine produces for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionFit {
    pub fit: FitResult,
    pub summary: PredictionSummary,
    pub fitted_values: Vec<f64>,
}

/// Fit OLS with intercept and compute per-observation prediction intervals.
///
/// The interval at each observed x is
/// `y_hat +/- t * sqrt(se_mean^2 + s^2)` with
/// `se_mean = s * sqrt(1/n + (x - x_mean)^2 / sum_sq_dev)`,
/// `s^2 = SSR / (n - 2)` and `t` the two-sided Student's t quantile with
/// n - 2 degrees of freedom.
pub fn fit_with_prediction_interval(
    observations: &Observations,
    prediction_interval_pct: f64,
) -> Result<RegressionFit> {
    validate_confidence(prediction_interval_pct)?;

    let n = observations.len();
    if n < MIN_OBSERVATIONS {
        return Err(InputError::InsufficientRows {
            required: MIN_OBSERVATIONS,
            found: n,
        }
        .into());
    }

    let x_vals = &observations.x;
    let x_mean: f64 = x_vals.iter().sum::<f64>() / n as f64;
    let sum_sq_dev: f64 = x_vals.iter().map(|&x| (x - x_mean).powi(2)).sum();
    let sum_sq: f64 = x_vals.iter().map(|&x| x * x).sum();
    // Relative to the magnitude of x so the check holds in any unit.
    if sum_sq_dev <= f64::EPSILON * sum_sq {
        return Err(ComputationError::ConstantRegressor.into());
    }

    let data = vec![
        ("Y".to_string(), observations.y.clone()),
        ("X".to_string(), x_vals.clone()),
    ];
    let regression_data = RegressionDataBuilder::new()
        .build_from(data)
        .map_err(|e| ComputationError::RegressionFailed(e.to_string()))?;

    let model = FormulaRegressionBuilder::new()
        .data(&regression_data)
        .formula("Y ~ X")
        .fit()
        .map_err(|e| ComputationError::RegressionFailed(e.to_string()))?;

    // parameters() returns [intercept, slope]
    let params = model.parameters();
    let fit = FitResult {
        slope: params[1],
        intercept: params[0],
        r_squared: model.rsquared(),
    };

    // scale() is SSR / (n - 2)
    let residual_var = model.scale().max(0.0);
    let residual_se = residual_var.sqrt();

    let df = (n - 2) as f64;
    let t_dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| ComputationError::InvalidInterval(format!("t-distribution: {}", e)))?;
    let alpha = 1.0 - prediction_interval_pct / 100.0;
    let t_value = t_dist.inverse_cdf(1.0 - alpha / 2.0);

    debug!(
        slope = fit.slope,
        intercept = fit.intercept,
        r_squared = fit.r_squared,
        residual_se,
        t_value,
        "fitted ols model"
    );

    let mut rows = Vec::with_capacity(n);
    let mut fitted_values = Vec::with_capacity(n);
    for &x in x_vals {
        let y_hat = fit.predict(x);
        let mean_se = residual_se * (1.0 / n as f64 + (x - x_mean).powi(2) / sum_sq_dev).sqrt();
        let obs_se = (mean_se.powi(2) + residual_var).sqrt();
        let mean_half = t_value * mean_se;
        let obs_half = t_value * obs_se;

        if !y_hat.is_finite() || !obs_half.is_finite() {
            return Err(ComputationError::InvalidInterval(format!(
                "x={}, y_hat={}, half_width={}",
                x, y_hat, obs_half
            ))
            .into());
        }

        fitted_values.push(y_hat);
        rows.push(PredictionRow {
            x,
            mean: y_hat,
            mean_se,
            mean_ci_lower: y_hat - mean_half,
            mean_ci_upper: y_hat + mean_half,
            lower_bound: y_hat - obs_half,
            upper_bound: y_hat + obs_half,
        });
    }

    Ok(RegressionFit {
        fit,
        summary: PredictionSummary {
            prediction_interval_pct,
            rows,
        },
        fitted_values,
    })
}
