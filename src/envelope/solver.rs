use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ComputationError, Envelope, Result};
use crate::regression::PredictionSummary;

/// Envelope slopes with smaller magnitude are treated as horizontal.
pub const MIN_ENVELOPE_SLOPE: f64 = 1e-12;

/// Singular values below this are dropped by the least-squares solve.
const SVD_EPS: f64 = 1e-14;

/// A straight-line approximation `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearEnvelope {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearEnvelope {
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// The x where this line reaches `y`. Only meaningful for a
    /// non-degenerate slope.
    pub fn solve_for(&self, y: f64) -> f64 {
        (y - self.intercept) / self.slope
    }
}

/// Linearized lower and upper envelopes of a prediction interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvelopeFit {
    pub lower: LinearEnvelope,
    pub upper: LinearEnvelope,
}

/// Where the linearized envelopes cross the caller's limits.
///
/// The values are returned as computed: they may come in either order and
/// need not be finite. Interpreting them is up to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundIntersection {
    /// x where the lower envelope equals `y_min`.
    pub min_intersection: f64,
    /// x where the upper envelope equals `y_max`.
    pub max_intersection: f64,
}

impl BoundIntersection {
    /// True when both intersections are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.min_intersection.is_finite() && self.max_intersection.is_finite()
    }
}

/// First-order least-squares fit of `values` against `x`.
///
/// Solves the overdetermined system `[x 1] * [slope intercept]^T = values`
/// through an SVD, the same way a degree-1 polynomial fit does.
pub fn linearize(x: &[f64], values: &[f64]) -> Result<LinearEnvelope> {
    if x.len() != values.len() || x.len() < 2 {
        return Err(ComputationError::InvalidInterval(format!(
            "cannot linearize {} bounds against {} x values",
            values.len(),
            x.len()
        ))
        .into());
    }

    let design = DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { x[i] } else { 1.0 });
    let rhs = DVector::from_column_slice(values);
    let coefficients = design
        .svd(true, true)
        .solve(&rhs, SVD_EPS)
        .map_err(|e| ComputationError::InvalidInterval(e.to_string()))?;

    Ok(LinearEnvelope {
        slope: coefficients[0],
        intercept: coefficients[1],
    })
}

/// Linearize both envelopes of a prediction summary.
pub fn fit_envelopes(summary: &PredictionSummary) -> Result<EnvelopeFit> {
    let x = summary.x();
    let lower = linearize(&x, &summary.lower_bounds())?;
    let upper = linearize(&x, &summary.upper_bounds())?;
    debug!(
        lower_slope = lower.slope,
        lower_intercept = lower.intercept,
        upper_slope = upper.slope,
        upper_intercept = upper.intercept,
        "linearized prediction-interval envelopes"
    );
    Ok(EnvelopeFit { lower, upper })
}

/// Find the x-values where the linearized envelopes meet `y_min` and `y_max`.
///
/// The caller guarantees `y_min < y_max`. Fails with `DegenerateEnvelope`
/// when either fitted slope is effectively zero.
pub fn solve_intersections(
    envelopes: &EnvelopeFit,
    y_min: f64,
    y_max: f64,
) -> Result<BoundIntersection> {
    for (envelope, line) in [(Envelope::Lower, envelopes.lower), (Envelope::Upper, envelopes.upper)] {
        if line.slope.abs() < MIN_ENVELOPE_SLOPE {
            warn!(%envelope, slope = line.slope, "envelope slope too close to zero");
            return Err(ComputationError::DegenerateEnvelope {
                envelope,
                slope: line.slope,
            }
            .into());
        }
    }

    Ok(BoundIntersection {
        min_intersection: envelopes.lower.solve_for(y_min),
        max_intersection: envelopes.upper.solve_for(y_max),
    })
}
