use serde::{Deserialize, Serialize};

use crate::error::{InputError, RangeError, Result};

/// Prediction interval used when the caller does not choose one.
pub const DEFAULT_PREDICTION_INTERVAL_PCT: f64 = 95.0;

/// Parameters of one analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Lower Ele.Flow limit.
    pub min_ele_flow: f64,
    /// Upper Ele.Flow limit, must exceed `min_ele_flow`.
    pub max_ele_flow: f64,
    /// Prediction interval coverage in percent, exclusive (0, 100).
    pub prediction_interval_pct: f64,
}

impl AnalysisParams {
    /// Parameters with the default 95 % prediction interval.
    pub fn new(min_ele_flow: f64, max_ele_flow: f64) -> Self {
        Self {
            min_ele_flow,
            max_ele_flow,
            prediction_interval_pct: DEFAULT_PREDICTION_INTERVAL_PCT,
        }
    }

    pub fn with_prediction_interval(mut self, pct: f64) -> Self {
        self.prediction_interval_pct = pct;
        self
    }

    /// Check the confidence level first, then the bound ordering.
    pub fn validate(&self) -> Result<()> {
        validate_confidence(self.prediction_interval_pct)?;
        validate_bounds(self.min_ele_flow, self.max_ele_flow)?;
        Ok(())
    }
}

/// Reject confidence levels outside the open interval (0, 100).
pub fn validate_confidence(pct: f64) -> std::result::Result<(), RangeError> {
    if pct > 0.0 && pct < 100.0 {
        Ok(())
    } else {
        Err(RangeError::OutOfRangeConfidence(pct))
    }
}

/// Reject non-finite bounds and `min >= max`.
pub fn validate_bounds(min: f64, max: f64) -> std::result::Result<(), InputError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(InputError::InvalidBoundOrdering { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_interval() {
        let params = AnalysisParams::new(15.0, 45.0);
        assert_eq!(params.prediction_interval_pct, 95.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_confidence_bounds_are_exclusive() {
        for pct in [0.0, 100.0, -1.0, 120.0, f64::NAN] {
            assert!(validate_confidence(pct).is_err(), "pct={}", pct);
        }
        for pct in [0.1, 50.0, 68.0, 99.7] {
            assert!(validate_confidence(pct).is_ok(), "pct={}", pct);
        }
    }

    #[test]
    fn test_bound_ordering() {
        let err = AnalysisParams::new(45.0, 15.0).validate().unwrap_err();
        assert!(matches!(err, Error::Input(InputError::InvalidBoundOrdering { .. })));
        assert!(AnalysisParams::new(10.0, 10.0).validate().is_err());
        assert!(AnalysisParams::new(f64::NEG_INFINITY, 10.0).validate().is_err());
    }

    #[test]
    fn test_confidence_checked_before_bounds() {
        let err = AnalysisParams::new(45.0, 15.0)
            .with_prediction_interval(0.0)
            .validate()
            .unwrap_err();
        assert!(err.is_range());
    }
}
