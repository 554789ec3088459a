//! The analysis pipeline: Validator -> Regression Engine -> Solver.
//!
//! Every call owns its inputs and threads the request parameters through
//! explicitly; nothing is shared between requests.

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::common::table_reader::read_csv_table;
use crate::common::types::{Observations, RawTable};
use crate::common::validator::{validate_columns, validate_table};
use crate::envelope::{fit_envelopes, solve_intersections, BoundIntersection, EnvelopeFit};
use crate::error::Result;
use crate::regression::{fit_with_prediction_interval, AnalysisParams, RegressionFit};

/// Headline numbers of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub min_intersection: f64,
    pub max_intersection: f64,
}

impl AnalysisResult {
    pub fn intersection(&self) -> BoundIntersection {
        BoundIntersection {
            min_intersection: self.min_intersection,
            max_intersection: self.max_intersection,
        }
    }
}

/// Everything computed for one request, ready for reporting or charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub params: AnalysisParams,
    pub observations: Observations,
    pub regression: RegressionFit,
    pub envelopes: EnvelopeFit,
    pub result: AnalysisResult,
}

impl Analysis {
    /// Observations lying outside their own prediction interval.
    pub fn outside_interval_count(&self) -> usize {
        self.regression
            .summary
            .inside_mask(&self.observations.y)
            .iter()
            .filter(|&&inside| !inside)
            .count()
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            result: self.result,
            min_ele_flow: self.params.min_ele_flow,
            max_ele_flow: self.params.max_ele_flow,
            prediction_interval_pct: self.params.prediction_interval_pct,
            observations: self.observations.len(),
            outside_interval: self.outside_interval_count(),
            range_available: self.result.intersection().is_finite(),
        }
    }
}

/// Flat, serializable summary of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub min_ele_flow: f64,
    pub max_ele_flow: f64,
    pub prediction_interval_pct: f64,
    pub observations: usize,
    pub outside_interval: usize,
    pub range_available: bool,
}

/// Run the engine and solver on already validated observations.
pub fn analyze_observations(observations: Observations, params: &AnalysisParams) -> Result<Analysis> {
    params.validate()?;

    let regression = fit_with_prediction_interval(&observations, params.prediction_interval_pct)?;
    let envelopes = fit_envelopes(&regression.summary)?;
    let intersection = solve_intersections(&envelopes, params.min_ele_flow, params.max_ele_flow)?;

    let result = AnalysisResult {
        slope: regression.fit.slope,
        intercept: regression.fit.intercept,
        r_squared: regression.fit.r_squared,
        min_intersection: intersection.min_intersection,
        max_intersection: intersection.max_intersection,
    };
    info!(
        rows = observations.len(),
        slope = result.slope,
        intercept = result.intercept,
        r_squared = result.r_squared,
        min_intersection = result.min_intersection,
        max_intersection = result.max_intersection,
        "analysis complete"
    );

    Ok(Analysis {
        params: *params,
        observations,
        regression,
        envelopes,
        result,
    })
}

/// Validate a raw table, then analyze it.
pub fn analyze_table(table: &RawTable, params: &AnalysisParams) -> Result<Analysis> {
    let observations = validate_table(table)?;
    analyze_observations(observations, params)
}

/// Validate numeric columns held by the caller, then analyze them.
pub fn analyze_columns(x: &[f64], y: &[f64], params: &AnalysisParams) -> Result<Analysis> {
    let observations = validate_columns(x, y)?;
    analyze_observations(observations, params)
}

/// Read a CSV file, validate it, then analyze it.
pub fn analyze_csv(path: &Path, params: &AnalysisParams) -> Result<Analysis> {
    let table = read_csv_table(path)?;
    analyze_table(&table, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, InputError, RangeError};

    fn make_valid_table() -> RawTable {
        RawTable::from_strings(
            &["F.S.Flux", "Ele.Flow"],
            &[
                &["1.0", "10.5"],
                &["2.0", "20.3"],
                &["3.0", "30.1"],
                &["4.0", "40.8"],
                &["5.0", "50.2"],
            ],
        )
    }

    #[test]
    fn test_analyze_expected_values() {
        let analysis = analyze_table(&make_valid_table(), &AnalysisParams::new(15.0, 45.0)).unwrap();
        let result = analysis.result;
        assert!((result.slope - 9.99).abs() < 1e-8);
        assert!((result.intercept - 0.41).abs() < 1e-8);
        assert!((result.r_squared - 0.9996924796756111).abs() < 1e-10);
        assert!((result.min_intersection - 1.5808252639534688).abs() < 1e-6);
        assert!((result.max_intersection - 4.343098659970456).abs() < 1e-6);
        assert_eq!(analysis.regression.summary.len(), 5);
        assert_eq!(analysis.regression.fitted_values.len(), 5);
    }

    #[test]
    fn test_small_scale_flux() {
        let observations = Observations::new(
            vec![1e-7, 2e-7, 3e-7, 4e-7, 5e-7],
            vec![10.5, 20.3, 30.1, 40.8, 50.2],
        );
        let result = analyze_observations(observations, &AnalysisParams::new(15.0, 45.0))
            .unwrap()
            .result;
        assert!((result.min_intersection / 1.5808252639534666e-7 - 1.0).abs() < 1e-6);
        assert!((result.max_intersection / 4.343098659970456e-7 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_report() {
        let analysis = analyze_table(&make_valid_table(), &AnalysisParams::new(15.0, 45.0)).unwrap();
        let report = analysis.report();
        assert_eq!(report.observations, 5);
        assert_eq!(report.outside_interval, 0);
        assert!(report.range_available);
        assert_eq!(report.prediction_interval_pct, 95.0);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("slope").is_some());
        assert!(json.get("min_intersection").is_some());
    }

    #[test]
    fn test_validation_runs_before_parameter_checks() {
        let table = RawTable::from_strings(&["F.S.Flux", "Ele.Flow"], &[&["1", "2"]]);
        let params = AnalysisParams::new(15.0, 45.0).with_prediction_interval(120.0);
        let err = analyze_table(&table, &params).unwrap_err();
        assert!(matches!(err, Error::Input(InputError::InsufficientRows { .. })));
    }

    #[test]
    fn test_out_of_range_confidence() {
        for pct in [0.0, 100.0, -1.0, 120.0] {
            let params = AnalysisParams::new(15.0, 45.0).with_prediction_interval(pct);
            let err = analyze_table(&make_valid_table(), &params).unwrap_err();
            assert!(matches!(err, Error::Range(RangeError::OutOfRangeConfidence(_))), "pct={}", pct);
        }
    }

    #[test]
    fn test_analyze_columns() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.5, 20.3, 30.1, 40.8, 50.2];
        let result = analyze_columns(&x, &y, &AnalysisParams::new(15.0, 45.0)).unwrap().result;
        assert!((result.min_intersection - 1.5808252639534688).abs() < 1e-6);

        let err = analyze_columns(&x[..2], &y[..2], &AnalysisParams::new(15.0, 45.0)).unwrap_err();
        assert!(matches!(err, Error::Input(InputError::InsufficientRows { found: 2, .. })));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = analyze_table(&make_valid_table(), &AnalysisParams::new(45.0, 15.0)).unwrap_err();
        assert!(matches!(err, Error::Input(InputError::InvalidBoundOrdering { .. })));
    }

    #[test]
    fn test_wider_interval_narrows_range() {
        let table = make_valid_table();
        let narrow = analyze_table(&table, &AnalysisParams::new(15.0, 45.0).with_prediction_interval(68.0))
            .unwrap()
            .result;
        let wide = analyze_table(&table, &AnalysisParams::new(15.0, 45.0).with_prediction_interval(99.7))
            .unwrap()
            .result;
        let narrow_span = narrow.max_intersection - narrow.min_intersection;
        let wide_span = wide.max_intersection - wide.min_intersection;
        assert!(wide_span < narrow_span);
    }
}
