//! fluxbound: regression-bound analyzer.
//!
//! Fits Ele.Flow against F.S.Flux by ordinary least squares, builds a
//! prediction interval around the fit, linearizes the interval's lower and
//! upper envelopes and solves for the F.S.Flux values where they meet a pair
//! of Ele.Flow limits.
//!
//! The pipeline is Validator -> Regression Engine -> Solver, with the chart
//! renderer consuming the results:
//!
//! ```no_run
//! use fluxbound::analysis::analyze_csv;
//! use fluxbound::regression::AnalysisParams;
//!
//! let params = AnalysisParams::new(8800.0, 13200.0);
//! let analysis = analyze_csv("data.csv".as_ref(), &params)?;
//! println!("{} .. {}", analysis.result.min_intersection, analysis.result.max_intersection);
//! # Ok::<(), fluxbound::error::Error>(())
//! ```

pub mod analysis;
pub mod chart;
pub mod common;
pub mod config;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod regression;

pub use analysis::{analyze_columns, analyze_csv, analyze_observations, analyze_table, Analysis, AnalysisReport, AnalysisResult};
pub use error::{Error, Result};
