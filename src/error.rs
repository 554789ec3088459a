//! Error taxonomy for the analyzer.
//!
//! Every failure is a rejected request: input problems, an out-of-range
//! confidence level, or a numerical dead end. Nothing here is retried.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Which prediction-interval envelope a computation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Lower,
    Upper,
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Envelope::Lower => write!(f, "lower"),
            Envelope::Upper => write!(f, "upper"),
        }
    }
}

/// Problems with the supplied dataset or bounds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Missing required columns: {missing:?}")]
    MissingColumns { missing: Vec<String> },

    #[error("At least {required} rows are required for analysis, got {found}")]
    InsufficientRows { required: usize, found: usize },

    #[error("Missing values found in required columns: column '{column}', row {row}")]
    MissingValues { column: String, row: usize },

    #[error("Non-numeric data in column '{column}', row {row}: '{value}'")]
    NonNumericData {
        column: String,
        row: usize,
        value: String,
    },

    #[error("min_ele_flow ({min}) must be smaller than max_ele_flow ({max}) and both must be finite")]
    InvalidBoundOrdering { min: f64, max: f64 },
}

/// Parameters outside their admissible range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("prediction_interval_pct must be between 0 and 100 (exclusive), got {0}")]
    OutOfRangeConfidence(f64),
}

/// Numerical failures while fitting or solving.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("{envelope} prediction-interval envelope slope is too close to zero ({slope:e})")]
    DegenerateEnvelope { envelope: Envelope, slope: f64 },

    #[error("All F.S.Flux values are identical; the regression is undefined")]
    ConstantRegressor,

    #[error("Linear regression fitting failed: {0}")]
    RegressionFailed(String),

    #[error("Prediction interval computation produced invalid values: {0}")]
    InvalidInterval(String),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error("Failed to read table: {0}")]
    Read(#[from] duckdb::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the input-error class of the taxonomy.
    pub fn is_input(&self) -> bool {
        matches!(self, Error::Input(_))
    }

    /// True for the range-error class of the taxonomy.
    pub fn is_range(&self) -> bool {
        matches!(self, Error::Range(_))
    }

    /// True for the computation-error class of the taxonomy.
    pub fn is_computation(&self) -> bool {
        matches!(self, Error::Computation(_))
    }
}
