use std::{error, fmt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Error raised while validating the input or fitting a tree.
///
/// We have to define a specific type because the generic dyn Error is not Sync, so it can't be used
/// with Rayon.
pub enum FitError {
    /// The number of rows of the features doesn't match the length of the target.
    ShapeMismatch { n_rows: usize, n_targets: usize },
    /// No rows, or no columns.
    EmptyDataset,
    /// All the targets are equal, there is nothing to learn.
    ConstantTarget,
    /// NAN, infinite value, or a label that is not 0 or 1 for a classification.
    InvalidValue(String),
    /// Inconsistent configuration.
    InvalidParams(String),
    /// The solver did not converge and the policy doesn't allow it.
    NotConverged { n_iter: usize },
    /// Malformed text input.
    Parse(String),
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FitError::ShapeMismatch { n_rows, n_targets } => write!(
                f,
                "features have {} rows but the target has {} values",
                n_rows, n_targets
            ),
            FitError::EmptyDataset => f.write_str("the dataset is empty"),
            FitError::ConstantTarget => f.write_str("the target is constant"),
            FitError::InvalidValue(msg) => write!(f, "invalid value: {}", msg),
            FitError::InvalidParams(msg) => write!(f, "invalid parameters: {}", msg),
            FitError::NotConverged { n_iter } => {
                write!(f, "the solver did not converge after {} iterations", n_iter)
            }
            FitError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl error::Error for FitError {}

impl std::convert::From<std::num::ParseFloatError> for FitError {
    fn from(err: std::num::ParseFloatError) -> Self {
        FitError::Parse(err.to_string())
    }
}

pub type FitResult<T> = Result<T, FitError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Error raised when a fitted tree is asked to predict.
pub enum PredictError {
    /// The number of features is not the one seen at fit time.
    DimensionMismatch { expected: usize, got: usize },
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PredictError::DimensionMismatch { expected, got } => write!(
                f,
                "the model was fitted on {} features, got {}",
                expected, got
            ),
        }
    }
}

impl error::Error for PredictError {}

pub type PredictResult<T> = Result<T, PredictError>;

pub(crate) static SHOULD_NOT_HAPPEN: &str =
    "There is an unexpected error in glmtree. Please raise a bug.";
