//! Error types for the recap-hmm crate.

use recap_history::HistoryError;

/// Error type for all fallible operations in the recap-hmm crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HmmError {
    /// Wraps an error from the capture data.
    #[error("capture data error: {0}")]
    History(#[from] HistoryError),

    /// Returned when the source dataset has too few distinct histories.
    #[error("need at least 2 distinct capture histories, got {distinct}")]
    InsufficientHistories {
        /// Number of distinct histories found.
        distinct: usize,
    },

    /// Returned when a probability vector is malformed.
    #[error("invalid probabilities for {context}: {reason}")]
    InvalidProbabilities {
        /// Which distribution failed.
        context: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when matrix dimensions disagree with the data.
    #[error("dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was measured.
        what: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a model parameter is out of range or malformed.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a group-varying parameter names an absent covariate.
    #[error("covariate {name:?} not found in capture data")]
    MissingCovariate {
        /// Covariate column name.
        name: String,
    },

    /// Returned when a group-varying parameter has no value for a level.
    #[error("no value for level {level:?} of covariate {column:?}")]
    MissingGroupLevel {
        /// Covariate column name.
        column: String,
        /// The covariate level without a value.
        level: String,
    },

    /// Returned when a group-varying parameter meets a missing covariate value.
    #[error("row {row}: covariate {column:?} is missing, cannot pick a group value")]
    MissingGroupValue {
        /// Covariate column name.
        column: String,
        /// Zero-based row position.
        row: usize,
    },

    /// Returned when a model name is not in the registry.
    #[error("unknown model {name:?}")]
    UnknownModel {
        /// The requested name.
        name: String,
    },
}
