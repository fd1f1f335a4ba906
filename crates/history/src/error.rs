//! Error types for the recap-history crate.

/// Error type for all fallible operations in the recap-history crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistoryError {
    /// Returned when a dataset has no records.
    #[error("dataset has no records")]
    EmptyData,

    /// Returned when an observation alphabet is unusable.
    #[error("invalid observation alphabet: {reason}")]
    InvalidAlphabet {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a capture history string has no symbols.
    #[error("row {row}: capture history is empty")]
    EmptyHistory {
        /// Zero-based row position.
        row: usize,
    },

    /// Returned when a capture history contains a code outside the alphabet.
    #[error("row {row}: unknown symbol {symbol:?} in capture history")]
    UnknownSymbol {
        /// Zero-based row position.
        row: usize,
        /// The offending code.
        symbol: String,
    },

    /// Returned when a capture history never leaves the "not observed" code.
    #[error("row {row}: capture history {ch:?} has no release occasion")]
    NoRelease {
        /// Zero-based row position.
        row: usize,
        /// The capture history.
        ch: String,
    },

    /// Returned when capture histories differ in occasion count.
    #[error("row {row}: history has {got} occasions, expected {expected}")]
    OccasionMismatch {
        /// Zero-based row position.
        row: usize,
        /// Occasion count of the first row.
        expected: usize,
        /// Occasion count of this row.
        got: usize,
    },

    /// Returned when a replicate count is zero.
    #[error("row {row}: freq must be a positive integer, got {freq}")]
    InvalidFrequency {
        /// Zero-based row position.
        row: usize,
        /// The offending count.
        freq: u32,
    },

    /// Returned when a row carries the wrong number of covariate values.
    #[error("row {row}: expected {expected} covariate values, got {got}")]
    CovariateCountMismatch {
        /// Zero-based row position.
        row: usize,
        /// Number of covariate columns.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Returned when a covariate column name is repeated or reserved.
    #[error("invalid covariate column {name:?}: {reason}")]
    InvalidColumn {
        /// Column name.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the number of encoded histories does not match a record's freq.
    #[error("record {id}: got {got} simulated histories, expected {expected}")]
    ReplicateMismatch {
        /// Record id.
        id: usize,
        /// The record's freq.
        expected: usize,
        /// Number of histories supplied.
        got: usize,
    },
}
