//! Assembly of simulated histories with replicated covariates.

use tracing::debug;

use crate::data::{CaptureData, CovariateValue};
use crate::error::HistoryError;

/// The simulated output dataset: one row per replicate.
///
/// Columns are `ch` followed by the source covariates in input order. The id
/// of the source record behind each row is kept as metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulatedData {
    covariate_names: Vec<String>,
    ch: Vec<String>,
    source_ids: Vec<usize>,
    /// Column-major: `covariates[col][row]`.
    covariates: Vec<Vec<CovariateValue>>,
}

impl SimulatedData {
    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.ch.len()
    }

    /// Returns the simulated capture histories.
    pub fn ch(&self) -> &[String] {
        &self.ch
    }

    /// Returns the source record id of every row.
    pub fn source_ids(&self) -> &[usize] {
        &self.source_ids
    }

    /// Returns the covariate column names.
    pub fn covariate_names(&self) -> &[String] {
        &self.covariate_names
    }

    /// Returns the covariate column at position `col`.
    ///
    /// # Panics
    ///
    /// Panics if `col` is out of range.
    pub fn covariate_column(&self, col: usize) -> &[CovariateValue] {
        &self.covariates[col]
    }

    /// Returns a covariate column by name.
    pub fn column(&self, name: &str) -> Option<&[CovariateValue]> {
        self.covariate_names
            .iter()
            .position(|n| n == name)
            .map(|col| self.covariates[col].as_slice())
    }
}

/// Builds a [`SimulatedData`] record by record, in input order.
#[derive(Debug)]
pub struct ResultAssembler<'a> {
    data: &'a CaptureData,
    out: SimulatedData,
}

impl<'a> ResultAssembler<'a> {
    /// Creates an assembler over the source dataset.
    pub fn new(data: &'a CaptureData) -> Self {
        let n_rows = usize::try_from(data.total_freq()).unwrap_or(usize::MAX);
        let n_cols = data.covariate_names().len();
        Self {
            data,
            out: SimulatedData {
                covariate_names: data.covariate_names().to_vec(),
                ch: Vec::with_capacity(n_rows),
                source_ids: Vec::with_capacity(n_rows),
                covariates: (0..n_cols).map(|_| Vec::with_capacity(n_rows)).collect(),
            },
        }
    }

    /// Appends the encoded histories of record `id`, replicating its
    /// covariates once per history.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::ReplicateMismatch`] if the number of histories
    /// differs from the record's `freq`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a record of the source dataset.
    pub fn append(&mut self, id: usize, histories: Vec<String>) -> Result<(), HistoryError> {
        let record = &self.data.records()[id];
        let n = histories.len();
        if n != record.freq() as usize {
            return Err(HistoryError::ReplicateMismatch {
                id,
                expected: record.freq() as usize,
                got: n,
            });
        }
        for (column, value) in self.out.covariates.iter_mut().zip(record.covariates()) {
            column.extend(std::iter::repeat_n(value, n).cloned());
        }
        self.out.source_ids.extend(std::iter::repeat_n(id, n));
        self.out.ch.extend(histories);
        Ok(())
    }

    /// Finishes assembly.
    pub fn finish(self) -> SimulatedData {
        debug!(
            n_rows = self.out.n_rows(),
            n_covariates = self.out.covariate_names.len(),
            "assembled simulated dataset"
        );
        self.out
    }
}

/// Assembles histories for every record of `data`, in input order.
///
/// `histories[i]` holds the encoded histories of record `i`.
///
/// # Errors
///
/// Returns [`HistoryError::ReplicateMismatch`] if a record's history count
/// differs from its `freq`, or if `histories` has a different length than
/// the dataset (reported against the first missing or surplus record id).
pub fn assemble(
    data: &CaptureData,
    histories: Vec<Vec<String>>,
) -> Result<SimulatedData, HistoryError> {
    if histories.len() != data.len() {
        let id = histories.len().min(data.len());
        let expected = data.records().get(id).map_or(0, |r| r.freq() as usize);
        let got = histories.get(id).map_or(0, Vec::len);
        return Err(HistoryError::ReplicateMismatch { id, expected, got });
    }
    let mut assembler = ResultAssembler::new(data);
    for (id, h) in histories.into_iter().enumerate() {
        assembler.append(id, h)?;
    }
    Ok(assembler.finish())
}
