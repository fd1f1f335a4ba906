//! Input capture datasets: histories, replicate counts, and covariates.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::HistoryError;
use crate::levels::{ObsLevels, release_occasion, split_history};

/// Column names with a fixed meaning; never treated as covariates.
pub const RESERVED_COLUMNS: [&str; 3] = ["ch", "freq", "id"];

/// A single covariate cell, passed through simulation untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CovariateValue {
    /// Text value (factor level).
    Text(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Missing value.
    Missing,
}

impl fmt::Display for CovariateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Missing => f.write_str("NA"),
        }
    }
}

impl From<&str> for CovariateValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CovariateValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for CovariateValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for CovariateValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// One input row: a capture history shared by `freq` identical individuals.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    id: usize,
    ch: String,
    freq: u32,
    covariates: Vec<CovariateValue>,
}

impl CaptureRecord {
    /// Returns the record id (its zero-based row position).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the raw capture-history string.
    pub fn ch(&self) -> &str {
        &self.ch
    }

    /// Returns the replicate count.
    pub fn freq(&self) -> u32 {
        self.freq
    }

    /// Returns covariate values in column order.
    pub fn covariates(&self) -> &[CovariateValue] {
        &self.covariates
    }
}

/// A capture dataset: ordered records plus covariate column names.
///
/// # Example
///
/// ```
/// use recap_history::{CaptureData, CovariateValue};
///
/// let mut data = CaptureData::new(vec!["sex".to_string()]).unwrap();
/// data.push("100", 1000, vec![CovariateValue::from("F")]).unwrap();
/// data.push("110", 100, vec![CovariateValue::from("M")]).unwrap();
/// assert_eq!(data.total_freq(), 1100);
/// assert_eq!(data.n_distinct_histories(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptureData {
    covariate_names: Vec<String>,
    records: Vec<CaptureRecord>,
}

impl CaptureData {
    /// Creates an empty dataset with the given covariate columns.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidColumn`] if a name is empty, reserved
    /// (`ch`, `freq`, `id`), or repeated.
    pub fn new(covariate_names: Vec<String>) -> Result<Self, HistoryError> {
        for (i, name) in covariate_names.iter().enumerate() {
            let reason = if name.is_empty() {
                Some("empty column name")
            } else if RESERVED_COLUMNS.contains(&name.as_str()) {
                Some("reserved column name")
            } else if covariate_names[..i].contains(name) {
                Some("duplicate column name")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(HistoryError::InvalidColumn {
                    name: name.clone(),
                    reason: reason.to_string(),
                });
            }
        }
        Ok(Self {
            covariate_names,
            records: Vec::new(),
        })
    }

    /// Appends a record and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::EmptyHistory`] for a blank history,
    /// [`HistoryError::InvalidFrequency`] if `freq` is zero, or
    /// [`HistoryError::CovariateCountMismatch`] if the number of covariate
    /// values differs from the number of columns.
    pub fn push(
        &mut self,
        ch: impl Into<String>,
        freq: u32,
        covariates: Vec<CovariateValue>,
    ) -> Result<usize, HistoryError> {
        let id = self.records.len();
        let ch = ch.into();
        if ch.trim().is_empty() {
            return Err(HistoryError::EmptyHistory { row: id });
        }
        if freq == 0 {
            return Err(HistoryError::InvalidFrequency { row: id, freq });
        }
        if covariates.len() != self.covariate_names.len() {
            return Err(HistoryError::CovariateCountMismatch {
                row: id,
                expected: self.covariate_names.len(),
                got: covariates.len(),
            });
        }
        self.records.push(CaptureRecord {
            id,
            ch,
            freq,
            covariates,
        });
        Ok(id)
    }

    /// Returns the records in input order.
    pub fn records(&self) -> &[CaptureRecord] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the covariate column names in input order.
    pub fn covariate_names(&self) -> &[String] {
        &self.covariate_names
    }

    /// Returns the column position of a covariate.
    pub fn covariate_index(&self, name: &str) -> Option<usize> {
        self.covariate_names.iter().position(|n| n == name)
    }

    /// Returns the sum of `freq` over all records.
    pub fn total_freq(&self) -> u64 {
        self.records.iter().map(|r| u64::from(r.freq)).sum()
    }

    /// Returns the number of distinct capture-history patterns.
    ///
    /// `"1,0,0"` and `"100"` count as the same pattern.
    pub fn n_distinct_histories(&self) -> usize {
        self.records
            .iter()
            .map(|r| split_history(&r.ch).join(","))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Parses every history against `levels` and derives release occasions.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::EmptyData`] for an empty dataset, a parse error
    /// for an unknown code, [`HistoryError::OccasionMismatch`] if histories
    /// differ in length, or [`HistoryError::NoRelease`] for a history that is
    /// never encountered.
    pub fn releases(&self, levels: &ObsLevels) -> Result<Releases, HistoryError> {
        if self.records.is_empty() {
            return Err(HistoryError::EmptyData);
        }
        let mut n_occasions = None;
        let mut occasions = Vec::with_capacity(self.records.len());
        let mut symbols = Vec::with_capacity(self.records.len());

        for record in &self.records {
            let parsed = levels.parse(&record.ch, record.id)?;
            let expected = *n_occasions.get_or_insert(parsed.len());
            if parsed.len() != expected {
                return Err(HistoryError::OccasionMismatch {
                    row: record.id,
                    expected,
                    got: parsed.len(),
                });
            }
            let occasion = release_occasion(&parsed).ok_or_else(|| HistoryError::NoRelease {
                row: record.id,
                ch: record.ch.clone(),
            })?;
            occasions.push(occasion);
            symbols.push(parsed[occasion - 1]);
        }

        Ok(Releases {
            n_occasions: n_occasions.unwrap_or(0),
            occasions,
            symbols,
        })
    }
}

/// Release occasions and release symbols derived from a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Releases {
    n_occasions: usize,
    occasions: Vec<usize>,
    symbols: Vec<usize>,
}

impl Releases {
    /// Returns the number of sampling occasions `T`.
    pub fn n_occasions(&self) -> usize {
        self.n_occasions
    }

    /// Returns the 1-indexed release occasion of every record.
    pub fn occasions(&self) -> &[usize] {
        &self.occasions
    }

    /// Returns the 1-indexed release occasion of record `id`.
    pub fn occasion(&self, id: usize) -> usize {
        self.occasions[id]
    }

    /// Returns the symbol index observed at release for record `id`.
    pub fn symbol(&self, id: usize) -> usize {
        self.symbols[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sex_data() -> CaptureData {
        let mut data = CaptureData::new(vec!["sex".to_string()]).unwrap();
        data.push("100", 1000, vec!["F".into()]).unwrap();
        data.push("110", 100, vec!["M".into()]).unwrap();
        data
    }

    #[test]
    fn new_rejects_reserved_and_duplicate_columns() {
        for bad in [vec!["ch"], vec!["freq"], vec!["id"], vec!["a", "a"], vec![""]] {
            let names = bad.into_iter().map(String::from).collect();
            assert!(matches!(
                CaptureData::new(names),
                Err(HistoryError::InvalidColumn { .. })
            ));
        }
    }

    #[test]
    fn push_assigns_row_ids() {
        let data = sex_data();
        assert_eq!(data.len(), 2);
        assert_eq!(data.records()[0].id(), 0);
        assert_eq!(data.records()[1].id(), 1);
        assert_eq!(data.records()[1].ch(), "110");
        assert_eq!(data.records()[1].freq(), 100);
        assert_eq!(data.records()[1].covariates(), &[CovariateValue::from("M")]);
    }

    #[test]
    fn push_rejects_bad_rows() {
        let mut data = sex_data();
        assert_eq!(
            data.push("101", 0, vec!["F".into()]),
            Err(HistoryError::InvalidFrequency { row: 2, freq: 0 })
        );
        assert_eq!(
            data.push("101", 1, vec![]),
            Err(HistoryError::CovariateCountMismatch {
                row: 2,
                expected: 1,
                got: 0
            })
        );
        assert_eq!(
            data.push(" ", 1, vec!["F".into()]),
            Err(HistoryError::EmptyHistory { row: 2 })
        );
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn totals_and_distinct() {
        let mut data = sex_data();
        assert_eq!(data.total_freq(), 1100);
        assert_eq!(data.n_distinct_histories(), 2);
        data.push("1,0,0", 3, vec!["F".into()]).unwrap();
        assert_eq!(data.n_distinct_histories(), 2);
        assert_eq!(data.covariate_index("sex"), Some(0));
        assert_eq!(data.covariate_index("age"), None);
    }

    #[test]
    fn releases_from_first_encounter() {
        let mut data = CaptureData::new(vec![]).unwrap();
        data.push("1000", 50, vec![]).unwrap();
        data.push("0100", 50, vec![]).unwrap();
        data.push("0010", 50, vec![]).unwrap();
        let levels = ObsLevels::new(["0", "1"]).unwrap();
        let rel = data.releases(&levels).unwrap();
        assert_eq!(rel.n_occasions(), 4);
        assert_eq!(rel.occasions(), &[1, 2, 3]);
        assert_eq!(rel.symbol(2), 1);
    }

    #[test]
    fn releases_reports_stratum_symbol() {
        let mut data = CaptureData::new(vec![]).unwrap();
        data.push("0B0", 1, vec![]).unwrap();
        let levels = ObsLevels::new(["0", "A", "B"]).unwrap();
        let rel = data.releases(&levels).unwrap();
        assert_eq!(rel.occasion(0), 2);
        assert_eq!(rel.symbol(0), 2);
    }

    #[test]
    fn releases_errors() {
        let levels = ObsLevels::new(["0", "1"]).unwrap();

        let empty = CaptureData::new(vec![]).unwrap();
        assert_eq!(empty.releases(&levels), Err(HistoryError::EmptyData));

        let mut ragged = CaptureData::new(vec![]).unwrap();
        ragged.push("100", 1, vec![]).unwrap();
        ragged.push("10", 1, vec![]).unwrap();
        assert_eq!(
            ragged.releases(&levels),
            Err(HistoryError::OccasionMismatch {
                row: 1,
                expected: 3,
                got: 2
            })
        );

        let mut never = CaptureData::new(vec![]).unwrap();
        never.push("000", 1, vec![]).unwrap();
        assert!(matches!(
            never.releases(&levels),
            Err(HistoryError::NoRelease { row: 0, .. })
        ));
    }

    #[test]
    fn covariate_display() {
        assert_eq!(CovariateValue::from("F").to_string(), "F");
        assert_eq!(CovariateValue::from(3_i64).to_string(), "3");
        assert_eq!(CovariateValue::from(1.5).to_string(), "1.5");
        assert_eq!(CovariateValue::Missing.to_string(), "NA");
    }
}
