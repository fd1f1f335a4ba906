//! Encoding of per-occasion symbol sequences into capture-history strings.

use crate::levels::ObsLevels;

/// Joins symbol codes into capture-history strings.
///
/// # Example
///
/// ```
/// use recap_history::{HistoryEncoder, ObsLevels};
///
/// let levels = ObsLevels::new(["0", "1"]).unwrap();
/// let encoder = HistoryEncoder::for_levels(&levels);
/// assert_eq!(encoder.encode(&[0, 1, 1], &levels), "011");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEncoder {
    delimiter: String,
}

impl HistoryEncoder {
    /// Creates an encoder with an explicit delimiter.
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// Picks the delimiter for an alphabet: none when every code is a single
    /// character, `","` otherwise.
    pub fn for_levels(levels: &ObsLevels) -> Self {
        if levels.all_single_char() {
            Self::new("")
        } else {
            Self::new(",")
        }
    }

    /// Returns the delimiter placed between occasions.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Encodes one replicate's symbols (occasions `1..=T` in order).
    ///
    /// # Panics
    ///
    /// Panics if a symbol index is not a level of `levels`.
    pub fn encode(&self, symbols: &[usize], levels: &ObsLevels) -> String {
        let mut out = String::with_capacity(symbols.len() * (1 + self.delimiter.len()));
        for (j, &s) in symbols.iter().enumerate() {
            if j > 0 {
                out.push_str(&self.delimiter);
            }
            out.push_str(levels.code(s));
        }
        out
    }

    /// Encodes a row-major `n_replicates x n_occasions` symbol matrix.
    ///
    /// # Panics
    ///
    /// Panics if `n_occasions` is zero or does not divide `symbols.len()`, or
    /// if a symbol index is out of range.
    pub fn encode_rows(
        &self,
        symbols: &[usize],
        n_occasions: usize,
        levels: &ObsLevels,
    ) -> Vec<String> {
        assert!(
            n_occasions > 0 && symbols.len() % n_occasions == 0,
            "symbol buffer of length {} is not a multiple of {n_occasions} occasions",
            symbols.len()
        );
        symbols
            .chunks_exact(n_occasions)
            .map(|row| self.encode(row, levels))
            .collect()
    }
}
