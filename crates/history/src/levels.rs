//! Observation alphabets and capture-history parsing.

use crate::error::HistoryError;

/// Symbol index of the "not observed" code. Always the first level.
pub const NOT_OBSERVED: usize = 0;

/// An ordered alphabet of observation codes.
///
/// Level 0 is the "not observed" code; the remaining levels are encounter
/// events (e.g. `"1"` for a CJS capture, or a stratum code).
///
/// # Example
///
/// ```
/// use recap_history::ObsLevels;
///
/// let levels = ObsLevels::new(["0", "A", "B"]).unwrap();
/// assert_eq!(levels.not_observed(), "0");
/// assert_eq!(levels.index_of("B"), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObsLevels {
    codes: Vec<String>,
}

impl ObsLevels {
    /// Creates an alphabet from codes in level order.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidAlphabet`] if fewer than two codes are
    /// given, or a code is empty, repeated, or contains `,` or whitespace.
    pub fn new<I, S>(codes: I) -> Result<Self, HistoryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        if codes.len() < 2 {
            return Err(HistoryError::InvalidAlphabet {
                reason: format!("need at least 2 codes, got {}", codes.len()),
            });
        }
        for (i, code) in codes.iter().enumerate() {
            if code.is_empty() {
                return Err(HistoryError::InvalidAlphabet {
                    reason: format!("code at level {i} is empty"),
                });
            }
            if code.contains(',') || code.chars().any(char::is_whitespace) {
                return Err(HistoryError::InvalidAlphabet {
                    reason: format!("code {code:?} contains a delimiter or whitespace"),
                });
            }
            if codes[..i].contains(code) {
                return Err(HistoryError::InvalidAlphabet {
                    reason: format!("duplicate code {code:?}"),
                });
            }
        }
        Ok(Self { codes })
    }

    /// Returns the number of codes in the alphabet.
    pub fn n_symbols(&self) -> usize {
        self.codes.len()
    }

    /// Returns all codes in level order.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Returns the code for a symbol index.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` is not a level of this alphabet.
    pub fn code(&self, symbol: usize) -> &str {
        assert!(
            symbol < self.codes.len(),
            "symbol index {symbol} out of range for {} levels",
            self.codes.len()
        );
        &self.codes[symbol]
    }

    /// Returns the "not observed" code.
    pub fn not_observed(&self) -> &str {
        &self.codes[NOT_OBSERVED]
    }

    /// Returns the level index of a code, if present.
    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| c == code)
    }

    /// Returns `true` if every code is exactly one character long.
    pub fn all_single_char(&self) -> bool {
        self.codes.iter().all(|c| c.chars().count() == 1)
    }

    /// Parses a capture-history string into symbol indices.
    ///
    /// `row` is only used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::EmptyHistory`] for an empty string and
    /// [`HistoryError::UnknownSymbol`] for a code outside the alphabet.
    pub fn parse(&self, ch: &str, row: usize) -> Result<Vec<usize>, HistoryError> {
        let tokens = split_history(ch);
        if tokens.is_empty() {
            return Err(HistoryError::EmptyHistory { row });
        }
        tokens
            .into_iter()
            .map(|tok| {
                self.index_of(tok).ok_or_else(|| HistoryError::UnknownSymbol {
                    row,
                    symbol: tok.to_string(),
                })
            })
            .collect()
    }
}

/// Splits a capture-history string into per-occasion codes.
///
/// A string containing `,` is split on commas (tokens are trimmed); otherwise
/// every character is one occasion.
pub fn split_history(ch: &str) -> Vec<&str> {
    let ch = ch.trim();
    if ch.is_empty() {
        return Vec::new();
    }
    if ch.contains(',') {
        ch.split(',').map(str::trim).collect()
    } else {
        ch.char_indices()
            .map(|(i, c)| &ch[i..i + c.len_utf8()])
            .collect()
    }
}

/// Returns the 1-indexed release occasion of a parsed history.
///
/// The release occasion is the first occasion whose symbol is not the
/// "not observed" code. Returns `None` if there is no such occasion.
pub fn release_occasion(symbols: &[usize]) -> Option<usize> {
    symbols
        .iter()
        .position(|&s| s != NOT_OBSERVED)
        .map(|pos| pos + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cjs() -> ObsLevels {
        ObsLevels::new(["0", "1"]).unwrap()
    }

    #[test]
    fn new_rejects_short_alphabet() {
        assert!(matches!(
            ObsLevels::new(["0"]),
            Err(HistoryError::InvalidAlphabet { .. })
        ));
    }

    #[test]
    fn new_rejects_duplicates_and_delimiters() {
        assert!(ObsLevels::new(["0", "1", "1"]).is_err());
        assert!(ObsLevels::new(["0", "A,B"]).is_err());
        assert!(ObsLevels::new(["0", ""]).is_err());
        assert!(ObsLevels::new(["0", "A B"]).is_err());
    }

    #[test]
    fn accessors() {
        let levels = ObsLevels::new(["0", "A", "B"]).unwrap();
        assert_eq!(levels.n_symbols(), 3);
        assert_eq!(levels.not_observed(), "0");
        assert_eq!(levels.code(2), "B");
        assert_eq!(levels.index_of("A"), Some(1));
        assert_eq!(levels.index_of("C"), None);
        assert!(levels.all_single_char());
    }

    #[test]
    fn multi_char_codes() {
        let levels = ObsLevels::new(["0", "AS", "BS"]).unwrap();
        assert!(!levels.all_single_char());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn code_out_of_range_panics() {
        cjs().code(2);
    }

    #[test]
    fn split_compact_and_delimited() {
        assert_eq!(split_history("1010"), vec!["1", "0", "1", "0"]);
        assert_eq!(split_history("0,AS, BS"), vec!["0", "AS", "BS"]);
        assert!(split_history("").is_empty());
        assert!(split_history("   ").is_empty());
    }

    #[test]
    fn parse_histories() {
        let levels = cjs();
        assert_eq!(levels.parse("0110", 0).unwrap(), vec![0, 1, 1, 0]);
        assert_eq!(
            levels.parse("012", 5),
            Err(HistoryError::UnknownSymbol {
                row: 5,
                symbol: "2".to_string()
            })
        );
        assert_eq!(levels.parse("", 1), Err(HistoryError::EmptyHistory { row: 1 }));
    }

    #[test]
    fn release_occasion_is_first_encounter() {
        assert_eq!(release_occasion(&[1, 0, 0]), Some(1));
        assert_eq!(release_occasion(&[0, 0, 2, 1]), Some(3));
        assert_eq!(release_occasion(&[0, 0, 0]), None);
        assert_eq!(release_occasion(&[]), None);
    }
}
