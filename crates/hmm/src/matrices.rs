//! Per-individual initial, transition, and emission probabilities.

use recap_history::ObsLevels;

use crate::error::HmmError;
use crate::sampler::validate_distribution;
use crate::state::HiddenState;

/// The three probability structures of a capture-recapture HMM, for every
/// individual record and occasion.
///
/// Occasions are 1-indexed. Storage is row-major with the distribution being
/// sampled innermost:
///
/// | Structure | Index | Sums to 1 over |
/// |-----------|-------|----------------|
/// | `delta` | `[i][k]` | `k` |
/// | `gamma` | `[i][j][from][to]` | `to`, for `start[i] <= j < T` |
/// | `dmat` | `[i][j][state][symbol]` | `symbol`, for `start[i] <= j <= T` |
///
/// Entries outside the live range of an individual are never read.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMatrices {
    levels: ObsLevels,
    n_states: usize,
    n_occasions: usize,
    start: Vec<usize>,
    delta: Vec<f64>,
    gamma: Vec<f64>,
    dmat: Vec<f64>,
}

impl ParameterMatrices {
    /// Allocates zero-filled matrices.
    ///
    /// `start[i]` is the 1-indexed release occasion of individual `i`.
    ///
    /// # Errors
    ///
    /// Returns [`HmmError::DimensionMismatch`] if there are no states or
    /// occasions, or a release occasion is outside `1..=n_occasions`.
    pub fn zeros(
        levels: ObsLevels,
        n_states: usize,
        n_occasions: usize,
        start: Vec<usize>,
    ) -> Result<Self, HmmError> {
        if n_states == 0 {
            return Err(HmmError::DimensionMismatch {
                what: "hidden states".to_string(),
                expected: 1,
                got: 0,
            });
        }
        if n_occasions == 0 {
            return Err(HmmError::DimensionMismatch {
                what: "occasions".to_string(),
                expected: 1,
                got: 0,
            });
        }
        if let Some((i, &s)) = start
            .iter()
            .enumerate()
            .find(|&(_, &s)| s == 0 || s > n_occasions)
        {
            return Err(HmmError::DimensionMismatch {
                what: format!("release occasion of individual {i} (1..={n_occasions})"),
                expected: n_occasions,
                got: s,
            });
        }
        let n = start.len();
        let m = n_states;
        let o = levels.n_symbols();
        Ok(Self {
            levels,
            n_states,
            n_occasions,
            start,
            delta: vec![0.0; n * m],
            gamma: vec![0.0; n * n_occasions * m * m],
            dmat: vec![0.0; n * n_occasions * m * o],
        })
    }

    /// Returns the observation alphabet.
    pub fn levels(&self) -> &ObsLevels {
        &self.levels
    }

    /// Returns the number of individual records.
    pub fn n_individuals(&self) -> usize {
        self.start.len()
    }

    /// Returns the number of hidden states `m`.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Returns the number of occasions `T`.
    pub fn n_occasions(&self) -> usize {
        self.n_occasions
    }

    /// Returns the release occasion of every individual.
    pub fn starts(&self) -> &[usize] {
        &self.start
    }

    /// Returns the release occasion of individual `i`.
    pub fn start(&self, i: usize) -> usize {
        self.start[i]
    }

    fn occasion_offset(&self, occasion: usize) -> usize {
        assert!(
            (1..=self.n_occasions).contains(&occasion),
            "occasion must be 1..={}, got {occasion}",
            self.n_occasions
        );
        occasion - 1
    }

    fn delta_range(&self, i: usize) -> std::ops::Range<usize> {
        let m = self.n_states;
        i * m..(i + 1) * m
    }

    fn gamma_range(&self, i: usize, occasion: usize, from: HiddenState) -> std::ops::Range<usize> {
        let m = self.n_states;
        assert!(from.as_index() < m, "{from} out of range for {m} states");
        let j = self.occasion_offset(occasion);
        let base = ((i * self.n_occasions + j) * m + from.as_index()) * m;
        base..base + m
    }

    fn dmat_range(&self, i: usize, occasion: usize, state: HiddenState) -> std::ops::Range<usize> {
        let m = self.n_states;
        let o = self.levels.n_symbols();
        assert!(state.as_index() < m, "{state} out of range for {m} states");
        let j = self.occasion_offset(occasion);
        let base = ((i * self.n_occasions + j) * m + state.as_index()) * o;
        base..base + o
    }

    /// Returns the initial-state distribution of individual `i`.
    pub fn initial(&self, i: usize) -> &[f64] {
        &self.delta[self.delta_range(i)]
    }

    /// Returns the initial-state distribution of individual `i` for writing.
    pub fn initial_mut(&mut self, i: usize) -> &mut [f64] {
        let r = self.delta_range(i);
        &mut self.delta[r]
    }

    /// Returns the next-state distribution from `from` at `occasion`.
    ///
    /// # Panics
    ///
    /// Panics if `occasion` or `from` is out of range.
    pub fn transition_row(&self, i: usize, occasion: usize, from: HiddenState) -> &[f64] {
        &self.gamma[self.gamma_range(i, occasion, from)]
    }

    /// Returns the next-state distribution from `from` at `occasion` for writing.
    pub fn transition_row_mut(
        &mut self,
        i: usize,
        occasion: usize,
        from: HiddenState,
    ) -> &mut [f64] {
        let r = self.gamma_range(i, occasion, from);
        &mut self.gamma[r]
    }

    /// Returns `gamma[i, occasion, from, to]`.
    pub fn transition(&self, i: usize, occasion: usize, from: HiddenState, to: HiddenState) -> f64 {
        self.transition_row(i, occasion, from)[to.as_index()]
    }

    /// Returns the symbol distribution emitted from `state` at `occasion`.
    ///
    /// # Panics
    ///
    /// Panics if `occasion` or `state` is out of range.
    pub fn emission_dist(&self, i: usize, occasion: usize, state: HiddenState) -> &[f64] {
        &self.dmat[self.dmat_range(i, occasion, state)]
    }

    /// Returns the symbol distribution emitted from `state` at `occasion` for writing.
    pub fn emission_dist_mut(&mut self, i: usize, occasion: usize, state: HiddenState) -> &mut [f64] {
        let r = self.dmat_range(i, occasion, state);
        &mut self.dmat[r]
    }

    /// Returns `dmat[i, occasion, symbol, state]`.
    pub fn emission(&self, i: usize, occasion: usize, symbol: usize, state: HiddenState) -> f64 {
        self.emission_dist(i, occasion, state)[symbol]
    }

    /// Validates every distribution in each individual's live range.
    ///
    /// Checks `delta[i]`, `gamma[i, j, k, :]` for `start[i] <= j < T` and
    /// `dmat[i, j, :, k]` for `start[i] <= j <= T`, for all states `k`.
    ///
    /// # Errors
    ///
    /// Returns [`HmmError::InvalidProbabilities`] naming the first bad
    /// distribution.
    pub fn validate(&self) -> Result<(), HmmError> {
        for i in 0..self.n_individuals() {
            validate_distribution(self.initial(i), &format!("delta[{i}]"))?;
            let s = self.start[i];
            for j in s..=self.n_occasions {
                for k in HiddenState::all(self.n_states) {
                    if j < self.n_occasions {
                        validate_distribution(
                            self.transition_row(i, j, k),
                            &format!("gamma[{i}, {j}, {}]", k.number()),
                        )?;
                    }
                    validate_distribution(
                        self.emission_dist(i, j, k),
                        &format!("dmat[{i}, {j}, :, {}]", k.number()),
                    )?;
                }
            }
        }
        Ok(())
    }
}
