//! Hidden states and per-occasion occupancy groups.

use std::fmt;

/// A hidden (latent) state of an individual.
///
/// States are numbered `1..=m` in the model; internally they are stored
/// zero-based so they can index matrix rows directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HiddenState(usize);

impl HiddenState {
    /// Creates a state from its 1-based number.
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero.
    pub fn new(number: usize) -> Self {
        assert!(number >= 1, "hidden states are numbered from 1");
        Self(number - 1)
    }

    /// Creates a state from its zero-based index.
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the 1-based state number.
    pub fn number(self) -> usize {
        self.0 + 1
    }

    /// Returns the zero-based index of this state.
    pub fn as_index(self) -> usize {
        self.0
    }

    /// Iterates over all `n_states` states in index order.
    pub fn all(n_states: usize) -> impl Iterator<Item = HiddenState> {
        (0..n_states).map(Self)
    }
}

impl fmt::Display for HiddenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state {}", self.number())
    }
}

/// Replicates grouped by the hidden state they currently occupy.
///
/// Each group lists replicate positions (into the per-record replicate
/// buffers). Groups are rebuilt at every occasion; empty groups are kept so
/// the caller decides what to skip.
#[derive(Debug, Clone)]
pub struct Occupancy {
    groups: Vec<Vec<usize>>,
}

impl Occupancy {
    /// Creates an empty occupancy table for `n_states` states.
    pub fn new(n_states: usize) -> Self {
        Self {
            groups: vec![Vec::new(); n_states],
        }
    }

    /// Rebuilds the groups from the current state of every replicate.
    ///
    /// Reuses the group buffers between calls.
    ///
    /// # Panics
    ///
    /// Panics if a state index is outside the table.
    pub fn regroup(&mut self, states: &[HiddenState]) {
        for g in &mut self.groups {
            g.clear();
        }
        let n_states = self.groups.len();
        for (replicate, &state) in states.iter().enumerate() {
            assert!(
                state.as_index() < n_states,
                "{state} out of range for {n_states} states"
            );
            self.groups[state.as_index()].push(replicate);
        }
    }

    /// Returns the number of states in the table.
    pub fn n_states(&self) -> usize {
        self.groups.len()
    }

    /// Returns the replicates currently in `state`.
    pub fn members(&self, state: HiddenState) -> &[usize] {
        &self.groups[state.as_index()]
    }

    /// Returns the number of replicates currently in `state`.
    pub fn count(&self, state: HiddenState) -> usize {
        self.groups[state.as_index()].len()
    }

    /// Iterates over every state with its members, including empty groups.
    pub fn iter(&self) -> impl Iterator<Item = (HiddenState, &[usize])> {
        self.groups
            .iter()
            .enumerate()
            .map(|(k, g)| (HiddenState::from_index(k), g.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering() {
        let s = HiddenState::new(1);
        assert_eq!(s.as_index(), 0);
        assert_eq!(s.number(), 1);
        assert_eq!(HiddenState::from_index(2).number(), 3);
        assert_eq!(HiddenState::new(2).to_string(), "state 2");
    }

    #[test]
    #[should_panic(expected = "numbered from 1")]
    fn zero_number_panics() {
        HiddenState::new(0);
    }

    #[test]
    fn all_in_order() {
        let all: Vec<usize> = HiddenState::all(3).map(HiddenState::number).collect();
        assert_eq!(all, vec![1, 2, 3]);
        assert_eq!(HiddenState::all(0).count(), 0);
    }

    #[test]
    fn regroup_partitions_replicates() {
        let states = [
            HiddenState::new(2),
            HiddenState::new(1),
            HiddenState::new(2),
            HiddenState::new(2),
        ];
        let mut occ = Occupancy::new(3);
        occ.regroup(&states);
        assert_eq!(occ.n_states(), 3);
        assert_eq!(occ.members(HiddenState::new(1)), &[1]);
        assert_eq!(occ.members(HiddenState::new(2)), &[0, 2, 3]);
        assert_eq!(occ.count(HiddenState::new(3)), 0);

        let sizes: Vec<usize> = occ.iter().map(|(_, m)| m.len()).collect();
        assert_eq!(sizes, vec![1, 3, 0]);
    }

    #[test]
    fn regroup_clears_previous_groups() {
        let mut occ = Occupancy::new(2);
        occ.regroup(&[HiddenState::new(1), HiddenState::new(1)]);
        occ.regroup(&[HiddenState::new(2)]);
        assert_eq!(occ.count(HiddenState::new(1)), 0);
        assert_eq!(occ.members(HiddenState::new(2)), &[0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn regroup_out_of_range_panics() {
        let mut occ = Occupancy::new(2);
        occ.regroup(&[HiddenState::new(3)]);
    }

    #[test]
    fn trait_assertions() {
        fn assert_copy<T: Copy>() {}
        fn assert_eq<T: Eq>() {}
        fn assert_hash<T: std::hash::Hash>() {}
        assert_copy::<HiddenState>();
        assert_eq::<HiddenState>();
        assert_hash::<HiddenState>();
    }
}
