//! Built-in capture-recapture models with fixed parameter values.
//!
//! | Model | Hidden states | Alphabet |
//! |-------|---------------|----------|
//! | CJS | alive, dead | `0`, `1` |
//! | Multistrata | one per stratum, then dead | `0`, stratum codes |
//!
//! Histories are conditioned on first capture: at the release occasion an
//! individual is observed with probability 1.

use std::collections::BTreeMap;

use recap_history::{CaptureData, NOT_OBSERVED, ObsLevels};
use tracing::debug;

use crate::error::HmmError;
use crate::matrices::ParameterMatrices;
use crate::params::ParamValue;
use crate::provider::ParameterMatrixProvider;
use crate::state::HiddenState;

/// Cormack-Jolly-Seber model: apparent survival `Phi` and detection `p`.
///
/// `Phi` at occasion `j` governs survival from `j` to `j + 1`; `p` at
/// occasion `j` governs detection at `j` (after release).
#[derive(Debug, Clone, PartialEq)]
pub struct CjsSpec {
    phi: ParamValue,
    p: ParamValue,
}

impl CjsSpec {
    const ALIVE: HiddenState = HiddenState::from_index(0);
    const DEAD: HiddenState = HiddenState::from_index(1);

    /// Creates a CJS specification.
    pub fn new(phi: ParamValue, p: ParamValue) -> Self {
        Self { phi, p }
    }

    /// Returns the survival parameter.
    pub fn phi(&self) -> &ParamValue {
        &self.phi
    }

    /// Returns the detection parameter.
    pub fn p(&self) -> &ParamValue {
        &self.p
    }

    /// Validates parameter ranges.
    pub fn validate(&self) -> Result<(), HmmError> {
        self.phi.validate("Phi")?;
        self.p.validate("p")
    }
}

impl ParameterMatrixProvider for CjsSpec {
    fn obs_levels(&self) -> Result<ObsLevels, HmmError> {
        Ok(ObsLevels::new(["0", "1"])?)
    }

    fn n_states(&self) -> usize {
        2
    }

    fn parameter_matrices(&self, data: &CaptureData) -> Result<ParameterMatrices, HmmError> {
        self.validate()?;
        let levels = self.obs_levels()?;
        let releases = data.releases(&levels)?;
        let t = releases.n_occasions();
        let mut pm =
            ParameterMatrices::zeros(levels, self.n_states(), t, releases.occasions().to_vec())?;

        for record in data.records() {
            let i = record.id();
            let s = releases.occasion(i);
            pm.initial_mut(i).copy_from_slice(&[1.0, 0.0]);
            for j in s..=t {
                if j < t {
                    let phi = self.phi.resolve("Phi", data, i, j)?;
                    pm.transition_row_mut(i, j, Self::ALIVE)
                        .copy_from_slice(&[phi, 1.0 - phi]);
                    pm.transition_row_mut(i, j, Self::DEAD)
                        .copy_from_slice(&[0.0, 1.0]);
                }
                let p = if j == s {
                    1.0
                } else {
                    self.p.resolve("p", data, i, j)?
                };
                pm.emission_dist_mut(i, j, Self::ALIVE)
                    .copy_from_slice(&[1.0 - p, p]);
                pm.emission_dist_mut(i, j, Self::DEAD)
                    .copy_from_slice(&[1.0, 0.0]);
            }
        }
        debug!(n_individuals = data.len(), n_occasions = t, "built CJS matrices");
        Ok(pm)
    }
}

/// Multistrata (Arnason-Schwarz) model: stratum-specific survival `S`,
/// detection `p`, and movement `Psi` between strata.
///
/// From stratum `r` an individual survives with `S_r`, then moves to stratum
/// `s != r` with `Psi_rs` or stays with `1 - Σ_s Psi_rs`. Strata without an
/// explicit movement entry are never entered from `r`.
///
/// # Example
///
/// ```
/// use recap_hmm::MultistrataSpec;
///
/// let spec = MultistrataSpec::new(vec!["A".to_string(), "B".to_string()])
///     .with_survival("A", 0.9.into())
///     .with_survival("B", 0.8.into())
///     .with_detection("A", 0.5.into())
///     .with_detection("B", 0.6.into())
///     .with_movement("A", "B", 0.2.into());
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MultistrataSpec {
    strata: Vec<String>,
    survival: BTreeMap<String, ParamValue>,
    detection: BTreeMap<String, ParamValue>,
    movement: BTreeMap<(String, String), ParamValue>,
}

impl MultistrataSpec {
    /// Creates a specification over the given stratum codes.
    pub fn new(strata: Vec<String>) -> Self {
        Self {
            strata,
            survival: BTreeMap::new(),
            detection: BTreeMap::new(),
            movement: BTreeMap::new(),
        }
    }

    /// Sets survival in a stratum.
    pub fn with_survival(mut self, stratum: &str, value: ParamValue) -> Self {
        self.survival.insert(stratum.to_string(), value);
        self
    }

    /// Sets detection in a stratum.
    pub fn with_detection(mut self, stratum: &str, value: ParamValue) -> Self {
        self.detection.insert(stratum.to_string(), value);
        self
    }

    /// Sets the probability of moving from one stratum to another.
    pub fn with_movement(mut self, from: &str, to: &str, value: ParamValue) -> Self {
        self.movement
            .insert((from.to_string(), to.to_string()), value);
        self
    }

    /// Returns the stratum codes.
    pub fn strata(&self) -> &[String] {
        &self.strata
    }

    /// Validates stratum names and parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`HmmError::InvalidParameter`] if there are no strata, a
    /// stratum lacks survival or detection, a parameter names an unknown
    /// stratum, a movement is a self-loop, or a value is out of range.
    pub fn validate(&self) -> Result<(), HmmError> {
        if self.strata.is_empty() {
            return Err(HmmError::InvalidParameter {
                name: "strata".to_string(),
                reason: "at least one stratum is required".to_string(),
            });
        }
        self.obs_levels()?;

        let known = |name: &str, stratum: &str| -> Result<(), HmmError> {
            if self.strata.iter().any(|s| s == stratum) {
                Ok(())
            } else {
                Err(HmmError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("unknown stratum {stratum:?}"),
                })
            }
        };

        for stratum in &self.strata {
            for (name, table) in [("S", &self.survival), ("p", &self.detection)] {
                let value = table.get(stratum).ok_or_else(|| HmmError::InvalidParameter {
                    name: format!("{name}[{stratum}]"),
                    reason: "no value given".to_string(),
                })?;
                value.validate(&format!("{name}[{stratum}]"))?;
            }
        }
        for (name, table) in [("S", &self.survival), ("p", &self.detection)] {
            for stratum in table.keys() {
                known(name, stratum)?;
            }
        }
        for ((from, to), value) in &self.movement {
            let name = format!("Psi[{from}->{to}]");
            known(&name, from)?;
            known(&name, to)?;
            if from == to {
                return Err(HmmError::InvalidParameter {
                    name,
                    reason: "staying is the complement of moving and cannot be set".to_string(),
                });
            }
            value.validate(&name)?;
        }
        Ok(())
    }

    fn dead(&self) -> HiddenState {
        HiddenState::from_index(self.strata.len())
    }

    /// Fills the transition row out of stratum `r` at occasion `j`.
    fn fill_transition(
        &self,
        pm: &mut ParameterMatrices,
        data: &CaptureData,
        i: usize,
        j: usize,
        r: usize,
    ) -> Result<(), HmmError> {
        let from = &self.strata[r];
        let survive = self.survival[from].resolve(&format!("S[{from}]"), data, i, j)?;

        let mut moves = vec![0.0; self.strata.len()];
        for (s, to) in self.strata.iter().enumerate() {
            if let Some(psi) = self.movement.get(&(from.clone(), to.clone())) {
                moves[s] = psi.resolve(&format!("Psi[{from}->{to}]"), data, i, j)?;
            }
        }
        let leaving: f64 = moves.iter().sum();
        if leaving > 1.0 + 1e-12 {
            return Err(HmmError::InvalidParameter {
                name: format!("Psi[{from}->*]"),
                reason: format!(
                    "movement out of stratum sums to {leaving} for individual {i} at occasion {j}"
                ),
            });
        }
        moves[r] = (1.0 - leaving).max(0.0);

        let dead = self.dead();
        let row = pm.transition_row_mut(i, j, HiddenState::from_index(r));
        for (to, psi) in moves.iter().enumerate() {
            row[to] = survive * psi;
        }
        row[dead.as_index()] = 1.0 - survive;
        Ok(())
    }
}

impl ParameterMatrixProvider for MultistrataSpec {
    fn obs_levels(&self) -> Result<ObsLevels, HmmError> {
        let codes = std::iter::once("0".to_string()).chain(self.strata.iter().cloned());
        Ok(ObsLevels::new(codes)?)
    }

    fn n_states(&self) -> usize {
        self.strata.len() + 1
    }

    fn parameter_matrices(&self, data: &CaptureData) -> Result<ParameterMatrices, HmmError> {
        self.validate()?;
        let levels = self.obs_levels()?;
        let n_symbols = levels.n_symbols();
        let releases = data.releases(&levels)?;
        let t = releases.n_occasions();
        let m = self.n_states();
        let dead = self.dead();
        let mut pm = ParameterMatrices::zeros(levels, m, t, releases.occasions().to_vec())?;

        for record in data.records() {
            let i = record.id();
            let s = releases.occasion(i);
            // Release symbols are stratum codes, so symbol `k` is stratum `k - 1`.
            let released_in = releases.symbol(i) - 1;
            pm.initial_mut(i)[released_in] = 1.0;

            for j in s..=t {
                for r in 0..self.strata.len() {
                    if j < t {
                        self.fill_transition(&mut pm, data, i, j, r)?;
                    }
                    let stratum = &self.strata[r];
                    let p = if j == s {
                        1.0
                    } else {
                        self.detection[stratum].resolve(&format!("p[{stratum}]"), data, i, j)?
                    };
                    let dist = pm.emission_dist_mut(i, j, HiddenState::from_index(r));
                    dist.fill(0.0);
                    dist[NOT_OBSERVED] = 1.0 - p;
                    dist[r + 1] = p;
                }
                if j < t {
                    let row = pm.transition_row_mut(i, j, dead);
                    row.fill(0.0);
                    row[dead.as_index()] = 1.0;
                }
                let dist = pm.emission_dist_mut(i, j, dead);
                dist.fill(0.0);
                dist[NOT_OBSERVED] = 1.0;
                debug_assert_eq!(dist.len(), n_symbols);
            }
        }
        debug!(
            n_individuals = data.len(),
            n_occasions = t,
            n_strata = self.strata.len(),
            "built multistrata matrices"
        );
        Ok(pm)
    }
}

/// Any built-in model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSpec {
    /// Cormack-Jolly-Seber.
    Cjs(CjsSpec),
    /// Multistrata (Arnason-Schwarz).
    Multistrata(MultistrataSpec),
}

impl ModelSpec {
    /// Validates the wrapped specification.
    pub fn validate(&self) -> Result<(), HmmError> {
        match self {
            Self::Cjs(spec) => spec.validate(),
            Self::Multistrata(spec) => spec.validate(),
        }
    }

    /// Returns a short name for the model family.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Cjs(_) => "cjs",
            Self::Multistrata(_) => "multistrata",
        }
    }
}

impl ParameterMatrixProvider for ModelSpec {
    fn obs_levels(&self) -> Result<ObsLevels, HmmError> {
        match self {
            Self::Cjs(spec) => spec.obs_levels(),
            Self::Multistrata(spec) => spec.obs_levels(),
        }
    }

    fn n_states(&self) -> usize {
        match self {
            Self::Cjs(spec) => spec.n_states(),
            Self::Multistrata(spec) => spec.n_states(),
        }
    }

    fn parameter_matrices(&self, data: &CaptureData) -> Result<ParameterMatrices, HmmError> {
        match self {
            Self::Cjs(spec) => spec.parameter_matrices(data),
            Self::Multistrata(spec) => spec.parameter_matrices(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use recap_history::CovariateValue;

    fn cjs_data() -> CaptureData {
        let mut data = CaptureData::new(vec!["sex".to_string()]).unwrap();
        data.push("1000", 3, vec![CovariateValue::from("F")]).unwrap();
        data.push("0011", 2, vec![CovariateValue::from("M")]).unwrap();
        data
    }

    fn ms_spec() -> MultistrataSpec {
        MultistrataSpec::new(vec!["A".to_string(), "B".to_string()])
            .with_survival("A", 0.9.into())
            .with_survival("B", 0.7.into())
            .with_detection("A", 0.5.into())
            .with_detection("B", 0.4.into())
            .with_movement("A", "B", 0.25.into())
    }

    #[test]
    fn cjs_structure() {
        let spec = CjsSpec::new(0.8.into(), 0.6.into());
        let data = cjs_data();
        let pm = spec.parameter_matrices(&data).unwrap();
        pm.validate().unwrap();

        let alive = CjsSpec::ALIVE;
        let dead = CjsSpec::DEAD;
        assert_eq!(pm.n_states(), 2);
        assert_eq!(pm.n_occasions(), 4);
        assert_eq!(pm.starts(), &[1, 3]);
        assert_eq!(pm.initial(0), &[1.0, 0.0]);
        assert_abs_diff_eq!(pm.transition(0, 1, alive, alive), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(pm.transition(0, 1, alive, dead), 0.2, epsilon = 1e-12);
        assert_eq!(pm.transition(0, 2, dead, dead), 1.0);
        // Conditioned on first capture.
        assert_eq!(pm.emission(0, 1, 1, alive), 1.0);
        assert_eq!(pm.emission(1, 3, 1, alive), 1.0);
        assert_abs_diff_eq!(pm.emission(0, 2, 1, alive), 0.6, epsilon = 1e-12);
        assert_eq!(pm.emission(1, 4, 0, dead), 1.0);
    }

    #[test]
    fn cjs_group_and_time_parameters() {
        let spec = CjsSpec::new(
            ParamValue::ByGroup {
                column: "sex".to_string(),
                levels: BTreeMap::from([("F".to_string(), 0.9), ("M".to_string(), 0.5)]),
            },
            ParamValue::ByOccasion(vec![0.0, 0.2, 0.3, 0.4]),
        );
        let pm = spec.parameter_matrices(&cjs_data()).unwrap();
        let alive = CjsSpec::ALIVE;
        assert_abs_diff_eq!(pm.transition(0, 2, alive, alive), 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(pm.transition(1, 3, alive, alive), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(pm.emission(0, 3, 1, alive), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(pm.emission(1, 4, 1, alive), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn cjs_rejects_bad_parameters() {
        let spec = CjsSpec::new(1.5.into(), 0.5.into());
        assert!(matches!(
            spec.parameter_matrices(&cjs_data()),
            Err(HmmError::InvalidParameter { .. })
        ));
        let short = CjsSpec::new(ParamValue::ByOccasion(vec![0.5]), 0.5.into());
        assert!(matches!(
            short.parameter_matrices(&cjs_data()),
            Err(HmmError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn cjs_rejects_foreign_symbols() {
        let mut data = CaptureData::new(vec![]).unwrap();
        data.push("0A0", 1, vec![]).unwrap();
        let spec = CjsSpec::new(0.5.into(), 0.5.into());
        assert!(matches!(
            spec.parameter_matrices(&data),
            Err(HmmError::History(_))
        ));
    }

    #[test]
    fn multistrata_structure() {
        let mut data = CaptureData::new(vec![]).unwrap();
        data.push("A00", 1, vec![]).unwrap();
        data.push("0B0", 1, vec![]).unwrap();
        let spec = ms_spec();
        let pm = spec.parameter_matrices(&data).unwrap();
        pm.validate().unwrap();

        let a = HiddenState::new(1);
        let b = HiddenState::new(2);
        let dead = HiddenState::new(3);
        assert_eq!(pm.n_states(), 3);
        assert_eq!(pm.levels().codes(), &["0", "A", "B"]);
        assert_eq!(pm.initial(0), &[1.0, 0.0, 0.0]);
        assert_eq!(pm.initial(1), &[0.0, 1.0, 0.0]);

        assert_abs_diff_eq!(pm.transition(0, 1, a, a), 0.9 * 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(pm.transition(0, 1, a, b), 0.9 * 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(pm.transition(0, 1, a, dead), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(pm.transition(0, 1, b, b), 0.7, epsilon = 1e-12);
        assert_eq!(pm.transition(0, 1, b, a), 0.0);
        assert_eq!(pm.transition(0, 2, dead, dead), 1.0);

        assert_eq!(pm.emission(1, 2, 2, b), 1.0);
        assert_abs_diff_eq!(pm.emission(1, 3, 2, b), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(pm.emission(1, 3, 0, b), 0.6, epsilon = 1e-12);
        assert_eq!(pm.emission(0, 3, 1, b), 0.0);
        assert_eq!(pm.emission(0, 2, 0, dead), 1.0);
    }

    #[test]
    fn multistrata_validation() {
        assert!(ms_spec().validate().is_ok());
        assert!(MultistrataSpec::new(vec![]).validate().is_err());

        let missing_p = MultistrataSpec::new(vec!["A".to_string()]).with_survival("A", 0.9.into());
        assert!(missing_p.validate().is_err());

        let unknown = ms_spec().with_movement("A", "C", 0.1.into());
        assert!(unknown.validate().is_err());

        let self_loop = ms_spec().with_movement("A", "A", 0.1.into());
        assert!(self_loop.validate().is_err());

        let zero_code = MultistrataSpec::new(vec!["0".to_string()])
            .with_survival("0", 0.9.into())
            .with_detection("0", 0.5.into());
        assert!(matches!(zero_code.validate(), Err(HmmError::History(_))));
    }

    #[test]
    fn multistrata_rejects_excess_movement() {
        let spec = MultistrataSpec::new(vec!["A".to_string(), "B".to_string(), "C".to_string()])
            .with_survival("A", 0.9.into())
            .with_survival("B", 0.9.into())
            .with_survival("C", 0.9.into())
            .with_detection("A", 0.5.into())
            .with_detection("B", 0.5.into())
            .with_detection("C", 0.5.into())
            .with_movement("A", "B", 0.6.into())
            .with_movement("A", "C", 0.6.into());
        let mut data = CaptureData::new(vec![]).unwrap();
        data.push("A0", 1, vec![]).unwrap();
        assert!(matches!(
            spec.parameter_matrices(&data),
            Err(HmmError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn model_spec_delegates() {
        let model = ModelSpec::Multistrata(ms_spec());
        assert_eq!(model.family(), "multistrata");
        assert_eq!(model.n_states(), 3);
        assert_eq!(model.obs_levels().unwrap().n_symbols(), 3);
        assert!(model.validate().is_ok());

        let cjs = ModelSpec::Cjs(CjsSpec::new(0.5.into(), 0.5.into()));
        assert_eq!(cjs.family(), "cjs");
        assert_eq!(cjs.n_states(), 2);
    }
}
