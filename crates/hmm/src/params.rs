//! Fixed parameter values for the built-in models.

use std::collections::BTreeMap;

use recap_history::{CaptureData, CovariateValue};

use crate::error::HmmError;

/// A real-scale probability parameter, constant or varying by occasion or
/// by a covariate group.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use recap_hmm::ParamValue;
///
/// let phi = ParamValue::ByGroup {
///     column: "sex".to_string(),
///     levels: BTreeMap::from([("F".to_string(), 0.8), ("M".to_string(), 0.6)]),
/// };
/// assert!(phi.validate("Phi").is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Same value for every individual and occasion.
    Constant(f64),
    /// One value per occasion; entry `j - 1` applies to occasion `j`.
    ByOccasion(Vec<f64>),
    /// One value per level of a covariate column.
    ByGroup {
        /// Covariate column name.
        column: String,
        /// Value for each covariate level. Keys match text covariates
        /// exactly and numeric covariates by parsed value, so `"1.0"`
        /// matches a float `1.0`.
        levels: BTreeMap<String, f64>,
    },
}

impl ParamValue {
    /// Checks that every value is a probability.
    ///
    /// # Errors
    ///
    /// Returns [`HmmError::InvalidParameter`] if a value is non-finite or
    /// outside `[0, 1]`, or if a varying parameter has no values.
    pub fn validate(&self, name: &str) -> Result<(), HmmError> {
        let check = |v: f64| -> Result<(), HmmError> {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(HmmError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("{v} is outside [0, 1]"),
                });
            }
            Ok(())
        };
        match self {
            Self::Constant(v) => check(*v),
            Self::ByOccasion(values) => {
                if values.is_empty() {
                    return Err(HmmError::InvalidParameter {
                        name: name.to_string(),
                        reason: "no occasion values".to_string(),
                    });
                }
                values.iter().try_for_each(|&v| check(v))
            }
            Self::ByGroup { column, levels } => {
                if levels.is_empty() {
                    return Err(HmmError::InvalidParameter {
                        name: name.to_string(),
                        reason: format!("no levels given for covariate {column:?}"),
                    });
                }
                levels.values().try_for_each(|&v| check(v))
            }
        }
    }

    /// Returns the value for record `id` at 1-indexed `occasion`.
    ///
    /// # Errors
    ///
    /// Returns [`HmmError::InvalidParameter`] if an occasion vector is too
    /// short, [`HmmError::MissingCovariate`] if the group column is absent,
    /// [`HmmError::MissingGroupValue`] if the record's covariate is missing,
    /// or [`HmmError::MissingGroupLevel`] if the record's level has no value.
    pub fn resolve(
        &self,
        name: &str,
        data: &CaptureData,
        id: usize,
        occasion: usize,
    ) -> Result<f64, HmmError> {
        match self {
            Self::Constant(v) => Ok(*v),
            Self::ByOccasion(values) => occasion
                .checked_sub(1)
                .and_then(|j| values.get(j))
                .copied()
                .ok_or_else(|| HmmError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!(
                        "no value for occasion {occasion} ({} given)",
                        values.len()
                    ),
                }),
            Self::ByGroup { column, levels } => {
                let col = data
                    .covariate_index(column)
                    .ok_or_else(|| HmmError::MissingCovariate {
                        name: column.clone(),
                    })?;
                let value = &data.records()[id].covariates()[col];
                if *value == CovariateValue::Missing {
                    return Err(HmmError::MissingGroupValue {
                        column: column.clone(),
                        row: id,
                    });
                }
                group_value(levels, value).ok_or_else(|| HmmError::MissingGroupLevel {
                    column: column.clone(),
                    level: value.to_string(),
                })
            }
        }
    }
}

fn group_value(levels: &BTreeMap<String, f64>, value: &CovariateValue) -> Option<f64> {
    let find = |matches: &dyn Fn(&str) -> bool| {
        levels
            .iter()
            .find(|(key, _)| matches(key.trim()))
            .map(|(_, &v)| v)
    };
    match value {
        CovariateValue::Text(s) => levels.get(s).copied(),
        CovariateValue::Int(i) => find(&|key| key.parse::<i64>().is_ok_and(|k| k == *i)),
        CovariateValue::Float(f) => find(&|key| key.parse::<f64>().is_ok_and(|k| k == *f)),
        CovariateValue::Missing => None,
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}
