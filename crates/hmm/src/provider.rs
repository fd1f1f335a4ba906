//! The parameter-matrix interface and the explicit model registry.

use std::collections::BTreeMap;

use recap_history::{CaptureData, ObsLevels};

use crate::error::HmmError;
use crate::matrices::ParameterMatrices;
use crate::models::ModelSpec;

/// Computes the HMM probability structures for a dataset.
///
/// Implementations must be pure: the same specification and data always
/// give the same matrices, indexed by record position in `data`.
pub trait ParameterMatrixProvider {
    /// Returns the observation alphabet emitted by this model.
    fn obs_levels(&self) -> Result<ObsLevels, HmmError>;

    /// Returns the number of hidden states `m`.
    fn n_states(&self) -> usize;

    /// Computes initial, transition, and emission probabilities for every
    /// record of `data`.
    fn parameter_matrices(&self, data: &CaptureData) -> Result<ParameterMatrices, HmmError>;
}

/// An explicit mapping from model name to specification.
///
/// # Example
///
/// ```
/// use recap_hmm::{CjsSpec, ModelRegistry, ModelSpec};
///
/// let registry = ModelRegistry::new()
///     .with_model("Phi(.)p(.)", ModelSpec::Cjs(CjsSpec::new(0.8.into(), 0.5.into())));
/// assert!(registry.get("Phi(.)p(.)").is_ok());
/// assert!(registry.get("Phi(t)p(.)").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelSpec>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model, replacing any model with the same name.
    pub fn with_model(mut self, name: impl Into<String>, spec: ModelSpec) -> Self {
        self.models.insert(name.into(), spec);
        self
    }

    /// Inserts a model and returns the one it replaced, if any.
    pub fn insert(&mut self, name: impl Into<String>, spec: ModelSpec) -> Option<ModelSpec> {
        self.models.insert(name.into(), spec)
    }

    /// Looks up a model by name.
    ///
    /// # Errors
    ///
    /// Returns [`HmmError::UnknownModel`] if no model has that name.
    pub fn get(&self, name: &str) -> Result<&ModelSpec, HmmError> {
        self.models.get(name).ok_or_else(|| HmmError::UnknownModel {
            name: name.to_string(),
        })
    }

    /// Iterates over model names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CjsSpec;

    fn cjs(phi: f64) -> ModelSpec {
        ModelSpec::Cjs(CjsSpec::new(phi.into(), 0.5.into()))
    }

    #[test]
    fn lookup_by_name() {
        let registry = ModelRegistry::new()
            .with_model("b", cjs(0.1))
            .with_model("a", cjs(0.2));
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(registry.get("a").unwrap(), &cjs(0.2));
        assert_eq!(
            registry.get("c").unwrap_err(),
            HmmError::UnknownModel {
                name: "c".to_string()
            }
        );
    }

    #[test]
    fn insert_replaces() {
        let mut registry = ModelRegistry::new();
        assert!(registry.insert("m", cjs(0.1)).is_none());
        assert_eq!(registry.insert("m", cjs(0.9)), Some(cjs(0.1)));
        assert_eq!(registry.get("m").unwrap(), &cjs(0.9));
    }

    #[test]
    fn empty_registry() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_err());
    }
}
