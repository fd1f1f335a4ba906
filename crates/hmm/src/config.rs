//! Configuration for history simulation.

use crate::error::HmmError;

/// Configuration for [`simulate_histories`](crate::simulate_histories).
///
/// # Example
///
/// ```
/// use recap_hmm::SimulateConfig;
///
/// let config = SimulateConfig::new()
///     .with_seed(42)
///     .with_parallel(true);
/// assert_eq!(config.seed(), Some(42));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulateConfig {
    seed: Option<u64>,
    parallel: bool,
    delimiter: Option<String>,
}

impl SimulateConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: no seed (drawn from the OS), sequential, delimiter chosen
    /// from the model's alphabet.
    pub fn new() -> Self {
        Self {
            seed: None,
            parallel: false,
            delimiter: None,
        }
    }

    /// Sets the base seed. Each record derives its own stream from it.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Simulates records in parallel with rayon.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Overrides the delimiter placed between occasion codes.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Returns the base seed, if set.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns `true` if records are simulated in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the delimiter override, if set.
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    /// Validates this configuration.
    ///
    /// The delimiter may be empty but must not contain control characters.
    pub fn validate(&self) -> Result<(), HmmError> {
        if let Some(d) = &self.delimiter {
            if d.chars().any(char::is_control) {
                return Err(HmmError::InvalidParameter {
                    name: "delimiter".to_string(),
                    reason: format!("must not contain control characters, got {d:?}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self::new()
    }
}
