//! Hidden Markov model forward simulation of capture-recapture histories.
//!
//! Given a model with fixed parameter values and a dataset of capture
//! records, this crate draws synthetic encounter histories: each record is
//! replicated `freq` times, released at its first encounter, moved through
//! hidden states by the transition matrices and observed through the
//! emission matrices.
//!
//! # Pipeline
//!
//! ```text
//!  ┌───────────────────┐     ┌───────────┐     ┌───────────────────┐
//!  │ ParameterMatrix-  │────▶│ simulate  │────▶│ recap-history     │
//!  │ Provider (models) │     │ (sampler) │     │ (encode/assemble) │
//!  └───────────────────┘     └───────────┘     └───────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use recap_history::CaptureData;
//! use recap_hmm::{CjsSpec, SimulateConfig, simulate_histories};
//!
//! let mut data = CaptureData::new(vec!["sex".to_string()]).unwrap();
//! data.push("100", 10, vec!["F".into()]).unwrap();
//! data.push("110", 5, vec!["M".into()]).unwrap();
//!
//! let model = CjsSpec::new(0.8.into(), 0.5.into());
//! let config = SimulateConfig::new().with_seed(42);
//! let out = simulate_histories(&data, &model, &config).unwrap();
//!
//! assert_eq!(out.n_rows(), 15);
//! assert!(out.ch().iter().all(|ch| ch.starts_with('1')));
//! ```

pub mod config;
pub mod error;
pub mod matrices;
pub mod models;
pub mod params;
pub mod provider;
pub mod sampler;
pub mod simulate;
pub mod state;

pub use config::SimulateConfig;
pub use error::HmmError;
pub use matrices::ParameterMatrices;
pub use models::{CjsSpec, ModelSpec, MultistrataSpec};
pub use params::ParamValue;
pub use provider::{ModelRegistry, ParameterMatrixProvider};
pub use sampler::{PROB_TOLERANCE, StateSampler, validate_distribution};
pub use simulate::{
    record_seed, require_distinct_histories, simulate_histories, simulate_named, simulate_record,
};
pub use state::{HiddenState, Occupancy};
