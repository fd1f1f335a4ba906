//! Capture histories for mark-recapture simulation.
//!
//! This crate holds the data side of the simulator: the input dataset of
//! capture records, the observation alphabet, the string encoding of
//! simulated histories, and the assembly of the output dataset.
//!
//! # Pipeline
//!
//! ```text
//!  ┌─────────────┐     ┌────────────────┐     ┌───────────────────┐
//!  │ CaptureData │────▶│ HistoryEncoder │────▶│ ResultAssembler   │
//!  │ (releases)  │     │ (symbols→ch)   │     │ (ch + covariates) │
//!  └─────────────┘     └────────────────┘     └───────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use recap_history::{CaptureData, ObsLevels};
//!
//! let mut data = CaptureData::new(vec![]).unwrap();
//! data.push("0110", 5, vec![]).unwrap();
//!
//! let levels = ObsLevels::new(["0", "1"]).unwrap();
//! let releases = data.releases(&levels).unwrap();
//! assert_eq!(releases.occasion(0), 2);
//! ```

pub mod assemble;
pub mod data;
pub mod encode;
pub mod error;
pub mod levels;

pub use assemble::{ResultAssembler, SimulatedData, assemble};
pub use data::{CaptureData, CaptureRecord, CovariateValue, RESERVED_COLUMNS, Releases};
pub use encode::HistoryEncoder;
pub use error::HistoryError;
pub use levels::{NOT_OBSERVED, ObsLevels, release_occasion, split_history};
