use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level recap configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecapConfig {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// I/O settings.
    #[serde(default)]
    pub io: IoConfig,

    /// Simulation settings.
    #[serde(default)]
    pub simulate: SimulateToml,

    /// Named model definitions.
    #[serde(default)]
    pub models: BTreeMap<String, ModelToml>,
}

impl RecapConfig {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            compression: default_compression(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SimulateToml {
    /// Name of the model in `[models]` to simulate from.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub delimiter: Option<String>,
}

/// A model definition, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelToml {
    Cjs(CjsToml),
    Multistrata(MultistrataToml),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CjsToml {
    pub phi: ParamToml,
    pub p: ParamToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultistrataToml {
    pub strata: Vec<String>,
    /// Survival per stratum.
    pub survival: BTreeMap<String, ParamToml>,
    /// Detection per stratum.
    pub detection: BTreeMap<String, ParamToml>,
    /// Movement probabilities keyed by origin, then destination stratum.
    #[serde(default)]
    pub movement: BTreeMap<String, BTreeMap<String, ParamToml>>,
}

/// A parameter value. Exactly one of `value`, `by_occasion` or `column`
/// must be set; `levels` goes with `column`.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ParamToml {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub by_occasion: Option<Vec<f64>>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub levels: Option<BTreeMap<String, f64>>,
}
