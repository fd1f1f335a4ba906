//! Pure conversion functions: TOML config structs -> crate API config types.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};

use crate::config::*;

use recap_hmm::{CjsSpec, ModelRegistry, ModelSpec, MultistrataSpec, ParamValue, SimulateConfig};
use recap_io::{Compression, WriterConfig};

/// Parses a compression algorithm name string into the corresponding enum variant.
pub fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "snappy" => Ok(Compression::Snappy),
        "zstd" => Ok(Compression::Zstd),
        other => bail!("unknown compression: {other:?}"),
    }
}

/// Converts a TOML parameter into a [`ParamValue`].
///
/// Exactly one of `value`, `by_occasion` or `column` must be set, and
/// `levels` must be given with `column` and only with it.
pub fn parse_param(name: &str, t: &ParamToml) -> Result<ParamValue> {
    let n_set = [t.value.is_some(), t.by_occasion.is_some(), t.column.is_some()]
        .iter()
        .filter(|&&b| b)
        .count();
    match n_set {
        0 => bail!("parameter {name} must have exactly one of value, by_occasion or column, got none"),
        1 => {}
        _ => bail!("parameter {name} must have exactly one of value, by_occasion or column, got {n_set}"),
    }

    if let Some(column) = &t.column {
        let Some(levels) = &t.levels else {
            bail!("parameter {name} groups by column {column:?} but has no levels");
        };
        return Ok(ParamValue::ByGroup {
            column: column.clone(),
            levels: levels.clone(),
        });
    }
    if t.levels.is_some() {
        bail!("parameter {name} has levels but no column");
    }
    match (t.value, &t.by_occasion) {
        (Some(v), _) => Ok(ParamValue::Constant(v)),
        (None, values) => Ok(ParamValue::ByOccasion(values.clone().unwrap_or_default())),
    }
}

fn parse_stratum_params(
    what: &str,
    table: &BTreeMap<String, ParamToml>,
) -> Result<Vec<(String, ParamValue)>> {
    table
        .iter()
        .map(|(stratum, t)| Ok((stratum.clone(), parse_param(&format!("{what}[{stratum}]"), t)?)))
        .collect()
}

/// Builds a validated [`ModelSpec`] from its TOML definition.
pub fn build_model(model: &ModelToml) -> Result<ModelSpec> {
    let spec = match model {
        ModelToml::Cjs(cjs) => ModelSpec::Cjs(CjsSpec::new(
            parse_param("Phi", &cjs.phi)?,
            parse_param("p", &cjs.p)?,
        )),
        ModelToml::Multistrata(ms) => {
            let mut spec = MultistrataSpec::new(ms.strata.clone());
            for (stratum, v) in parse_stratum_params("S", &ms.survival)? {
                spec = spec.with_survival(&stratum, v);
            }
            for (stratum, v) in parse_stratum_params("p", &ms.detection)? {
                spec = spec.with_detection(&stratum, v);
            }
            for (from, targets) in &ms.movement {
                for (to, t) in targets {
                    let v = parse_param(&format!("Psi[{from}->{to}]"), t)?;
                    spec = spec.with_movement(from, to, v);
                }
            }
            ModelSpec::Multistrata(spec)
        }
    };
    spec.validate()?;
    Ok(spec)
}

/// Builds the model registry from the `[models]` tables.
pub fn build_registry(models: &BTreeMap<String, ModelToml>) -> Result<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    for (name, model) in models {
        let spec = build_model(model).with_context(|| format!("invalid model {name:?}"))?;
        registry.insert(name.clone(), spec);
    }
    Ok(registry)
}

/// Picks the model to run: the CLI override, then `[simulate].model`, then
/// the only model defined.
pub fn resolve_model_name(
    cli_model: Option<&str>,
    simulate: &SimulateToml,
    registry: &ModelRegistry,
) -> Result<String> {
    if let Some(name) = cli_model.or(simulate.model.as_deref()) {
        return Ok(name.to_string());
    }
    let mut names = registry.names();
    match (names.next(), names.next()) {
        (Some(only), None) => Ok(only.to_string()),
        (None, _) => bail!("no models defined: add a [models.<name>] table to the config"),
        (Some(_), Some(_)) => {
            bail!("several models defined: set [simulate].model in config or use --model")
        }
    }
}

/// Builds a [`SimulateConfig`] from the TOML simulation settings.
pub fn build_simulate_config(simulate: &SimulateToml, seed: Option<u64>) -> Result<SimulateConfig> {
    let mut cfg = SimulateConfig::new().with_parallel(simulate.parallel);
    if let Some(d) = &simulate.delimiter {
        cfg = cfg.with_delimiter(d.clone());
    }
    if let Some(s) = seed {
        cfg = cfg.with_seed(s);
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a [`WriterConfig`] from the TOML I/O configuration.
pub fn build_writer_config(io: &IoConfig) -> Result<WriterConfig> {
    let compression = parse_compression(&io.compression)?;
    let cfg = WriterConfig::default()
        .with_compression(compression)
        .with_row_group_size(io.row_group_size);
    cfg.validate()?;
    Ok(cfg)
}
