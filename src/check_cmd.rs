//! Check command: validate a model against capture data without simulating.

use anyhow::{Context, Result};
use tracing::info_span;

use recap_history::CaptureData;
use recap_hmm::{ModelSpec, ParameterMatrices, ParameterMatrixProvider, require_distinct_histories};
use recap_io::read_parquet;

use crate::cli::CheckArgs;
use crate::config::RecapConfig;
use crate::convert;

/// Run the check: compute and validate the parameter matrices, then print a
/// summary of the dataset and model.
pub fn run(args: CheckArgs) -> Result<()> {
    let _cmd = info_span!("check").entered();

    let config = RecapConfig::load(&args.config)?;
    let input = args
        .input
        .as_ref()
        .or(config.io.input.as_ref())
        .ok_or_else(|| anyhow::anyhow!("no input path: set [io].input in config or use --input"))?;

    let registry = convert::build_registry(&config.models)?;
    let name = convert::resolve_model_name(args.model.as_deref(), &config.simulate, &registry)?;
    let model = registry.get(&name)?;

    let data = read_parquet(input)
        .with_context(|| format!("failed to read Parquet: {}", input.display()))?;
    let matrices = check(&data, model).with_context(|| format!("model {name:?} failed checks"))?;

    println!("{}", summary(&name, model, &data, &matrices));
    Ok(())
}

/// Computes and validates the matrices of `model` over `data`.
fn check(data: &CaptureData, model: &ModelSpec) -> Result<ParameterMatrices> {
    require_distinct_histories(data)?;
    let matrices = model.parameter_matrices(data)?;
    matrices.validate()?;
    Ok(matrices)
}

fn summary(name: &str, model: &ModelSpec, data: &CaptureData, pm: &ParameterMatrices) -> String {
    let first_release = pm.starts().iter().min().copied().unwrap_or(0);
    let last_release = pm.starts().iter().max().copied().unwrap_or(0);
    format!(
        "model: {name} ({})\n\
         records: {} ({} distinct histories)\n\
         rows to simulate: {}\n\
         occasions: {}\n\
         hidden states: {}\n\
         alphabet: {}\n\
         release occasions: {first_release}..={last_release}\n\
         covariates: {}",
        model.family(),
        data.len(),
        data.n_distinct_histories(),
        data.total_freq(),
        pm.n_occasions(),
        pm.n_states(),
        pm.levels().codes().join(" "),
        data.covariate_names().join(", "),
    )
}
