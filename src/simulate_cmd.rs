//! Simulate command: read capture data, simulate histories, write Parquet.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use recap_hmm::simulate_named;
use recap_io::{read_parquet, write_parquet};

use crate::cli::SimulateArgs;
use crate::config::RecapConfig;
use crate::convert;

/// Run the simulation pipeline.
pub fn run(args: SimulateArgs) -> Result<()> {
    let _cmd = info_span!("simulate").entered();

    // 1. Load config and apply CLI overrides
    let mut config = RecapConfig::load(&args.config)?;
    if args.input.is_some() {
        config.io.input = args.input;
    }
    if args.output.is_some() {
        config.io.output = args.output;
    }
    let seed = args.seed.or(config.seed);

    let input = config.io.input.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no input path: set [io].input in config or use --input")
    })?;
    let output = config.io.output.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no output path: set [io].output in config or use --output")
    })?;

    // 2. Build library configs
    let registry = convert::build_registry(&config.models)?;
    let model = convert::resolve_model_name(args.model.as_deref(), &config.simulate, &registry)?;
    let sim_cfg = convert::build_simulate_config(&config.simulate, seed)?;
    let writer_cfg = convert::build_writer_config(&config.io)?;

    // 3. Read capture data
    info!(path = %input.display(), "reading capture data");
    let data = read_parquet(input)
        .with_context(|| format!("failed to read Parquet: {}", input.display()))?;

    // 4. Simulate
    let simulated = simulate_named(&data, &registry, &model, &sim_cfg)
        .with_context(|| format!("simulation failed for model {model:?}"))?;

    // 5. Write output
    write_parquet(output, &simulated, &writer_cfg)
        .with_context(|| format!("failed to write Parquet: {}", output.display()))?;
    info!(
        path = %output.display(),
        n_rows = simulated.n_rows(),
        "simulation written"
    );
    Ok(())
}
