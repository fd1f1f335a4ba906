//! Forward simulation of capture histories.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use recap_history::{
    CaptureData, CaptureRecord, HistoryEncoder, HistoryError, NOT_OBSERVED, SimulatedData,
    assemble,
};
use tracing::{debug, info, trace};

use crate::config::SimulateConfig;
use crate::error::HmmError;
use crate::matrices::ParameterMatrices;
use crate::provider::{ModelRegistry, ParameterMatrixProvider};
use crate::sampler::StateSampler;
use crate::state::{HiddenState, Occupancy};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derives the seed of record `id`'s random stream from the run seed.
///
/// Streams depend only on `(base, id)`, so the order in which records are
/// simulated does not change the output.
pub fn record_seed(base: u64, id: usize) -> u64 {
    splitmix64(base ^ splitmix64(id as u64))
}

/// Simulates `freq` replicate histories of record `i`.
///
/// Returns a row-major `freq x T` buffer of symbol indices. Occasions before
/// the record's release occasion hold [`NOT_OBSERVED`].
///
/// # Algorithm
///
/// 1. Split the replicates over states at release with one multinomial draw
///    from the initial distribution.
/// 2. Emit at release, one draw batch per occupied state.
/// 3. For each later occasion, move each occupied state group through its
///    transition row, regroup, then emit.
///
/// Emissions never feed back into the state process.
///
/// # Errors
///
/// Returns [`HmmError::InvalidProbabilities`] if a distribution reached by
/// the recursion is not a probability vector.
///
/// # Panics
///
/// Panics if `i` is not an individual of `matrices`.
pub fn simulate_record<R: Rng>(
    matrices: &ParameterMatrices,
    i: usize,
    freq: usize,
    sampler: &mut StateSampler<R>,
) -> Result<Vec<usize>, HmmError> {
    let t = matrices.n_occasions();
    let start = matrices.start(i);
    let mut symbols = vec![NOT_OBSERVED; freq * t];
    if freq == 0 {
        return Ok(symbols);
    }

    // Replicates have no past at release, so only the state counts matter.
    let counts = sampler.draw_counts(freq as u64, matrices.initial(i))?;
    let mut states: Vec<HiddenState> = counts
        .iter()
        .enumerate()
        .flat_map(|(k, &c)| std::iter::repeat_n(HiddenState::from_index(k), c as usize))
        .collect();
    let mut draws = Vec::with_capacity(freq);

    let mut occupancy = Occupancy::new(matrices.n_states());
    occupancy.regroup(&states);
    emit(matrices, i, start, &occupancy, sampler, &mut draws, &mut symbols)?;

    for j in start + 1..=t {
        for (state, members) in occupancy.iter() {
            if members.is_empty() {
                trace!(record = i, occasion = j, %state, "no replicates to move");
                continue;
            }
            let row = matrices.transition_row(i, j - 1, state);
            sampler.draw_categorical(members.len(), row, &mut draws)?;
            for (&r, &next) in members.iter().zip(&draws) {
                states[r] = HiddenState::from_index(next);
            }
        }
        occupancy.regroup(&states);
        emit(matrices, i, j, &occupancy, sampler, &mut draws, &mut symbols)?;
    }
    Ok(symbols)
}

fn emit<R: Rng>(
    matrices: &ParameterMatrices,
    i: usize,
    occasion: usize,
    occupancy: &Occupancy,
    sampler: &mut StateSampler<R>,
    draws: &mut Vec<usize>,
    symbols: &mut [usize],
) -> Result<(), HmmError> {
    let t = matrices.n_occasions();
    for (state, members) in occupancy.iter() {
        if members.is_empty() {
            trace!(record = i, occasion, %state, "no replicates to observe");
            continue;
        }
        let dist = matrices.emission_dist(i, occasion, state);
        sampler.draw_categorical(members.len(), dist, draws)?;
        for (&r, &symbol) in members.iter().zip(draws.iter()) {
            symbols[r * t + occasion - 1] = symbol;
        }
    }
    Ok(())
}

/// Checks that `data` can seed a simulation: it must hold at least two
/// distinct capture histories.
///
/// # Errors
///
/// Returns [`HistoryError::EmptyData`] for an empty dataset and
/// [`HmmError::InsufficientHistories`] for a single distinct history.
pub fn require_distinct_histories(data: &CaptureData) -> Result<(), HmmError> {
    if data.is_empty() {
        return Err(HistoryError::EmptyData.into());
    }
    let distinct = data.n_distinct_histories();
    if distinct < 2 {
        return Err(HmmError::InsufficientHistories { distinct });
    }
    Ok(())
}

/// Simulates `freq` histories for every record of `data` under `provider`.
///
/// Output rows follow input record order; within a record, replicates are in
/// draw order. Each row carries the record's covariates.
///
/// # Errors
///
/// Returns [`HmmError::InsufficientHistories`] if `data` has fewer than two
/// distinct histories, any error from computing or validating the parameter
/// matrices, or [`HmmError::DimensionMismatch`] if the provider returns
/// matrices for a different number of individuals.
#[tracing::instrument(skip(data, provider, config), fields(n_records = data.len()))]
pub fn simulate_histories<P>(
    data: &CaptureData,
    provider: &P,
    config: &SimulateConfig,
) -> Result<SimulatedData, HmmError>
where
    P: ParameterMatrixProvider + ?Sized,
{
    config.validate()?;
    require_distinct_histories(data)?;

    let matrices = provider.parameter_matrices(data)?;
    matrices.validate()?;
    if matrices.n_individuals() != data.len() {
        return Err(HmmError::DimensionMismatch {
            what: "individuals in parameter matrices".to_string(),
            expected: data.len(),
            got: matrices.n_individuals(),
        });
    }

    let encoder = match config.delimiter() {
        Some(d) => HistoryEncoder::new(d),
        None => HistoryEncoder::for_levels(matrices.levels()),
    };
    let base_seed = config
        .seed()
        .unwrap_or_else(|| StdRng::from_os_rng().random());

    info!(
        seed = base_seed,
        n_occasions = matrices.n_occasions(),
        n_states = matrices.n_states(),
        total_rows = data.total_freq(),
        parallel = config.parallel(),
        "simulating capture histories"
    );

    let run = |record: &CaptureRecord| -> Result<Vec<String>, HmmError> {
        let id = record.id();
        let freq = record.freq() as usize;
        let mut sampler = StateSampler::seeded(record_seed(base_seed, id));
        let symbols = simulate_record(&matrices, id, freq, &mut sampler)?;
        debug!(record = id, freq, start = matrices.start(id), "simulated record");
        Ok(encoder.encode_rows(&symbols, matrices.n_occasions(), matrices.levels()))
    };

    let histories: Vec<Vec<String>> = if config.parallel() {
        data.records()
            .par_iter()
            .map(&run)
            .collect::<Result<_, _>>()?
    } else {
        data.records().iter().map(&run).collect::<Result<_, _>>()?
    };

    let out = assemble(data, histories)?;
    info!(n_rows = out.n_rows(), "simulation complete");
    Ok(out)
}

/// Simulates histories under the model registered as `name`.
///
/// # Errors
///
/// Returns [`HmmError::UnknownModel`] if `registry` has no such model, or any
/// error from [`simulate_histories`].
pub fn simulate_named(
    data: &CaptureData,
    registry: &ModelRegistry,
    name: &str,
    config: &SimulateConfig,
) -> Result<SimulatedData, HmmError> {
    let model = registry.get(name)?;
    info!(model = name, family = model.family(), "resolved model");
    simulate_histories(data, model, config)
}
