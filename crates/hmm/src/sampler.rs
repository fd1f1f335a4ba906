//! Categorical sampling of hidden states and observation symbols.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution};

use crate::error::HmmError;

/// Tolerance on the sum of a probability vector.
pub const PROB_TOLERANCE: f64 = 1e-8;

/// Checks that `probs` is a probability vector.
///
/// Every entry must be finite and non-negative, and the entries must sum to
/// 1 within [`PROB_TOLERANCE`]. Vectors are never renormalised.
///
/// # Errors
///
/// Returns [`HmmError::InvalidProbabilities`] naming `context`.
pub fn validate_distribution(probs: &[f64], context: &str) -> Result<(), HmmError> {
    let invalid = |reason: String| HmmError::InvalidProbabilities {
        context: context.to_string(),
        reason,
    };
    if probs.is_empty() {
        return Err(invalid("no outcomes".to_string()));
    }
    let mut sum = 0.0;
    for (k, &p) in probs.iter().enumerate() {
        if !p.is_finite() {
            return Err(invalid(format!("entry {k} is not finite: {p}")));
        }
        if p < 0.0 {
            return Err(invalid(format!("entry {k} is negative: {p}")));
        }
        sum += p;
    }
    if (sum - 1.0).abs() > PROB_TOLERANCE {
        return Err(invalid(format!("sums to {sum}, expected 1")));
    }
    Ok(())
}

/// Draws categorical outcomes from an injected random number generator.
///
/// One sampler serves one stream of draws; the simulator gives every record
/// its own seeded sampler so results do not depend on scheduling.
///
/// # Example
///
/// ```
/// use recap_hmm::StateSampler;
///
/// let mut sampler = StateSampler::seeded(42);
/// let mut out = Vec::new();
/// sampler.draw_categorical(5, &[0.0, 1.0, 0.0], &mut out).unwrap();
/// assert_eq!(out, vec![1; 5]);
/// ```
#[derive(Debug, Clone)]
pub struct StateSampler<R = StdRng> {
    rng: R,
    cdf: Vec<f64>,
}

impl<R: Rng> StateSampler<R> {
    /// Wraps a random number generator.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            cdf: Vec::new(),
        }
    }

    /// Returns the underlying generator.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Draws `n` i.i.d. outcomes from `probs`, writing one outcome index per
    /// trial into `out` (cleared first).
    ///
    /// The CDF is built once per call and each trial costs one uniform draw
    /// plus a binary search. Zero-probability outcomes are never returned.
    ///
    /// # Errors
    ///
    /// Returns [`HmmError::InvalidProbabilities`] if `probs` is not a
    /// probability vector.
    pub fn draw_categorical(
        &mut self,
        n: usize,
        probs: &[f64],
        out: &mut Vec<usize>,
    ) -> Result<(), HmmError> {
        validate_distribution(probs, "categorical draw")?;
        out.clear();
        if n == 0 {
            return Ok(());
        }

        self.cdf.clear();
        let mut acc = 0.0;
        for &p in probs {
            acc += p;
            self.cdf.push(acc);
        }
        // Pin the tail to exactly 1.0 from the last outcome with mass onward.
        let last = probs.iter().rposition(|&p| p > 0.0).unwrap_or(probs.len() - 1);
        for c in &mut self.cdf[last..] {
            *c = 1.0;
        }

        out.reserve(n);
        for _ in 0..n {
            let u: f64 = self.rng.random();
            out.push(self.cdf.partition_point(|&c| c <= u).min(last));
        }
        Ok(())
    }

    /// Draws the number of trials landing on each outcome for `n` trials.
    ///
    /// Uses the conditional-binomial construction of the multinomial, so the
    /// cost is proportional to the number of outcomes rather than `n`.
    ///
    /// # Errors
    ///
    /// Returns [`HmmError::InvalidProbabilities`] if `probs` is not a
    /// probability vector.
    pub fn draw_counts(&mut self, n: u64, probs: &[f64]) -> Result<Vec<u64>, HmmError> {
        validate_distribution(probs, "multinomial draw")?;
        let mut counts = vec![0u64; probs.len()];
        let last = probs.iter().rposition(|&p| p > 0.0).unwrap_or(probs.len() - 1);

        let mut remaining = n;
        let mut mass = 1.0;
        for (k, &p) in probs.iter().enumerate().take(last) {
            if remaining == 0 {
                break;
            }
            let q = if mass > 0.0 {
                (p / mass).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let binomial =
                Binomial::new(remaining, q).map_err(|e| HmmError::InvalidProbabilities {
                    context: "multinomial draw".to_string(),
                    reason: e.to_string(),
                })?;
            let c = binomial.sample(&mut self.rng);
            counts[k] = c;
            remaining -= c;
            mass -= p;
        }
        counts[last] += remaining;
        Ok(counts)
    }
}

impl StateSampler<StdRng> {
    /// Creates a [`StdRng`]-backed sampler from a 64-bit seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + SeedableRng> StateSampler<R> {
    /// Restarts the stream from a 64-bit seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = R::seed_from_u64(seed);
    }
}
