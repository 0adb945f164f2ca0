//! Randomized per-trajectory windows.
//!
//! Each window starts from a baseline derived from the trajectory id, takes
//! a weighted discrete correction that favors small moves, an occasional
//! extra ±1 "edge" for ids in the upper half of the session, and a little
//! uniform noise. The sum is rounded and clamped to
//! [`MIN_WINDOW`]`..=`[`MAX_WINDOW`].

use rand::{
    distr::{weighted::WeightedIndex, Distribution},
    Rng,
};

use crate::error::SmoothError;

/// Smallest stochastic window.
pub const MIN_WINDOW: i64 = 2;
/// Largest stochastic window.
pub const MAX_WINDOW: i64 = 10;

const CORRECTIONS: [i64; 5] = [-2, -1, 0, 1, 2];
const CORRECTION_WEIGHTS: [f64; 5] = [0.1, 0.25, 0.3, 0.25, 0.1];
const EDGE_PROBABILITY: f64 = 0.2;
const NOISE: f64 = 0.25;

/// Draws stochastic windows from a caller-owned RNG.
#[derive(Debug, Clone)]
pub struct StochasticWindows {
    corrections: WeightedIndex<f64>,
}

impl StochasticWindows {
    /// Sampler over the fixed correction distribution.
    pub fn new() -> Result<Self, SmoothError> {
        let corrections =
            WeightedIndex::new(CORRECTION_WEIGHTS).map_err(|e| {
                SmoothError::InvalidParameter {
                    strategy: "stochastic",
                    reason: e.to_string(),
                }
            })?;
        Ok(Self { corrections })
    }

    /// One window for trajectory `id`.
    ///
    /// `upper_half` marks ids eligible for the extra edge perturbation.
    pub fn sample<R: Rng>(
        &self,
        id: u32,
        upper_half: bool,
        rng: &mut R,
    ) -> usize {
        let base = 4 + i64::from(id % 3);
        let mut correction = CORRECTIONS[self.corrections.sample(rng)];
        if upper_half && rng.random_bool(EDGE_PROBABILITY) {
            correction += if rng.random_bool(0.5) { 1 } else { -1 };
        }
        let noise = rng.random_range(-NOISE..=NOISE);
        let raw = ((base + correction) as f64 + noise).round() as i64;
        raw.clamp(MIN_WINDOW, MAX_WINDOW) as usize
    }
}

/// Ids whose rank among the session's sorted distinct ids is in the upper
/// half.
#[must_use]
pub fn upper_half_ids(ids: &[u32]) -> Vec<u32> {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let half = sorted.len() / 2;
    sorted.split_off(half)
}
