//! Window planning: how many neighbors each trajectory averages over.
//!
//! [`plan`] turns the session's trajectory list and one
//! [`SmoothingStrategy`] into a [`WindowPlan`]. Trajectories missing from the
//! plan are left alone by the smoother.
//!
//! # Strategies
//!
//! - **Manual**: caller-supplied id → window table, used verbatim.
//! - **Linear**: `window = 2 × id`.
//! - **Adaptive**: `window = max(min, min(frames / scaling, max))`, see
//!   [`adaptive`].
//! - **Stochastic**: randomized window in `2..=10`, see [`stochastic`].

pub mod adaptive;
pub mod stochastic;

use std::collections::{btree_map, BTreeMap};

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    error::SmoothError,
    options::{AdaptiveBounds, PlannerOptions, StrategyKind},
    trajectory::TrajectoryInfo,
};

/// Window strategy together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmoothingStrategy {
    /// Explicit id → window table.
    Manual(BTreeMap<u32, usize>),
    /// `window = 2 × id`.
    Linear,
    /// Frame-count based window within bounds.
    Adaptive(AdaptiveBounds),
    /// Randomized window; `seed` pins the draw.
    Stochastic {
        /// Fixed seed, or `None` for OS entropy.
        seed: Option<u64>,
    },
}

impl SmoothingStrategy {
    /// Strategy named by `selector`, with parameters from `options`.
    ///
    /// Fails with [`SmoothError::InvalidStrategy`] for unknown selectors.
    pub fn from_selector(
        selector: &str,
        options: &PlannerOptions,
    ) -> Result<Self, SmoothError> {
        let kind: StrategyKind = selector.parse()?;
        Ok(Self::from_kind(kind, options))
    }

    /// Strategy of the given kind, with parameters from `options`.
    #[must_use]
    pub fn from_kind(kind: StrategyKind, options: &PlannerOptions) -> Self {
        match kind {
            StrategyKind::Manual => Self::Manual(
                options.manual.iter().map(|row| (row.id, row.window)).collect(),
            ),
            StrategyKind::Linear => Self::Linear,
            StrategyKind::Adaptive => Self::Adaptive(options.adaptive),
            StrategyKind::Stochastic => Self::Stochastic {
                seed: options.stochastic.seed,
            },
        }
    }

    /// The selector this strategy answers to.
    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Manual(_) => StrategyKind::Manual,
            Self::Linear => StrategyKind::Linear,
            Self::Adaptive(_) => StrategyKind::Adaptive,
            Self::Stochastic { .. } => StrategyKind::Stochastic,
        }
    }

    /// Lowercase strategy name for status output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Window size per trajectory id, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowPlan {
    windows: BTreeMap<u32, usize>,
}

impl WindowPlan {
    /// Empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Window planned for `id`, if any.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<usize> {
        self.windows.get(&id).copied()
    }

    /// Whether `id` has a planned window.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.windows.contains_key(&id)
    }

    /// Set the window for `id`, replacing any previous one.
    pub fn insert(&mut self, id: u32, window: usize) {
        let _ = self.windows.insert(id, window);
    }

    /// Number of planned trajectories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether nothing is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// `(id, window)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.windows.iter().map(|(&id, &w)| (id, w))
    }
}

impl FromIterator<(u32, usize)> for WindowPlan {
    fn from_iter<I: IntoIterator<Item = (u32, usize)>>(iter: I) -> Self {
        Self {
            windows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for WindowPlan {
    type Item = (u32, usize);
    type IntoIter = btree_map::IntoIter<u32, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.into_iter()
    }
}

/// Compute a window for every trajectory the strategy covers.
///
/// No partial plan is returned on error.
pub fn plan(
    trajectories: &[TrajectoryInfo],
    strategy: &SmoothingStrategy,
) -> Result<WindowPlan, SmoothError> {
    log::info!("The {} smoothing strategy is active", strategy.name());

    let plan = match strategy {
        SmoothingStrategy::Manual(table) => {
            table.iter().map(|(&id, &w)| (id, w)).collect()
        }
        SmoothingStrategy::Linear => trajectories
            .iter()
            .map(|t| (t.id, t.id as usize * 2))
            .collect(),
        SmoothingStrategy::Adaptive(bounds) => {
            plan_adaptive(trajectories, bounds)?
        }
        SmoothingStrategy::Stochastic { seed } => {
            let mut rng = seed.map_or_else(
                StdRng::from_os_rng,
                StdRng::seed_from_u64,
            );
            plan_stochastic(trajectories, &mut rng)?
        }
    };

    for (id, window) in plan.iter() {
        log::info!("Trajectory #{id}: smoothing window {window}");
    }
    Ok(plan)
}

fn plan_adaptive(
    trajectories: &[TrajectoryInfo],
    bounds: &AdaptiveBounds,
) -> Result<WindowPlan, SmoothError> {
    adaptive::check_bounds(bounds)?;
    Ok(trajectories
        .iter()
        .map(|t| {
            let frames = t.frame_count.unwrap_or_else(|| {
                log::warn!(
                    "Frame count unavailable for trajectory #{}; assuming {}",
                    t.id,
                    adaptive::FALLBACK_FRAME_COUNT
                );
                adaptive::FALLBACK_FRAME_COUNT
            });
            log::debug!("Trajectory #{} has {frames} frames", t.id);
            (t.id, adaptive::adaptive_window(frames, bounds))
        })
        .collect())
}

/// Stochastic plan drawn from a caller-supplied RNG.
pub fn plan_stochastic<R: rand::Rng>(
    trajectories: &[TrajectoryInfo],
    rng: &mut R,
) -> Result<WindowPlan, SmoothError> {
    let windows = stochastic::StochasticWindows::new()?;
    let ids: Vec<u32> = trajectories.iter().map(|t| t.id).collect();
    let upper = stochastic::upper_half_ids(&ids);
    Ok(trajectories
        .iter()
        .map(|t| {
            let edge = upper.binary_search(&t.id).is_ok();
            (t.id, windows.sample(t.id, edge, rng))
        })
        .collect())
}
