use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SmoothError;

/// Which window strategy a smoothing run uses.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Explicit id → window table.
    Manual,
    /// Window is twice the trajectory id.
    #[serde(alias = "automatic")]
    Linear,
    /// Window grows with frame count between fixed bounds.
    Adaptive,
    /// Randomized window per trajectory.
    #[default]
    Stochastic,
}

impl StrategyKind {
    /// Lowercase name used in logs and option files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Linear => "linear",
            Self::Adaptive => "adaptive",
            Self::Stochastic => "stochastic",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = SmoothError;

    /// Accepts the strategy names and the legacy numeric selectors 1–4.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" | "1" => Ok(Self::Manual),
            "linear" | "automatic" | "2" => Ok(Self::Linear),
            "adaptive" | "3" => Ok(Self::Adaptive),
            "stochastic" | "4" => Ok(Self::Stochastic),
            _ => Err(SmoothError::InvalidStrategy {
                selector: s.to_owned(),
            }),
        }
    }
}

/// One row of the manual window table.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema,
)]
pub struct ManualWindow {
    /// Trajectory id.
    pub id: u32,
    /// Neighbors averaged on each side.
    pub window: usize,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema,
)]
#[schemars(title = "Adaptive", inline)]
#[serde(default)]
/// Bounds for the frame-count based window.
pub struct AdaptiveBounds {
    /// Smallest window ever produced.
    #[schemars(title = "Min Window", range(min = 0, max = 50))]
    pub min_window: usize,
    /// Largest window ever produced.
    #[schemars(title = "Max Window", range(min = 0, max = 50))]
    pub max_window: usize,
    /// Frames per unit of window growth.
    #[schemars(title = "Frame Scaling", range(min = 1))]
    pub scaling: usize,
}

impl Default for AdaptiveBounds {
    fn default() -> Self {
        Self {
            min_window: 3,
            max_window: 9,
            scaling: 1000,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    JsonSchema,
)]
#[schemars(title = "Stochastic", inline)]
#[serde(default)]
/// Randomness source for the stochastic strategy.
pub struct StochasticOptions {
    /// Fixed RNG seed. Unset draws from OS entropy on every run.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(title = "Seed")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Planner", inline)]
#[serde(default)]
/// Window planning configuration.
pub struct PlannerOptions {
    /// Active strategy.
    #[schemars(title = "Strategy")]
    pub strategy: StrategyKind,
    /// Table used by the manual strategy.
    #[schemars(skip)]
    pub manual: Vec<ManualWindow>,
    /// Bounds used by the adaptive strategy.
    pub adaptive: AdaptiveBounds,
    /// Settings for the stochastic strategy.
    pub stochastic: StochasticOptions,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            manual: (1..=6)
                .map(|id| ManualWindow {
                    id,
                    window: id as usize * 2,
                })
                .collect(),
            adaptive: AdaptiveBounds::default(),
            stochastic: StochasticOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_legacy_numbers() {
        assert_eq!(
            "manual".parse::<StrategyKind>().unwrap(),
            StrategyKind::Manual
        );
        assert_eq!("2".parse::<StrategyKind>().unwrap(), StrategyKind::Linear);
        assert_eq!(
            "Automatic".parse::<StrategyKind>().unwrap(),
            StrategyKind::Linear
        );
        assert_eq!(
            " 3 ".parse::<StrategyKind>().unwrap(),
            StrategyKind::Adaptive
        );
        assert_eq!(
            "stochastic".parse::<StrategyKind>().unwrap(),
            StrategyKind::Stochastic
        );
    }

    #[test]
    fn unknown_selector_is_invalid_strategy() {
        let err = "5".parse::<StrategyKind>().unwrap_err();
        assert!(matches!(
            err,
            SmoothError::InvalidStrategy { ref selector } if selector == "5"
        ));
        assert!("casino".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn default_manual_table_doubles_ids() {
        let opts = PlannerOptions::default();
        assert_eq!(opts.manual.len(), 6);
        assert!(opts
            .manual
            .iter()
            .all(|row| row.window == row.id as usize * 2));
    }
}
