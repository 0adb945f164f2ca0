//! Centralized smoothing options with TOML preset support.
//!
//! Strategy choice, window bounds and engine settings live in one explicit
//! [`Options`] value handed to the planner and engine at call time. Options
//! serialize to/from TOML presets.

mod engine;
mod planner;

use std::path::Path;

pub use engine::{BoundaryPolicy, ConvolutionMethod, EngineOptions};
pub use planner::{
    AdaptiveBounds, ManualWindow, PlannerOptions, StochasticOptions,
    StrategyKind,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::SmoothError, planner::SmoothingStrategy};

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[engine]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Window planning.
    pub planner: PlannerOptions,
    /// Convolution engine.
    pub engine: EngineOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SmoothError> {
        let content =
            std::fs::read_to_string(path).map_err(SmoothError::Io)?;
        toml::from_str(&content)
            .map_err(|e| SmoothError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), SmoothError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SmoothError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SmoothError::Io)?;
        }
        std::fs::write(path, content).map_err(SmoothError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// The active window strategy with its parameters.
    #[must_use]
    pub fn strategy(&self) -> SmoothingStrategy {
        SmoothingStrategy::from_kind(self.planner.strategy, &self.planner)
    }

    /// Every setting that shapes a run, as `(name, value)` pairs.
    ///
    /// Only settings relevant to the active strategy are listed.
    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let planner = &self.planner;
        let mut rows = vec![("strategy", planner.strategy.to_string())];
        match planner.strategy {
            StrategyKind::Manual => {
                let table = planner
                    .manual
                    .iter()
                    .map(|row| format!("#{}={}", row.id, row.window))
                    .collect::<Vec<_>>()
                    .join(",");
                rows.push(("manual", table));
            }
            StrategyKind::Linear => {}
            StrategyKind::Adaptive => {
                let b = planner.adaptive;
                rows.push(("min_window", b.min_window.to_string()));
                rows.push(("max_window", b.max_window.to_string()));
                rows.push(("scaling", b.scaling.to_string()));
            }
            StrategyKind::Stochastic => {
                let seed = planner
                    .stochastic
                    .seed
                    .map_or_else(|| "entropy".to_owned(), |s| s.to_string());
                rows.push(("seed", seed));
            }
        }
        rows.push(("method", self.engine.method.to_string()));
        rows.push(("boundary", self.engine.boundary.to_string()));
        rows.push(("parallel", self.engine.parallel.to_string()));
        rows
    }

    /// [`Self::summary`] joined into one log line.
    #[must_use]
    pub fn summary_line(&self) -> String {
        self.summary()
            .iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
