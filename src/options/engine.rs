use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the triangular filter is evaluated.
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
#[cfg_attr(feature = "binary", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ConvolutionMethod {
    /// Per-frame neighbor loop, O(frames · window · atoms).
    Naive,
    /// Normalized kernel swept over a flat frame-major buffer.
    #[default]
    Fast,
}

impl fmt::Display for ConvolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Naive => "naive",
            Self::Fast => "fast",
        })
    }
}

/// What the filter does with neighbors beyond the first and last frame.
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
#[cfg_attr(feature = "binary", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Drop missing neighbors and renormalize by the weights actually used.
    Truncate,
    /// Repeat the nearest edge frame so the kernel stays full length.
    #[default]
    Clamp,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Truncate => "truncate",
            Self::Clamp => "clamp",
        })
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
#[schemars(title = "Engine", inline)]
#[serde(default)]
/// Convolution engine configuration.
pub struct EngineOptions {
    /// Filter evaluation method.
    #[schemars(title = "Method")]
    pub method: ConvolutionMethod,
    /// Edge handling.
    #[schemars(title = "Boundary")]
    pub boundary: BoundaryPolicy,
    /// Smooth trajectories on worker threads (needs the `parallel`
    /// feature; ignored otherwise).
    #[schemars(title = "Parallel")]
    pub parallel: bool,
}
