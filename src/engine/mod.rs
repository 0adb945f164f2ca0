//! Convolution engine: triangular temporal smoothing of coordinate frames.
//!
//! Output frame `i` is a weighted average of input frames `j` with
//! `|i - j| ≤ window`, weighted `window + 1 - |i - j|`. Two interchangeable
//! implementations exist:
//!
//! - [`NaiveConvolution`]: per-frame neighbor loop.
//! - [`StridedConvolution`]: normalized kernel swept over a flat buffer.
//!
//! Both honor the same [`BoundaryPolicy`], so for a given policy their
//! output agrees to floating-point tolerance. Interior frames (at least
//! `window` frames from either end) are identical across policies; the first
//! and last `window` frames are not.

pub mod kernel;
mod naive;
mod strided;

pub use naive::NaiveConvolution;
pub use strided::StridedConvolution;

pub use crate::options::{BoundaryPolicy, ConvolutionMethod, EngineOptions};
use crate::{
    error::SmoothError,
    trajectory::{self, Frame, Trajectory},
};

/// A way of evaluating the triangular filter over a frame sequence.
///
/// Implementations may assume every frame has the same atom count.
pub trait Convolution: Send + Sync {
    /// Smoothed copy of `frames`, same length and atom order.
    fn convolve(
        &self,
        frames: &[Frame],
        window: usize,
        boundary: BoundaryPolicy,
    ) -> Vec<Frame>;

    /// Short name for logging.
    fn name(&self) -> &'static str {
        "unnamed"
    }
}

impl ConvolutionMethod {
    /// Implementation behind this method.
    #[must_use]
    pub fn convolution(self) -> &'static dyn Convolution {
        match self {
            Self::Naive => &NaiveConvolution,
            Self::Fast => &StridedConvolution,
        }
    }
}

/// Smoothed copy of trajectory `id`'s frames.
///
/// Fails with [`SmoothError::MalformedTrajectory`] before computing anything
/// if the frames disagree on atom count. Window 0 returns an exact copy.
pub fn smooth(
    id: u32,
    frames: &[Frame],
    window: usize,
    options: &EngineOptions,
) -> Result<Vec<Frame>, SmoothError> {
    let atoms = trajectory::check_frames(id, frames)?;
    let convolution = options.method.convolution();
    log::debug!(
        "Trajectory #{id}: {} convolution over {} frames × {atoms} atoms, \
         window {window}, {} edges",
        convolution.name(),
        frames.len(),
        options.boundary
    );
    Ok(convolution.convolve(frames, window, options.boundary))
}

/// [`smooth`] over a whole [`Trajectory`].
pub fn smooth_trajectory(
    trajectory: &Trajectory,
    window: usize,
    options: &EngineOptions,
) -> Result<Vec<Frame>, SmoothError> {
    smooth(trajectory.id(), trajectory.frames(), window, options)
}
