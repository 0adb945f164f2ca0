//! Direct triangular sliding average.

use glam::DVec3;

use super::{kernel, Convolution};
use crate::{options::BoundaryPolicy, trajectory::Frame};

/// Visits every in-range neighbor of every output frame and divides by the
/// weight used. Clamped edges add the frames past each end in closed form.
/// O(frames · min(window, frames) · atoms).
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveConvolution;

impl Convolution for NaiveConvolution {
    fn convolve(
        &self,
        frames: &[Frame],
        window: usize,
        boundary: BoundaryPolicy,
    ) -> Vec<Frame> {
        let n = frames.len();
        let atoms = frames.first().map_or(0, Vec::len);
        let reach = window.min(n.saturating_sub(1));

        (0..n)
            .map(|i| {
                let mut acc = vec![DVec3::ZERO; atoms];
                let mut total = 0.0;
                let lo = i.saturating_sub(reach);
                let hi = (i + reach).min(n - 1);
                let neighbors = frames.iter().enumerate().take(hi + 1).skip(lo);
                for (j, frame) in neighbors {
                    let weight =
                        kernel::triangular_weight(window, i.abs_diff(j));
                    total += weight;
                    add_scaled(&mut acc, frame, weight);
                }
                if boundary == BoundaryPolicy::Clamp {
                    let before = kernel::overhang_weight(window, i);
                    let after = kernel::overhang_weight(window, n - 1 - i);
                    add_scaled(&mut acc, &frames[0], before);
                    add_scaled(&mut acc, &frames[n - 1], after);
                    total += before + after;
                }
                for a in &mut acc {
                    *a /= total;
                }
                acc
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "naive"
    }
}

fn add_scaled(acc: &mut [DVec3], frame: &[DVec3], weight: f64) {
    if weight == 0.0 {
        return;
    }
    for (a, x) in acc.iter_mut().zip(frame) {
        *a += *x * weight;
    }
}
