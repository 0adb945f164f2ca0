//! Kernel-tap-major convolution over a flat frame buffer.
//!
//! Coordinates are laid out frame-major in one `f64` buffer with stride
//! `atoms · 3`. For every kernel tap the in-range output frames are updated
//! with a single contiguous axpy over the shifted source slab, so the inner
//! loop runs independently per atom and per spatial coordinate. Only taps
//! that can reach a real frame are built; what falls off either end is
//! handled per the [`BoundaryPolicy`].

use glam::DVec3;

use super::{kernel, Convolution};
use crate::{options::BoundaryPolicy, trajectory::Frame};

/// Normalized-kernel convolution along the frame axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct StridedConvolution;

impl Convolution for StridedConvolution {
    fn convolve(
        &self,
        frames: &[Frame],
        window: usize,
        boundary: BoundaryPolicy,
    ) -> Vec<Frame> {
        let n = frames.len();
        if n == 0 {
            return Vec::new();
        }
        let stride = frames.first().map_or(0, Vec::len) * 3;
        let input = flatten(frames, stride);
        let mut output = vec![0.0; n * stride];
        // Weight reaching each output frame; only consulted when truncating.
        let mut used = vec![0.0; n];
        let reach = window.min(n - 1);

        // Only offsets within `reach` can land on a real frame.
        let taps = kernel::normalized_kernel(window, reach);
        for (k, &weight) in taps.iter().enumerate() {
            let offset = k as i64 - reach as i64;
            // Output frames [lo, hi) read sources [lo + offset, hi + offset).
            let lo = (-offset).max(0) as usize;
            let hi = (n as i64 - offset).min(n as i64) as usize;
            let src_lo = (lo as i64 + offset) as usize;
            let src_hi = (hi as i64 + offset) as usize;
            axpy(
                weight,
                &input[src_lo * stride..src_hi * stride],
                &mut output[lo * stride..hi * stride],
            );
            for u in &mut used[lo..hi] {
                *u += weight;
            }
        }

        if boundary == BoundaryPolicy::Clamp {
            let total = kernel::full_weight_sum(window);
            let first = &input[..stride];
            let last = &input[(n - 1) * stride..];
            for (i, row) in output.chunks_exact_mut(stride.max(1)).enumerate()
            {
                let before = kernel::overhang_weight(window, i) / total;
                let after = kernel::overhang_weight(window, n - 1 - i) / total;
                axpy(before, first, row);
                axpy(after, last, row);
            }
        }

        if boundary == BoundaryPolicy::Truncate {
            let rows = output.chunks_exact_mut(stride.max(1));
            for (row, &u) in rows.zip(&used) {
                for x in row {
                    *x /= u;
                }
            }
        }

        unflatten(&output, n, stride)
    }

    fn name(&self) -> &'static str {
        "fast"
    }
}

/// `dst += a · src`, element-wise.
#[inline]
fn axpy(a: f64, src: &[f64], dst: &mut [f64]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d += a * s;
    }
}

fn flatten(frames: &[Frame], stride: usize) -> Vec<f64> {
    let mut flat = Vec::with_capacity(frames.len() * stride);
    for frame in frames {
        for p in frame {
            flat.extend_from_slice(&p.to_array());
        }
    }
    flat
}

fn unflatten(flat: &[f64], n: usize, stride: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| {
            flat[i * stride..(i + 1) * stride]
                .chunks_exact(3)
                .map(|c| DVec3::new(c[0], c[1], c[2]))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Vec<Frame> {
        (0..5)
            .map(|i| {
                let x = i as f64;
                vec![DVec3::new(x, 0.0, 0.0), DVec3::new(0.0, x * x, -x)]
            })
            .collect()
    }

    #[test]
    fn clamped_edges_repeat_end_frames() {
        let out =
            StridedConvolution.convolve(&ramp(), 1, BoundaryPolicy::Clamp);
        assert!((out[0][0].x - 0.25).abs() < 1e-12);
        assert!((out[2][0].x - 2.0).abs() < 1e-12);
        // (1·9 + 2·16 + 1·16) / 4
        assert!((out[4][1].y - 57.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn truncated_edges_renormalize() {
        let out =
            StridedConvolution.convolve(&ramp(), 1, BoundaryPolicy::Truncate);
        assert!((out[0][0].x - 1.0 / 3.0).abs() < 1e-12);
        assert!((out[0][1].z - -1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn window_wider_than_trajectory_clamps_everything() {
        let frames: Vec<Frame> =
            vec![vec![DVec3::splat(1.0)], vec![DVec3::splat(3.0)]];
        let out =
            StridedConvolution.convolve(&frames, 4, BoundaryPolicy::Clamp);
        // Taps at offsets <= 0 read frame 0, taps > 0 read frame 1.
        // Frame 0: (1+2+3+4+5)·1 + (4+3+2+1)·3 = 15 + 30 over 25.
        assert!((out[0][0].x - 45.0 / 25.0).abs() < 1e-12);
        // Frame 1: offsets <= -1 read frame 0, (1+2+3+4)·1; rest frame 1.
        assert!((out[1][0].x - (10.0 + 15.0 * 3.0) / 25.0).abs() < 1e-12);
    }

    #[test]
    fn zero_atoms_keeps_frame_count() {
        let frames: Vec<Frame> = vec![Vec::new(); 3];
        let out =
            StridedConvolution.convolve(&frames, 2, BoundaryPolicy::Truncate);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(Vec::is_empty));
    }
}
