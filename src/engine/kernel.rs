//! Triangular kernel weights and the weight that falls past an edge.

/// Weight of a neighbor `distance` frames away: `window + 1 - distance`,
/// or 0 beyond the window.
#[inline]
#[must_use]
pub fn triangular_weight(window: usize, distance: usize) -> f64 {
    if distance > window {
        0.0
    } else {
        (window - distance) as f64 + 1.0
    }
}

/// Taps for offsets `-r..=r` with `r = min(window, reach)`, i.e.
/// `…, window, window + 1, window, …`.
///
/// `reach` bounds the kernel to the offsets that can land on a real frame,
/// so the length never depends on `window` alone.
#[must_use]
pub fn triangular_kernel(window: usize, reach: usize) -> Vec<f64> {
    let r = window.min(reach);
    (0..=2 * r)
        .map(|k| triangular_weight(window, k.abs_diff(r)))
        .collect()
}

/// [`triangular_kernel`] divided by the full kernel sum, so a complete
/// kernel sums to 1.
#[must_use]
pub fn normalized_kernel(window: usize, reach: usize) -> Vec<f64> {
    let total = full_weight_sum(window);
    triangular_kernel(window, reach)
        .into_iter()
        .map(|w| w / total)
        .collect()
}

/// Sum of the full kernel, `(window + 1)²`.
#[inline]
#[must_use]
pub fn full_weight_sum(window: usize) -> f64 {
    let peak = window as f64 + 1.0;
    peak * peak
}

/// Total weight of the taps that fall past an edge `inside` frames away.
///
/// Those are the distances `inside + 1..=window`, with weights
/// `m, m - 1, …, 1` for `m = window - inside`.
#[inline]
#[must_use]
pub fn overhang_weight(window: usize, inside: usize) -> f64 {
    let m = window.saturating_sub(inside) as f64;
    m * (m + 1.0) / 2.0
}
