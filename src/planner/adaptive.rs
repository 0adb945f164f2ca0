//! Frame-count based window with bounded growth.

use crate::{error::SmoothError, options::AdaptiveBounds};

/// Frame count assumed when the host cannot report one.
pub const FALLBACK_FRAME_COUNT: usize = 1;

/// Reject bounds that cannot produce a window.
pub fn check_bounds(bounds: &AdaptiveBounds) -> Result<(), SmoothError> {
    if bounds.scaling == 0 {
        return Err(SmoothError::InvalidParameter {
            strategy: "adaptive",
            reason: "frame scaling must be at least 1".to_owned(),
        });
    }
    if bounds.min_window > bounds.max_window {
        return Err(SmoothError::InvalidParameter {
            strategy: "adaptive",
            reason: format!(
                "min window {} exceeds max window {}",
                bounds.min_window, bounds.max_window
            ),
        });
    }
    Ok(())
}

/// `max(min, min(frames / scaling, max))`.
///
/// Bounds must have passed [`check_bounds`].
#[must_use]
pub fn adaptive_window(frame_count: usize, bounds: &AdaptiveBounds) -> usize {
    (frame_count / bounds.scaling)
        .min(bounds.max_window)
        .max(bounds.min_window)
}
