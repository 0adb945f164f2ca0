//! Coordinate history of a molecular dynamics trajectory.
//!
//! A [`Trajectory`] is an ordered list of frames sharing one atom set. Frames
//! are never edited in place: smoothing appends a new block of frames after
//! the originals.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::SmoothError;

/// One snapshot of every atom position, in a fixed atom order.
pub type Frame = Vec<DVec3>;

/// What a host can report about a trajectory without handing out its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryInfo {
    /// Stable trajectory (model) id.
    pub id: u32,
    /// Number of frames, or `None` when the host failed to report it.
    pub frame_count: Option<usize>,
}

/// Ordered frames of one trajectory, identified by a stable integer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    id: u32,
    frames: Vec<Frame>,
}

impl Trajectory {
    /// Trajectory over the given frames.
    #[must_use]
    pub fn new(id: u32, frames: Vec<Frame>) -> Self {
        Self { id, frames }
    }

    /// Stable trajectory id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// All frames, originals first, appended blocks after.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Total number of frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Atom count per frame (taken from frame 0).
    #[must_use]
    pub fn atom_count(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }

    /// Id and frame count.
    #[must_use]
    pub fn info(&self) -> TrajectoryInfo {
        TrajectoryInfo {
            id: self.id,
            frame_count: Some(self.frames.len()),
        }
    }

    /// Check that every frame has the same atom count.
    pub fn validate(&self) -> Result<(), SmoothError> {
        check_frames(self.id, &self.frames).map(|_| ())
    }

    /// Append a block of frames after the existing ones.
    ///
    /// The block must match the trajectory's atom count; on mismatch nothing
    /// is appended.
    pub fn append_frames(
        &mut self,
        frames: Vec<Frame>,
    ) -> Result<(), SmoothError> {
        if let Some(first) = self.frames.first() {
            let expected = first.len();
            if let Some((offset, bad)) =
                frames.iter().enumerate().find(|(_, f)| f.len() != expected)
            {
                return Err(SmoothError::MalformedTrajectory {
                    id: self.id,
                    frame: self.frames.len() + offset,
                    expected,
                    found: bad.len(),
                });
            }
        } else {
            let _ = check_frames(self.id, &frames)?;
        }
        self.frames.extend(frames);
        Ok(())
    }
}

/// Verify that all frames share frame 0's atom count and return that count.
///
/// An empty frame list has an atom count of 0.
pub fn check_frames(id: u32, frames: &[Frame]) -> Result<usize, SmoothError> {
    let Some(first) = frames.first() else {
        return Ok(0);
    };
    let expected = first.len();
    for (frame, positions) in frames.iter().enumerate().skip(1) {
        if positions.len() != expected {
            return Err(SmoothError::MalformedTrajectory {
                id,
                frame,
                expected,
                found: positions.len(),
            });
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Frame> {
        (0..n).map(|i| vec![DVec3::new(i as f64, 0.0, 0.0)]).collect()
    }

    #[test]
    fn append_keeps_originals_in_place() {
        let mut traj = Trajectory::new(1, line(3));
        let before = traj.frames().to_vec();
        traj.append_frames(line(3)).unwrap();
        assert_eq!(traj.frame_count(), 6);
        assert_eq!(&traj.frames()[..3], before.as_slice());
    }

    #[test]
    fn append_rejects_wrong_atom_count() {
        let mut traj = Trajectory::new(2, line(2));
        let bad = vec![vec![DVec3::ZERO, DVec3::ONE]];
        let err = traj.append_frames(bad).unwrap_err();
        assert!(matches!(
            err,
            SmoothError::MalformedTrajectory {
                id: 2,
                frame: 2,
                expected: 1,
                found: 2
            }
        ));
        assert_eq!(traj.frame_count(), 2);
    }

    #[test]
    fn check_frames_reports_first_bad_frame() {
        let mut frames = line(4);
        frames[2].push(DVec3::ONE);
        let err = check_frames(9, &frames).unwrap_err();
        assert!(matches!(
            err,
            SmoothError::MalformedTrajectory { id: 9, frame: 2, .. }
        ));
        assert_eq!(check_frames(9, &line(4)).unwrap(), 1);
        assert_eq!(check_frames(9, &[]).unwrap(), 0);
    }

    #[test]
    fn info_reports_frame_count() {
        let traj = Trajectory::new(5, line(7));
        assert_eq!(
            traj.info(),
            TrajectoryInfo {
                id: 5,
                frame_count: Some(7)
            }
        );
        assert_eq!(traj.atom_count(), 1);
    }
}
