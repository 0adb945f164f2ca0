//! Narrow interface to the application that owns the trajectories.
//!
//! The smoother only needs three things from its host: the list of loaded
//! trajectories, their frames, and a way to append frames. [`Session`] is the
//! in-memory implementation used by the binary and by tests; a viewer
//! integration implements [`TrajectoryHost`] over its own model list.
//!
//! Visual orchestration (opening structures, framing the camera, exporting
//! images and movies) goes through [`HostCommand`] values collected in a
//! [`CommandScript`], never through direct calls into the host.

mod command;
mod session;

pub use command::{CommandScript, HostCommand};
pub use session::Session;

use crate::{
    error::SmoothError,
    trajectory::{Frame, TrajectoryInfo},
};

/// Read/append access to a host's trajectories.
pub trait TrajectoryHost {
    /// Every loaded trajectory with its frame count, in host order.
    fn trajectories(&self) -> Vec<TrajectoryInfo>;

    /// Ordered frames of trajectory `id`.
    fn frames(&self, id: u32) -> Result<Vec<Frame>, SmoothError>;

    /// Append `frames` after the existing frames of trajectory `id`.
    fn append_frames(
        &mut self,
        id: u32,
        frames: Vec<Frame>,
    ) -> Result<(), SmoothError>;
}
