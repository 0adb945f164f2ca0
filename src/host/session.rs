//! In-memory trajectory session with JSON dump support.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::TrajectoryHost;
use crate::{
    error::SmoothError,
    trajectory::{Frame, Trajectory, TrajectoryInfo},
};

/// On-disk shape of a session.
#[derive(Deserialize)]
struct SessionFile {
    trajectories: Vec<Trajectory>,
}

#[derive(Serialize)]
struct SessionFileRef<'a> {
    trajectories: &'a [Trajectory],
}

/// Loaded trajectories, addressable by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    trajectories: Vec<Trajectory>,
    /// Trajectory id → index into `trajectories`.
    index: FxHashMap<u32, usize>,
}

impl Session {
    /// Empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session over the given trajectories.
    ///
    /// Ids must be unique and every trajectory needs at least one frame.
    pub fn from_trajectories(
        trajectories: Vec<Trajectory>,
    ) -> Result<Self, SmoothError> {
        let mut session = Self::new();
        for trajectory in trajectories {
            session.add(trajectory)?;
        }
        Ok(session)
    }

    /// Add one trajectory.
    pub fn add(&mut self, trajectory: Trajectory) -> Result<(), SmoothError> {
        let id = trajectory.id();
        if self.index.contains_key(&id) {
            return Err(SmoothError::SessionParse(format!(
                "duplicate trajectory id #{id}"
            )));
        }
        if trajectory.frame_count() == 0 {
            return Err(SmoothError::SessionParse(format!(
                "trajectory #{id} has no frames"
            )));
        }
        let _ = self.index.insert(id, self.trajectories.len());
        self.trajectories.push(trajectory);
        Ok(())
    }

    /// Trajectory with this id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Trajectory> {
        self.index.get(&id).map(|&i| &self.trajectories[i])
    }

    /// All trajectories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter()
    }

    /// Number of trajectories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    /// Whether the session holds no trajectories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Parse a session from JSON.
    pub fn from_json(json: &str) -> Result<Self, SmoothError> {
        let file: SessionFile = serde_json::from_str(json)
            .map_err(|e| SmoothError::SessionParse(e.to_string()))?;
        Self::from_trajectories(file.trajectories)
    }

    /// Serialize the session to JSON.
    pub fn to_json(&self) -> Result<String, SmoothError> {
        let file = SessionFileRef {
            trajectories: &self.trajectories,
        };
        serde_json::to_string(&file)
            .map_err(|e| SmoothError::SessionParse(e.to_string()))
    }

    /// Load a session from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SmoothError> {
        let content =
            std::fs::read_to_string(path).map_err(SmoothError::Io)?;
        Self::from_json(&content)
    }

    /// Save the session to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), SmoothError> {
        let content = self.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SmoothError::Io)?;
        }
        std::fs::write(path, content).map_err(SmoothError::Io)
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Trajectory, SmoothError> {
        let &i = self
            .index
            .get(&id)
            .ok_or(SmoothError::UnknownTrajectory(id))?;
        Ok(&mut self.trajectories[i])
    }
}

impl<'a> IntoIterator for &'a Session {
    type Item = &'a Trajectory;
    type IntoIter = std::slice::Iter<'a, Trajectory>;

    fn into_iter(self) -> Self::IntoIter {
        self.trajectories.iter()
    }
}

impl TrajectoryHost for Session {
    fn trajectories(&self) -> Vec<TrajectoryInfo> {
        self.trajectories.iter().map(Trajectory::info).collect()
    }

    fn frames(&self, id: u32) -> Result<Vec<Frame>, SmoothError> {
        self.get(id)
            .map(|t| t.frames().to_vec())
            .ok_or(SmoothError::UnknownTrajectory(id))
    }

    fn append_frames(
        &mut self,
        id: u32,
        frames: Vec<Frame>,
    ) -> Result<(), SmoothError> {
        self.get_mut(id)?.append_frames(frames)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    fn traj(id: u32, n: usize) -> Trajectory {
        Trajectory::new(
            id,
            (0..n).map(|i| vec![DVec3::splat(i as f64)]).collect(),
        )
    }

    #[test]
    fn rejects_duplicate_ids_and_empty_trajectories() {
        let err = Session::from_trajectories(vec![traj(1, 2), traj(1, 3)])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        let err =
            Session::from_trajectories(vec![Trajectory::new(4, Vec::new())])
                .unwrap_err();
        assert!(err.to_string().contains("#4"));
    }

    #[test]
    fn host_queries_by_id() {
        let mut session =
            Session::from_trajectories(vec![traj(3, 2), traj(1, 5)]).unwrap();
        let infos = session.trajectories();
        assert_eq!(infos[0].id, 3);
        assert_eq!(infos[1].frame_count, Some(5));

        assert_eq!(session.frames(1).unwrap().len(), 5);
        assert!(matches!(
            session.frames(2),
            Err(SmoothError::UnknownTrajectory(2))
        ));

        session
            .append_frames(3, vec![vec![DVec3::ZERO]; 2])
            .unwrap();
        assert_eq!(session.get(3).unwrap().frame_count(), 4);
        assert!(session.append_frames(9, Vec::new()).is_err());
    }

    #[test]
    fn json_round_trip() {
        let session =
            Session::from_trajectories(vec![traj(1, 3), traj(2, 1)]).unwrap();
        let json = session.to_json().unwrap();
        let parsed = Session::from_json(&json).unwrap();
        assert_eq!(parsed, session);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn json_positions_are_triples() {
        let json = r#"{"trajectories":[{"id":7,"frames":[[[1.0,2.0,3.0]],[[4.0,5.0,6.0]]]}]}"#;
        let session = Session::from_json(json).unwrap();
        let t = session.get(7).unwrap();
        assert_eq!(t.frames()[1][0], DVec3::new(4.0, 5.0, 6.0));
        assert!(Session::from_json("{\"trajectories\": 3}").is_err());
    }
}
