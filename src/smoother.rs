//! Smoothing run over every trajectory a host has loaded.
//!
//! One run plans windows once, then for each trajectory that has more than
//! one frame and a planned window, smooths a copy of its frames and appends
//! that copy after the originals. A trajectory that cannot be smoothed is
//! skipped and reported; the rest of the run continues.

use std::fmt;

use crate::{
    engine,
    error::SmoothError,
    host::{CommandScript, TrajectoryHost},
    options::Options,
    planner::{self, WindowPlan},
    trajectory::{Frame, TrajectoryInfo},
};

/// Why a loaded trajectory was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The plan has no window for it.
    NotPlanned,
    /// One frame has no temporal neighbors.
    SingleFrame,
    /// Fetching, smoothing or appending failed.
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPlanned => f.write_str("no planned window"),
            Self::SingleFrame => f.write_str("single frame"),
            Self::Failed(msg) => f.write_str(msg),
        }
    }
}

/// A trajectory that received a smoothed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothedTrajectory {
    /// Trajectory id.
    pub id: u32,
    /// Window used.
    pub window: usize,
    /// Frames before the run.
    pub original_frames: usize,
    /// Frames appended by the run.
    pub appended_frames: usize,
}

/// Outcome of one [`Smoother::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothReport {
    /// Windows chosen by the planner.
    pub plan: WindowPlan,
    /// Trajectories that were smoothed, in host order.
    pub smoothed: Vec<SmoothedTrajectory>,
    /// Trajectories left alone, in host order.
    pub skipped: Vec<(u32, SkipReason)>,
}

impl SmoothReport {
    /// Ids of the smoothed trajectories.
    #[must_use]
    pub fn smoothed_ids(&self) -> Vec<u32> {
        self.smoothed.iter().map(|s| s.id).collect()
    }

    /// Host commands that play back every appended smoothed block.
    #[must_use]
    pub fn playback_script(&self) -> CommandScript {
        let mut script = CommandScript::new();
        for s in &self.smoothed {
            let _ = script.play_appended(
                s.id,
                s.original_frames,
                s.appended_frames,
            );
        }
        script
    }

    fn skip(&mut self, id: u32, reason: SkipReason) {
        match &reason {
            SkipReason::Failed(msg) => {
                log::warn!("Skipping trajectory #{id}: {msg}");
            }
            other => log::debug!("Skipping trajectory #{id}: {other}"),
        }
        self.skipped.push((id, reason));
    }
}

/// Trajectory whose frames are ready to smooth.
struct Job {
    id: u32,
    window: usize,
    frames: Vec<Frame>,
}

/// Smoothed frames waiting to be appended.
struct Outcome {
    id: u32,
    window: usize,
    original_frames: usize,
    result: Result<Vec<Frame>, SmoothError>,
}

/// Plans windows and smooths every eligible trajectory of a host.
#[derive(Debug, Clone, Default)]
pub struct Smoother {
    options: Options,
}

impl Smoother {
    /// Smoother with the given options.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Options in use.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Smooth every eligible trajectory of `host` and append the results.
    ///
    /// Planning errors abort the run before anything is appended. Per
    /// trajectory failures are recorded in the report.
    pub fn run<H: TrajectoryHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> Result<SmoothReport, SmoothError> {
        log::info!("Activated options: {}", self.options.summary_line());

        let infos = host.trajectories();
        let plan = planner::plan(&infos, &self.options.strategy())?;
        let mut report = SmoothReport {
            plan,
            ..SmoothReport::default()
        };

        let eligible = eligible(&infos, &mut report);
        if self.parallel_enabled() {
            let jobs: Vec<Job> = eligible
                .into_iter()
                .filter_map(|(id, window)| {
                    fetch(&*host, id, window, &mut report)
                })
                .collect();
            for outcome in self.smooth_all(jobs) {
                finish(host, outcome, &mut report);
            }
        } else {
            for (id, window) in eligible {
                if let Some(job) = fetch(&*host, id, window, &mut report) {
                    let outcome = self.smooth_job(job);
                    finish(host, outcome, &mut report);
                }
            }
        }

        log::info!(
            "Smoothing complete: {} smoothed, {} skipped",
            report.smoothed.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn parallel_enabled(&self) -> bool {
        if !self.options.engine.parallel {
            return false;
        }
        if cfg!(feature = "parallel") {
            true
        } else {
            log::warn!(
                "Parallel smoothing requested but the `parallel` feature is \
                 disabled; smoothing sequentially"
            );
            false
        }
    }

    fn smooth_job(&self, job: Job) -> Outcome {
        log::info!(
            "Smoothing trajectory #{} with window {}",
            job.id,
            job.window
        );
        Outcome {
            id: job.id,
            window: job.window,
            original_frames: job.frames.len(),
            result: engine::smooth(
                job.id,
                &job.frames,
                job.window,
                &self.options.engine,
            ),
        }
    }

    #[cfg(feature = "parallel")]
    fn smooth_all(&self, jobs: Vec<Job>) -> Vec<Outcome> {
        use rayon::prelude::*;

        jobs.into_par_iter().map(|job| self.smooth_job(job)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn smooth_all(&self, jobs: Vec<Job>) -> Vec<Outcome> {
        jobs.into_iter().map(|job| self.smooth_job(job)).collect()
    }
}

/// Apply the skip rule: planned and more than one frame.
fn eligible(
    infos: &[TrajectoryInfo],
    report: &mut SmoothReport,
) -> Vec<(u32, usize)> {
    let mut out = Vec::new();
    for info in infos {
        let Some(window) = report.plan.get(info.id) else {
            report.skip(info.id, SkipReason::NotPlanned);
            continue;
        };
        if matches!(info.frame_count, Some(n) if n <= 1) {
            report.skip(info.id, SkipReason::SingleFrame);
            continue;
        }
        out.push((info.id, window));
    }
    out
}

fn fetch<H: TrajectoryHost + ?Sized>(
    host: &H,
    id: u32,
    window: usize,
    report: &mut SmoothReport,
) -> Option<Job> {
    match host.frames(id) {
        // The host may not have reported a frame count up front.
        Ok(frames) if frames.len() <= 1 => {
            report.skip(id, SkipReason::SingleFrame);
            None
        }
        Ok(frames) => Some(Job { id, window, frames }),
        Err(e) => {
            report.skip(id, SkipReason::Failed(e.to_string()));
            None
        }
    }
}

fn finish<H: TrajectoryHost + ?Sized>(
    host: &mut H,
    outcome: Outcome,
    report: &mut SmoothReport,
) {
    let Outcome {
        id,
        window,
        original_frames,
        result,
    } = outcome;
    let appended = match result {
        Ok(frames) => {
            let count = frames.len();
            host.append_frames(id, frames).map(|()| count)
        }
        Err(e) => Err(e),
    };
    match appended {
        Ok(appended_frames) => {
            log::info!("Smoothed trajectory #{id}");
            report.smoothed.push(SmoothedTrajectory {
                id,
                window,
                original_frames,
                appended_frames,
            });
        }
        Err(e) => report.skip(id, SkipReason::Failed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::{
        host::Session,
        options::{
            BoundaryPolicy, ConvolutionMethod, ManualWindow, StrategyKind,
        },
        trajectory::Trajectory,
    };

    fn ramp(id: u32, n: usize) -> Trajectory {
        Trajectory::new(
            id,
            (0..n).map(|i| vec![DVec3::new(i as f64, 0.0, 0.0)]).collect(),
        )
    }

    fn manual(rows: &[(u32, usize)]) -> Options {
        let mut opts = Options::default();
        opts.planner.strategy = StrategyKind::Manual;
        opts.planner.manual = rows
            .iter()
            .map(|&(id, window)| ManualWindow { id, window })
            .collect();
        opts.engine.method = ConvolutionMethod::Naive;
        opts.engine.boundary = BoundaryPolicy::Truncate;
        opts
    }

    /// Host whose frame counts are unknown and whose frames can go missing.
    struct FlakyHost {
        session: Session,
        missing: u32,
    }

    impl TrajectoryHost for FlakyHost {
        fn trajectories(&self) -> Vec<TrajectoryInfo> {
            self.session
                .trajectories()
                .into_iter()
                .map(|info| TrajectoryInfo {
                    frame_count: None,
                    ..info
                })
                .collect()
        }

        fn frames(&self, id: u32) -> Result<Vec<Frame>, SmoothError> {
            if id == self.missing {
                return Err(SmoothError::UnknownTrajectory(id));
            }
            self.session.frames(id)
        }

        fn append_frames(
            &mut self,
            id: u32,
            frames: Vec<Frame>,
        ) -> Result<(), SmoothError> {
            self.session.append_frames(id, frames)
        }
    }

    #[test]
    fn appends_full_smoothed_copy() {
        let mut session = Session::from_trajectories(vec![ramp(1, 5)]).unwrap();
        let report =
            Smoother::new(manual(&[(1, 1)])).run(&mut session).unwrap();

        let traj = session.get(1).unwrap();
        assert_eq!(traj.frame_count(), 10);
        assert_eq!(&traj.frames()[..5], ramp(1, 5).frames());
        assert_eq!(traj.frames()[7][0], DVec3::new(2.0, 0.0, 0.0));
        assert!((traj.frames()[5][0].x - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            report.smoothed,
            [SmoothedTrajectory {
                id: 1,
                window: 1,
                original_frames: 5,
                appended_frames: 5,
            }]
        );
    }

    #[test]
    fn single_frame_and_unplanned_are_skipped() {
        let mut session = Session::from_trajectories(vec![
            ramp(1, 1),
            ramp(2, 4),
            ramp(3, 6),
        ])
        .unwrap();
        let report =
            Smoother::new(manual(&[(1, 3), (2, 2)])).run(&mut session).unwrap();

        assert_eq!(report.smoothed_ids(), [2]);
        assert_eq!(
            report.skipped,
            [(1, SkipReason::SingleFrame), (3, SkipReason::NotPlanned)]
        );
        assert_eq!(session.get(1).unwrap().frame_count(), 1);
        assert_eq!(session.get(3).unwrap().frame_count(), 6);
    }

    #[test]
    fn single_frame_never_smoothed_under_any_strategy() {
        for kind in [
            StrategyKind::Manual,
            StrategyKind::Linear,
            StrategyKind::Adaptive,
            StrategyKind::Stochastic,
        ] {
            let mut session =
                Session::from_trajectories(vec![ramp(1, 1), ramp(2, 1)])
                    .unwrap();
            let mut opts = Options::default();
            opts.planner.strategy = kind;
            opts.planner.stochastic.seed = Some(3);
            let report = Smoother::new(opts).run(&mut session).unwrap();
            assert!(report.smoothed.is_empty(), "{kind}");
            assert!(session.iter().all(|t| t.frame_count() == 1));
        }
    }

    #[test]
    fn malformed_trajectory_does_not_stop_the_run() {
        let mut bad = ramp(1, 4).frames().to_vec();
        bad[2].push(DVec3::ONE);
        let mut session = Session::from_trajectories(vec![
            Trajectory::new(1, bad),
            ramp(2, 4),
        ])
        .unwrap();
        let report =
            Smoother::new(manual(&[(1, 1), (2, 1)])).run(&mut session).unwrap();

        assert_eq!(report.smoothed_ids(), [2]);
        assert_eq!(report.skipped.len(), 1);
        let (id, SkipReason::Failed(msg)) = &report.skipped[0] else {
            panic!("expected a failure, got {:?}", report.skipped[0]);
        };
        assert_eq!(*id, 1);
        assert!(msg.contains("malformed trajectory #1"));
        assert_eq!(session.get(1).unwrap().frame_count(), 4);
        assert_eq!(session.get(2).unwrap().frame_count(), 8);
    }

    #[test]
    fn host_without_frame_counts() {
        let session = Session::from_trajectories(vec![
            ramp(1, 1),
            ramp(2, 3),
            ramp(3, 3),
        ])
        .unwrap();
        let mut host = FlakyHost {
            session,
            missing: 3,
        };
        let mut opts = Options::default();
        opts.planner.strategy = StrategyKind::Adaptive;
        let report = Smoother::new(opts).run(&mut host).unwrap();

        // Unknown frame counts plan the minimum window.
        assert_eq!(report.plan.get(1), Some(3));
        assert_eq!(report.smoothed_ids(), [2]);
        assert_eq!(report.skipped[0], (1, SkipReason::SingleFrame));
        assert!(matches!(report.skipped[1], (3, SkipReason::Failed(_))));
    }

    #[test]
    fn planning_error_aborts_before_appending() {
        let mut session = Session::from_trajectories(vec![ramp(1, 5)]).unwrap();
        let mut opts = Options::default();
        opts.planner.strategy = StrategyKind::Adaptive;
        opts.planner.adaptive.scaling = 0;
        assert!(Smoother::new(opts).run(&mut session).is_err());
        assert_eq!(session.get(1).unwrap().frame_count(), 5);
    }

    #[test]
    fn linear_strategy_doubles_frames_for_every_trajectory() {
        let mut session =
            Session::from_trajectories(vec![ramp(1, 6), ramp(2, 9)]).unwrap();
        let mut opts = Options::default();
        opts.planner.strategy = StrategyKind::Linear;
        let report = Smoother::new(opts).run(&mut session).unwrap();

        assert_eq!(report.plan.get(2), Some(4));
        assert_eq!(session.get(1).unwrap().frame_count(), 12);
        assert_eq!(session.get(2).unwrap().frame_count(), 18);
        assert_eq!(
            report.playback_script().to_string(),
            "coordset #1 7,12\nwait 6\ncoordset #2 10,18\nwait 9\n"
        );
    }

    #[test]
    fn parallel_option_matches_sequential() {
        let build = || {
            Session::from_trajectories((1..=4).map(|id| ramp(id, 20)).collect())
                .unwrap()
        };
        let mut opts = Options::default();
        opts.planner.strategy = StrategyKind::Linear;

        let mut sequential = build();
        let _ = Smoother::new(opts.clone()).run(&mut sequential).unwrap();

        opts.engine.parallel = true;
        let mut parallel = build();
        let _ = Smoother::new(opts).run(&mut parallel).unwrap();

        assert_eq!(sequential, parallel);
    }
}
