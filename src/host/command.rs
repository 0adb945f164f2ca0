//! Host command vocabulary and recorded command scripts.
//!
//! Every visual step a smoothing workflow asks of the host (open a
//! structure, frame the view, play coordinate sets, export images or movies)
//! is a [`HostCommand`]. Its `Display` form is one line of the host's command
//! language, so a [`CommandScript`] can be written out and replayed by the
//! host without this crate linking against it.

use std::{fmt, path::Path};

use crate::error::SmoothError;

/// A single operation issued to the visualization host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    // ── Structures ──────────────────────────────────────────────────
    /// Open a structure or trajectory file.
    Open {
        /// File path or database id.
        path: String,
    },

    // ── Camera ──────────────────────────────────────────────────────
    /// Fit the view to one model, or to everything.
    View {
        /// Model to frame; `None` frames all models.
        model: Option<u32>,
    },

    // ── Playback ────────────────────────────────────────────────────
    /// Play a range of coordinate sets of one model.
    Coordset {
        /// Model id.
        model: u32,
        /// First coordinate set (1-based).
        start: usize,
        /// Last coordinate set (1-based, inclusive).
        end: usize,
    },
    /// Pause script execution until rendering catches up.
    Wait {
        /// Frames to wait; `None` waits for running motions to finish.
        frames: Option<usize>,
    },

    // ── Export ──────────────────────────────────────────────────────
    /// Save the current view as an image.
    SaveImage {
        /// Output image path.
        path: String,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Supersampling factor.
        supersample: u32,
    },
    /// Start capturing movie frames.
    MovieRecord {
        /// Supersampling factor.
        supersample: u32,
    },
    /// Stop capturing and encode the captured frames.
    MovieEncode {
        /// Output video path.
        path: String,
        /// Frames per second.
        framerate: u32,
    },
}

/// Quote paths the host would otherwise split on whitespace.
fn quoted(path: &str) -> String {
    if path.contains(char::is_whitespace) {
        format!("\"{path}\"")
    } else {
        path.to_owned()
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path } => write!(f, "open {}", quoted(path)),
            Self::View { model: None } => f.write_str("view"),
            Self::View { model: Some(id) } => write!(f, "view #{id}"),
            Self::Coordset { model, start, end } => {
                write!(f, "coordset #{model} {start},{end}")
            }
            Self::Wait { frames: None } => f.write_str("wait"),
            Self::Wait { frames: Some(n) } => write!(f, "wait {n}"),
            Self::SaveImage {
                path,
                width,
                height,
                supersample,
            } => write!(
                f,
                "save {} width {width} height {height} supersample \
                 {supersample}",
                quoted(path)
            ),
            Self::MovieRecord { supersample } => {
                write!(f, "movie record supersample {supersample}")
            }
            Self::MovieEncode { path, framerate } => {
                write!(f, "movie encode {} framerate {framerate}", quoted(path))
            }
        }
    }
}

/// Ordered list of host commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandScript {
    commands: Vec<HostCommand>,
}

impl CommandScript {
    /// Empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one command.
    pub fn push(&mut self, command: HostCommand) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Commands in issue order.
    #[must_use]
    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Play the smoothed block appended after `original` frames of `model`,
    /// then wait for playback to finish.
    pub fn play_appended(
        &mut self,
        model: u32,
        original: usize,
        appended: usize,
    ) -> &mut Self {
        if appended == 0 {
            return self;
        }
        let _ = self.push(HostCommand::Coordset {
            model,
            start: original + 1,
            end: original + appended,
        });
        self.push(HostCommand::Wait {
            frames: Some(appended),
        })
    }

    /// Wrap the current commands in a movie capture written to `path`.
    pub fn record_movie(
        &mut self,
        path: &str,
        supersample: u32,
        framerate: u32,
    ) -> &mut Self {
        self.commands
            .insert(0, HostCommand::MovieRecord { supersample });
        self.push(HostCommand::MovieEncode {
            path: path.to_owned(),
            framerate,
        })
    }

    /// Write the script, one command per line.
    pub fn save(&self, path: &Path) -> Result<(), SmoothError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SmoothError::Io)?;
        }
        std::fs::write(path, self.to_string()).map_err(SmoothError::Io)
    }
}

impl Extend<HostCommand> for CommandScript {
    fn extend<I: IntoIterator<Item = HostCommand>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

impl IntoIterator for CommandScript {
    type Item = HostCommand;
    type IntoIter = std::vec::IntoIter<HostCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl fmt::Display for CommandScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{command}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_render_as_host_lines() {
        assert_eq!(
            HostCommand::Open {
                path: "1exr".to_owned()
            }
            .to_string(),
            "open 1exr"
        );
        assert_eq!(HostCommand::View { model: Some(2) }.to_string(), "view #2");
        assert_eq!(
            HostCommand::SaveImage {
                path: "out dir/snap.png".to_owned(),
                width: 3840,
                height: 2160,
                supersample: 3,
            }
            .to_string(),
            "save \"out dir/snap.png\" width 3840 height 2160 supersample 3"
        );
    }

    #[test]
    fn play_appended_targets_new_block() {
        let mut script = CommandScript::new();
        let _ = script.play_appended(1, 100, 100).play_appended(2, 5, 0);
        assert_eq!(script.to_string(), "coordset #1 101,200\nwait 100\n");
    }

    #[test]
    fn scripts_concatenate() {
        let mut script = CommandScript::new();
        let _ = script.push(HostCommand::Open {
            path: "1exr.pdb".to_owned(),
        });
        let mut playback = CommandScript::new();
        let _ = playback.play_appended(1, 4, 4);
        script.extend(playback);
        assert_eq!(
            script.to_string(),
            "open 1exr.pdb\ncoordset #1 5,8\nwait 4\n"
        );
    }

    #[test]
    fn movie_wraps_existing_commands() {
        let mut script = CommandScript::new();
        let _ = script
            .push(HostCommand::View { model: None })
            .play_appended(3, 10, 10)
            .record_movie("smooth.mp4", 3, 25);
        let lines: Vec<String> =
            script.commands().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            [
                "movie record supersample 3",
                "view",
                "coordset #3 11,20",
                "wait 10",
                "movie encode smooth.mp4 framerate 25",
            ]
        );
    }
}
