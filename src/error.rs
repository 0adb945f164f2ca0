//! Crate-level error types.

use std::fmt;

/// Errors produced by the trajsmooth crate.
#[derive(Debug)]
pub enum SmoothError {
    /// A strategy selector matched none of the window strategies.
    InvalidStrategy {
        /// The selector as supplied by the caller.
        selector: String,
    },
    /// Strategy parameters that cannot produce a window.
    InvalidParameter {
        /// Name of the strategy the parameters belong to.
        strategy: &'static str,
        /// What is wrong with them.
        reason: String,
    },
    /// Frames of one trajectory disagree on their atom count.
    MalformedTrajectory {
        /// Trajectory id.
        id: u32,
        /// Index of the first offending frame.
        frame: usize,
        /// Atom count of frame 0.
        expected: usize,
        /// Atom count of the offending frame.
        found: usize,
    },
    /// The host has no trajectory with this id.
    UnknownTrajectory(u32),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// JSON session parsing/serialization failure.
    SessionParse(String),
}

impl fmt::Display for SmoothError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStrategy { selector } => write!(
                f,
                "invalid smoothing strategy '{selector}' (expected manual, \
                 linear, adaptive or stochastic)"
            ),
            Self::InvalidParameter { strategy, reason } => {
                write!(f, "invalid {strategy} strategy parameters: {reason}")
            }
            Self::MalformedTrajectory {
                id,
                frame,
                expected,
                found,
            } => write!(
                f,
                "malformed trajectory #{id}: frame {frame} has {found} atoms, \
                 expected {expected}"
            ),
            Self::UnknownTrajectory(id) => {
                write!(f, "no trajectory #{id} in session")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::SessionParse(msg) => {
                write!(f, "session parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for SmoothError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SmoothError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
