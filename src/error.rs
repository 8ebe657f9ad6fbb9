// src/error.rs

use thiserror::Error;

/// Which side of the vehicle a lane lookup referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Fewer than three points, or the normal equations could not be solved.
    #[error("degenerate fit: {points} point(s), need at least 3")]
    DegenerateFit { points: usize },

    /// The distance engine found no lane curve on the required side.
    #[error("no lane curve found on the {side} side")]
    NoLaneOnSide { side: Side },

    /// Malformed startup parameters. Fatal; never raised per-frame.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}
