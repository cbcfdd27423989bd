//! Error types for engine commands
//!
//! Every variant is a local, recoverable rejection: the engine is left
//! exactly as it was before the call. Off-grid clicks and crashes are not
//! errors; they are reported through `MoveOutcome`.

use thiserror::Error;

use crate::sim::RaceMode;

#[derive(Debug, Error)]
pub enum RaceError {
    #[error("{operation} is not allowed in {actual:?} mode (expected {expected})")]
    WrongMode {
        operation: &'static str,
        expected: &'static str,
        actual: RaceMode,
    },

    #[error("Track too short: {points} points, need at least {min}")]
    TrackTooShort { points: usize, min: usize },

    #[error("Track has no usable start direction")]
    DegenerateTrack,

    #[error("Invalid track width: {0}")]
    InvalidWidth(f32),

    #[error("Invalid cell size: {0}")]
    InvalidCellSize(f32),

    #[error("Cannot start a race without players")]
    NoPlayers,

    #[error("Player name is empty")]
    EmptyPlayerName,

    #[error("Color palette is empty")]
    EmptyPalette,

    #[error("Invalid settings: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RaceError>;
