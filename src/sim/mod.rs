//! Deterministic race simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Integer grid movement only
//! - Turn order by insertion order
//! - No rendering or platform dependencies

pub mod engine;
pub mod geometry;
pub mod grid;
pub mod player;
pub mod snapshot;
pub mod track;

pub use engine::{MoveOutcome, RaceEngine, RaceMode};
pub use geometry::{Segment, distance_to_segment, segments_intersect};
pub use grid::{CellRect, Grid, GridCoordinate, WorldPoint};
pub use player::Player;
pub use snapshot::{PlayerView, RaceSnapshot, TrackView};
pub use track::{StartLine, StartPlacement, Track};
