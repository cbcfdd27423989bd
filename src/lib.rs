//! Vector Racers - draw a closed track, then race it on a grid
//!
//! Core modules:
//! - `sim`: Deterministic race simulation (grid, track geometry, players, turn engine)
//! - `settings`: Explicit configuration handed to the engine
//! - `error`: Rejections surfaced by engine commands
//! - `platform`: Browser bindings exposing the command interface

pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{RaceError, Result};
pub use settings::{CrashPenalty, RaceSettings};

use glam::Vec2;

/// Game configuration defaults
pub mod consts {
    /// Grid cell size in world units
    pub const DEFAULT_CELL_SIZE: f32 = 30.0;
    /// Drivable surface thickness
    pub const DEFAULT_TRACK_WIDTH: f32 = 80.0;
    /// Visual border drawn on both sides of the surface (also widens the start line)
    pub const DEFAULT_BORDER_WIDTH: f32 = 4.0;

    /// A drawn path needs at least this many points to become a track
    pub const MIN_TRACK_POINTS: usize = 5;
    /// Fewer points than this can't even form a polyline
    pub const MIN_POLYLINE_POINTS: usize = 2;
    /// Minimum distance between consecutive recorded stroke points
    pub const MIN_STROKE_SPACING: f32 = 5.0;

    /// Index into the drawn path where the start line is placed
    pub const START_REFERENCE_INDEX: usize = 5;
    /// Number of leading stroke segments summed to estimate the start direction
    pub const MAX_DIRECTION_WINDOW: usize = 20;

    /// Moves a player must have made before a lap crossing counts
    pub const DEFAULT_MIN_MOVES_FOR_LAP: u32 = 10;

    /// Camera limits (consumed by the renderer only)
    pub const MIN_ZOOM: f32 = 0.1;
    pub const MAX_ZOOM: f32 = 5.0;

    /// Player colors, assigned cyclically
    pub const PALETTE: [&str; 6] = [
        "#ef4444", "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899",
    ];
}

/// Sign of `v` as -1, 0 or 1 (zero stays zero, unlike `f32::signum`)
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Snap a direction to the nearest cardinal axis.
///
/// Ties (|x| == |y|) go to the vertical axis. A zero vector stays zero.
#[inline]
pub fn cardinal(dir: Vec2) -> Vec2 {
    if dir.x.abs() > dir.y.abs() {
        Vec2::new(sign(dir.x), 0.0)
    } else {
        Vec2::new(0.0, sign(dir.y))
    }
}
