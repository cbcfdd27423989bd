//! Per-racer movement state
//!
//! A player's position is always the last entry of its history. Movement
//! only changes through `move_to` and `crash`; the engine validates moves
//! before calling either.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::GridCoordinate;
use crate::settings::CrashPenalty;

/// Offsets around the inertia point, column by column
const NEIGHBORHOOD: [IVec2; 9] = [
    IVec2::new(-1, -1),
    IVec2::new(-1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, -1),
    IVec2::new(0, 0),
    IVec2::new(0, 1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(1, 1),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    name: String,
    color: String,
    grid_pos: GridCoordinate,
    /// Grid units moved last turn
    velocity: IVec2,
    /// Every cell visited, starting cell first
    history: Vec<GridCoordinate>,
    crash_count: u32,
    /// Turns taken, crashes included
    move_count: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, color: impl Into<String>, start: GridCoordinate) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            grid_pos: start,
            velocity: IVec2::ZERO,
            history: vec![start],
            crash_count: 0,
            move_count: 0,
        }
    }

    /// Move to `target`, taking the displacement as the new velocity
    pub fn move_to(&mut self, target: GridCoordinate) {
        self.velocity = target - self.grid_pos;
        self.grid_pos = target;
        self.history.push(target);
        self.move_count += 1;
    }

    /// Roll back along the history after going off track.
    ///
    /// Returns how many cells were actually removed; the starting cell is
    /// never removed, so this can be less than the policy asks for.
    pub fn crash(&mut self, penalty: CrashPenalty) -> u32 {
        self.crash_count += 1;
        self.move_count += 1;

        let wanted = penalty.cells(self.crash_count) as usize;
        let removable = self.history.len() - 1;
        let removed = wanted.min(removable);
        self.history.truncate(self.history.len() - removed);

        self.grid_pos = *self.history.last().unwrap_or(&self.grid_pos);
        // Velocity of the move that led here, if there was one
        self.velocity = match self.history.as_slice() {
            [.., prev, last] => *last - *prev,
            _ => IVec2::ZERO,
        };

        removed as u32
    }

    /// Where the player ends up with zero acceleration
    #[inline]
    pub fn inertia_point(&self) -> GridCoordinate {
        self.grid_pos + self.velocity
    }

    /// The 3x3 neighborhood of the inertia point
    pub fn valid_destinations(&self) -> [GridCoordinate; 9] {
        let center = self.inertia_point();
        NEIGHBORHOOD.map(|offset| center + offset)
    }

    pub fn is_valid_destination(&self, target: GridCoordinate) -> bool {
        let d = target.as_i64vec2() - self.inertia_point().as_i64vec2();
        d.x.abs() <= 1 && d.y.abs() <= 1
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn grid_pos(&self) -> GridCoordinate {
        self.grid_pos
    }

    pub fn velocity(&self) -> IVec2 {
        self.velocity
    }

    pub fn history(&self) -> &[GridCoordinate] {
        &self.history
    }

    pub fn crash_count(&self) -> u32 {
        self.crash_count
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Put an unmoved player on a new starting cell (grid was rescaled)
    pub(crate) fn relocate(&mut self, start: GridCoordinate) {
        *self = Self::new(std::mem::take(&mut self.name), std::mem::take(&mut self.color), start);
    }
}
