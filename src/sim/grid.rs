//! World <-> grid coordinate mapping
//!
//! Grid cell (i, j) is centered on world point (i * size, j * size).
//! World coordinates snap with `f32::round`, i.e. round-half-away-from-zero.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Integer grid cell
pub type GridCoordinate = IVec2;
/// Continuous point in track space
pub type WorldPoint = Vec2;

/// Axis-aligned cell bounds in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    size: f32,
}

impl Grid {
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Does not rescale anything already expressed in grid cells
    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }

    #[inline]
    pub fn to_grid(&self, world: WorldPoint) -> GridCoordinate {
        IVec2::new(
            (world.x / self.size).round() as i32,
            (world.y / self.size).round() as i32,
        )
    }

    /// Center of the cell
    #[inline]
    pub fn to_world(&self, cell: GridCoordinate) -> WorldPoint {
        cell.as_vec2() * self.size
    }

    /// Nearest cell center
    #[inline]
    pub fn snap(&self, world: WorldPoint) -> WorldPoint {
        self.to_world(self.to_grid(world))
    }

    pub fn cell_rect(&self, cell: GridCoordinate) -> CellRect {
        let center = self.to_world(cell);
        CellRect {
            x: center.x - self.size / 2.0,
            y: center.y - self.size / 2.0,
            width: self.size,
            height: self.size,
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_grid_rounds_to_nearest() {
        let grid = Grid::new(30.0);
        assert_eq!(grid.to_grid(Vec2::new(14.0, 16.0)), IVec2::new(0, 1));
        assert_eq!(grid.to_grid(Vec2::new(-44.0, -46.0)), IVec2::new(-1, -2));
    }

    #[test]
    fn test_half_rounds_away_from_zero() {
        let grid = Grid::new(30.0);
        assert_eq!(grid.to_grid(Vec2::new(15.0, -15.0)), IVec2::new(1, -1));
        assert_eq!(grid.to_grid(Vec2::new(45.0, -45.0)), IVec2::new(2, -2));
    }

    #[test]
    fn test_to_world_is_cell_center() {
        let grid = Grid::new(30.0);
        assert_eq!(grid.to_world(IVec2::new(2, -3)), Vec2::new(60.0, -90.0));
        let rect = grid.cell_rect(IVec2::new(1, 1));
        assert_eq!((rect.x, rect.y, rect.width), (15.0, 15.0, 30.0));
    }

    #[test]
    fn test_set_size() {
        let mut grid = Grid::default();
        grid.set_size(20.0);
        assert_eq!(grid.to_grid(Vec2::new(41.0, 0.0)), IVec2::new(2, 0));
    }

    proptest! {
        #[test]
        fn prop_snap_is_idempotent(
            x in -10_000.0f32..10_000.0,
            y in -10_000.0f32..10_000.0,
            size in prop_oneof![Just(10.0f32), Just(20.0f32), Just(30.0f32), Just(50.0f32)],
        ) {
            let grid = Grid::new(size);
            let once = grid.snap(Vec2::new(x, y));
            prop_assert_eq!(grid.snap(once), once);
        }

        #[test]
        fn prop_cell_round_trips(i in -1000i32..1000, j in -1000i32..1000) {
            let grid = Grid::new(30.0);
            let cell = IVec2::new(i, j);
            prop_assert_eq!(grid.to_grid(grid.to_world(cell)), cell);
        }
    }
}
