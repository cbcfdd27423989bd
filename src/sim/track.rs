//! Track geometry: drivable surface and start/finish line
//!
//! The drawn points form a closed loop (the last point connects back to
//! the first). The surface is that loop stroked at `width` with round
//! joins and caps. The start line sits across the loop at a reference
//! point and only counts crossings in the travel direction.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::geometry::{Segment, segments_intersect};
use super::grid::{Grid, GridCoordinate, WorldPoint};
use crate::cardinal;
use crate::consts::*;
use crate::error::{RaceError, Result};

/// Start/finish line segment in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartLine {
    pub p1: WorldPoint,
    pub p2: WorldPoint,
}

/// Where and how the race starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartPlacement {
    /// Point on the track the line is centered on
    pub center: WorldPoint,
    /// Forward travel direction (cardinal unit vector)
    pub direction: Vec2,
    pub line: StartLine,
    /// Cell players start from, one cell behind the line
    pub cell: GridCoordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    points: Vec<WorldPoint>,
    width: f32,
    border_width: f32,
    /// Closed-loop segments, bounds padded by width / 2
    segments: Vec<Segment>,
    start: Option<StartPlacement>,
}

impl Track {
    /// Build the closed polyline through `points` at the given width
    pub fn generate(points: Vec<WorldPoint>, width: f32, border_width: f32) -> Result<Self> {
        if points.len() < MIN_POLYLINE_POINTS {
            return Err(RaceError::TrackTooShort {
                points: points.len(),
                min: MIN_POLYLINE_POINTS,
            });
        }
        check_width(width)?;

        let segments = build_segments(&points, width);
        log::debug!(
            "Generated track: {} points, {} segments, width {}",
            points.len(),
            segments.len(),
            width
        );

        Ok(Self {
            points,
            width,
            border_width,
            segments,
            start: None,
        })
    }

    /// Re-stroke the same path at a new width. The start line keeps its
    /// center and direction but is resized to span the new width.
    pub fn set_width(&mut self, width: f32) -> Result<()> {
        check_width(width)?;
        self.width = width;
        self.segments = build_segments(&self.points, width);
        if let Some(start) = self.start {
            self.start = Some(StartPlacement {
                line: start_line(start.center, start.direction, self.line_half_length()),
                ..start
            });
        }
        Ok(())
    }

    /// Place the start line from the drawn path itself.
    ///
    /// The line is centered on the point at `START_REFERENCE_INDEX`, and the
    /// travel direction is the net direction of the opening stretch of the stroke.
    pub fn place_start(&mut self, grid: &Grid) -> Result<()> {
        let index = START_REFERENCE_INDEX.min(self.points.len() - 1);
        let reference = self.points[index];
        let direction = stroke_direction(&self.points);
        self.set_start_line(grid, reference, direction)
    }

    /// Set the start line centered on `reference`, perpendicular to the
    /// cardinal axis nearest to `direction`.
    pub fn set_start_line(&mut self, grid: &Grid, reference: WorldPoint, direction: Vec2) -> Result<()> {
        let direction = cardinal(direction);
        if direction == Vec2::ZERO {
            return Err(RaceError::DegenerateTrack);
        }

        let cell = grid.to_grid(reference - direction * grid.size());
        let line = start_line(reference, direction, self.line_half_length());

        log::info!(
            "Start line at ({:.0}, {:.0}) heading ({}, {}), start cell ({}, {})",
            reference.x,
            reference.y,
            direction.x,
            direction.y,
            cell.x,
            cell.y
        );

        self.start = Some(StartPlacement {
            center: reference,
            direction,
            line,
            cell,
        });
        Ok(())
    }

    /// Recompute the start cell for a new grid without moving the line
    pub fn reseat_start_cell(&mut self, grid: &Grid) {
        if let Some(start) = self.start.as_mut() {
            start.cell = grid.to_grid(start.center - start.direction * grid.size());
        }
    }

    /// Whether `point` lies on the drivable surface (boundary inclusive)
    pub fn is_on_track(&self, point: WorldPoint) -> bool {
        let half = self.width / 2.0;
        self.segments
            .iter()
            .any(|seg| seg.bounds_contain(point) && seg.distance_to(point) <= half)
    }

    /// Whether the move `from -> to` crosses the start line going forward
    pub fn check_lap_crossing(&self, from: WorldPoint, to: WorldPoint) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        if !segments_intersect(from, to, start.line.p1, start.line.p2) {
            return false;
        }
        (to - from).dot(start.direction) > 0.0
    }

    /// Half-length of the start line: covers the surface plus both borders, twice over
    fn line_half_length(&self) -> f32 {
        self.width + self.border_width * 2.0
    }

    /// Axis-aligned bounds of the drawn points
    pub fn bounds(&self) -> (WorldPoint, WorldPoint) {
        self.points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        )
    }

    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn border_width(&self) -> f32 {
        self.border_width
    }

    pub fn start(&self) -> Option<&StartPlacement> {
        self.start.as_ref()
    }

    pub fn start_line(&self) -> Option<StartLine> {
        self.start.map(|s| s.line)
    }

    pub fn start_direction(&self) -> Option<Vec2> {
        self.start.map(|s| s.direction)
    }

    pub fn start_cell(&self) -> Option<IVec2> {
        self.start.map(|s| s.cell)
    }
}

fn check_width(width: f32) -> Result<()> {
    if width > 0.0 && width.is_finite() {
        Ok(())
    } else {
        Err(RaceError::InvalidWidth(width))
    }
}

fn build_segments(points: &[WorldPoint], width: f32) -> Vec<Segment> {
    let n = points.len();
    (0..n)
        .map(|i| Segment::new(points[i], points[(i + 1) % n], width / 2.0))
        .collect()
}

fn start_line(center: WorldPoint, direction: Vec2, half_length: f32) -> StartLine {
    let perp = direction.perp();
    StartLine {
        p1: center + perp * half_length,
        p2: center - perp * half_length,
    }
}

/// Net direction of the first `MAX_DIRECTION_WINDOW` segments as drawn.
/// Only looks forward, so the closing jump back to the first point never counts.
fn stroke_direction(points: &[WorldPoint]) -> Vec2 {
    points
        .windows(2)
        .take(MAX_DIRECTION_WINDOW)
        .map(|w| w[1] - w[0])
        .sum()
}
