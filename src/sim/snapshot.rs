//! Read-only race view for renderers

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::engine::{RaceEngine, RaceMode};
use super::grid::{GridCoordinate, WorldPoint};
use super::track::StartLine;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackView {
    pub points: Vec<WorldPoint>,
    pub width: f32,
    pub border_width: f32,
    pub start_line: Option<StartLine>,
    pub start_direction: Option<Vec2>,
    pub start_cell: Option<GridCoordinate>,
    /// (min, max) of the drawn points, for centering the camera
    pub bounds: (WorldPoint, WorldPoint),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub color: String,
    pub grid_pos: GridCoordinate,
    pub velocity: IVec2,
    pub history: Vec<GridCoordinate>,
    pub crash_count: u32,
    pub move_count: u32,
    /// Whose turn it is
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub mode: RaceMode,
    pub cell_size: f32,
    /// Stroke in progress (Drawing) or the path the track was built from
    pub drawn_path: Vec<WorldPoint>,
    pub track: Option<TrackView>,
    pub players: Vec<PlayerView>,
    pub current_player: Option<usize>,
    pub valid_destinations: Vec<GridCoordinate>,
    pub winner: Option<usize>,
}

impl RaceSnapshot {
    pub fn capture(engine: &RaceEngine) -> Self {
        let racing = engine.mode() == RaceMode::Racing;
        let current = engine.current_player().map(|_| engine.current_player_index());

        let track = engine.track().map(|t| TrackView {
            points: t.points().to_vec(),
            width: t.width(),
            border_width: t.border_width(),
            start_line: t.start_line(),
            start_direction: t.start_direction(),
            start_cell: t.start_cell(),
            bounds: t.bounds(),
        });

        let players = engine
            .players()
            .iter()
            .enumerate()
            .map(|(i, p)| PlayerView {
                name: p.name().to_string(),
                color: p.color().to_string(),
                grid_pos: p.grid_pos(),
                velocity: p.velocity(),
                history: p.history().to_vec(),
                crash_count: p.crash_count(),
                move_count: p.move_count(),
                active: racing && i == engine.current_player_index(),
            })
            .collect();

        Self {
            mode: engine.mode(),
            cell_size: engine.grid().size(),
            drawn_path: engine.drawn_path().to_vec(),
            track,
            players,
            current_player: current,
            valid_destinations: engine.valid_destinations(),
            winner: engine.winner_index(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
