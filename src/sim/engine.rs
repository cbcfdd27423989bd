//! Race engine: turn-based state machine
//!
//! Drawing -> Setup -> Racing -> Finished, plus `reset` back to Drawing
//! from anywhere. Every command runs to completion; a rejected command
//! leaves the engine untouched.

use serde::{Deserialize, Serialize};

use super::grid::{Grid, GridCoordinate, WorldPoint};
use super::player::Player;
use super::snapshot::RaceSnapshot;
use super::track::Track;
use crate::consts::MIN_TRACK_POINTS;
use crate::error::{RaceError, Result};
use crate::settings::RaceSettings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceMode {
    /// Freehand drawing of the track
    Drawing,
    /// Track fixed, players joining
    Setup,
    /// Players taking turns
    Racing,
    /// Someone completed the lap
    Finished,
}

/// Result of a racing turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MoveOutcome {
    /// Target was not a legal destination; nothing changed
    Ignored,
    /// Normal move, turn passed on
    Moved { player: usize, to: GridCoordinate },
    /// Landed off track and rolled back `penalty` cells, turn passed on
    Crashed {
        player: usize,
        penalty: u32,
        back_to: GridCoordinate,
    },
    /// Crossed the start line forward; race over
    Finished { winner: usize, to: GridCoordinate },
}

#[derive(Debug, Clone)]
pub struct RaceEngine {
    settings: RaceSettings,
    grid: Grid,
    mode: RaceMode,
    /// Stroke being recorded while drawing
    drawn_path: Vec<WorldPoint>,
    track: Option<Track>,
    /// Turn order is insertion order
    players: Vec<Player>,
    current_player: usize,
    winner: Option<usize>,
}

impl Default for RaceEngine {
    fn default() -> Self {
        Self::with_settings(RaceSettings::default())
    }
}

impl RaceEngine {
    /// Create an engine after validating `settings`
    pub fn new(settings: RaceSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::with_settings(settings))
    }

    fn with_settings(settings: RaceSettings) -> Self {
        Self {
            grid: Grid::new(settings.cell_size),
            settings,
            mode: RaceMode::Drawing,
            drawn_path: Vec::new(),
            track: None,
            players: Vec::new(),
            current_player: 0,
            winner: None,
        }
    }

    fn require(&self, expected: RaceMode, operation: &'static str) -> Result<()> {
        if self.mode == expected {
            return Ok(());
        }
        let expected = match expected {
            RaceMode::Drawing => "Drawing",
            RaceMode::Setup => "Setup",
            RaceMode::Racing => "Racing",
            RaceMode::Finished => "Finished",
        };
        Err(self.wrong_mode(operation, expected))
    }

    /// Track parameters can change until the race starts
    fn require_editable(&self, operation: &'static str) -> Result<()> {
        match self.mode {
            RaceMode::Drawing | RaceMode::Setup => Ok(()),
            _ => Err(self.wrong_mode(operation, "Drawing or Setup")),
        }
    }

    fn wrong_mode(&self, operation: &'static str, expected: &'static str) -> RaceError {
        log::warn!("Rejected {} in {:?} mode", operation, self.mode);
        RaceError::WrongMode {
            operation,
            expected,
            actual: self.mode,
        }
    }

    fn set_mode(&mut self, mode: RaceMode) {
        log::info!("Mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    // === Drawing ===

    /// Start a new stroke, discarding any previous one
    pub fn begin_stroke(&mut self, point: WorldPoint) -> Result<()> {
        self.require(RaceMode::Drawing, "begin_stroke")?;
        self.drawn_path.clear();
        self.drawn_path.push(point);
        Ok(())
    }

    /// Extend the stroke. Points too close to the previous one are dropped;
    /// returns whether `point` was recorded.
    pub fn extend_stroke(&mut self, point: WorldPoint) -> Result<bool> {
        self.require(RaceMode::Drawing, "extend_stroke")?;
        let spacing = self.settings.min_stroke_spacing;
        if self
            .drawn_path
            .last()
            .is_some_and(|last| last.distance(point) <= spacing)
        {
            return Ok(false);
        }
        self.drawn_path.push(point);
        Ok(true)
    }

    /// Throw away the stroke drawn so far
    pub fn clear_track(&mut self) -> Result<()> {
        self.require(RaceMode::Drawing, "clear_track")?;
        self.drawn_path.clear();
        self.track = None;
        Ok(())
    }

    /// Turn `path` into the race track and move on to player setup
    pub fn finish_drawing(&mut self, path: Vec<WorldPoint>) -> Result<()> {
        self.require(RaceMode::Drawing, "finish_drawing")?;
        if path.len() < MIN_TRACK_POINTS {
            log::warn!("Track too short: {} points", path.len());
            return Err(RaceError::TrackTooShort {
                points: path.len(),
                min: MIN_TRACK_POINTS,
            });
        }

        let mut track = Track::generate(
            path.clone(),
            self.settings.track_width,
            self.settings.border_width,
        )?;
        track.place_start(&self.grid)?;

        log::info!("Track finished with {} points", path.len());
        self.drawn_path = path;
        self.track = Some(track);
        self.set_mode(RaceMode::Setup);
        Ok(())
    }

    /// Finish with the stroke recorded through `begin_stroke`/`extend_stroke`
    pub fn finish_drawing_recorded(&mut self) -> Result<()> {
        let path = self.drawn_path.clone();
        self.finish_drawing(path)
    }

    // === Setup ===

    /// Add a racer on the start cell; returns its index in turn order
    pub fn add_player(&mut self, name: &str, color: &str) -> Result<usize> {
        self.require(RaceMode::Setup, "add_player")?;
        let name = name.trim();
        if name.is_empty() {
            return Err(RaceError::EmptyPlayerName);
        }
        let start = self.start_cell()?;

        self.players.push(Player::new(name, color, start));
        log::info!("Player {} joined ({})", name, color);
        Ok(self.players.len() - 1)
    }

    /// Add a racer with the next palette color
    pub fn add_player_auto(&mut self, name: &str) -> Result<usize> {
        let color = self.settings.color_for(self.players.len()).to_string();
        self.add_player(name, &color)
    }

    pub fn start_race(&mut self) -> Result<()> {
        self.require(RaceMode::Setup, "start_race")?;
        if self.players.is_empty() {
            log::warn!("Cannot start race without players");
            return Err(RaceError::NoPlayers);
        }
        self.current_player = 0;
        self.set_mode(RaceMode::Racing);
        Ok(())
    }

    /// Change the surface width, regenerating the track if one exists
    pub fn set_track_width(&mut self, width: f32) -> Result<()> {
        self.require_editable("set_track_width")?;
        if let Some(track) = self.track.as_mut() {
            track.set_width(width)?;
        } else if !(width > 0.0 && width.is_finite()) {
            return Err(RaceError::InvalidWidth(width));
        }
        self.settings.track_width = width;
        Ok(())
    }

    /// Change the grid cell size. Players that already joined are moved to
    /// the start cell of the new grid.
    pub fn set_cell_size(&mut self, size: f32) -> Result<()> {
        self.require_editable("set_cell_size")?;
        if !(size > 0.0 && size.is_finite()) {
            return Err(RaceError::InvalidCellSize(size));
        }
        self.settings.cell_size = size;
        self.grid.set_size(size);

        if let Some(track) = self.track.as_mut() {
            track.reseat_start_cell(&self.grid);
            if let Some(start) = track.start_cell() {
                for player in &mut self.players {
                    player.relocate(start);
                }
            }
        }
        Ok(())
    }

    fn start_cell(&self) -> Result<GridCoordinate> {
        self.track
            .as_ref()
            .and_then(Track::start_cell)
            .ok_or(RaceError::DegenerateTrack)
    }

    // === Racing ===

    /// Play the current player's turn toward `target`
    pub fn attempt_move(&mut self, target: GridCoordinate) -> Result<MoveOutcome> {
        self.require(RaceMode::Racing, "attempt_move")?;
        let index = self.current_player;
        let player = &self.players[index];

        if !player.is_valid_destination(target) {
            log::debug!("Ignoring click on ({}, {})", target.x, target.y);
            return Ok(MoveOutcome::Ignored);
        }

        let track = self.track.as_ref().ok_or(RaceError::DegenerateTrack)?;
        let from = self.grid.to_world(player.grid_pos());
        let to = self.grid.to_world(target);
        let on_track = track.is_on_track(to);
        let lap = on_track
            && player.move_count() >= self.settings.min_moves_for_lap
            && track.check_lap_crossing(from, to);

        let player = &mut self.players[index];
        let outcome = if !on_track {
            let penalty = player.crash(self.settings.crash_penalty);
            log::info!(
                "{} crashed at ({}, {}), back {} cells",
                player.name(),
                target.x,
                target.y,
                penalty
            );
            MoveOutcome::Crashed {
                player: index,
                penalty,
                back_to: player.grid_pos(),
            }
        } else if lap {
            player.move_to(target);
            log::info!("{} wins after {} moves", player.name(), player.move_count());
            self.winner = Some(index);
            self.set_mode(RaceMode::Finished);
            return Ok(MoveOutcome::Finished { winner: index, to: target });
        } else {
            player.move_to(target);
            log::debug!("{} moved to ({}, {})", player.name(), target.x, target.y);
            MoveOutcome::Moved { player: index, to: target }
        };

        self.current_player = (self.current_player + 1) % self.players.len();
        Ok(outcome)
    }

    /// Route a click in world space to the grid cell under it
    pub fn attempt_move_at(&mut self, world: WorldPoint) -> Result<MoveOutcome> {
        let target = self.grid.to_grid(world);
        self.attempt_move(target)
    }

    /// Discard track and players and go back to drawing
    pub fn reset(&mut self) {
        self.drawn_path.clear();
        self.track = None;
        self.players.clear();
        self.current_player = 0;
        self.winner = None;
        self.set_mode(RaceMode::Drawing);
    }

    // === Queries ===

    pub fn mode(&self) -> RaceMode {
        self.mode
    }

    pub fn settings(&self) -> &RaceSettings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn drawn_path(&self) -> &[WorldPoint] {
        &self.drawn_path
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player
    }

    /// The player whose turn it is (or who won)
    pub fn current_player(&self) -> Option<&Player> {
        match self.mode {
            RaceMode::Racing | RaceMode::Finished => self.players.get(self.current_player),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.and_then(|i| self.players.get(i))
    }

    pub fn winner_index(&self) -> Option<usize> {
        self.winner
    }

    /// Legal destinations for the player to move; empty outside a race
    pub fn valid_destinations(&self) -> Vec<GridCoordinate> {
        match (self.mode, self.players.get(self.current_player)) {
            (RaceMode::Racing, Some(player)) => player.valid_destinations().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CrashPenalty;
    use glam::{IVec2, Vec2};

    /// Straight run along y = 0 heading +x with a point every 40 units,
    /// then a wide return loop. Start line at x = 40, start cell (0, 0)
    /// with 30-unit cells.
    fn straight_path() -> Vec<Vec2> {
        let mut points: Vec<Vec2> = (0..=20).map(|i| Vec2::new(-160.0 + i as f32 * 40.0, 0.0)).collect();
        points.extend([
            Vec2::new(640.0, 300.0),
            Vec2::new(-400.0, 300.0),
            Vec2::new(-400.0, 0.0),
        ]);
        points
    }

    fn racing(settings: RaceSettings, players: &[&str]) -> RaceEngine {
        let mut engine = RaceEngine::new(settings).unwrap();
        engine.finish_drawing(straight_path()).unwrap();
        for name in players {
            engine.add_player_auto(name).unwrap();
        }
        engine.start_race().unwrap();
        engine
    }

    #[test]
    fn test_mode_progression() {
        let mut engine = RaceEngine::default();
        assert_eq!(engine.mode(), RaceMode::Drawing);

        engine.finish_drawing(straight_path()).unwrap();
        assert_eq!(engine.mode(), RaceMode::Setup);
        assert_eq!(engine.track().unwrap().start_cell(), Some(IVec2::ZERO));

        engine.add_player("Ada", "#fff").unwrap();
        engine.start_race().unwrap();
        assert_eq!(engine.mode(), RaceMode::Racing);
        assert_eq!(engine.current_player().unwrap().name(), "Ada");
    }

    #[test]
    fn test_short_track_rejected_without_changes() {
        let mut engine = RaceEngine::default();
        let path = straight_path()[..4].to_vec();
        let result = engine.finish_drawing(path);
        assert!(matches!(result, Err(RaceError::TrackTooShort { points: 4, min: 5 })));
        assert_eq!(engine.mode(), RaceMode::Drawing);
        assert!(engine.track().is_none());
    }

    #[test]
    fn test_wrong_mode_commands() {
        let mut engine = RaceEngine::default();
        assert!(matches!(
            engine.add_player("Ada", "#fff"),
            Err(RaceError::WrongMode { actual: RaceMode::Drawing, .. })
        ));
        assert!(matches!(
            engine.attempt_move(IVec2::ZERO),
            Err(RaceError::WrongMode { .. })
        ));

        engine.finish_drawing(straight_path()).unwrap();
        assert!(matches!(
            engine.finish_drawing(straight_path()),
            Err(RaceError::WrongMode { .. })
        ));
        assert!(matches!(engine.start_race(), Err(RaceError::NoPlayers)));
        assert_eq!(engine.mode(), RaceMode::Setup);
    }

    #[test]
    fn test_player_names() {
        let mut engine = RaceEngine::default();
        engine.finish_drawing(straight_path()).unwrap();
        assert!(matches!(engine.add_player("   ", "#fff"), Err(RaceError::EmptyPlayerName)));
        engine.add_player_auto(" Ada ").unwrap();
        engine.add_player_auto("Ada").unwrap();
        let players = engine.players();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name(), "Ada");
        assert_eq!(players[0].color(), "#ef4444");
        assert_eq!(players[1].color(), "#3b82f6");
    }

    #[test]
    fn test_legal_move_advances_turn() {
        let mut engine = racing(RaceSettings::default(), &["P1", "P2"]);
        let outcome = engine.attempt_move(IVec2::new(1, 0)).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { player: 0, to: IVec2::new(1, 0) });

        let p1 = &engine.players()[0];
        assert_eq!(p1.grid_pos(), IVec2::new(1, 0));
        assert_eq!(p1.velocity(), IVec2::new(1, 0));
        assert_eq!(p1.move_count(), 1);
        assert_eq!(engine.current_player_index(), 1);
    }

    #[test]
    fn test_illegal_click_is_ignored() {
        let mut engine = racing(RaceSettings::default(), &["P1", "P2"]);
        let outcome = engine.attempt_move(IVec2::new(5, 5)).unwrap();
        assert_eq!(outcome, MoveOutcome::Ignored);
        assert_eq!(engine.current_player_index(), 0);
        assert_eq!(engine.players()[0].move_count(), 0);
    }

    #[test]
    fn test_far_off_click_is_ignored() {
        let mut engine = racing(RaceSettings::default(), &["P1", "P2"]);
        let far = [
            IVec2::new(0, i32::MIN),
            IVec2::new(i32::MIN, i32::MIN),
            IVec2::new(i32::MAX, 0),
        ];
        for target in far {
            assert_eq!(engine.attempt_move(target).unwrap(), MoveOutcome::Ignored);
        }
        assert_eq!(engine.current_player_index(), 0);
        assert_eq!(engine.players()[0].grid_pos(), IVec2::ZERO);
    }

    #[test]
    fn test_off_track_move_crashes() {
        let settings = RaceSettings {
            track_width: 40.0,
            ..Default::default()
        };
        let mut engine = racing(settings, &["P1", "P2"]);
        engine.attempt_move(IVec2::new(1, 0)).unwrap();
        engine.attempt_move(IVec2::new(1, 0)).unwrap();

        // (60, 30) is 30 units off the centerline, surface half-width is 20
        let outcome = engine.attempt_move(IVec2::new(2, 1)).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Crashed { player: 0, penalty: 1, back_to: IVec2::ZERO }
        );
        let p1 = &engine.players()[0];
        assert_eq!(p1.crash_count(), 1);
        assert_eq!(p1.history().len(), 1);
        assert_eq!(p1.grid_pos(), IVec2::ZERO);
        assert_eq!(p1.velocity(), IVec2::ZERO);
        assert_eq!(p1.move_count(), 2);
        assert_eq!(engine.current_player_index(), 1);
    }

    #[test]
    fn test_fixed_penalty_never_removes_start() {
        let settings = RaceSettings {
            track_width: 40.0,
            crash_penalty: CrashPenalty::Fixed(2),
            ..Default::default()
        };
        let mut engine = racing(settings, &["Solo"]);
        // Straight off the surface from the start cell
        let outcome = engine.attempt_move(IVec2::new(0, 1)).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Crashed { player: 0, penalty: 0, back_to: IVec2::ZERO }
        );
        assert_eq!(engine.players()[0].history(), &[IVec2::ZERO]);
        assert_eq!(engine.current_player_index(), 0);
    }

    #[test]
    fn test_forward_crossing_finishes_race() {
        let settings = RaceSettings {
            min_moves_for_lap: 1,
            ..Default::default()
        };
        let mut engine = racing(settings, &["P1", "P2"]);
        engine.attempt_move(IVec2::new(1, 0)).unwrap();
        engine.attempt_move(IVec2::new(1, 0)).unwrap();

        // 30 -> 60 crosses the line at x = 40
        let outcome = engine.attempt_move(IVec2::new(2, 0)).unwrap();
        assert_eq!(outcome, MoveOutcome::Finished { winner: 0, to: IVec2::new(2, 0) });
        assert_eq!(engine.mode(), RaceMode::Finished);
        assert_eq!(engine.current_player_index(), 0);
        assert_eq!(engine.winner().unwrap().name(), "P1");
        assert_eq!(engine.players()[0].grid_pos(), IVec2::new(2, 0));

        assert!(matches!(
            engine.attempt_move(IVec2::new(3, 0)),
            Err(RaceError::WrongMode { actual: RaceMode::Finished, .. })
        ));
        assert!(engine.valid_destinations().is_empty());
    }

    #[test]
    fn test_crossing_before_threshold_is_a_plain_move() {
        let mut engine = racing(RaceSettings::default(), &["P1", "P2"]);
        engine.attempt_move(IVec2::new(1, 0)).unwrap();
        engine.attempt_move(IVec2::new(1, 0)).unwrap();
        let outcome = engine.attempt_move(IVec2::new(2, 0)).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { player: 0, to: IVec2::new(2, 0) });
        assert_eq!(engine.mode(), RaceMode::Racing);
    }

    #[test]
    fn test_click_routing() {
        let mut engine = racing(RaceSettings::default(), &["P1"]);
        let outcome = engine.attempt_move_at(Vec2::new(29.0, 2.0)).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { player: 0, to: IVec2::new(1, 0) });
        assert_eq!(engine.current_player_index(), 0);
    }

    #[test]
    fn test_reset_from_race() {
        let mut engine = racing(RaceSettings::default(), &["P1", "P2"]);
        engine.attempt_move(IVec2::new(1, 0)).unwrap();
        engine.reset();
        assert_eq!(engine.mode(), RaceMode::Drawing);
        assert!(engine.players().is_empty());
        assert!(engine.track().is_none());
        assert!(engine.drawn_path().is_empty());
        assert_eq!(engine.current_player_index(), 0);
    }

    #[test]
    fn test_stroke_recording() {
        let mut engine = RaceEngine::default();
        engine.begin_stroke(Vec2::ZERO).unwrap();
        assert!(!engine.extend_stroke(Vec2::new(3.0, 0.0)).unwrap());
        assert!(engine.extend_stroke(Vec2::new(6.0, 0.0)).unwrap());
        assert_eq!(engine.drawn_path().len(), 2);

        engine.clear_track().unwrap();
        assert!(engine.drawn_path().is_empty());

        for p in straight_path() {
            engine.extend_stroke(p).unwrap();
        }
        engine.finish_drawing_recorded().unwrap();
        assert_eq!(engine.mode(), RaceMode::Setup);
        assert!(matches!(engine.begin_stroke(Vec2::ZERO), Err(RaceError::WrongMode { .. })));
    }

    #[test]
    fn test_resize_during_setup_moves_players() {
        let mut engine = RaceEngine::default();
        engine.finish_drawing(straight_path()).unwrap();
        engine.add_player_auto("P1").unwrap();

        engine.set_cell_size(20.0).unwrap();
        // (40 - 20) / 20
        assert_eq!(engine.players()[0].grid_pos(), IVec2::new(1, 0));
        assert_eq!(engine.grid().size(), 20.0);

        engine.set_track_width(60.0).unwrap();
        assert_eq!(engine.track().unwrap().width(), 60.0);
        assert_eq!(engine.settings().track_width, 60.0);
        assert!(matches!(engine.set_track_width(-1.0), Err(RaceError::InvalidWidth(_))));
        assert!(matches!(engine.set_cell_size(0.0), Err(RaceError::InvalidCellSize(_))));
    }

    #[test]
    fn test_resize_rejected_mid_race() {
        let mut engine = racing(RaceSettings::default(), &["P1"]);
        assert!(matches!(engine.set_cell_size(20.0), Err(RaceError::WrongMode { .. })));
        assert!(matches!(engine.set_track_width(20.0), Err(RaceError::WrongMode { .. })));
        assert_eq!(engine.grid().size(), 30.0);
    }

    #[test]
    fn test_valid_destinations_for_current_player() {
        let mut engine = racing(RaceSettings::default(), &["P1", "P2"]);
        engine.attempt_move(IVec2::new(1, 1)).unwrap();
        // P2 still at rest on the start cell
        let dests = engine.valid_destinations();
        assert_eq!(dests.len(), 9);
        assert!(dests.contains(&IVec2::new(-1, -1)));
        assert!(dests.contains(&IVec2::new(1, 1)));
    }
}
