//! Race settings
//!
//! One explicit configuration value owned by the engine. Changing a value
//! through the engine regenerates whatever depends on it; nothing reads
//! settings from ambient state.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{RaceError, Result};

/// How far a crash rolls a player back along their history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CrashPenalty {
    /// Roll back as many cells as the player has crashed so far (1, 2, 3, ...)
    #[default]
    Escalating,
    /// Always roll back the same number of cells
    Fixed(u32),
}

impl CrashPenalty {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrashPenalty::Escalating => "Escalating",
            CrashPenalty::Fixed(_) => "Fixed",
        }
    }

    /// Parse "escalating", "fixed" (2 cells) or "fixed:N"
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "escalating" | "esc" => Some(CrashPenalty::Escalating),
            "fixed" => Some(CrashPenalty::Fixed(2)),
            _ => s
                .strip_prefix("fixed:")
                .and_then(|n| n.trim().parse().ok())
                .map(CrashPenalty::Fixed),
        }
    }

    /// Cells to roll back for a player whose crash count (including this crash) is `crash_count`
    pub fn cells(&self, crash_count: u32) -> u32 {
        match self {
            CrashPenalty::Escalating => crash_count,
            CrashPenalty::Fixed(n) => *n,
        }
    }
}

/// Race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    // === Geometry ===
    /// Grid cell size in world units
    pub cell_size: f32,
    /// Drivable surface thickness
    pub track_width: f32,
    /// Border thickness on each side (visual, but widens the start line)
    pub border_width: f32,

    // === Drawing ===
    /// Minimum spacing between recorded stroke points
    pub min_stroke_spacing: f32,

    // === Rules ===
    /// Moves required before crossing the start line finishes the race
    pub min_moves_for_lap: u32,
    /// Crash rollback policy
    pub crash_penalty: CrashPenalty,

    // === Presentation ===
    /// Player colors, assigned cyclically
    pub palette: Vec<String>,
    /// Camera zoom limits (renderer only)
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            track_width: DEFAULT_TRACK_WIDTH,
            border_width: DEFAULT_BORDER_WIDTH,

            min_stroke_spacing: MIN_STROKE_SPACING,

            min_moves_for_lap: DEFAULT_MIN_MOVES_FOR_LAP,
            crash_penalty: CrashPenalty::Escalating,

            palette: PALETTE.iter().map(|c| c.to_string()).collect(),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl RaceSettings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded race settings (cell size {})", settings.cell_size);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject values the engine can't work with
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size > 0.0) || !self.cell_size.is_finite() {
            return Err(RaceError::InvalidCellSize(self.cell_size));
        }
        if !(self.track_width > 0.0) || !self.track_width.is_finite() {
            return Err(RaceError::InvalidWidth(self.track_width));
        }
        if !(self.border_width >= 0.0) {
            return Err(RaceError::InvalidWidth(self.border_width));
        }
        if self.palette.is_empty() {
            return Err(RaceError::EmptyPalette);
        }
        Ok(())
    }

    /// Color for the player joining at `index`
    pub fn color_for(&self, index: usize) -> &str {
        &self.palette[index % self.palette.len()]
    }

    /// Clamp a zoom factor into the configured camera range
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
