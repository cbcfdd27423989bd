//! wasm-bindgen wrapper around `RaceEngine`
//!
//! Points cross the boundary as flat `[x0, y0, x1, y1, ...]` slices, state
//! goes back as JSON, and rejections become JS `Error`s.

use glam::{IVec2, Vec2};
use wasm_bindgen::prelude::*;

use crate::error::RaceError;
use crate::settings::RaceSettings;
use crate::sim::RaceEngine;

fn js_error(err: RaceError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn to_points(coords: &[f32]) -> Vec<Vec2> {
    coords.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect()
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Ignore double init when the module is loaded twice
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Vector Racers loaded");
}

#[wasm_bindgen]
pub struct WebRace {
    engine: RaceEngine,
}

#[wasm_bindgen]
impl WebRace {
    /// Create a race with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebRace {
        WebRace {
            engine: RaceEngine::default(),
        }
    }

    /// Create a race from a (partial) JSON settings object
    pub fn with_settings(json: &str) -> Result<WebRace, JsValue> {
        let settings = RaceSettings::from_json(json).map_err(js_error)?;
        let engine = RaceEngine::new(settings).map_err(js_error)?;
        Ok(WebRace { engine })
    }

    pub fn begin_stroke(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.engine.begin_stroke(Vec2::new(x, y)).map_err(js_error)
    }

    pub fn extend_stroke(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        self.engine.extend_stroke(Vec2::new(x, y)).map_err(js_error)
    }

    pub fn clear_track(&mut self) -> Result<(), JsValue> {
        self.engine.clear_track().map_err(js_error)
    }

    /// Finish with the recorded stroke
    pub fn finish_drawing(&mut self) -> Result<(), JsValue> {
        self.engine.finish_drawing_recorded().map_err(js_error)
    }

    /// Finish with an explicit path
    pub fn finish_drawing_path(&mut self, coords: &[f32]) -> Result<(), JsValue> {
        self.engine.finish_drawing(to_points(coords)).map_err(js_error)
    }

    /// Returns the new player's turn index
    pub fn add_player(&mut self, name: &str, color: Option<String>) -> Result<usize, JsValue> {
        match color {
            Some(color) => self.engine.add_player(name, &color),
            None => self.engine.add_player_auto(name),
        }
        .map_err(js_error)
    }

    pub fn start_race(&mut self) -> Result<(), JsValue> {
        self.engine.start_race().map_err(js_error)
    }

    /// Click in world space; returns the outcome as JSON
    pub fn click(&mut self, x: f32, y: f32) -> Result<String, JsValue> {
        let outcome = self.engine.attempt_move_at(Vec2::new(x, y)).map_err(js_error)?;
        serde_json::to_string(&outcome).map_err(|e| js_error(e.into()))
    }

    /// Move to a grid cell; returns the outcome as JSON
    pub fn move_to(&mut self, gx: i32, gy: i32) -> Result<String, JsValue> {
        let outcome = self.engine.attempt_move(IVec2::new(gx, gy)).map_err(js_error)?;
        serde_json::to_string(&outcome).map_err(|e| js_error(e.into()))
    }

    pub fn set_track_width(&mut self, width: f32) -> Result<(), JsValue> {
        self.engine.set_track_width(width).map_err(js_error)
    }

    pub fn set_cell_size(&mut self, size: f32) -> Result<(), JsValue> {
        self.engine.set_cell_size(size).map_err(js_error)
    }

    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        self.engine.settings().clamp_zoom(zoom)
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Full render state as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.engine.snapshot().to_json().map_err(js_error)
    }
}

impl Default for WebRace {
    fn default() -> Self {
        Self::new()
    }
}
