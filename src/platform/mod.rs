//! Platform abstraction layer
//!
//! The simulation never touches the page. On the web, `web::WebRace`
//! exposes the engine's command interface to JavaScript; input capture,
//! the camera and canvas painting stay on the JS side.

#[cfg(target_arch = "wasm32")]
pub mod web;
