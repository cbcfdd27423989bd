//! Vector Racers entry point
//!
//! The browser build starts from `platform::web`. Natively this runs a
//! short scripted race headlessly and logs every turn, which is handy
//! for checking a settings file: `vector-racers [settings.json]`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::{IVec2, Vec2};
    use vector_racers::sim::{MoveOutcome, RaceEngine};
    use vector_racers::{RaceSettings, Result};

    /// Loop drawn as a dense stroke, like a pointer would record it
    fn demo_stroke() -> Vec<Vec2> {
        (0..180)
            .map(|i| {
                let t = i as f32 / 180.0 * std::f32::consts::TAU;
                Vec2::new(300.0 * t.cos(), 180.0 * t.sin())
            })
            .collect()
    }

    fn load_settings() -> Result<RaceSettings> {
        match std::env::args().nth(1) {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(json) => RaceSettings::from_json(&json),
                Err(e) => {
                    log::warn!("Could not read {}: {}, using defaults", path, e);
                    Ok(RaceSettings::default())
                }
            },
            None => Ok(RaceSettings::default()),
        }
    }

    pub fn run() -> Result<()> {
        let mut engine = RaceEngine::new(load_settings()?)?;

        let stroke = demo_stroke();
        engine.begin_stroke(stroke[0])?;
        for p in &stroke[1..] {
            engine.extend_stroke(*p)?;
        }
        engine.finish_drawing_recorded()?;

        engine.add_player_auto("Red")?;
        engine.add_player_auto("Blue")?;
        engine.start_race()?;

        // Accelerations per turn, alternating Red and Blue
        let script = [
            IVec2::new(0, 1),
            IVec2::new(0, 1),
            IVec2::new(-1, 1),
            IVec2::ZERO,
            IVec2::new(1, 1),
            IVec2::new(1, 1),
        ];
        for accel in script {
            let Some(player) = engine.current_player() else {
                break;
            };
            let target = player.inertia_point() + accel;
            match engine.attempt_move(target)? {
                MoveOutcome::Finished { winner, .. } => {
                    log::info!("Player {} won", winner);
                    break;
                }
                outcome => log::info!("{:?}", outcome),
            }
        }

        log::info!("Final state: {}", engine.snapshot().to_json()?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Vector Racers (native) starting...");
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is `platform::web::start`
}
