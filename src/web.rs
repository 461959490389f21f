//! Browser bindings
//!
//! The page owns the animation frame loop, the camera/pose tracker and the
//! relay socket. It calls into [`WebGame`] once per frame and receives
//! `score`/`death` messages through `window.parent.postMessage`.

use wasm_bindgen::prelude::*;

use crate::arena::ArenaTable;
use crate::game::Game;
use crate::highscores::HighScores;
use crate::input::{Direction, JumpDetector, LeanMapper};
use crate::protocol::{RelayMessage, ShellMessage};
use crate::settings::{ControlScheme, Settings};
use crate::sim::MatchParams;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Sky Hop starting...");
}

/// Game instance exported to JS
#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    settings: Settings,
    lean: LeanMapper,
    jump: JumpDetector,
    high_scores: HighScores,
    solo: bool,
    last_time: Option<f64>,
    recorded: bool,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a match. `user_id` 0 is a solo run, which also applies the
    /// saved difficulty.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, user_id: u32, arena_id: &str) -> Result<WebGame, JsValue> {
        let settings = Settings::load();
        let arenas = ArenaTable::builtin();
        let arena = arenas.get_or_fallback(arena_id).map_err(to_js)?;

        let solo = user_id == 0;
        let params = if solo {
            let difficulty = settings.difficulty;
            MatchParams::new(seed, 0, arena.with_difficulty(difficulty))
                .with_platform_count(difficulty.platform_count())
        } else {
            MatchParams::new(seed, user_id as u64, arena.clone())
        };

        let game = Game::new(params).map_err(to_js)?;
        log::info!(
            "Control: {}, solo: {}",
            settings.effective_control().as_str(),
            solo
        );
        Ok(WebGame {
            game,
            lean: LeanMapper::from_settings(&settings),
            jump: JumpDetector::from_settings(&settings),
            settings,
            high_scores: HighScores::load(),
            solo,
            last_time: None,
            recorded: false,
        })
    }

    /// Keyboard axis: -1 left, 1 right, 0 none
    pub fn set_direction(&mut self, axis: i32) {
        self.game.set_direction(Direction::from_axis(axis));
        self.game.set_speed_scale(None);
    }

    pub fn set_jumping(&mut self, jumping: bool) {
        self.game.set_jumping(jumping);
    }

    /// Normalized torso landmark from the pose tracker (0 when not found)
    pub fn set_torso(&mut self, x: f64, y: f64) {
        if self.settings.effective_control() != ControlScheme::Pose {
            return;
        }
        self.game.apply_lean(self.lean.map(x));
        let jumping = self.jump.sample(y);
        self.game.set_jumping(jumping);
    }

    /// Debug camera switch; returns whether the camera is now on
    pub fn toggle_camera(&mut self) -> bool {
        let on = self.settings.toggle_camera();
        if !on {
            self.game.apply_lean(None);
            self.game.set_jumping(false);
            self.jump.reset();
        }
        self.settings.save();
        on
    }

    /// Advance to `now_ms` (requestAnimationFrame timestamp) and forward any
    /// score/death messages to the page. Returns false once the game stopped.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let elapsed = self.last_time.map_or(0.0, |last| now_ms - last);
        self.last_time = Some(now_ms);

        self.game.update(elapsed);
        for message in self.game.shell_messages() {
            post_to_shell(&message);
        }

        if self.game.is_over() && self.solo && !self.recorded {
            self.recorded = true;
            let arena = self.game.state().arena().id.clone();
            let score = self.game.score();
            if let Some(rank) = self
                .high_scores
                .add_score(score, &arena, js_sys::Date::now())
            {
                log::info!("New high score #{}: {}", rank, score);
                self.high_scores.save();
            }
        }

        !self.game.is_stopped()
    }

    pub fn stop(&mut self) {
        self.game.stop();
    }

    /// Render snapshot as JSON
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.snapshot()).map_err(to_js)
    }

    /// Relay message forwarded by the page; returns whether the HUD changed
    pub fn handle_message(&mut self, json: &str) -> bool {
        match RelayMessage::from_json(json) {
            Ok(message) => self.game.handle_relay_message(&message),
            Err(e) => {
                log::warn!("Ignoring malformed relay message: {}", e);
                false
            }
        }
    }

    pub fn score(&self) -> f64 {
        self.game.score() as f64
    }

    pub fn opponent_score(&self) -> Option<f64> {
        if !self.settings.show_opponent_score {
            return None;
        }
        self.game.opponent_score().map(|o| o.score as f64)
    }

    pub fn opponent_dead(&self) -> bool {
        self.game.opponent_dead()
    }

    pub fn best_score(&self) -> Option<f64> {
        self.high_scores.top_score().map(|s| s as f64)
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Post a message to the embedding page (no-op when not embedded)
fn post_to_shell(message: &ShellMessage) {
    let Some(parent) = web_sys::window().and_then(|w| w.parent().ok().flatten()) else {
        return;
    };
    let Ok(json) = serde_json::to_string(message) else {
        return;
    };
    match js_sys::JSON::parse(&json) {
        Ok(value) => {
            if let Err(e) = parent.post_message(&value, "*") {
                log::warn!("postMessage failed: {:?}", e);
            }
        }
        Err(e) => log::warn!("Could not encode {:?}: {:?}", message, e),
    }
}
