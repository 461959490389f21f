//! Frame driver around the simulation
//!
//! [`Game`] owns the match state and the latest input signals, converts
//! frame time into fixed 16 ms ticks, and relays opponent updates to the HUD
//! without ever letting them touch the simulation.

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, TICK_MS};
use crate::error::MatchError;
use crate::input::{Direction, Lean, TickInput};
use crate::protocol::{OpponentScore, RelayMessage, ShellMessage};
use crate::sim::{GameEvent, GameState, MatchParams, RenderSnapshot, tick};

/// Game instance holding all state
#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    input: TickInput,
    /// Last jumping level seen, for edge detection
    jump_level: bool,
    /// Rising edge waiting for the next tick
    jump_pressed: bool,
    /// Unsimulated time in milliseconds
    accumulator: f64,
    stopped: bool,
    opponent: Option<OpponentScore>,
    opponent_dead: bool,
    session_winner: Option<u64>,
}

impl Game {
    pub fn new(params: MatchParams) -> Result<Self, MatchError> {
        Ok(Self::from_state(GameState::initialize(params)?))
    }

    /// Drive an already initialized match
    pub fn from_state(state: GameState) -> Self {
        let stopped = state.is_over();
        Self {
            state,
            input: TickInput::default(),
            jump_level: false,
            jump_pressed: false,
            accumulator: 0.0,
            stopped,
            opponent: None,
            opponent_dead: false,
            session_winner: None,
        }
    }

    // === Input ===

    pub fn set_direction(&mut self, direction: Direction) {
        self.input.direction = direction;
    }

    /// Fraction of the arena move speed (`None` for full speed)
    pub fn set_speed_scale(&mut self, speed_scale: Option<f64>) {
        self.input.speed_scale = speed_scale;
    }

    /// Apply a pose lean; a lost torso (`None`) stops horizontal movement
    pub fn apply_lean(&mut self, lean: Option<Lean>) {
        match lean {
            Some(lean) => {
                self.input.direction = lean.direction;
                self.input.speed_scale = lean.speed_scale;
            }
            None => {
                self.input.direction = Direction::None;
                self.input.speed_scale = None;
            }
        }
    }

    /// Report the jumping level (key held, torso risen). Only the transition
    /// to `true` requests a jump.
    pub fn set_jumping(&mut self, jumping: bool) {
        if jumping && !self.jump_level {
            self.jump_pressed = true;
        }
        self.jump_level = jumping;
    }

    /// Request a single jump on the next tick
    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
    }

    pub fn set_autopilot(&mut self, autopilot: bool) {
        self.input.autopilot = autopilot;
    }

    // === Loop ===

    /// Run simulation ticks for `elapsed_ms` of frame time. Returns the
    /// number of ticks run.
    pub fn update(&mut self, elapsed_ms: f64) -> u32 {
        if self.stopped {
            return 0;
        }

        let elapsed = if elapsed_ms.is_finite() {
            elapsed_ms.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };
        self.accumulator += elapsed;

        let mut substeps = 0;
        while self.accumulator >= TICK_MS && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= TICK_MS;
            substeps += 1;

            if self.stopped {
                self.accumulator = 0.0;
                break;
            }
        }

        // Never catch up on dropped time
        if self.accumulator >= TICK_MS {
            log::debug!("Dropping {:.1} ms of backlog", self.accumulator);
            self.accumulator %= TICK_MS;
        }

        substeps
    }

    /// Run exactly one tick with the current input. Returns false once
    /// stopped.
    pub fn step(&mut self) -> bool {
        if self.stopped {
            return false;
        }

        let input = TickInput {
            jump: self.jump_pressed,
            ..self.input.clone()
        };
        tick(&mut self.state, &input);

        // Clear one-shot inputs after processing
        self.jump_pressed = false;

        if self.state.is_over() {
            self.stop();
        }
        true
    }

    /// Stop ticking. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.accumulator = 0.0;
        log::info!(
            "Game stopped at tick {} with score {}",
            self.state.time_ticks,
            self.state.score
        );
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    // === Output ===

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Drain pending events as page messages
    pub fn shell_messages(&mut self) -> Vec<ShellMessage> {
        self.state
            .drain_events()
            .iter()
            .filter_map(ShellMessage::from_event)
            .collect()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    // === Opponent ===

    /// Apply a message from the session relay. Returns whether it changed
    /// anything the HUD shows.
    pub fn handle_relay_message(&mut self, message: &RelayMessage) -> bool {
        let me = self.state.params.user_id;
        match message {
            RelayMessage::OpponentScore { value } => {
                // Our own echo, or we don't know who we are yet
                if value.user_id == me || me == 0 {
                    log::debug!("Ignoring opponent score from user {}", value.user_id);
                    return false;
                }
                self.opponent = Some(*value);
                true
            }
            RelayMessage::OpponentDeath { value } => {
                if *value == me {
                    return false;
                }
                log::info!("Opponent {} died", value);
                self.opponent_dead = true;
                true
            }
            RelayMessage::SessionFinished { winner_id } => {
                log::info!("Session finished, winner {}", winner_id);
                self.session_winner = Some(*winner_id);
                true
            }
            other => {
                log::warn!("Ignoring relay message {:?}", other);
                false
            }
        }
    }

    pub fn opponent_score(&self) -> Option<OpponentScore> {
        self.opponent
    }

    pub fn opponent_dead(&self) -> bool {
        self.opponent_dead
    }

    pub fn session_winner(&self) -> Option<u64> {
        self.session_winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaConfig;
    use crate::sim::{GamePhase, Platform};

    fn game(seed: u32) -> Game {
        Game::new(MatchParams::new(seed, 11, ArenaConfig::default())).unwrap()
    }

    /// Platforms stacked straight up from the spawn point, 70 apart
    fn ladder_game() -> Game {
        let mut state =
            GameState::initialize(MatchParams::new(5, 11, ArenaConfig::default())).unwrap();
        let base = state.platforms[0].top();
        for (i, platform) in state.platforms.iter_mut().enumerate() {
            *platform = Platform::new(170.0, base - 70.0 * i as f64);
        }
        Game::from_state(state)
    }

    #[test]
    fn test_fixed_timestep() {
        let mut game = ladder_game();
        assert_eq!(game.update(10.0), 0);
        assert_eq!(game.update(10.0), 1);
        assert_eq!(game.state().time_ticks, 1);
        assert_eq!(game.update(48.0), 3);
        assert_eq!(game.state().time_ticks, 4);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut game = ladder_game();
        // 100 ms cap -> 6 ticks, the rest of the stall is dropped
        assert_eq!(game.update(5_000.0), 6);
        assert_eq!(game.update(0.0), 0);
        assert_eq!(game.update(f64::NAN), 0);
        assert_eq!(game.update(-20.0), 0);
        assert_eq!(game.state().time_ticks, 6);
    }

    #[test]
    fn test_jump_latch_is_edge_triggered() {
        let mut game = ladder_game();
        game.step();
        assert!(game.state().character.on_platform);

        game.set_jumping(true);
        game.step();
        assert_eq!(game.state().character.velocity_y, -15.0);

        // Still held: no second request, even after landing
        for _ in 0..60 {
            game.set_jumping(true);
            game.step();
        }
        let jumps = game
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::Jumped)
            .count();
        assert_eq!(jumps, 1);
        assert!(game.state().character.on_platform);

        game.set_jumping(false);
        game.set_jumping(true);
        game.step();
        assert!(game.drain_events().contains(&GameEvent::Jumped));
    }

    #[test]
    fn test_stops_on_game_over() {
        let mut game = game(42);
        let mut ticks = 0;
        for _ in 0..100 {
            ticks += game.update(16.0);
        }
        assert!(game.is_over());
        assert!(game.is_stopped());
        assert_eq!(ticks, 21);
        assert_eq!(game.state().phase, GamePhase::GameOver);

        assert!(!game.step());
        game.stop();
        assert_eq!(game.state().time_ticks, 21);

        let messages = game.shell_messages();
        assert_eq!(messages, vec![ShellMessage::Death { value: 11 }]);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut game = ladder_game();
        game.update(32.0);
        game.stop();
        game.stop();
        assert!(game.is_stopped());
        assert!(!game.is_over());
        assert_eq!(game.update(100.0), 0);
        assert_eq!(game.state().time_ticks, 2);
    }

    #[test]
    fn test_lean_drives_direction() {
        let mut game = ladder_game();
        game.step();
        let start = game.state().character.pos.x;
        game.apply_lean(Some(Lean {
            direction: Direction::Right,
            speed_scale: Some(0.5),
        }));
        game.step();
        assert_eq!(game.state().character.pos.x, start + 4.0);

        game.apply_lean(None);
        game.step();
        assert_eq!(game.state().character.pos.x, start + 4.0);
    }

    #[test]
    fn test_opponent_updates_never_touch_physics() {
        let mut game = ladder_game();
        game.update(64.0);
        let before = game.state().character.clone();

        let from_self = RelayMessage::OpponentScore {
            value: OpponentScore {
                user_id: 11,
                score: 99,
            },
        };
        assert!(!game.handle_relay_message(&from_self));
        assert_eq!(game.opponent_score(), None);

        let from_rival = RelayMessage::OpponentScore {
            value: OpponentScore {
                user_id: 12,
                score: 7,
            },
        };
        assert!(game.handle_relay_message(&from_rival));
        assert_eq!(game.opponent_score().map(|o| o.score), Some(7));

        assert!(game.handle_relay_message(&RelayMessage::OpponentDeath { value: 12 }));
        assert!(game.opponent_dead());
        assert!(game.handle_relay_message(&RelayMessage::SessionFinished { winner_id: 11 }));
        assert_eq!(game.session_winner(), Some(11));
        assert!(!game.handle_relay_message(&RelayMessage::PlayerLeft { user_id: 12 }));

        assert_eq!(game.state().character, before);
        assert!(!game.is_stopped());
    }
}
