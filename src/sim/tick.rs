//! Fixed timestep simulation tick
//!
//! One call advances the match by one 16 ms step. Order matters: the camera
//! follows the freshly moved character, and recycling decisions use the
//! freshly moved camera.

use super::physics::step_character;
use super::state::{GameEvent, GamePhase, GameState};
use super::terrain::recycle;
use crate::input::{Direction, TickInput};

/// Advance the match by one tick. Does nothing unless the match is playing.
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        steer_autopilot(state, &mut input);
    }
    let input = &input;

    state.time_ticks += 1;

    // 1. Character
    let was_grounded = state.character.on_platform;
    let outcome = step_character(
        &mut state.character,
        input,
        &state.platforms,
        &state.params.arena,
        state.params.viewport.width,
        state.time_ticks,
    );
    if let Some(slot) = outcome.landed {
        if !was_grounded {
            state.events.push(GameEvent::Landed { slot });
        }
    }
    if outcome.jumped {
        state.events.push(GameEvent::Jumped);
    }

    // 2. Camera and score
    state
        .camera
        .follow(state.character.pos.y, state.params.viewport.height);

    // 3. Terrain
    let report = recycle(
        &mut state.platforms,
        state.camera.offset,
        &mut state.rng,
        &state.params.arena,
        &state.params.viewport,
    );
    state.relaxed_placements += report.relaxed;

    let score = state.camera.score();
    if score > state.score {
        state.score = score;
        state.events.push(GameEvent::ScoreChanged { score });
    }

    // 4. Death
    if state.character.screen_y(state.camera.offset) > state.death_line() {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::Death {
            final_score: state.score,
            user_id: state.params.user_id,
        });
        log::info!(
            "Game over after {} ticks, score {}",
            state.time_ticks,
            state.score
        );
    }
}

/// Demo player: jump whenever possible and steer under the platform the
/// character is heading for (the next one up while rising, the nearest one
/// below the feet while falling).
fn steer_autopilot(state: &GameState, input: &mut TickInput) {
    let arena = &state.params.arena;
    let character = &state.character;
    let feet = character.pos.y + arena.character_size;
    let rising = character.velocity_y < 0.0;

    let target = if rising {
        state
            .platforms
            .iter()
            .filter(|p| p.top() < feet)
            .max_by(|a, b| a.top().total_cmp(&b.top()))
    } else {
        state
            .platforms
            .iter()
            .filter(|p| p.top() >= feet)
            .min_by(|a, b| a.top().total_cmp(&b.top()))
    };

    input.jump = true;
    input.speed_scale = None;
    input.direction = match target {
        Some(platform) => {
            let platform_center = platform.pos.x + arena.platform_width / 2.0;
            let character_center = character.pos.x + arena.character_size / 2.0;
            let dx = platform_center - character_center;
            if dx > arena.move_speed / 2.0 {
                Direction::Right
            } else if dx < -arena.move_speed / 2.0 {
                Direction::Left
            } else {
                Direction::None
            }
        }
        None => Direction::None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaConfig;
    use crate::sim::state::MatchParams;
    use crate::sim::terrain::Platform;
    use proptest::prelude::*;

    fn new_state(seed: u32) -> GameState {
        GameState::initialize(MatchParams::new(seed, 11, ArenaConfig::default())).unwrap()
    }

    /// Platforms stacked straight up from the spawn point, 70 apart
    fn ladder_state() -> GameState {
        let mut state = new_state(5);
        let base = state.platforms[0].top();
        for (i, platform) in state.platforms.iter_mut().enumerate() {
            *platform = Platform::new(170.0, base - 70.0 * i as f64);
        }
        state
    }

    fn deaths(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Death { .. }))
            .count()
    }

    #[test]
    fn test_fall_through_seed_42() {
        // Slot 0 spawns at the far left, nowhere near the character
        let mut state = new_state(42);
        let input = TickInput::default();
        for _ in 0..1000 {
            tick(&mut state, &input);
            if state.is_over() {
                break;
            }
        }

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.time_ticks, 21);
        let events = state.drain_events();
        assert_eq!(deaths(&events), 1);
        assert_eq!(
            events.last(),
            Some(&GameEvent::Death {
                final_score: 0,
                user_id: 11
            })
        );
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::ScoreChanged { .. })));
    }

    #[test]
    fn test_lands_on_platform_beneath() {
        let mut state = ladder_state();
        state.character.velocity_y = 3.0;
        state.character.pos.y = state.platforms[0].top() - 40.0 - 3.0;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.character.pos.y, state.platforms[0].top() - 40.0);
        assert_eq!(state.character.velocity_y, 0.0);
        assert!(state.character.on_platform);
        assert_eq!(state.drain_events(), vec![GameEvent::Landed { slot: 0 }]);
    }

    #[test]
    fn test_jump_from_spawn() {
        let mut state = ladder_state();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        // First tick settles onto slot 0
        tick(&mut state, &TickInput::default());
        assert!(state.character.on_platform);

        tick(&mut state, &jump);
        assert_eq!(state.character.velocity_y, -15.0);
        assert!(state.drain_events().contains(&GameEvent::Jumped));

        // Holding jump mid-air does nothing
        let before = state.character.velocity_y;
        tick(&mut state, &jump);
        assert!(state.character.velocity_y > before);
    }

    #[test]
    fn test_death_is_terminal() {
        let mut state = new_state(8);
        state.character.pos.y = 5000.0;
        tick(&mut state, &TickInput::default());
        assert!(state.is_over());

        let frozen = state.character.clone();
        let ticks = state.time_ticks;
        let platforms = state.platforms.clone();
        for _ in 0..10 {
            tick(
                &mut state,
                &TickInput {
                    direction: Direction::Left,
                    jump: true,
                    ..Default::default()
                },
            );
        }
        assert_eq!(state.character, frozen);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.platforms, platforms);
        assert_eq!(deaths(&state.drain_events()), 1);
    }

    #[test]
    fn test_autopilot_climbs() {
        let mut state = ladder_state();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state, &input);
        }
        assert!(!state.is_over());
        assert!(state.score > 0);
        assert!(state.camera.offset > 0.0);
        assert_eq!(state.platforms.len(), 20);
    }

    #[test]
    fn test_determinism() {
        let mut a = new_state(99_999);
        let mut b = new_state(99_999);

        let inputs = [
            TickInput {
                direction: Direction::Left,
                ..Default::default()
            },
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput {
                autopilot: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for n in 0..400 {
            let input = &inputs[(n / 7) % inputs.len()];
            tick(&mut a, input);
            tick(&mut b, input);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.character, b.character);
        assert_eq!(a.platforms, b.platforms);
        assert_eq!(a.score, b.score);
        assert_eq!(a.rng, b.rng);
    }

    proptest! {
        #[test]
        fn score_is_monotonic(
            seed in any::<u32>(),
            moves in proptest::collection::vec((-1i32..=1, any::<bool>(), any::<bool>()), 50..300)
        ) {
            let mut state = new_state(seed);
            let mut last = state.score;
            for (axis, jump, autopilot) in moves {
                let input = TickInput {
                    direction: Direction::from_axis(axis),
                    jump,
                    autopilot,
                    ..Default::default()
                };
                tick(&mut state, &input);
                prop_assert!(state.score >= last);
                last = state.score;
            }

            let events = state.drain_events();
            let mut previous = 0;
            for event in &events {
                if let GameEvent::ScoreChanged { score } = event {
                    prop_assert!(*score > previous);
                    previous = *score;
                }
            }
            prop_assert!(deaths(&events) <= 1);
            prop_assert_eq!(state.platforms.len(), 20);
        }
    }
}
