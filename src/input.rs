//! Player input signals
//!
//! The simulation reads one [`TickInput`] per tick. Keyboard handlers write
//! it directly; pose tracking goes through [`LeanMapper`] and
//! [`JumpDetector`], which turn torso landmarks into the same signals.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Horizontal movement signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// `-1` left, `1` right, anything else none
    pub fn from_axis(axis: i32) -> Self {
        match axis.signum() {
            -1 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::None,
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub direction: Direction,
    /// Fraction of the arena move speed; `None` is full speed
    pub speed_scale: Option<f64>,
    /// Jump requested this tick (still gated by ground contact and cooldown)
    pub jump: bool,
    /// Let the simulation steer and jump on its own
    pub autopilot: bool,
}

/// Direction and speed derived from a torso lean
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lean {
    pub direction: Direction,
    pub speed_scale: Option<f64>,
}

/// Maps the normalized torso x position to a movement signal.
///
/// The camera image is mirrored: leaning toward the left of the frame moves
/// the character right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeanMapper {
    pub center: f64,
    pub dead_zone: f64,
    pub lean_factor: f64,
}

impl Default for LeanMapper {
    fn default() -> Self {
        Self {
            center: 0.5,
            dead_zone: 0.05,
            lean_factor: 0.5,
        }
    }
}

impl LeanMapper {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dead_zone: settings.lean_dead_zone,
            lean_factor: settings.lean_factor,
            ..Self::default()
        }
    }

    /// `None` when the tracker has no torso yet (x reported as 0)
    pub fn map(&self, torso_x: f64) -> Option<Lean> {
        if torso_x == 0.0 || !torso_x.is_finite() {
            return None;
        }

        let lean = if torso_x < self.center - self.dead_zone {
            let amount = (self.center - torso_x) / self.center;
            Lean {
                direction: Direction::Right,
                speed_scale: Some(amount * self.lean_factor),
            }
        } else if torso_x > self.center + self.dead_zone {
            let amount = (torso_x - self.center) / self.center;
            Lean {
                direction: Direction::Left,
                speed_scale: Some(amount * self.lean_factor),
            }
        } else {
            Lean {
                direction: Direction::None,
                speed_scale: None,
            }
        };
        Some(lean)
    }
}

/// Turns successive torso heights into a jumping level signal.
///
/// A quick rise of the torso (y shrinking in image space) starts a jump; the
/// signal drops again once the torso holds still.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpDetector {
    pub jump_threshold: f64,
    pub stable_threshold: f64,
    last_torso_y: Option<f64>,
    jumping: bool,
}

impl Default for JumpDetector {
    fn default() -> Self {
        Self {
            jump_threshold: 0.05,
            stable_threshold: 0.02,
            last_torso_y: None,
            jumping: false,
        }
    }
}

impl JumpDetector {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            jump_threshold: settings.jump_threshold,
            stable_threshold: settings.stable_threshold,
            ..Self::default()
        }
    }

    /// Feed one sample, returns the current jumping level
    pub fn sample(&mut self, torso_y: f64) -> bool {
        if let Some(last) = self.last_torso_y.filter(|y| *y > 0.0) {
            let delta = last - torso_y;
            if delta > self.jump_threshold {
                self.jumping = true;
            } else if delta.abs() < self.stable_threshold {
                self.jumping = false;
            }
        }
        self.last_torso_y = Some(torso_y);
        self.jumping
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn reset(&mut self) {
        self.last_torso_y = None;
        self.jumping = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_from_axis() {
        assert_eq!(Direction::from_axis(-3), Direction::Left);
        assert_eq!(Direction::from_axis(1), Direction::Right);
        assert_eq!(Direction::from_axis(0), Direction::None);
    }

    #[test]
    fn test_lean_is_mirrored() {
        let mapper = LeanMapper::default();

        let lean = mapper.map(0.3).unwrap();
        assert_eq!(lean.direction, Direction::Right);
        assert_relative_eq!(lean.speed_scale.unwrap(), 0.2);

        let lean = mapper.map(0.9).unwrap();
        assert_eq!(lean.direction, Direction::Left);
        assert_relative_eq!(lean.speed_scale.unwrap(), 0.4);
    }

    #[test]
    fn test_lean_dead_zone() {
        let mapper = LeanMapper::default();
        for x in [0.46, 0.5, 0.54] {
            let lean = mapper.map(x).unwrap();
            assert_eq!(lean.direction, Direction::None);
            assert_eq!(lean.speed_scale, None);
        }
        assert_eq!(mapper.map(0.0), None);
    }

    #[test]
    fn test_jump_detector_rise_and_settle() {
        let mut detector = JumpDetector::default();
        assert!(!detector.sample(0.6));
        // Torso rises by 0.1
        assert!(detector.sample(0.5));
        // Still moving: level holds
        assert!(detector.sample(0.47));
        // Holds still: level drops
        assert!(!detector.sample(0.465));
    }

    #[test]
    fn test_jump_detector_ignores_drop() {
        let mut detector = JumpDetector::default();
        detector.sample(0.5);
        assert!(!detector.sample(0.6));
        detector.reset();
        assert!(!detector.is_jumping());
    }
}
