//! Player settings and preferences
//!
//! Persisted separately from scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::arena::Difficulty;

/// How the player steers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    /// Arrow keys / A-D and space
    Keyboard,
    /// Torso lean and hop in front of the camera
    #[default]
    Pose,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::Keyboard => "Keyboard",
            ControlScheme::Pose => "Pose",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keyboard" | "keys" => Some(ControlScheme::Keyboard),
            "pose" | "camera" => Some(ControlScheme::Pose),
            _ => None,
        }
    }

    pub fn uses_camera(&self) -> bool {
        matches!(self, ControlScheme::Pose)
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub control: ControlScheme,
    /// Camera feed on (pose control falls back to keyboard when off)
    pub camera_enabled: bool,
    /// Difficulty for solo runs; multiplayer uses the session arena as is
    pub difficulty: Difficulty,

    // === Pose tuning ===
    /// Torso offset from center ignored as noise (fraction of frame width)
    pub lean_dead_zone: f64,
    /// Speed scale per unit of lean
    pub lean_factor: f64,
    /// Torso rise between samples that counts as a hop
    pub jump_threshold: f64,
    /// Torso movement below which the hop is over
    pub stable_threshold: f64,

    // === HUD ===
    pub show_opponent_score: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            control: ControlScheme::Pose,
            camera_enabled: true,
            difficulty: Difficulty::Normal,

            lean_dead_zone: 0.05,
            lean_factor: 0.5,
            jump_threshold: 0.05,
            stable_threshold: 0.02,

            show_opponent_score: true,
        }
    }
}

impl Settings {
    /// Settings for a control scheme (applies scheme defaults)
    pub fn from_scheme(control: ControlScheme) -> Self {
        let mut settings = Self::default();
        settings.apply_scheme(control);
        settings
    }

    pub fn apply_scheme(&mut self, control: ControlScheme) {
        self.control = control;
        self.camera_enabled = control.uses_camera();
    }

    /// Flip the camera (the debug `C` key)
    pub fn toggle_camera(&mut self) -> bool {
        self.camera_enabled = !self.camera_enabled;
        log::info!("Camera {}", if self.camera_enabled { "on" } else { "off" });
        self.camera_enabled
    }

    /// Pose input is only live while the camera is on
    pub fn effective_control(&self) -> ControlScheme {
        if self.control.uses_camera() && !self.camera_enabled {
            ControlScheme::Keyboard
        } else {
            self.control
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sky_hop_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file, defaults for anything missing
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, crate::error::ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pose_tuning() {
        let settings = Settings::default();
        assert_eq!(settings.control, ControlScheme::Pose);
        assert_eq!(settings.lean_dead_zone, 0.05);
        assert_eq!(settings.lean_factor, 0.5);
    }

    #[test]
    fn test_camera_toggle_falls_back_to_keyboard() {
        let mut settings = Settings::default();
        assert_eq!(settings.effective_control(), ControlScheme::Pose);
        assert!(!settings.toggle_camera());
        assert_eq!(settings.effective_control(), ControlScheme::Keyboard);
        assert!(settings.toggle_camera());
        assert_eq!(settings.effective_control(), ControlScheme::Pose);
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!(ControlScheme::from_str("KEYS"), Some(ControlScheme::Keyboard));
        assert_eq!(ControlScheme::from_str("joystick"), None);
        let settings = Settings::from_scheme(ControlScheme::Keyboard);
        assert!(!settings.camera_enabled);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "control": "Keyboard", "difficulty": "hard" }"#).unwrap();
        assert_eq!(settings.control, ControlScheme::Keyboard);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.jump_threshold, 0.05);
    }
}
