//! Playfield geometry and runtime settings
//!
//! Loaded from JSON; every field has a default so partial files work.

use serde::{Deserialize, Serialize};

/// Playfield geometry in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    /// Distance at which new patterns are spawned
    pub render_distance: f64,
    /// Radius of the centre polygon. Patterns whose outer edge falls to this
    /// distance have passed the cursor and are retired.
    pub hex_length: f64,
    /// Thickness of the centre polygon's border
    pub hex_border: f64,
    /// Radius of the cursor's orbit
    pub cursor_distance: f64,
    /// Cursor triangle size
    pub cursor_size: f64,
    /// Empty space left between consecutive patterns
    pub pattern_gap: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            render_distance: 300.0,
            hex_length: 24.0,
            hex_border: 3.0,
            cursor_distance: 32.0,
            cursor_size: 5.0,
            pattern_gap: 48.0,
        }
    }
}

/// Runtime settings for a play session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub arena: Arena,
    /// RNG seed; `None` lets the host pick one
    pub seed: Option<u64>,
    /// Frames between difficulty steps (`Level::increase_multiplier`)
    pub frames_per_difficulty_step: u32,
    /// Level to start on
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            seed: None,
            frames_per_difficulty_step: 600,
            level: "HEXAGON".to_string(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
