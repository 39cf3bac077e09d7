//! Haxagon - level simulation core for a rotating-polygon reflex game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (levels, patterns, collisions)
//! - `renderer`: Vertex output consumed by a host renderer
//! - `catalog`: Level content loaded from JSON
//! - `highscores`: Binary score database
//! - `settings`: Playfield geometry and runtime configuration

pub mod catalog;
pub mod color;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use catalog::LevelCatalog;
pub use color::Color;
pub use settings::{Arena, Settings};

use glam::Vec2;

/// Gameplay constants
pub mod consts {
    /// Factor applied to |multiplier| on every difficulty step
    pub const DIFFICULTY_MULTIPLIER: f64 = 1.1;
    /// Shortest wait between rotation flips (frames)
    pub const FLIP_FRAMES_MIN: u32 = 120;
    /// Longest wait between rotation flips (frames)
    pub const FLIP_FRAMES_MAX: u32 = 500;
    /// Patterns kept in flight at steady state
    pub const TOTAL_PATTERNS_AT_ONE_TIME: usize = 5;
    /// Length of a side-count tween (frames)
    pub const FRAMES_PER_CHANGE_SIDE: u32 = 36;

    /// Smallest polygon a pattern may be authored for
    pub const MIN_SIDES: usize = 3;
    /// Largest polygon a pattern may be authored for
    pub const MAX_SIDES: usize = 12;
    /// Side count used to pick the very first pattern
    pub const DEFAULT_SIDES: usize = 6;

    /// Logical frames per second the frame counters assume
    pub const FRAMES_PER_SECOND: u32 = 60;
    /// Rotation speed applied on the game over screen
    pub const GAME_OVER_ROT_SPEED: f64 = 0.5;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Convert polar (r, degrees) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, degrees: f64) -> Vec2 {
    let theta = degrees.to_radians() as f32;
    Vec2::new(r * theta.cos(), r * theta.sin())
}
