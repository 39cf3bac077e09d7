//! Level definitions
//!
//! A `LevelFactory` is immutable authored content plus the one field that
//! survives between plays: the high score. It produces a fresh `Level` for
//! every run.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use super::level::Level;
use super::pattern::PatternFactory;
use super::policy::{FollowTarget, SpawnPolicy};
use super::twist::Twist;
use crate::color::Color;
use crate::settings::Arena;

/// Content-authoring errors. These indicate a broken level definition.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("level `{0}` has no pattern factories")]
    NoPatterns(String),
    #[error("level `{level}` has an empty {palette} palette")]
    EmptyPalette { level: String, palette: &'static str },
    #[error("level `{0}` has a pulse period of zero frames")]
    ZeroPulse(String),
    #[error("pattern `{pattern}` has an invalid side range {min}..={max}")]
    InvalidSides {
        pattern: String,
        min: usize,
        max: usize,
    },
    #[error("pattern `{0}` has no walls")]
    EmptyPattern(String),
    #[error("pattern `{pattern}` has a wall at distance {distance} with height {height}")]
    InvalidWall {
        pattern: String,
        distance: f64,
        height: f64,
    },
    #[error("no level named `{0}`")]
    UnknownLevel(String),
    #[error("malformed level content: {0}")]
    Json(#[from] serde_json::Error),
}

/// Authored level definition
#[derive(Debug, Serialize, Deserialize)]
pub struct LevelFactory {
    name: String,
    difficulty: String,
    mode: String,
    creator: String,
    music: String,

    #[serde(default)]
    high_score: Cell<u32>,

    /// Frames per color pulse
    speed_pulse: u32,
    /// Wall travel per frame (world units)
    speed_wall: f64,
    /// Playfield rotation per frame at |multiplier| = 1 (degrees)
    speed_rotation: f64,
    /// Cursor travel per left/right step (degrees)
    speed_cursor: f64,

    colors_fg: Vec<Color>,
    colors_bg1: Vec<Color>,
    colors_bg2: Vec<Color>,

    patterns: Vec<PatternFactory>,
}

impl LevelFactory {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let factory: LevelFactory = serde_json::from_str(json)?;
        factory.validate()?;
        Ok(factory)
    }

    /// Check the definition can be played
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.patterns.is_empty() {
            return Err(LevelError::NoPatterns(self.name.clone()));
        }
        for (palette, colors) in [
            ("foreground", &self.colors_fg),
            ("background 1", &self.colors_bg1),
            ("background 2", &self.colors_bg2),
        ] {
            if colors.is_empty() {
                return Err(LevelError::EmptyPalette {
                    level: self.name.clone(),
                    palette,
                });
            }
        }
        if self.speed_pulse == 0 {
            return Err(LevelError::ZeroPulse(self.name.clone()));
        }
        self.patterns.iter().try_for_each(PatternFactory::validate)
    }

    /// Start a run with the default arena and spawn policy
    pub fn instantiate(
        &self,
        rng: &mut Twist,
        render_distance: f64,
    ) -> Result<Level<'_>, LevelError> {
        let arena = Arena {
            render_distance,
            ..Arena::default()
        };
        self.instantiate_with(rng, arena, Box::new(FollowTarget))
    }

    pub fn instantiate_with(
        &self,
        rng: &mut Twist,
        arena: Arena,
        policy: Box<dyn SpawnPolicy>,
    ) -> Result<Level<'_>, LevelError> {
        self.validate()?;
        log::info!(
            "Starting level {} ({} / {}), seed {}",
            self.name,
            self.difficulty,
            self.mode,
            rng.seed()
        );
        Ok(Level::new(self, rng, arena, policy))
    }

    /// Record `score` if it beats the stored best. Returns true on a new record.
    pub fn set_high_score(&self, score: u32) -> bool {
        if score > self.high_score.get() {
            self.high_score.set(score);
            true
        } else {
            false
        }
    }

    /// Every side count at least one pattern factory is authored for
    pub fn supported_sides(&self) -> Vec<usize> {
        let mut sides: Vec<usize> = self
            .patterns
            .iter()
            .flat_map(|p| p.min_sides..=p.max_sides)
            .collect();
        sides.sort_unstable();
        sides.dedup();
        sides
    }

    pub fn supports_sides(&self, sides: usize) -> bool {
        self.patterns.iter().any(|p| p.supports(sides))
    }

    pub fn patterns(&self) -> &[PatternFactory] {
        &self.patterns
    }

    pub fn colors_fg(&self) -> &[Color] {
        &self.colors_fg
    }

    pub fn colors_bg1(&self) -> &[Color] {
        &self.colors_bg1
    }

    pub fn colors_bg2(&self) -> &[Color] {
        &self.colors_bg2
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn music(&self) -> &str {
        &self.music
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.get()
    }

    pub fn speed_pulse(&self) -> u32 {
        self.speed_pulse
    }

    pub fn speed_wall(&self) -> f64 {
        self.speed_wall
    }

    pub fn speed_rotation(&self) -> f64 {
        self.speed_rotation
    }

    pub fn speed_cursor(&self) -> f64 {
        self.speed_cursor
    }
}
