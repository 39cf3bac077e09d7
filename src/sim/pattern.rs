//! Wall patterns
//!
//! A pattern is a group of walls authored for a range of polygon sizes. Each
//! wall occupies one side of the polygon and a radial band
//! `[distance, distance + height]`; walls travel toward the centre as the
//! level advances.

use serde::{Deserialize, Serialize};

use super::factory::LevelError;
use super::twist::Twist;
use crate::consts::{MAX_SIDES, MIN_SIDES};

/// A single wall segment in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    distance: f64,
    height: f64,
    side: usize,
}

impl Wall {
    pub fn new(distance: f64, height: f64, side: usize) -> Self {
        Self {
            distance,
            height,
            side,
        }
    }

    /// Inner edge distance from the centre
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Outer edge distance from the centre
    pub fn outer_distance(&self) -> f64 {
        self.distance + self.height
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn advance(&mut self, amount: f64) {
        self.distance -= amount;
    }

    /// Whether the radial band contains `distance`
    pub fn spans_distance(&self, distance: f64) -> bool {
        distance >= self.distance && distance <= self.outer_distance()
    }
}

/// An instantiated pattern: walls sharing a side count
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    walls: Vec<Wall>,
    sides: usize,
}

impl Pattern {
    pub fn new(walls: Vec<Wall>, sides: usize) -> Self {
        Self { walls, sides }
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Side count this pattern was laid out for
    pub fn sides(&self) -> usize {
        self.sides
    }

    /// Distance of the nearest wall's inner edge
    pub fn distance(&self) -> f64 {
        self.walls
            .iter()
            .map(Wall::distance)
            .fold(f64::INFINITY, f64::min)
    }

    /// Distance of the furthest wall's outer edge
    pub fn furthest_distance(&self) -> f64 {
        self.walls
            .iter()
            .map(Wall::outer_distance)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Move every wall `amount` units toward the centre
    pub fn advance(&mut self, amount: f64) {
        for wall in &mut self.walls {
            wall.advance(amount);
        }
    }

    /// A pattern is spent once its furthest edge has reached `limit`
    pub fn is_traversed(&self, limit: f64) -> bool {
        self.furthest_distance() <= limit
    }
}

/// Authored wall, relative to its pattern's origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallFactory {
    pub distance: f64,
    pub height: f64,
    pub side: usize,
}

impl WallFactory {
    fn instantiate(&self, origin: f64, sides: usize, offset: usize, mirror: bool) -> Wall {
        let mut side = self.side % sides;
        if mirror {
            side = sides - 1 - side;
        }
        Wall::new(origin + self.distance, self.height, (side + offset) % sides)
    }
}

/// Authored pattern content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFactory {
    pub name: String,
    pub min_sides: usize,
    pub max_sides: usize,
    pub walls: Vec<WallFactory>,
}

impl PatternFactory {
    pub fn supports(&self, sides: usize) -> bool {
        (self.min_sides..=self.max_sides).contains(&sides)
    }

    /// Reject content the simulation cannot run
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.min_sides < MIN_SIDES
            || self.max_sides > MAX_SIDES
            || self.min_sides > self.max_sides
        {
            return Err(LevelError::InvalidSides {
                pattern: self.name.clone(),
                min: self.min_sides,
                max: self.max_sides,
            });
        }
        if self.walls.is_empty() {
            return Err(LevelError::EmptyPattern(self.name.clone()));
        }
        if let Some(wall) = self
            .walls
            .iter()
            .find(|w| !(w.height > 0.0) || !(w.distance >= 0.0))
        {
            return Err(LevelError::InvalidWall {
                pattern: self.name.clone(),
                distance: wall.distance,
                height: wall.height,
            });
        }
        Ok(())
    }

    /// Build a pattern whose nearest authored offset sits at `distance`
    ///
    /// `sides` is kept when this factory supports it; otherwise a side count
    /// is drawn from the factory's range. The layout is rotated by a random
    /// number of sides and mirrored half of the time.
    pub fn spawn(&self, rng: &mut Twist, sides: usize, distance: f64) -> Pattern {
        let sides = if self.supports(sides) {
            sides
        } else {
            rng.range(self.min_sides as u32, self.max_sides as u32) as usize
        };
        let offset = rng.index(sides);
        let mirror = rng.coin();

        let walls = self
            .walls
            .iter()
            .map(|w| w.instantiate(distance, sides, offset, mirror))
            .collect();

        Pattern::new(walls, sides)
    }
}
