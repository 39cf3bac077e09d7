//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One `update` call is one logical frame
//! - Randomness only from the `Twist` passed in
//! - No rendering or platform dependencies beyond the `DrawTarget` sink

pub mod collision;
pub mod factory;
pub mod level;
pub mod pattern;
pub mod policy;
pub mod tick;
pub mod timer;
pub mod twist;

pub use collision::{Movement, sector_of, wall_collision};
pub use factory::{LevelError, LevelFactory};
pub use level::Level;
pub use pattern::{Pattern, PatternFactory, Wall, WallFactory};
pub use policy::{FollowTarget, Shuffle, SpawnPolicy};
pub use tick::{TickInput, tick};
pub use timer::FrameTimer;
pub use twist::Twist;
