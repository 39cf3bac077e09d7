//! Per-frame call sequence
//!
//! What an owning play state does every frame: gate the player's input on
//! the walls around the cursor, step the cursor, advance the level, and
//! report the collision state afterwards. Ending the run on `Movement::Dead`
//! is left to the caller.

use super::collision::Movement;
use super::level::Level;
use super::twist::Twist;

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move the cursor counter-clockwise
    pub left: bool,
    /// Move the cursor clockwise
    pub right: bool,
}

/// Advance the level by one frame
pub fn tick(
    level: &mut Level<'_>,
    rng: &mut Twist,
    input: TickInput,
    cursor_distance: f64,
) -> Movement {
    let movement = level.collision(cursor_distance);
    if movement.is_dead() {
        return movement;
    }

    // Pressing both directions cancels out
    match (input.left, input.right) {
        (true, false) if movement.allows_left() => level.left(),
        (false, true) if movement.allows_right() => level.right(),
        _ => {}
    }

    let target = level.target_sides();
    level.update(rng, target);
    level.collision(cursor_distance)
}
