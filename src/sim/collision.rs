//! Cursor-vs-wall collision on an n-gon playfield
//!
//! Angles are converted into sector coordinates (`u = angle / sector_width`)
//! before any test, so the sector index of the cursor and the angular extent
//! of each wall are derived from the same number. A cursor exactly on a
//! sector boundary belongs to the sector that starts there (the next sector
//! counter-clockwise), and every query agrees on that.

use super::pattern::Wall;
use crate::normalize_degrees;

/// Which ways the cursor may move, as seen from the walls around it
///
/// This is a signal for the caller. `Dead` means the cursor currently sits
/// inside a wall; deciding that the run is over is left to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    CanMove,
    /// A wall occupies the neighbouring space counter-clockwise
    CannotMoveLeft,
    /// A wall occupies the neighbouring space clockwise
    CannotMoveRight,
    /// Walls on both sides
    CannotMove,
    Dead,
}

impl Movement {
    pub fn allows_left(self) -> bool {
        matches!(self, Movement::CanMove | Movement::CannotMoveRight)
    }

    pub fn allows_right(self) -> bool {
        matches!(self, Movement::CanMove | Movement::CannotMoveLeft)
    }

    pub fn is_dead(self) -> bool {
        self == Movement::Dead
    }

    /// Combine the verdicts of two walls
    pub fn merge(self, other: Movement) -> Movement {
        use Movement::*;
        match (self, other) {
            (Dead, _) | (_, Dead) => Dead,
            (CannotMove, _) | (_, CannotMove) => CannotMove,
            (CannotMoveLeft, CannotMoveRight) | (CannotMoveRight, CannotMoveLeft) => CannotMove,
            (CanMove, m) | (m, CanMove) => m,
            (m, _) => m,
        }
    }

    fn from_sides(left: bool, right: bool) -> Movement {
        match (left, right) {
            (true, true) => Movement::CannotMove,
            (true, false) => Movement::CannotMoveLeft,
            (false, true) => Movement::CannotMoveRight,
            (false, false) => Movement::CanMove,
        }
    }
}

/// Angular width of one sector (degrees) for a possibly fractional side count
#[inline]
pub fn sector_width(sides: f64) -> f64 {
    360.0 / sides
}

/// Number of sectors drawn for a possibly fractional side count
#[inline]
pub fn sector_count(sides: f64) -> usize {
    (sides.ceil() as usize).max(1)
}

/// Coordinates this close to a whole number sit on a sector boundary
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Position of an angle in sector units, in [0, sides)
///
/// Angles within rounding error of a boundary are snapped onto it, so
/// `sector_width(n) * k` always lands in sector `k`.
#[inline]
pub fn sector_coordinate(angle: f64, sides: f64) -> f64 {
    let mut u = normalize_degrees(angle) / sector_width(sides);
    let boundary = u.round();
    if (u - boundary).abs() < BOUNDARY_EPSILON {
        u = boundary;
    }
    if u >= sides { 0.0 } else { u }
}

/// Sector index containing `angle`
pub fn sector_of(angle: f64, sides: f64) -> usize {
    let u = sector_coordinate(angle, sides);
    (u.floor() as usize).min(sector_count(sides) - 1)
}

/// Whether sector `side` covers the sector coordinate `u` (half-open, wraps)
#[inline]
fn side_covers(side: usize, u: f64, sides: f64) -> bool {
    (u - side as f64).rem_euclid(sides) < 1.0
}

/// Test a single wall against the cursor
///
/// `step` is the cursor's per-frame angular movement in degrees; a wall one
/// step away blocks movement toward it. Walls outside the cursor's radial
/// band are ignored.
pub fn wall_collision(
    wall: &Wall,
    cursor_distance: f64,
    cursor_pos: f64,
    step: f64,
    sides: f64,
) -> Movement {
    if !wall.spans_distance(cursor_distance) {
        return Movement::CanMove;
    }

    let width = sector_width(sides);
    let side = wall.side();

    if side_covers(side, sector_coordinate(cursor_pos, sides), sides) {
        return Movement::Dead;
    }

    let left = side_covers(side, sector_coordinate(cursor_pos + step, sides), sides);
    let right = side_covers(side, sector_coordinate(cursor_pos - step, sides), sides);

    // A step wider than a whole sector can jump the wall entirely; treat the
    // wall as blocking whichever side it sits nearest to.
    if !left && !right && step >= width {
        let u = sector_coordinate(cursor_pos, sides);
        let ahead = (side as f64 - u).rem_euclid(sides);
        let behind = (u - side as f64 - 1.0).rem_euclid(sides);
        if ahead * width <= step || behind * width <= step {
            return Movement::from_sides(ahead <= behind, behind < ahead);
        }
    }

    Movement::from_sides(left, right)
}
