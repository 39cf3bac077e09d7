//! Shape generation for 2D primitives
//!
//! All angles are in degrees. The playfield polygon can have a fractional
//! side count while it tweens; the last sector is then cut short at 360.

use glam::Vec2;

use super::vertex::Vertex;
use crate::polar_to_cartesian;
use crate::sim::collision::{sector_count, sector_width};

/// Angular extent of sector `index`, clipped to a full turn
pub fn sector_span(index: usize, sides: f64) -> (f64, f64) {
    let width = sector_width(sides);
    let start = index as f64 * width;
    let end = ((index + 1) as f64 * width).min(360.0);
    (start, end)
}

/// Generate vertices for a single triangle
pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::at(a, color),
        Vertex::at(b, color),
        Vertex::at(c, color),
    ]
}

/// Generate vertices for a slice from the centre out to `radius`
pub fn sector_slice(radius: f32, start: f64, end: f64, color: [f32; 4]) -> Vec<Vertex> {
    triangle(
        Vec2::ZERO,
        polar_to_cartesian(radius, start),
        polar_to_cartesian(radius, end),
        color,
    )
}

/// Generate vertices for the straight-edged band between two radii
/// (a polygon wall segment)
pub fn band_segment(
    inner_radius: f32,
    outer_radius: f32,
    start: f64,
    end: f64,
    color: [f32; 4],
) -> Vec<Vertex> {
    let inner1 = polar_to_cartesian(inner_radius, start);
    let outer1 = polar_to_cartesian(outer_radius, start);
    let inner2 = polar_to_cartesian(inner_radius, end);
    let outer2 = polar_to_cartesian(outer_radius, end);

    vec![
        Vertex::at(inner1, color),
        Vertex::at(outer1, color),
        Vertex::at(inner2, color),
        Vertex::at(inner2, color),
        Vertex::at(outer1, color),
        Vertex::at(outer2, color),
    ]
}

/// Generate vertices for a filled (possibly fractional) regular polygon
pub fn polygon(radius: f32, sides: f64, rotation: f64, color: [f32; 4]) -> Vec<Vertex> {
    let count = sector_count(sides);
    let mut vertices = Vec::with_capacity(count * 3);
    for i in 0..count {
        let (start, end) = sector_span(i, sides);
        vertices.extend(sector_slice(radius, start + rotation, end + rotation, color));
    }
    vertices
}
