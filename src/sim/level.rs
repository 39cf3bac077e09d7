//! Per-run level simulation
//!
//! A `Level` borrows its `LevelFactory` for content and owns everything that
//! changes while playing: the queue of in-flight patterns, playfield rotation
//! and direction, the cursor, the side-count tween and the color pulse.
//!
//! One call to `update` is one logical frame. The three countdowns it drives
//! are independent `FrameTimer`s:
//! - side tween (`delay`): runs for `FRAMES_PER_CHANGE_SIDE` after a side
//!   change starts, interpolating the polygon from `last_sides` to
//!   `current_sides`
//! - color pulse (`pulse`): period `speed_pulse`, rotates palette indices
//! - flip (`flip`): random period in `[FLIP_FRAMES_MIN, FLIP_FRAMES_MAX]`,
//!   negates the multiplier

use std::collections::VecDeque;

use super::collision::{self, Movement, sector_width, wall_collision};
use super::factory::LevelFactory;
use super::pattern::Pattern;
use super::policy::SpawnPolicy;
use super::timer::FrameTimer;
use super::twist::Twist;
use crate::color::{Color, interpolate_color};
use crate::consts::*;
use crate::normalize_degrees;
use crate::polar_to_cartesian;
use crate::renderer::{DrawTarget, shapes};
use crate::settings::Arena;

/// Current and upcoming index into one palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PaletteCursor {
    index: usize,
    next: usize,
}

impl PaletteCursor {
    fn new(len: usize) -> Self {
        Self {
            index: 0,
            next: 1 % len,
        }
    }

    fn advance(&mut self, len: usize) {
        self.index = self.next;
        self.next = (self.next + 1) % len;
    }

    fn blend(&self, colors: &[Color], t: f64) -> Color {
        interpolate_color(colors[self.index], colors[self.next], t)
    }
}

#[derive(Debug)]
pub struct Level<'a> {
    factory: &'a LevelFactory,
    arena: Arena,
    policy: Box<dyn SpawnPolicy>,
    supported: Vec<usize>,

    /// Nearest pattern first
    patterns: VecDeque<Pattern>,

    /// Rotation direction and speed
    multiplier: f64,
    cursor_pos: f64,
    rotation: f64,
    sides_tween: f64,
    last_sides: usize,
    current_sides: usize,

    delay: FrameTimer,
    pulse: FrameTimer,
    flip: FrameTimer,

    fg: PaletteCursor,
    bg1: PaletteCursor,
    bg2: PaletteCursor,
}

impl<'a> Level<'a> {
    /// Build a run from a validated factory. Use `LevelFactory::instantiate`.
    pub(crate) fn new(
        factory: &'a LevelFactory,
        rng: &mut Twist,
        arena: Arena,
        policy: Box<dyn SpawnPolicy>,
    ) -> Self {
        let supported = factory.supported_sides();
        let start_sides = supported
            .iter()
            .copied()
            .min_by_key(|s| s.abs_diff(DEFAULT_SIDES))
            .unwrap_or(DEFAULT_SIDES);

        let mut level = Self {
            factory,
            arena,
            policy,
            supported,
            patterns: VecDeque::with_capacity(TOTAL_PATTERNS_AT_ONE_TIME + 1),
            multiplier: 1.0,
            cursor_pos: 0.0,
            rotation: 0.0,
            sides_tween: 1.0,
            last_sides: start_sides,
            current_sides: start_sides,
            delay: FrameTimer::idle(),
            pulse: FrameTimer::new(factory.speed_pulse()),
            flip: FrameTimer::new(FLIP_FRAMES_MAX),
            fg: PaletteCursor::new(factory.colors_fg().len()),
            bg1: PaletteCursor::new(factory.colors_bg1().len()),
            bg2: PaletteCursor::new(factory.colors_bg2().len()),
        };

        level.fill_patterns(rng);

        // The playfield starts in the shape of the first pattern
        if let Some(sides) = level.patterns.front().map(Pattern::sides) {
            level.current_sides = sides;
            level.last_sides = sides;
        }
        level.cursor_pos = sector_width(level.current_sides as f64) / 2.0;

        level
    }

    /// Advance one frame
    ///
    /// `hex_length` is the side count the playfield should be heading for;
    /// owners normally pass `target_sides()`. It must be a side count this
    /// level has patterns for.
    pub fn update(&mut self, rng: &mut Twist, hex_length: usize) {
        assert!(
            self.factory.supports_sides(hex_length),
            "level `{}` has no pattern authored for {} sides",
            self.factory.name(),
            hex_length
        );

        self.update_sides(rng, hex_length);
        self.update_flip(rng);
        self.rotate(self.factory.speed_rotation());
        self.update_colors();
        self.update_patterns(rng);
    }

    fn update_sides(&mut self, rng: &mut Twist, target: usize) {
        if self.delay.is_running() {
            if self.delay.tick() {
                self.last_sides = self.current_sides;
                self.sides_tween = 1.0;
            } else {
                self.sides_tween = self.delay.progress();
            }
            return;
        }

        if target == self.current_sides {
            return;
        }

        let next = self
            .policy
            .next_sides(rng, self.current_sides, target, &self.supported);
        assert!(
            next != self.current_sides && self.supported.contains(&next),
            "spawn policy chose {} sides (current {}, supported {:?})",
            next,
            self.current_sides,
            self.supported
        );

        log::debug!("Sides {} -> {}", self.current_sides, next);
        self.last_sides = self.current_sides;
        self.current_sides = next;
        self.delay.reset(FRAMES_PER_CHANGE_SIDE);
        self.sides_tween = 0.0;
    }

    fn update_flip(&mut self, rng: &mut Twist) {
        if self.flip.tick() {
            self.multiplier = -self.multiplier;
            let frames = rng.range(FLIP_FRAMES_MIN, FLIP_FRAMES_MAX);
            self.flip.reset(frames);
            log::debug!("Flip: multiplier {:.3}, next in {} frames", self.multiplier, frames);
        }
    }

    fn update_colors(&mut self) {
        if self.pulse.tick() {
            self.fg.advance(self.factory.colors_fg().len());
            self.bg1.advance(self.factory.colors_bg1().len());
            self.bg2.advance(self.factory.colors_bg2().len());
            self.pulse.reset(self.factory.speed_pulse());
        }
    }

    fn update_patterns(&mut self, rng: &mut Twist) {
        // Walls ease back to full speed while the polygon morphs
        let amount = self.factory.speed_wall() * self.sides_tween;
        for pattern in &mut self.patterns {
            pattern.advance(amount);
        }

        while self
            .patterns
            .front()
            .is_some_and(|p| p.is_traversed(self.arena.hex_length))
        {
            self.patterns.pop_front();
            log::trace!("Pattern retired, {} left", self.patterns.len());
        }

        self.fill_patterns(rng);
    }

    fn fill_patterns(&mut self, rng: &mut Twist) {
        let factories = self.factory.patterns();
        while self.patterns.len() < TOTAL_PATTERNS_AT_ONE_TIME {
            let index = self
                .policy
                .next_pattern(rng, factories, self.current_sides);
            assert!(
                index < factories.len(),
                "spawn policy chose pattern {} of {}",
                index,
                factories.len()
            );

            let distance = self.patterns.back().map_or(self.arena.render_distance, |p| {
                (p.furthest_distance() + self.arena.pattern_gap).max(self.arena.render_distance)
            });
            let pattern = factories[index].spawn(rng, self.current_sides, distance);
            log::trace!(
                "Spawned pattern {} ({} sides) at {:.1}",
                factories[index].name,
                pattern.sides(),
                distance
            );
            self.patterns.push_back(pattern);
        }
    }

    /// Test the cursor at `cursor_distance` against the nearby walls
    pub fn collision(&self, cursor_distance: f64) -> Movement {
        let sides = self.interpolated_sides();
        let step = self.factory.speed_cursor();
        let mut movement = Movement::CanMove;

        for pattern in &self.patterns {
            // Queue is ordered, nothing further out can reach the cursor
            if pattern.distance() > cursor_distance {
                break;
            }
            for wall in pattern.walls() {
                movement = movement.merge(wall_collision(
                    wall,
                    cursor_distance,
                    self.cursor_pos,
                    step,
                    sides,
                ));
                if movement.is_dead() {
                    return movement;
                }
            }
        }

        movement
    }

    /// Whether a wall fills `sector` at `cursor_distance`
    pub fn sector_blocked(&self, sector: usize, cursor_distance: f64) -> bool {
        let sides = self.interpolated_sides();
        let centre = (sector as f64 + 0.5) * sector_width(sides);
        self.patterns
            .iter()
            .take_while(|p| p.distance() <= cursor_distance)
            .flat_map(Pattern::walls)
            .any(|w| wall_collision(w, cursor_distance, centre, 0.0, sides).is_dead())
    }

    /// Sector of the current polygon containing `angle` (degrees)
    pub fn sector_of(&self, angle: f64) -> usize {
        collision::sector_of(angle, self.interpolated_sides())
    }

    pub fn cursor_sector(&self) -> usize {
        self.sector_of(self.cursor_pos)
    }

    /// Scale |multiplier| by `DIFFICULTY_MULTIPLIER`, keeping its sign
    pub fn increase_multiplier(&mut self) {
        self.multiplier *= DIFFICULTY_MULTIPLIER;
        log::debug!("Multiplier now {:.3}", self.multiplier);
    }

    /// Step the cursor counter-clockwise
    pub fn left(&mut self) {
        self.cursor_pos = normalize_degrees(self.cursor_pos + self.factory.speed_cursor());
    }

    /// Step the cursor clockwise
    pub fn right(&mut self) {
        self.cursor_pos = normalize_degrees(self.cursor_pos - self.factory.speed_cursor());
    }

    /// Rotate the playfield by `speed` in the multiplier's direction
    pub fn rotate(&mut self, speed: f64) {
        self.rotation = normalize_degrees(self.rotation + speed * self.multiplier);
    }

    /// Bring rotation and cursor angle back into [0, 360)
    pub fn clamp(&mut self) {
        self.rotation = normalize_degrees(self.rotation);
        self.cursor_pos = normalize_degrees(self.cursor_pos);
    }

    /// Drop every in-flight pattern
    pub fn clear_patterns(&mut self) {
        self.patterns.clear();
    }

    pub fn draw(&self, target: &mut dyn DrawTarget) {
        self.draw_scaled(target, 1.0, 1.0);
    }

    /// Emit the playfield. `scale` sizes everything; `offset` grows only the
    /// centre polygon (the game over screen expands it).
    pub fn draw_scaled(&self, target: &mut dyn DrawTarget, scale: f32, offset: f32) {
        let sides = self.interpolated_sides();
        let width = sector_width(sides);
        let rotation = self.rotation;
        let fg = self.color_fg().to_rgba_f32();
        let bg1 = self.color_bg1().to_rgba_f32();
        let bg2 = self.color_bg2().to_rgba_f32();

        // Background sectors reach past the spawn ring so the screen is covered
        let far = (self.arena.render_distance * 2.0) as f32 * scale;
        for i in 0..collision::sector_count(sides) {
            let (start, end) = shapes::sector_span(i, sides);
            let color = if i % 2 == 0 { bg1 } else { bg2 };
            target.draw_triangles(&shapes::sector_slice(
                far,
                start + rotation,
                end + rotation,
                color,
            ));
        }

        for wall in self.patterns.iter().flat_map(Pattern::walls) {
            let inner = wall.distance().max(self.arena.hex_length);
            let outer = wall.outer_distance();
            if outer <= inner {
                continue;
            }
            let start = wall.side() as f64 * width + rotation;
            target.draw_triangles(&shapes::band_segment(
                inner as f32 * scale,
                outer as f32 * scale,
                start,
                start + width,
                fg,
            ));
        }

        let hex = self.arena.hex_length as f32 * offset * scale;
        let border = self.arena.hex_border as f32 * scale;
        target.draw_triangles(&shapes::polygon(hex, sides, rotation, fg));
        target.draw_triangles(&shapes::polygon((hex - border).max(0.0), sides, rotation, bg2));

        let angle = self.cursor_pos + rotation;
        let base = self.arena.cursor_distance as f32 * scale;
        let size = self.arena.cursor_size as f32 * scale;
        let spread = (self.arena.cursor_size / self.arena.cursor_distance).to_degrees();
        target.draw_triangles(&shapes::triangle(
            polar_to_cartesian(base + size, angle),
            polar_to_cartesian(base, angle - spread),
            polar_to_cartesian(base, angle + spread),
            fg,
        ));
    }

    /// Side count of the nearest pattern: where the playfield should head
    pub fn target_sides(&self) -> usize {
        self.patterns
            .front()
            .map_or(self.current_sides, Pattern::sides)
    }

    /// Side count mid-tween, between `last_sides` and `current_sides`
    pub fn interpolated_sides(&self) -> f64 {
        let last = self.last_sides as f64;
        last + (self.current_sides as f64 - last) * self.sides_tween
    }

    /// Fraction of the current color pulse elapsed
    pub fn pulse(&self) -> f64 {
        self.pulse.progress()
    }

    pub fn color_fg(&self) -> Color {
        self.fg.blend(self.factory.colors_fg(), self.pulse())
    }

    pub fn color_bg1(&self) -> Color {
        self.bg1.blend(self.factory.colors_bg1(), self.pulse())
    }

    pub fn color_bg2(&self) -> Color {
        self.bg2.blend(self.factory.colors_bg2(), self.pulse())
    }

    pub fn factory(&self) -> &'a LevelFactory {
        self.factory
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn patterns(&self) -> &VecDeque<Pattern> {
        &self.patterns
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn cursor_pos(&self) -> f64 {
        self.cursor_pos
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn sides_tween(&self) -> f64 {
        self.sides_tween
    }

    pub fn last_sides(&self) -> usize {
        self.last_sides
    }

    pub fn current_sides(&self) -> usize {
        self.current_sides
    }

    /// Frames left in the side tween (0 when idle)
    pub fn delay_frame(&self) -> u32 {
        self.delay.remaining()
    }

    /// Frames into the current color pulse
    pub fn tween_frame(&self) -> u32 {
        self.pulse.elapsed()
    }

    /// Frames until the next rotation flip
    pub fn flip_frame(&self) -> u32 {
        self.flip.remaining()
    }

    /// (current, next) palette indices for foreground, background 1, background 2
    pub fn color_indices(&self) -> [(usize, usize); 3] {
        [
            (self.fg.index, self.fg.next),
            (self.bg1.index, self.bg1.next),
            (self.bg2.index, self.bg2.next),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Vertex;
    use crate::sim::factory::tests::test_factory;
    use crate::sim::pattern::Wall;
    use crate::sim::policy::Shuffle;

    const CURSOR: f64 = 100.0;

    /// Walls in every sector of a hexagon except `gap`
    fn ring_with_gap(distance: f64, gap: usize) -> Pattern {
        let walls = (0..6)
            .filter(|&s| s != gap)
            .map(|s| Wall::new(distance, 10.0, s))
            .collect();
        Pattern::new(walls, 6)
    }

    #[test]
    fn test_instantiate_fills_queue() {
        let factory = test_factory();
        let mut rng = Twist::new(1);
        let level = factory.instantiate(&mut rng, 300.0).unwrap();

        assert_eq!(level.patterns().len(), TOTAL_PATTERNS_AT_ONE_TIME);
        assert_eq!(level.current_sides(), 6);
        assert_eq!(level.last_sides(), 6);
        assert_eq!(level.multiplier(), 1.0);
        assert_eq!(level.flip_frame(), FLIP_FRAMES_MAX);
        assert!((level.patterns()[0].distance() - 300.0).abs() < 1e-9);

        let distances: Vec<f64> = level.patterns().iter().map(Pattern::distance).collect();
        assert!(distances.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_blocked_sector_and_gap() {
        let factory = test_factory();
        let mut rng = Twist::new(2);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.clear_patterns();
        level.patterns.push_back(ring_with_gap(95.0, 3));

        assert!(level.sector_blocked(0, CURSOR));
        assert!(!level.sector_blocked(3, CURSOR));

        level.cursor_pos = 30.0;
        assert_eq!(level.collision(CURSOR), Movement::Dead);

        level.cursor_pos = 210.0;
        assert_eq!(level.cursor_sector(), 3);
        assert_eq!(level.collision(CURSOR), Movement::CanMove);

        // Near the edge of the gap the neighbouring wall blocks movement
        level.cursor_pos = 238.0;
        assert_eq!(level.collision(CURSOR), Movement::CannotMoveLeft);
        level.cursor_pos = 182.0;
        assert_eq!(level.collision(CURSOR), Movement::CannotMoveRight);
    }

    #[test]
    fn test_far_patterns_ignored() {
        let factory = test_factory();
        let mut rng = Twist::new(3);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.clear_patterns();
        level.patterns.push_back(ring_with_gap(150.0, 3));
        level.cursor_pos = 30.0;
        assert_eq!(level.collision(CURSOR), Movement::CanMove);
    }

    #[test]
    fn test_clear_then_update_repopulates() {
        let factory = test_factory();
        let mut rng = Twist::new(4);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.clear_patterns();
        assert!(level.patterns().is_empty());

        let target = level.target_sides();
        level.update(&mut rng, target);
        assert_eq!(level.patterns().len(), TOTAL_PATTERNS_AT_ONE_TIME);
    }

    #[test]
    fn test_flip_once() {
        let factory = test_factory();
        let mut rng = Twist::new(5);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.flip = FrameTimer::new(1);

        level.update(&mut rng, 6);
        assert_eq!(level.multiplier(), -1.0);
        assert!((FLIP_FRAMES_MIN..=FLIP_FRAMES_MAX).contains(&level.flip_frame()));

        level.update(&mut rng, 6);
        assert_eq!(level.multiplier(), -1.0);
    }

    #[test]
    fn test_first_flip_after_max_frames() {
        let factory = test_factory();
        let mut rng = Twist::new(6);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        for _ in 0..FLIP_FRAMES_MAX - 1 {
            level.update(&mut rng, 6);
        }
        assert_eq!(level.multiplier(), 1.0);
        level.update(&mut rng, 6);
        assert_eq!(level.multiplier(), -1.0);
    }

    #[test]
    fn test_increase_multiplier_keeps_sign() {
        let factory = test_factory();
        let mut rng = Twist::new(7);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.multiplier = -1.0;
        for _ in 0..3 {
            level.increase_multiplier();
        }
        assert!((level.multiplier() + DIFFICULTY_MULTIPLIER.powi(3)).abs() < 1e-12);
    }

    #[test]
    fn test_side_tween() {
        let factory = test_factory();
        let mut rng = Twist::new(8);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();

        level.update(&mut rng, 4);
        assert_eq!(level.last_sides(), 6);
        assert_eq!(level.current_sides(), 4);
        assert_eq!(level.sides_tween(), 0.0);
        assert_eq!(level.delay_frame(), FRAMES_PER_CHANGE_SIDE);

        for _ in 0..FRAMES_PER_CHANGE_SIDE - 1 {
            level.update(&mut rng, 4);
            assert_ne!(level.last_sides(), level.current_sides());
            assert!((0.0..=1.0).contains(&level.sides_tween()));
        }
        let mid = level.interpolated_sides();
        assert!(mid > 4.0 && mid < 6.0);

        level.update(&mut rng, 4);
        assert_eq!(level.last_sides(), 4);
        assert_eq!(level.sides_tween(), 1.0);
        assert_eq!(level.interpolated_sides(), 4.0);
    }

    #[test]
    fn test_walls_hold_at_tween_start() {
        let factory = test_factory();
        let mut rng = Twist::new(9);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        let before = level.patterns()[0].distance();
        level.update(&mut rng, 4);
        assert_eq!(level.patterns()[0].distance(), before);
        level.update(&mut rng, 4);
        assert!(level.patterns()[0].distance() < before);
    }

    #[test]
    fn test_shuffle_policy_changes_sides() {
        let factory = test_factory();
        let mut rng = Twist::new(10);
        let arena = Arena::default();
        let mut level = factory
            .instantiate_with(&mut rng, arena, Box::new(Shuffle))
            .unwrap();
        level.update(&mut rng, 5);
        assert_ne!(level.current_sides(), 6);
        assert!(factory.supports_sides(level.current_sides()));
    }

    #[test]
    #[should_panic(expected = "no pattern authored for 9 sides")]
    fn test_unsupported_target_panics() {
        let factory = test_factory();
        let mut rng = Twist::new(11);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.update(&mut rng, 9);
    }

    #[test]
    fn test_rotation_wraps() {
        let factory = test_factory();
        let mut rng = Twist::new(12);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        for _ in 0..2000 {
            let target = level.target_sides();
            level.update(&mut rng, target);
            assert!((0.0..360.0).contains(&level.rotation()));
        }
    }

    #[test]
    fn test_cursor_wraps() {
        let factory = test_factory();
        let mut rng = Twist::new(13);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.cursor_pos = 3.0;
        level.right();
        assert!((level.cursor_pos() - 357.0).abs() < 1e-9);
        level.left();
        assert!((level.cursor_pos() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_and_clamp() {
        let factory = test_factory();
        let mut rng = Twist::new(14);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.multiplier = -2.0;
        level.rotate(10.0);
        assert!((level.rotation() - 340.0).abs() < 1e-9);
        level.rotation = 725.0;
        level.cursor_pos = -90.0;
        level.clamp();
        assert!((level.rotation() - 5.0).abs() < 1e-9);
        assert!((level.cursor_pos() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_pulse_rotates_indices() {
        let factory = test_factory();
        let mut rng = Twist::new(15);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        assert_eq!(level.color_indices(), [(0, 1), (0, 0), (0, 1)]);
        assert_eq!(level.color_fg(), factory.colors_fg()[0]);

        for _ in 0..factory.speed_pulse() - 1 {
            level.update(&mut rng, 6);
        }
        assert_eq!(level.tween_frame(), factory.speed_pulse() - 1);

        level.update(&mut rng, 6);
        assert_eq!(level.tween_frame(), 0);
        assert_eq!(level.color_indices(), [(1, 0), (0, 0), (1, 2)]);
    }

    #[test]
    fn test_patterns_retire_past_centre() {
        let factory = test_factory();
        let mut rng = Twist::new(16);
        let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
        level.clear_patterns();
        level.patterns.push_back(Pattern::new(vec![Wall::new(14.0, 12.0, 0)], 6));
        level.update(&mut rng, 6);
        // 14 + 12 - 2 = 24 reaches the centre polygon
        assert!(level.patterns().iter().all(|p| p.distance() >= 300.0));
        assert_eq!(level.patterns().len(), TOTAL_PATTERNS_AT_ONE_TIME);
    }

    #[test]
    fn test_draw_emits_triangles() {
        let factory = test_factory();
        let mut rng = Twist::new(17);
        let level = factory.instantiate(&mut rng, 300.0).unwrap();
        let mut vertices: Vec<Vertex> = Vec::new();
        level.draw(&mut vertices);

        let walls: usize = level.patterns().iter().map(|p| p.walls().len()).sum();
        let expected = 6 * 3 + walls * 6 + 2 * 6 * 3 + 3;
        assert_eq!(vertices.len(), expected);
        assert_eq!(vertices.len() % 3, 0);
    }
}
