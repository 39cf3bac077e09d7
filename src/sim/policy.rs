//! Spawn policies
//!
//! How a level chooses its next side count and its next pattern factory is
//! content design rather than simulation, so it is injected. Policies draw
//! only from the `Twist` they are handed.

use super::pattern::PatternFactory;
use super::twist::Twist;

pub trait SpawnPolicy: std::fmt::Debug {
    /// Side count to tween toward, given the caller's `target`.
    ///
    /// Only called when `target != current`. The result must be one of
    /// `supported` and must differ from `current`.
    fn next_sides(
        &mut self,
        rng: &mut Twist,
        current: usize,
        target: usize,
        supported: &[usize],
    ) -> usize;

    /// Index into `factories` for the next pattern. `factories` is non-empty.
    fn next_pattern(&mut self, rng: &mut Twist, factories: &[PatternFactory], sides: usize)
    -> usize;
}

/// Tween straight to the caller's target; draw patterns uniformly from every
/// factory, so content authored for other side counts reshapes the playfield.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowTarget;

impl SpawnPolicy for FollowTarget {
    fn next_sides(
        &mut self,
        _rng: &mut Twist,
        _current: usize,
        target: usize,
        _supported: &[usize],
    ) -> usize {
        target
    }

    fn next_pattern(
        &mut self,
        rng: &mut Twist,
        factories: &[PatternFactory],
        _sides: usize,
    ) -> usize {
        uniform(rng, factories)
    }
}

/// Ignore the target's exact value and jump to any other supported side
/// count; patterns are drawn the same way as `FollowTarget`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shuffle;

impl SpawnPolicy for Shuffle {
    fn next_sides(
        &mut self,
        rng: &mut Twist,
        current: usize,
        target: usize,
        supported: &[usize],
    ) -> usize {
        let choices: Vec<usize> = supported.iter().copied().filter(|&s| s != current).collect();
        if choices.is_empty() {
            return target;
        }
        choices[rng.index(choices.len())]
    }

    fn next_pattern(
        &mut self,
        rng: &mut Twist,
        factories: &[PatternFactory],
        _sides: usize,
    ) -> usize {
        uniform(rng, factories)
    }
}

fn uniform(rng: &mut Twist, factories: &[PatternFactory]) -> usize {
    rng.index(factories.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pattern::WallFactory;

    fn factory(name: &str, min: usize, max: usize) -> PatternFactory {
        PatternFactory {
            name: name.into(),
            min_sides: min,
            max_sides: max,
            walls: vec![WallFactory {
                distance: 0.0,
                height: 10.0,
                side: 0,
            }],
        }
    }

    #[test]
    fn test_follow_target() {
        let mut rng = Twist::new(3);
        assert_eq!(FollowTarget.next_sides(&mut rng, 6, 4, &[4, 5, 6]), 4);
    }

    #[test]
    fn test_shuffle_never_repeats() {
        let mut rng = Twist::new(3);
        let mut policy = Shuffle;
        for _ in 0..100 {
            let next = policy.next_sides(&mut rng, 5, 4, &[4, 5, 6]);
            assert_ne!(next, 5);
            assert!([4, 6].contains(&next));
        }
    }

    #[test]
    fn test_pattern_draws_every_factory() {
        let factories = vec![factory("square", 4, 4), factory("hex", 6, 6)];
        let mut rng = Twist::new(11);
        let mut seen = [false; 2];
        for _ in 0..50 {
            seen[FollowTarget.next_pattern(&mut rng, &factories, 6)] = true;
        }
        // The square is drawn even while the playfield is a hexagon
        assert_eq!(seen, [true, true]);
    }
}
