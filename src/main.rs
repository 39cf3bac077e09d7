//! Haxagon headless runner
//!
//! Plays a level with a simple autopilot, the way the attract mode would,
//! and reports how long it survived.
//!
//! Usage: `haxagon [settings.json] [scores.db]`

use std::error::Error;

use haxagon::consts::{FRAMES_PER_SECOND, GAME_OVER_ROT_SPEED};
use haxagon::highscores::{self, format_time};
use haxagon::renderer::Vertex;
use haxagon::sim::{FollowTarget, Level, TickInput, Twist, tick};
use haxagon::{LevelCatalog, Settings};

/// Give up after this long even if the autopilot is still alive
const MAX_FRAMES: u32 = 5 * 60 * FRAMES_PER_SECOND;
/// Frames of game over spin before the run is written up
const GAME_OVER_FRAMES: u32 = 60;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::from_json(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    let scores_path = args.next();

    let catalog = LevelCatalog::builtin()?;
    if let Some(path) = &scores_path {
        highscores::load(&catalog, path)?;
    }

    let factory = catalog.get(&settings.level)?;
    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });
    let mut rng = Twist::new(seed);
    let arena = settings.arena;
    let mut level = factory.instantiate_with(&mut rng, arena, Box::new(FollowTarget))?;

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut frames = 0;
    while frames < MAX_FRAMES {
        let input = autopilot(&level, arena.cursor_distance);
        let movement = tick(&mut level, &mut rng, input, arena.cursor_distance);
        if movement.is_dead() {
            break;
        }

        frames += 1;
        let step = settings.frames_per_difficulty_step;
        if step > 0 && frames % step == 0 {
            level.increase_multiplier();
        }

        vertices.clear();
        level.draw(&mut vertices);
    }

    // Game over: spin the playfield down and expand the centre polygon
    level.clear_patterns();
    let mut offset = 1.0f32;
    for _ in 0..GAME_OVER_FRAMES {
        level.rotate(GAME_OVER_ROT_SPEED);
        level.clamp();
        offset *= 1.01;
        vertices.clear();
        level.draw_scaled(&mut vertices, 1.0, offset);
    }

    let record = factory.set_high_score(frames);
    log::info!(
        "{} [{}]: survived {} (best {}){}",
        factory.name(),
        factory.difficulty(),
        format_time(frames),
        format_time(factory.high_score()),
        if record { " NEW RECORD!" } else { "" }
    );

    if let Some(path) = &scores_path {
        highscores::save(&catalog, path)?;
    }
    Ok(())
}

/// Steer toward the nearest sector the next wall leaves open
fn autopilot(level: &Level<'_>, cursor_distance: f64) -> TickInput {
    let Some(ahead) = level
        .patterns()
        .iter()
        .find(|p| p.furthest_distance() >= cursor_distance)
    else {
        return TickInput::default();
    };
    let reach = ahead.distance().max(cursor_distance) + 1.0;

    let sides = level.current_sides();
    let width = 360.0 / level.interpolated_sides();
    let cursor = level.cursor_pos();

    let best = (0..sides)
        .filter(|&s| !level.sector_blocked(s, reach))
        .map(|s| {
            let centre = (s as f64 + 0.5) * width;
            // Signed shortest turn from the cursor, counter-clockwise positive
            (centre - cursor + 540.0).rem_euclid(360.0) - 180.0
        })
        .min_by(|a, b| a.abs().total_cmp(&b.abs()));

    let step = level.factory().speed_cursor();
    match best {
        Some(delta) if delta > step / 2.0 => TickInput {
            left: true,
            right: false,
        },
        Some(delta) if delta < -step / 2.0 => TickInput {
            left: false,
            right: true,
        },
        _ => TickInput::default(),
    }
}
