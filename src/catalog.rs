//! Level catalog
//!
//! Owns every `LevelFactory` for the process lifetime. Levels borrow from it
//! while they run.

use serde::Deserialize;

use crate::highscores::ScoreRecord;
use crate::sim::{LevelError, LevelFactory};

const BUILTIN_LEVELS: &str = include_str!("../levels/default.json");

#[derive(Deserialize)]
struct CatalogFile {
    levels: Vec<LevelFactory>,
}

#[derive(Debug)]
pub struct LevelCatalog {
    levels: Vec<LevelFactory>,
}

impl LevelCatalog {
    /// Parse and validate a catalog document (`{"levels": [...]}`)
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        for level in &file.levels {
            level.validate()?;
        }
        log::info!("Loaded {} levels", file.levels.len());
        Ok(Self {
            levels: file.levels,
        })
    }

    /// Levels shipped with the crate
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn levels(&self) -> &[LevelFactory] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, name: &str) -> Result<&LevelFactory, LevelError> {
        self.levels
            .iter()
            .find(|l| l.name() == name)
            .ok_or_else(|| LevelError::UnknownLevel(name.to_string()))
    }

    /// Restore stored high scores. Records match a level on all four identity
    /// strings; unmatched records are skipped. Returns how many matched.
    pub fn apply_scores(&self, records: &[ScoreRecord]) -> usize {
        let mut matched = 0;
        for record in records {
            match self.levels.iter().find(|l| record.matches(l)) {
                Some(level) => {
                    level.set_high_score(record.high_score);
                    matched += 1;
                }
                None => log::warn!("No level for stored score {:?}", record.name),
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert!(catalog.len() >= 2);
        let hexagon = catalog.get("HEXAGON").unwrap();
        assert!(hexagon.supports_sides(6));
        assert_eq!(hexagon.high_score(), 0);
    }

    #[test]
    fn test_unknown_level() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.get("NOPE"),
            Err(LevelError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_apply_scores() {
        let catalog = LevelCatalog::builtin().unwrap();
        let level = catalog.get("HEXAGONER").unwrap();
        let records = vec![
            ScoreRecord::for_level(level, 1234),
            ScoreRecord {
                name: "GONE".into(),
                difficulty: "EASY".into(),
                mode: "NORMAL".into(),
                creator: "NOBODY".into(),
                high_score: 5,
            },
        ];
        assert_eq!(catalog.apply_scores(&records), 1);
        assert_eq!(level.high_score(), 1234);
        assert_eq!(catalog.get("HEXAGON").unwrap().high_score(), 0);
    }

    #[test]
    fn test_builtin_levels_change_shape() {
        use std::collections::BTreeSet;

        use crate::sim::{TickInput, Twist, tick};

        // Cursor ring far outside the spawn ring, so nothing ends the run
        const UNREACHABLE: f64 = 10_000.0;

        let catalog = LevelCatalog::builtin().unwrap();
        for factory in catalog.levels() {
            for seed in 0..5 {
                let mut rng = Twist::new(seed);
                let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
                let mut seen = BTreeSet::new();
                for _ in 0..3000 {
                    tick(&mut level, &mut rng, TickInput::default(), UNREACHABLE);
                    seen.insert(level.current_sides());
                }
                assert!(
                    seen.len() > 1,
                    "{} (seed {}) stayed at {:?} sides",
                    factory.name(),
                    seed,
                    seen
                );
            }
        }
    }

    #[test]
    fn test_builtin_levels_play() {
        use crate::sim::Twist;

        let catalog = LevelCatalog::builtin().unwrap();
        for factory in catalog.levels() {
            let mut rng = Twist::new(2024);
            let mut level = factory.instantiate(&mut rng, 300.0).unwrap();
            for _ in 0..3000 {
                let target = level.target_sides();
                level.update(&mut rng, target);
                assert!(factory.supports_sides(level.current_sides()));
            }
        }
    }
}
