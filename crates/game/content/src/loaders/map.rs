//! Level loader.
//!
//! Levels are stored as ASCII rows using the [`Level::from_ascii`] legend.
//! Actors and loot are placed separately by scenario files.

use std::path::Path;

use game_core::{Level, Position};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Level data structure for RON files.
///
/// ```ron
/// (
///     rows: [
///         ".####.....",
///         ".#,,+..$..",
///         ".####.....",
///     ],
///     abandoned_shops: [(x: 7, y: 1)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub rows: Vec<String>,
    /// Shop cells that no longer trade.
    #[serde(default)]
    pub abandoned_shops: Vec<Position>,
}

impl LevelSpec {
    pub fn build(&self) -> LoadResult<Level> {
        let mut level = Level::from_ascii(&self.rows)
            .map_err(|e| anyhow::anyhow!("Invalid level layout: {}", e))?;

        for &at in &self.abandoned_shops {
            let shop = level
                .cell_mut(at)
                .and_then(|cell| cell.shop.as_mut())
                .ok_or_else(|| anyhow::anyhow!("No shop to abandon at {}", at))?;
            shop.abandoned = true;
        }
        Ok(level)
    }
}

/// Loader for levels from RON files.
pub struct LevelLoader;

impl LevelLoader {
    pub fn load(path: &Path) -> LoadResult<Level> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Level> {
        let spec: LevelSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse level RON: {}", e))?;
        spec.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abandoned_shops_stop_trading() {
        let level = LevelLoader::parse(
            r#"(rows: ["..$.$"], abandoned_shops: [(x: 4, y: 0)])"#,
        )
        .unwrap();
        assert!(level.cell(Position::new(2, 0)).unwrap().shop().unwrap().is_active());
        assert!(!level.cell(Position::new(4, 0)).unwrap().shop().unwrap().is_active());
    }

    #[test]
    fn abandoning_a_plain_floor_is_an_error() {
        let err = LevelLoader::parse(r#"(rows: ["..."], abandoned_shops: [(x: 1, y: 0)])"#)
            .unwrap_err();
        assert!(err.to_string().contains("No shop"));
    }

    #[test]
    fn bad_glyphs_are_reported() {
        let err = LevelLoader::parse(r#"(rows: [".?."])"#).unwrap_err();
        assert!(err.to_string().contains("Invalid level layout"));
    }
}
