//! Game configuration loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
///
/// Every field has a default, so a file only lists what it overrides:
///
/// ```toml
/// perception_radius = 8
///
/// [ai.battle]
/// order_cooldown = 20
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &GameConfig) -> LoadResult<()> {
        let thief = &config.ai.thief;
        if thief.search_time_min > thief.search_time_max {
            anyhow::bail!(
                "thief search_time_min ({}) exceeds search_time_max ({})",
                thief.search_time_min,
                thief.search_time_max
            );
        }
        let basic = &config.ai.basic;
        if basic.attack_min > basic.attack_max {
            anyhow::bail!(
                "attack_min ({}) exceeds attack_max ({})",
                basic.attack_min,
                basic.attack_max
            );
        }
        if config.perception_radius < 0 {
            anyhow::bail!("perception_radius must not be negative");
        }
        Ok(())
    }
}
