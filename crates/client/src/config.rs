//! Skirmish run configuration.
use std::env;
use std::path::PathBuf;

/// Settings of one skirmish run.
#[derive(Clone, Debug)]
pub struct SkirmishConfig {
    pub rounds: u32,
    pub seed: u64,
    /// Game configuration TOML; built-in tuning when absent.
    pub config_path: Option<PathBuf>,
    /// Scenario RON; the built-in town skirmish when absent.
    pub level_path: Option<PathBuf>,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            rounds: 200,
            seed: 7,
            config_path: None,
            level_path: None,
        }
    }
}

impl SkirmishConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SKIRMISH_ROUNDS` - Number of rounds to play (default: 200)
    /// - `SKIRMISH_SEED` - World random seed (default: 7)
    /// - `SKIRMISH_CONFIG` - Path to a game configuration TOML
    /// - `SKIRMISH_LEVEL` - Path to a scenario RON
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(rounds) = read_env::<u32>("SKIRMISH_ROUNDS") {
            config.rounds = rounds;
        }
        if let Some(seed) = read_env::<u64>("SKIRMISH_SEED") {
            config.seed = seed;
        }
        config.config_path = read_env::<PathBuf>("SKIRMISH_CONFIG");
        config.level_path = read_env::<PathBuf>("SKIRMISH_LEVEL");

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
