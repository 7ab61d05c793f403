//! Content loaders for reading game data from files.
//!
//! Every loader offers `load` for a path and `parse` for file contents
//! already in memory.

pub mod config;
pub mod map;
pub mod scenario;

pub use config::ConfigLoader;
pub use map::{LevelLoader, LevelSpec};
pub use scenario::{ActorSpec, ItemSpec, Scenario, ScenarioLoader, ScenarioSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
