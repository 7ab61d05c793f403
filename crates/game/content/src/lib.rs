//! Data-driven content loaders.
//!
//! This crate reads the files a skirmish is built from:
//! - Game configuration (TOML)
//! - Levels as ASCII rows (RON)
//! - Scenarios: a level plus its actors, loot and faction hostilities (RON)
//!
//! All loaders use game-core types directly with serde for RON/TOML deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActorSpec, ConfigLoader, ItemSpec, LevelLoader, LevelSpec, LoadResult, Scenario,
    ScenarioLoader, ScenarioSpec,
};
