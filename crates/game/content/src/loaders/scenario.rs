//! Scenario loader.
//!
//! A scenario is a level plus everything placed on it: actors with their
//! capabilities and brain roles, loose loot and faction hostilities.
//! Brain roles are kept as names; the driver maps them onto its brains.

use std::path::Path;

use game_core::{
    ActorState, EntityId, FactionId, GameConfig, Item, ItemId, Markers, Position, Spell, World,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LevelSpec, LoadResult, read_file};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: u32,
    pub name: String,
    pub value: u32,
    /// Cell of a loose item; ignored for carried items.
    #[serde(default)]
    pub at: Option<Position>,
}

impl ItemSpec {
    fn item(&self) -> Item {
        Item::new(ItemId(self.id), self.name.clone(), self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    pub id: u32,
    pub name: String,
    pub faction: u16,
    pub at: Position,
    /// Starting and maximum hit points; indestructible when absent.
    #[serde(default)]
    pub hp: Option<i32>,
    /// Starting and maximum spell power.
    #[serde(default)]
    pub power: Option<i32>,
    #[serde(default)]
    pub spells: Vec<Spell>,
    #[serde(default)]
    pub markers: Markers,
    /// Brain role name, `None` for actors driven from outside.
    #[serde(default)]
    pub brain: Option<String>,
    #[serde(default)]
    pub inventory: Vec<ItemSpec>,
}

impl ActorSpec {
    pub fn actor(&self) -> ActorState {
        let id = EntityId(self.id);
        let mut actor = ActorState::new(id, self.name.clone(), self.at, FactionId(self.faction))
            .with_markers(self.markers);
        if let Some(hp) = self.hp {
            actor = actor.with_health(hp, hp);
        }
        if let Some(pp) = self.power {
            actor = actor.with_spell_power(pp, pp);
        }
        if !self.spells.is_empty() {
            actor = actor.with_spellbook(self.spells.clone());
        }
        for item in &self.inventory {
            actor = actor.with_item(item.item().with_owner(id));
        }
        actor
    }
}

/// Scenario structure for RON files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub level: LevelSpec,
    /// Pairs of factions that treat each other as enemies.
    #[serde(default)]
    pub hostilities: Vec<(u16, u16)>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    pub actors: Vec<ActorSpec>,
}

/// A populated world and the brain role of each brain-driven actor.
#[derive(Debug)]
pub struct Scenario {
    pub world: World,
    pub brains: Vec<(EntityId, String)>,
}

impl ScenarioSpec {
    pub fn build(&self, config: GameConfig, seed: u64) -> LoadResult<Scenario> {
        let level = self.level.build()?;
        let mut world = World::new(level, config, seed);

        for spec in &self.items {
            let at = spec
                .at
                .ok_or_else(|| anyhow::anyhow!("Loose item '{}' has no position", spec.name))?;
            world
                .level_mut()
                .add_item(at, spec.item())
                .map_err(|e| anyhow::anyhow!("Failed to place item '{}': {}", spec.name, e))?;
        }

        for spec in &self.actors {
            world
                .spawn(spec.actor())
                .map_err(|e| anyhow::anyhow!("Failed to place actor '{}': {}", spec.name, e))?;
        }

        for &(a, b) in &self.hostilities {
            for id in world.actor_ids() {
                let Some(faction) = world.actor(id).map(|actor| actor.faction) else {
                    continue;
                };
                let enemy = if faction == FactionId(a) {
                    FactionId(b)
                } else if faction == FactionId(b) {
                    FactionId(a)
                } else {
                    continue;
                };
                world
                    .add_enemy_group(id, enemy)
                    .map_err(|e| anyhow::anyhow!("Failed to set hostilities: {}", e))?;
            }
        }

        let brains = self
            .actors
            .iter()
            .filter_map(|a| a.brain.clone().map(|role| (EntityId(a.id), role)))
            .collect();
        Ok(Scenario { world, brains })
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ScenarioSpec> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::SpellKind;

    const DUEL: &str = r#"
        (
            level: (rows: ["......", "..$..."]),
            hostilities: [(1, 2)],
            items: [(id: 7, name: "purse", value: 30, at: Some((x: 5, y: 0)))],
            actors: [
                (
                    id: 1, name: "mage", faction: 1, at: (x: 0, y: 0),
                    hp: Some(8), power: Some(6),
                    spells: [(kind: FrostBolt, power: 3, range: 5)],
                    markers: ("COMMANDER | IN_BATTLE"),
                    brain: Some("Spellcaster"),
                ),
                (id: 2, name: "brute", faction: 2, at: (x: 4, y: 1), hp: Some(12), brain: Some("Basic")),
                (id: 3, name: "hero", faction: 1, at: (x: 1, y: 1), markers: ("PLAYER")),
            ],
        )
    "#;

    #[test]
    fn scenario_places_actors_loot_and_hostilities() {
        let scenario = ScenarioLoader::parse(DUEL)
            .unwrap()
            .build(GameConfig::default(), 1)
            .unwrap();
        let world = &scenario.world;

        let mage = world.actor(EntityId(1)).unwrap();
        assert!(mage.has(Markers::COMMANDER | Markers::IN_BATTLE));
        assert_eq!(mage.power(), 6);
        assert!(mage.spellbook.as_ref().unwrap().get(SpellKind::FrostBolt).is_some());

        assert!(world.is_enemy(EntityId(1), EntityId(2)));
        assert!(world.is_enemy(EntityId(2), EntityId(3)));
        assert!(!world.is_enemy(EntityId(1), EntityId(3)));
        assert!(world.level().cell(Position::new(5, 0)).unwrap().has_items());

        assert_eq!(
            scenario.brains,
            vec![
                (EntityId(1), "Spellcaster".to_string()),
                (EntityId(2), "Basic".to_string())
            ]
        );
    }

    #[test]
    fn actors_outside_the_level_are_rejected() {
        let content = r#"(level: (rows: ["..."]), actors: [(id: 1, name: "lost", faction: 1, at: (x: 9, y: 9))])"#;
        let err = ScenarioLoader::parse(content)
            .unwrap()
            .build(GameConfig::default(), 1)
            .unwrap_err();
        assert!(err.to_string().contains("lost"));
    }
}
