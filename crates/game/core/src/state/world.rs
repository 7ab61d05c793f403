//! The world: level, actors and the shared random source.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{ActorState, EntityId, FactionId, Position};
use crate::config::GameConfig;
use crate::env::Level;
use crate::error::WorldError;

/// Mutable world state shared by every actor.
///
/// Actors are kept in id order so iteration, and therefore every decision
/// derived from it, is reproducible for a given seed.
#[derive(Debug)]
pub struct World {
    level: Level,
    actors: BTreeMap<EntityId, ActorState>,
    config: GameConfig,
    rng: StdRng,
    turn: u64,
}

impl World {
    pub fn new(level: Level, config: GameConfig, seed: u64) -> Self {
        Self {
            level,
            actors: BTreeMap::new(),
            config,
            rng: StdRng::seed_from_u64(seed),
            turn: 0,
        }
    }

    pub fn spawn(&mut self, actor: ActorState) -> Result<(), WorldError> {
        if !self.level.contains(actor.position) {
            return Err(WorldError::OutOfBounds(actor.position));
        }
        if self.actors.contains_key(&actor.id) {
            return Err(WorldError::DuplicateActor(actor.id));
        }
        self.actors.insert(actor.id, actor);
        Ok(())
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    pub fn actor(&self, id: EntityId) -> Option<&ActorState> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: EntityId) -> Option<&mut ActorState> {
        self.actors.get_mut(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.values()
    }

    pub fn actor_ids(&self) -> Vec<EntityId> {
        self.actors.keys().copied().collect()
    }

    /// Living actor standing at `position`.
    pub fn actor_at(&self, position: Position) -> Option<&ActorState> {
        self.actors
            .values()
            .find(|a| a.position == position && a.is_alive())
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.actor(id).is_some_and(ActorState::is_alive)
    }

    /// True when `position` is passable and no living actor stands on it.
    pub fn is_free(&self, position: Position) -> bool {
        self.level.is_passable(position) && self.actor_at(position).is_none()
    }

    // ========================================================================
    // Perception
    // ========================================================================

    /// Cells inside the perception square of `id`, row-major.
    ///
    /// Empty for unknown or dead actors.
    pub fn seen_cells(&self, id: EntityId) -> Vec<Position> {
        let Some(actor) = self.actor(id).filter(|a| a.is_alive()) else {
            return Vec::new();
        };
        let r = self.config.perception_radius;
        let center = actor.position;

        (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| center.offset(dx, dy)))
            .filter(|p| self.level.contains(*p))
            .collect()
    }

    pub fn can_see(&self, viewer: EntityId, position: Position) -> bool {
        self.actor(viewer)
            .filter(|a| a.is_alive())
            .is_some_and(|a| a.position.distance(position) <= self.config.perception_radius)
            && self.level.contains(position)
    }

    /// Living enemies of `id` inside its perception square, in cell order.
    pub fn seen_enemies(&self, id: EntityId) -> Vec<EntityId> {
        self.seen_actors(id, |world, other| world.is_enemy(id, other))
    }

    /// Living friends of `id` inside its perception square, in cell order.
    pub fn seen_friends(&self, id: EntityId) -> Vec<EntityId> {
        self.seen_actors(id, |world, other| world.is_friend(id, other))
    }

    fn seen_actors(&self, id: EntityId, keep: impl Fn(&World, EntityId) -> bool) -> Vec<EntityId> {
        self.seen_cells(id)
            .into_iter()
            .filter_map(|p| self.actor_at(p))
            .map(|a| a.id)
            .filter(|&other| other != id && keep(self, other))
            .collect()
    }

    /// First cell of `cells` holding a living enemy of `id`.
    pub fn find_enemy_cell(&self, id: EntityId, cells: &[Position]) -> Option<Position> {
        cells.iter().copied().find(|&p| {
            self.actor_at(p)
                .is_some_and(|other| other.id != id && self.is_enemy(id, other.id))
        })
    }

    // ========================================================================
    // Memory
    // ========================================================================

    pub fn is_enemy(&self, id: EntityId, other: EntityId) -> bool {
        let (Some(me), Some(them)) = (self.actor(id), self.actor(other)) else {
            return false;
        };
        id != other
            && (me.memory.enemies.contains(&other)
                || me.memory.enemy_groups.contains(&them.faction))
    }

    pub fn is_friend(&self, id: EntityId, other: EntityId) -> bool {
        let (Some(me), Some(them)) = (self.actor(id), self.actor(other)) else {
            return false;
        };
        id != other
            && !self.is_enemy(id, other)
            && (me.faction == them.faction || me.memory.friend_groups.contains(&them.faction))
    }

    pub fn add_enemy_group(&mut self, id: EntityId, faction: FactionId) -> Result<(), WorldError> {
        self.actor_mut(id)
            .ok_or(WorldError::UnknownActor(id))?
            .memory
            .add_enemy_group(faction);
        Ok(())
    }

    pub fn add_friend_group(&mut self, id: EntityId, faction: FactionId) -> Result<(), WorldError> {
        self.actor_mut(id)
            .ok_or(WorldError::UnknownActor(id))?
            .memory
            .add_friend_group(faction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let level = Level::from_ascii(&[".........."; 10]).unwrap();
        let config = GameConfig {
            perception_radius: 3,
            ..GameConfig::default()
        };
        World::new(level, config, 7)
    }

    #[test]
    fn seen_cells_are_clipped_to_level() {
        let mut world = world();
        world
            .spawn(ActorState::new(EntityId(1), "a", Position::new(0, 0), FactionId(1)))
            .unwrap();

        assert_eq!(world.seen_cells(EntityId(1)).len(), 16);
    }

    #[test]
    fn enemies_follow_memory_groups() {
        let mut world = world();
        world
            .spawn(ActorState::new(EntityId(1), "a", Position::new(1, 1), FactionId(1)))
            .unwrap();
        world
            .spawn(ActorState::new(EntityId(2), "b", Position::new(2, 2), FactionId(2)))
            .unwrap();
        world
            .spawn(ActorState::new(EntityId(3), "c", Position::new(3, 1), FactionId(1)))
            .unwrap();

        assert!(world.seen_enemies(EntityId(1)).is_empty());
        world.add_enemy_group(EntityId(1), FactionId(2)).unwrap();

        assert_eq!(world.seen_enemies(EntityId(1)), vec![EntityId(2)]);
        assert_eq!(world.seen_friends(EntityId(1)), vec![EntityId(3)]);
        assert_eq!(
            world.find_enemy_cell(EntityId(1), &world.seen_cells(EntityId(1))),
            Some(Position::new(2, 2))
        );
    }

    #[test]
    fn duplicate_spawn_is_rejected() {
        let mut world = world();
        let actor = ActorState::new(EntityId(1), "a", Position::new(1, 1), FactionId(1));
        world.spawn(actor.clone()).unwrap();
        assert_eq!(world.spawn(actor), Err(WorldError::DuplicateActor(EntityId(1))));
    }
}
