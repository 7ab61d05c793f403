//! Actor state and its optional capabilities.
//!
//! Capabilities that only some actors have (health, spell power, a spellbook)
//! are plain `Option` fields, and tag-like capabilities are [`Markers`]. An
//! absent capability means the actor simply cannot take part in the mechanic
//! that reads it.

use std::collections::BTreeSet;

use bitflags::bitflags;

use super::{EntityId, FactionId, Item, Position};
use crate::action::{ActionRequest, OrderRequest};

bitflags! {
    /// Tag capabilities of an actor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Markers: u16 {
        /// Controlled by a human through the input path.
        const PLAYER    = 1 << 0;
        /// May issue orders that subordinates accept.
        const COMMANDER = 1 << 1;
        /// Currently taking part in a battle.
        const IN_BATTLE = 1 << 2;
        /// Under the Haste spell.
        const HASTED    = 1 << 3;
    }
}

/// Hit points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    pub hp: i32,
    pub max_hp: i32,
}

impl Health {
    pub const fn new(hp: i32, max_hp: i32) -> Self {
        Self { hp, max_hp }
    }

    /// `hp / max_hp`; zero for a degenerate maximum.
    pub fn fraction(self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        f64::from(self.hp) / f64::from(self.max_hp)
    }
}

/// Spell power points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellPower {
    pub pp: i32,
    pub max_pp: i32,
}

impl SpellPower {
    pub const fn new(pp: i32, max_pp: i32) -> Self {
        Self { pp, max_pp }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellKind {
    FrostBolt,
    Heal,
    Haste,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spell {
    pub kind: SpellKind,
    /// Spell power consumed per cast.
    pub power: i32,
    /// Maximum Chebyshev distance to the target.
    pub range: i32,
}

impl Spell {
    pub const fn new(kind: SpellKind, power: i32, range: i32) -> Self {
        Self { kind, power, range }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spellbook {
    pub spells: Vec<Spell>,
}

impl Spellbook {
    pub fn new(spells: Vec<Spell>) -> Self {
        Self { spells }
    }

    pub fn get(&self, kind: SpellKind) -> Option<&Spell> {
        self.spells.iter().find(|s| s.kind == kind)
    }
}

/// Who an actor considers an enemy or a friend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Memory {
    pub enemy_groups: BTreeSet<FactionId>,
    pub friend_groups: BTreeSet<FactionId>,
    pub enemies: BTreeSet<EntityId>,
}

impl Memory {
    pub fn add_enemy_group(&mut self, faction: FactionId) {
        self.friend_groups.remove(&faction);
        self.enemy_groups.insert(faction);
    }

    pub fn add_friend_group(&mut self, faction: FactionId) {
        self.enemy_groups.remove(&faction);
        self.friend_groups.insert(faction);
    }

    pub fn add_enemy(&mut self, id: EntityId) {
        self.enemies.insert(id);
    }
}

/// Complete state of one actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub faction: FactionId,
    pub markers: Markers,

    // === Optional capabilities ===
    pub health: Option<Health>,
    pub spell_power: Option<SpellPower>,
    pub spellbook: Option<Spellbook>,

    pub inventory: Vec<Item>,
    pub gold: u32,
    pub memory: Memory,

    // === Posted requests, consumed by the resolver / input path ===
    pub requests: Vec<ActionRequest>,
    pub order_requests: Vec<OrderRequest>,
}

impl ActorState {
    pub fn new(id: EntityId, name: impl Into<String>, position: Position, faction: FactionId) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            faction,
            markers: Markers::empty(),
            health: None,
            spell_power: None,
            spellbook: None,
            inventory: Vec::new(),
            gold: 0,
            memory: Memory::default(),
            requests: Vec::new(),
            order_requests: Vec::new(),
        }
    }

    pub fn with_health(mut self, hp: i32, max_hp: i32) -> Self {
        self.health = Some(Health::new(hp, max_hp));
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers.insert(markers);
        self
    }

    pub fn with_spell_power(mut self, pp: i32, max_pp: i32) -> Self {
        self.spell_power = Some(SpellPower::new(pp, max_pp));
        self
    }

    pub fn with_spellbook(mut self, spells: Vec<Spell>) -> Self {
        self.spellbook = Some(Spellbook::new(spells));
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.inventory.push(item);
        self
    }

    /// Actors without a health capability are indestructible.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.is_none_or(|h| h.hp > 0)
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.markers.contains(Markers::PLAYER)
    }

    #[inline]
    pub fn has(&self, markers: Markers) -> bool {
        self.markers.contains(markers)
    }

    /// Spell power available for casting; zero without the capability.
    pub fn power(&self) -> i32 {
        self.spell_power.map_or(0, |p| p.pp)
    }

    pub fn post(&mut self, request: ActionRequest) {
        self.requests.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_without_health_is_alive() {
        let actor = ActorState::new(EntityId(3), "statue", Position::ORIGIN, FactionId(0));
        assert!(actor.is_alive());

        let dead = actor.with_health(0, 10);
        assert!(!dead.is_alive());
    }

    #[test]
    fn memory_groups_are_exclusive() {
        let mut memory = Memory::default();
        memory.add_friend_group(FactionId(2));
        memory.add_enemy_group(FactionId(2));

        assert!(memory.enemy_groups.contains(&FactionId(2)));
        assert!(!memory.friend_groups.contains(&FactionId(2)));
    }
}
