//! World state: identifiers, actors, items and the world container.

mod actor;
mod common;
mod item;
mod world;

pub use actor::{
    ActorState, Health, Markers, Memory, Spell, SpellKind, SpellPower, Spellbook,
};
pub use common::{EntityId, FactionId, Position};
pub use item::{Item, ItemId, ItemTags};
pub use world::World;
