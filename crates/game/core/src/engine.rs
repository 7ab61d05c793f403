//! Action request resolver.
//!
//! [`resolve_requests`] is the authoritative reducer for requests brains post
//! on actors. It drains the acting actor's request queue, validates each
//! request against the current world and applies it. Rejected requests are
//! reported as outcomes rather than errors: a blocked step is a normal part
//! of a turn.

use crate::action::{ActionRequest, Transaction, TransactionKind};
use crate::error::WorldError;
use crate::state::{EntityId, ItemId, ItemTags, Markers, Position, SpellKind, World};

/// Damage dealt by a frost bolt.
pub const FROST_BOLT_DAMAGE: i32 = 5;

/// Result of applying one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Moved { actor: EntityId, from: Position, to: Position },
    Blocked { actor: EntityId, to: Position },
    Hit { actor: EntityId, target: EntityId, damage: i32, killed: bool },
    Missed { actor: EntityId, target: EntityId },
    Cast { actor: EntityId, spell: SpellKind, target: EntityId },
    Fizzled { actor: EntityId, spell: SpellKind },
    PickedUp { actor: EntityId, items: usize },
    Traded { actor: EntityId, kind: TransactionKind, item: ItemId, price: u32 },
    Refused { actor: EntityId, kind: TransactionKind, item: ItemId },
    Waited { actor: EntityId },
}

/// Applies and clears every request posted on `actor`.
pub fn resolve_requests(world: &mut World, actor: EntityId) -> Result<Vec<Outcome>, WorldError> {
    let requests = std::mem::take(
        &mut world
            .actor_mut(actor)
            .ok_or(WorldError::UnknownActor(actor))?
            .requests,
    );

    let mut outcomes = Vec::with_capacity(requests.len());
    for request in requests {
        if !world.is_alive(actor) {
            break;
        }
        let outcome = match request {
            ActionRequest::Move { to } => apply_move(world, actor, to),
            ActionRequest::Attack { target } => apply_attack(world, actor, target),
            ActionRequest::CastSpell { spell, target } => apply_spell(world, actor, spell, target),
            ActionRequest::Pickup { at } => apply_pickup(world, actor, at),
            ActionRequest::Transaction(tx) => apply_transaction(world, actor, tx),
            ActionRequest::Wait => Outcome::Waited { actor },
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn position_of(world: &World, actor: EntityId) -> Position {
    world.actor(actor).map(|a| a.position).unwrap_or_default()
}

fn apply_move(world: &mut World, actor: EntityId, to: Position) -> Outcome {
    let from = position_of(world, actor);
    if !from.is_adjacent(to) || !world.is_free(to) {
        return Outcome::Blocked { actor, to };
    }
    if let Some(state) = world.actor_mut(actor) {
        state.position = to;
    }
    Outcome::Moved { actor, from, to }
}

fn apply_attack(world: &mut World, actor: EntityId, target: EntityId) -> Outcome {
    let from = position_of(world, actor);
    let damage = world.config().melee_damage;

    let Some(victim) = world.actor_mut(target).filter(|t| t.is_alive()) else {
        return Outcome::Missed { actor, target };
    };
    if !from.is_adjacent(victim.position) {
        return Outcome::Missed { actor, target };
    }
    let Some(health) = victim.health.as_mut() else {
        return Outcome::Hit { actor, target, damage: 0, killed: false };
    };
    health.hp -= damage;
    Outcome::Hit { actor, target, damage, killed: health.hp <= 0 }
}

fn apply_spell(world: &mut World, actor: EntityId, spell: SpellKind, target: EntityId) -> Outcome {
    let Some(caster) = world.actor(actor) else {
        return Outcome::Fizzled { actor, spell };
    };
    let Some(known) = caster.spellbook.as_ref().and_then(|b| b.get(spell)).copied() else {
        return Outcome::Fizzled { actor, spell };
    };
    let in_range = world
        .actor(target)
        .filter(|t| t.is_alive())
        .is_some_and(|t| t.position.distance(caster.position) <= known.range);
    if caster.power() < known.power || !in_range {
        return Outcome::Fizzled { actor, spell };
    }

    if let Some(power) = world.actor_mut(actor).and_then(|c| c.spell_power.as_mut()) {
        power.pp -= known.power;
    }
    if let Some(victim) = world.actor_mut(target) {
        match spell {
            SpellKind::FrostBolt => {
                if let Some(health) = victim.health.as_mut() {
                    health.hp -= FROST_BOLT_DAMAGE;
                }
            }
            SpellKind::Heal => {
                if let Some(health) = victim.health.as_mut() {
                    health.hp = (health.hp + health.max_hp / 2).min(health.max_hp);
                }
            }
            SpellKind::Haste => victim.markers.insert(Markers::HASTED),
        }
    }
    Outcome::Cast { actor, spell, target }
}

fn apply_pickup(world: &mut World, actor: EntityId, at: Position) -> Outcome {
    let from = position_of(world, actor);
    if from != at && !from.is_adjacent(at) {
        return Outcome::PickedUp { actor, items: 0 };
    }

    let taken: Vec<_> = match world.level_mut().cell_mut(at) {
        Some(cell) => {
            let (claimed, free): (Vec<_>, Vec<_>) = std::mem::take(&mut cell.items)
                .into_iter()
                .partition(|item| item.is_claimed());
            cell.items = claimed;
            free
        }
        None => Vec::new(),
    };

    let count = taken.len();
    if let Some(state) = world.actor_mut(actor) {
        state
            .inventory
            .extend(taken.into_iter().map(|item| item.with_owner(actor)));
    }
    Outcome::PickedUp { actor, items: count }
}

fn apply_transaction(world: &mut World, actor: EntityId, tx: Transaction) -> Outcome {
    let refused = Outcome::Refused { actor, kind: tx.kind, item: tx.item };

    let from = position_of(world, actor);
    let shop_active = world
        .level()
        .cell(tx.shop)
        .and_then(|c| c.shop())
        .is_some_and(|s| s.is_active());
    if from != tx.shop || !shop_active {
        return refused;
    }

    match tx.kind {
        TransactionKind::Sell => {
            let Some(state) = world.actor_mut(actor) else {
                return refused;
            };
            let Some(index) = state.inventory.iter().position(|i| i.id == tx.item) else {
                return refused;
            };
            let mut item = state.inventory.remove(index);
            state.gold += tx.price;
            item.owner = None;
            item.tags.insert(ItemTags::UNPAID);
            if let Some(cell) = world.level_mut().cell_mut(tx.shop) {
                cell.items.push(item);
            }
        }
        TransactionKind::Buy => {
            let affordable = world.actor(actor).is_some_and(|a| a.gold >= tx.price);
            let Some(cell) = world.level_mut().cell_mut(tx.shop) else {
                return refused;
            };
            let Some(index) = cell
                .items
                .iter()
                .position(|i| i.id == tx.item && i.is_unpaid())
            else {
                return refused;
            };
            if !affordable {
                return refused;
            }
            let mut item = cell.items.remove(index);
            item.tags.remove(ItemTags::UNPAID);
            item.owner = Some(actor);
            if let Some(state) = world.actor_mut(actor) {
                state.gold -= tx.price;
                state.inventory.push(item);
            }
        }
    }

    Outcome::Traded { actor, kind: tx.kind, item: tx.item, price: tx.price }
}
