//! Requests posted on actors by their brains.
//!
//! Brains never mutate the world directly. They attach an [`ActionRequest`]
//! to the acting actor, and the resolver in [`crate::engine`] applies it after
//! the turn. Orders aimed at a human-controlled actor are attached as an
//! [`OrderRequest`] instead and left to the input path.

use crate::state::{EntityId, ItemId, Position, SpellKind};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionRequest {
    /// Step to an adjacent cell.
    Move { to: Position },
    /// Melee attack on an adjacent actor.
    Attack { target: EntityId },
    CastSpell { spell: SpellKind, target: EntityId },
    /// Pick up every unclaimed item at an adjacent or current cell.
    Pickup { at: Position },
    Transaction(Transaction),
    Wait,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransactionKind {
    Buy,
    Sell,
}

/// Buy/sell request against the shop at `shop`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    pub kind: TransactionKind,
    pub item: ItemId,
    pub shop: Position,
    pub price: u32,
}

/// Plain-data description of a commanded goal.
///
/// A directive is what travels between actors when one orders another; the
/// receiving brain turns it into a concrete goal.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Directive {
    AttackActor { target: EntityId },
    MoveUntilEnemy { dx: i32, dy: i32 },
    Guard { at: Position },
}

/// Order addressed to a player-controlled actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderRequest {
    pub src: EntityId,
    pub directive: Directive,
}
