//! World substrate shared by the decision system and its drivers.
//!
//! `game-core` defines the level grid, actors with their optional
//! capabilities, perception and memory queries, and the action requests brains
//! post. All world mutation caused by a decision flows through
//! [`engine::resolve_requests`].
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{ActionRequest, Directive, OrderRequest, Transaction, TransactionKind};
pub use config::{
    AiConfig, BasicBiases, BattleConfig, CommanderBiases, GameConfig, SpellcasterBiases,
    ThiefConfig,
};
pub use engine::{Outcome, resolve_requests};
pub use env::{BaseElement, Cell, Door, Level, MapDimensions, Shop};
pub use error::{ErrorSeverity, WorldError};
pub use state::{
    ActorState, EntityId, FactionId, Health, Item, ItemId, ItemTags, Markers, Memory, Position,
    Spell, SpellKind, SpellPower, Spellbook, World,
};
