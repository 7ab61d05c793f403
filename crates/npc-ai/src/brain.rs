//! Per-actor brains and the turn entry point.
//!
//! A [`Brain`] pairs an actor with its [`GoalTop`]. At the start of each turn
//! it drains the actor's order inbox, turning every order into an injected
//! evaluator (revoking the previous order first), then runs the top goal once.

use std::collections::BTreeMap;

use game_core::{EntityId, GameConfig, World};

use crate::context::GoalContext;
use crate::error::{AiError, Result};
use crate::evaluator::Evaluator;
use crate::goal::Goal;
use crate::orders::{Order, OrderBoard};
use crate::status::GoalStatus;
use crate::top::GoalTop;

#[derive(Clone, Debug)]
pub struct Brain {
    actor: EntityId,
    top: GoalTop,
}

impl Brain {
    pub fn new(actor: EntityId, top: GoalTop) -> Self {
        Self { actor, top }
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn top(&self) -> &GoalTop {
        &self.top
    }

    pub fn top_mut(&mut self) -> &mut GoalTop {
        &mut self.top
    }

    /// Replaces any standing order with `order`.
    pub fn receive(&mut self, order: Order, config: &GameConfig) {
        let goal = Goal::from_directive(&order.directive, config);
        tracing::debug!("{} receives order from {}: {}", self.actor, order.src, goal.goal_type());
        self.top.clear_orders();
        self.top
            .give_orders(Evaluator::orders(self.top.biases().order, order.src, goal));
    }

    /// Runs one turn for this brain's actor.
    ///
    /// Dead actors drop their orders and do nothing.
    pub fn take_turn(&mut self, world: &mut World, orders: &mut OrderBoard) -> Result<GoalStatus> {
        let alive = world
            .actor(self.actor)
            .ok_or(AiError::MissingActor(self.actor))?
            .is_alive();

        let inbox = orders.drain(self.actor);
        if !alive {
            return Ok(self.top.status());
        }
        for order in inbox {
            self.receive(order, world.config());
        }

        let mut ctx = GoalContext::new(self.actor, world, orders);
        self.top.process(&mut ctx)
    }
}

/// Every brain in a world plus the order board they share.
#[derive(Debug, Default)]
pub struct Brains {
    brains: BTreeMap<EntityId, Brain>,
    board: OrderBoard,
}

impl Brains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, brain: Brain) -> Option<Brain> {
        self.brains.insert(brain.actor(), brain)
    }

    pub fn get(&self, actor: EntityId) -> Option<&Brain> {
        self.brains.get(&actor)
    }

    pub fn get_mut(&mut self, actor: EntityId) -> Option<&mut Brain> {
        self.brains.get_mut(&actor)
    }

    pub fn actors(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.brains.keys().copied()
    }

    pub fn board(&self) -> &OrderBoard {
        &self.board
    }

    /// Runs one turn of `actor`'s brain.
    ///
    /// Returns `None` for actors without a brain (the player, for one).
    pub fn take_turn(&mut self, actor: EntityId, world: &mut World) -> Result<Option<GoalStatus>> {
        match self.brains.get_mut(&actor) {
            Some(brain) => brain.take_turn(world, &mut self.board).map(Some),
            None => Ok(None),
        }
    }
}
