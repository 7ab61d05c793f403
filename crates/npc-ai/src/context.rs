//! Per-turn context handed to evaluators and goals.
//!
//! [`GoalContext`] is the only way a decision reaches the world: it exposes
//! what the acting actor perceives and lets goals post action requests on that
//! actor or orders for other actors. It lives for exactly one `take_turn`.

use game_core::{
    ActionRequest, ActorState, Directive, EntityId, GameConfig, Level, OrderRequest, Position,
    World,
};
use rand::rngs::StdRng;

use crate::error::{AiError, Result};
use crate::orders::{Order, OrderBoard};

pub struct GoalContext<'a> {
    /// The actor whose brain is running.
    pub actor: EntityId,
    pub world: &'a mut World,
    pub orders: &'a mut OrderBoard,
}

impl<'a> GoalContext<'a> {
    pub fn new(actor: EntityId, world: &'a mut World, orders: &'a mut OrderBoard) -> Self {
        Self {
            actor,
            world,
            orders,
        }
    }

    /// State of the acting actor.
    pub fn me(&self) -> Result<&ActorState> {
        self.world
            .actor(self.actor)
            .ok_or(AiError::MissingActor(self.actor))
    }

    pub fn position(&self) -> Result<Position> {
        self.me().map(|a| a.position)
    }

    pub fn level(&self) -> &Level {
        self.world.level()
    }

    pub fn config(&self) -> &GameConfig {
        self.world.config()
    }

    pub fn rng(&mut self) -> &mut StdRng {
        self.world.rng()
    }

    // ========================================================================
    // Perception
    // ========================================================================

    pub fn seen_cells(&self) -> Vec<Position> {
        self.world.seen_cells(self.actor)
    }

    pub fn seen_enemies(&self) -> Vec<EntityId> {
        self.world.seen_enemies(self.actor)
    }

    pub fn seen_friends(&self) -> Vec<EntityId> {
        self.world.seen_friends(self.actor)
    }

    pub fn can_see(&self, position: Position) -> bool {
        self.world.can_see(self.actor, position)
    }

    /// Position of `target` if it is alive and inside the perception square.
    pub fn visible_position(&self, target: EntityId) -> Option<Position> {
        self.world
            .actor(target)
            .filter(|a| a.is_alive())
            .map(|a| a.position)
            .filter(|&p| self.can_see(p))
    }

    /// `true` when the acting actor could step into `to` this turn.
    pub fn can_step(&self, to: Position) -> bool {
        self.position().is_ok_and(|p| p.is_adjacent(to)) && self.world.is_free(to)
    }

    // ========================================================================
    // Side effects
    // ========================================================================

    /// Attaches `request` to the acting actor for the resolver.
    pub fn post(&mut self, request: ActionRequest) -> Result<()> {
        self.world
            .actor_mut(self.actor)
            .ok_or(AiError::MissingActor(self.actor))?
            .post(request);
        Ok(())
    }

    /// Sends `directive` to `target` on behalf of the acting actor.
    ///
    /// Brain-driven targets receive it through the order board; a
    /// player-controlled target gets an [`OrderRequest`] attached instead and
    /// the input path decides what to do with it.
    pub fn issue_order(&mut self, target: EntityId, directive: Directive) -> Result<()> {
        let src = self.actor;
        let target_state = self
            .world
            .actor_mut(target)
            .ok_or(AiError::MissingActor(target))?;

        if target_state.is_player() {
            tracing::debug!("{src} attaches order request {directive:?} to player {target}");
            target_state.order_requests.push(OrderRequest { src, directive });
        } else {
            tracing::info!("{src} orders {target}: {directive:?}");
            self.orders.post(target, Order::new(src, directive));
        }
        Ok(())
    }
}
