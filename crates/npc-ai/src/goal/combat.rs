//! Combat goals.

use game_core::{ActionRequest, EntityId, SpellKind};

use super::{FollowPath, Goal, Node};
use crate::context::GoalContext;
use crate::error::Result;
use crate::status::GoalStatus;

/// Path steps taken toward a moving target before replanning.
const CHASE_STEPS: usize = 3;

/// One melee attack on an adjacent target.
#[derive(Clone, Debug)]
pub struct HitActor {
    target: EntityId,
}

impl HitActor {
    pub fn new(target: EntityId) -> Self {
        Self { target }
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        let pos = ctx.position()?;
        let adjacent = ctx
            .world
            .actor(self.target)
            .filter(|t| t.is_alive())
            .is_some_and(|t| t.position.is_adjacent(pos));
        if !adjacent {
            return Ok(GoalStatus::Failed);
        }
        ctx.post(ActionRequest::Attack {
            target: self.target,
        })?;
        Ok(GoalStatus::Completed)
    }
}

/// Chases a target and hits it until it is dead or out of sight.
#[derive(Clone, Debug)]
pub struct AttackActor {
    target: EntityId,
}

impl AttackActor {
    pub fn new(target: EntityId) -> Self {
        Self { target }
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        let Some(target_pos) = ctx.visible_position(self.target) else {
            tracing::debug!("{}: target {} is dead or gone", ctx.actor, self.target);
            node.remove_all_sub_goals();
            return Ok(GoalStatus::Completed);
        };

        if !node.has_sub_goals() {
            let pos = ctx.position()?;
            if pos.is_adjacent(target_pos) {
                node.add_sub_goal(Goal::new(HitActor::new(self.target)));
            } else {
                let chase = ctx.level().find_path(pos, target_pos).and_then(|mut path| {
                    path.pop();
                    path.truncate(CHASE_STEPS);
                    (!path.is_empty()).then(|| Goal::new(FollowPath::new(path)))
                });
                match chase {
                    Some(goal) => node.add_sub_goal(goal),
                    None => return Ok(GoalStatus::Failed),
                }
            }
        }

        Ok(match node.process_sub_goals(ctx)? {
            GoalStatus::Failed => GoalStatus::Failed,
            _ => GoalStatus::Active,
        })
    }
}

/// Casts one spell on a target.
#[derive(Clone, Debug)]
pub struct CastSpell {
    spell: SpellKind,
    target: EntityId,
}

impl CastSpell {
    pub fn new(spell: SpellKind, target: EntityId) -> Self {
        Self { spell, target }
    }

    pub fn spell(&self) -> SpellKind {
        self.spell
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        if !ctx.world.is_alive(self.target) {
            return Ok(GoalStatus::Failed);
        }
        tracing::debug!("{} casts {} on {}", ctx.actor, self.spell, self.target);
        ctx.post(ActionRequest::CastSpell {
            spell: self.spell,
            target: self.target,
        })?;
        Ok(GoalStatus::Completed)
    }
}
