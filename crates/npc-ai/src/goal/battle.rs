//! Battle-scoped composite goals.
//!
//! A commander carrying the `IN_BATTLE` marker runs [`WinBattle`], which
//! alternates between [`FindEnemyArmy`] (march the army toward the level
//! center until contact) and [`EngageEnemy`] (send everyone at the first
//! visible enemy). Both command the commander's visible friends through
//! [`GoalContext::issue_order`].

use game_core::{Directive, EntityId, MapDimensions, Markers, Position};

use super::{AttackActor, Goal, GoalType, MoveUntilEnemy, Node};
use crate::context::GoalContext;
use crate::error::Result;
use crate::status::GoalStatus;

/// Dispatches between finding and engaging the enemy army.
#[derive(Clone, Debug, Default)]
pub struct WinBattle;

impl WinBattle {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        if !ctx.me()?.has(Markers::IN_BATTLE) {
            tracing::info!("{} leaves the battle", ctx.actor);
            node.remove_all_sub_goals();
            return Ok(GoalStatus::Completed);
        }

        if !node.has_sub_goals() {
            let goal = if ctx.seen_enemies().is_empty() {
                Goal::new(FindEnemyArmy::new(ctx.level().dimensions(), ctx.config().ai.battle.macro_cell_size))
            } else {
                Goal::new(EngageEnemy::new())
            };
            tracing::info!("{} battle plan: {}", ctx.actor, goal.goal_type());
            node.add_sub_goal(goal);
        }

        // Both outcomes of a battle plan lead to a fresh dispatch next turn.
        node.process_sub_goals(ctx)?;
        Ok(GoalStatus::Active)
    }
}

/// Coarse grid of level regions, marked as the army passes through them.
#[derive(Clone, Debug)]
pub struct MacroGrid {
    cell_size: u32,
    cols: u32,
    rows: u32,
    visited: Vec<bool>,
}

impl MacroGrid {
    pub fn new(dimensions: MapDimensions, cell_size: u32) -> Self {
        let cell_size = cell_size.max(1);
        let cols = dimensions.width.div_ceil(cell_size);
        let rows = dimensions.height.div_ceil(cell_size);
        Self {
            cell_size,
            cols,
            rows,
            visited: vec![false; (cols * rows) as usize],
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (mx, my) = (pos.x as u32 / self.cell_size, pos.y as u32 / self.cell_size);
        (mx < self.cols && my < self.rows).then(|| (my * self.cols + mx) as usize)
    }

    /// Marks the region holding `pos`. Returns `true` if it was new.
    pub fn mark(&mut self, pos: Position) -> bool {
        match self.index(pos) {
            Some(i) if !self.visited[i] => {
                self.visited[i] = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_visited(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.visited[i])
    }

    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|v| **v).count()
    }
}

/// Marches the commander and its visible friends toward the level center.
///
/// The march order is re-issued every `order_cooldown` turns from the
/// commander's current position, whatever the state of its own march.
#[derive(Clone, Debug)]
pub struct FindEnemyArmy {
    direction: (i32, i32),
    cooldown: u32,
    grid: MacroGrid,
}

impl FindEnemyArmy {
    pub fn new(dimensions: MapDimensions, macro_cell_size: u32) -> Self {
        Self {
            direction: (0, 0),
            cooldown: 0,
            grid: MacroGrid::new(dimensions, macro_cell_size),
        }
    }

    pub fn direction(&self) -> (i32, i32) {
        self.direction
    }

    pub fn grid(&self) -> &MacroGrid {
        &self.grid
    }

    /// Unit direction from `from` toward the center of a level.
    pub fn direction_to_center(dimensions: MapDimensions, from: Position) -> (i32, i32) {
        from.direction_to(dimensions.center())
    }

    fn issue_march(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<()> {
        let battle = ctx.config().ai.battle.clone();
        self.direction = Self::direction_to_center(ctx.level().dimensions(), ctx.position()?);
        self.cooldown = battle.order_cooldown;

        let (dx, dy) = self.direction;
        let friends = ctx.seen_friends();
        if friends.is_empty() {
            tracing::warn!("{}: no army member in sight to march with", ctx.actor);
        }
        for friend in friends {
            ctx.issue_order(friend, Directive::MoveUntilEnemy { dx, dy })?;
        }
        ctx.issue_order(ctx.actor, Directive::MoveUntilEnemy { dx, dy })?;

        node.remove_sub_goals_of_kind(GoalType::MoveUntilEnemy);
        node.add_sub_goal(Goal::new(MoveUntilEnemy::new(dx, dy, battle.move_until_enemy_turns)));
        Ok(())
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        if node.activate_if_inactive() {
            self.issue_march(node, ctx)?;
        }

        self.grid.mark(ctx.position()?);
        if !ctx.seen_enemies().is_empty() {
            tracing::info!("{} made contact with the enemy", ctx.actor);
            node.remove_all_sub_goals();
            return Ok(GoalStatus::Completed);
        }

        if self.cooldown == 0 {
            self.issue_march(node, ctx)?;
        }
        self.cooldown = self.cooldown.saturating_sub(1);

        if !node.has_sub_goals() {
            let (dx, dy) = self.direction;
            let turns = ctx.config().ai.battle.move_until_enemy_turns;
            node.add_sub_goal(Goal::new(MoveUntilEnemy::new(dx, dy, turns)));
        }
        node.process_sub_goals(ctx)?;
        Ok(GoalStatus::Active)
    }
}

/// Sends every visible friend, and the commander itself, at one enemy.
#[derive(Clone, Debug, Default)]
pub struct EngageEnemy {
    target: Option<EntityId>,
}

impl EngageEnemy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        if node.activate_if_inactive() {
            let Some(&target) = ctx.seen_enemies().first() else {
                return Ok(GoalStatus::Failed);
            };
            self.target = Some(target);
            tracing::info!("{} engages {target}", ctx.actor);

            let friends = ctx.seen_friends();
            if friends.is_empty() {
                tracing::warn!("{}: no army member in sight to engage with", ctx.actor);
            }
            for friend in friends {
                ctx.issue_order(friend, Directive::AttackActor { target })?;
            }
            node.add_sub_goal(Goal::new(AttackActor::new(target)));
        }

        node.process_sub_goals(ctx)
    }
}
