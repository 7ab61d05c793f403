//! Goals: stateful tasks organized as stacks.
//!
//! Every goal is a [`Goal`]: a closed [`GoalKind`] variant carrying the
//! kind-specific state, plus a [`Node`] carrying what all goals share (status,
//! sub-goal stack, completion hook). Atomic goals post action requests on the
//! acting actor; composite goals push sub-goals onto their own stack and let
//! [`Node::process_sub_goals`] drive the top of it.
//!
//! # Lifecycle
//!
//! ```text
//! Inactive ──process──► Active ──► Completed | Failed (popped by the parent)
//! ```
//!
//! A goal is processed at most once per turn, through [`Goal::process`].

mod battle;
mod combat;
mod errand;
mod movement;
mod thief;

pub use battle::{EngageEnemy, FindEnemyArmy, MacroGrid, WinBattle};
pub use combat::{AttackActor, CastSpell, HitActor};
pub use errand::{GetItem, Guard, Patrol};
pub use movement::{Explore, FleeFromActor, FollowPath, MoveUntilEnemy, Retreat};
pub use thief::{SearchHouse, Thief, ThiefMemory};

use game_core::{Directive, GameConfig, Position};

use crate::context::GoalContext;
use crate::error::Result;
use crate::status::GoalStatus;

/// Side effect run on a goal's node after every processing of that goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalHook {
    /// Reports the acting actor's cell when it holds an active shop.
    NoteShops,
}

impl GoalHook {
    fn run(self, node: &mut Node, ctx: &GoalContext<'_>) -> Result<()> {
        match self {
            GoalHook::NoteShops => {
                let pos = ctx.position()?;
                let active = ctx
                    .level()
                    .cell(pos)
                    .and_then(|c| c.shop())
                    .is_some_and(|s| s.is_active());
                if active {
                    node.reports.push(GoalReport::ShopPassed(pos));
                }
            }
        }
        Ok(())
    }
}

/// Observation bubbled from a sub-goal to its ancestors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GoalReport {
    ShopPassed(Position),
    /// A thief loop finished and hands back what it learned.
    ThiefMemory(ThiefMemory),
}

/// State shared by every goal kind.
#[derive(Clone, Debug, Default)]
pub struct Node {
    status: GoalStatus,
    /// LIFO stack; the last element is processed first.
    sub_goals: Vec<Goal>,
    injected: bool,
    hook: Option<GoalHook>,
    reports: Vec<GoalReport>,
}

impl Node {
    pub fn status(&self) -> GoalStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: GoalStatus) {
        self.status = status;
    }

    /// Marks the node active. Returns `true` if it was inactive, so the
    /// caller knows to run its activation.
    pub(crate) fn activate_if_inactive(&mut self) -> bool {
        if self.status.is_inactive() {
            self.status = GoalStatus::Active;
            true
        } else {
            false
        }
    }

    pub fn sub_goals(&self) -> &[Goal] {
        &self.sub_goals
    }

    pub fn has_sub_goals(&self) -> bool {
        !self.sub_goals.is_empty()
    }

    /// Pushes `goal` on top of the stack.
    pub fn add_sub_goal(&mut self, goal: Goal) {
        tracing::trace!("push sub-goal {}", goal.goal_type());
        self.sub_goals.push(goal);
    }

    pub fn remove_all_sub_goals(&mut self) {
        self.sub_goals.clear();
    }

    pub fn remove_sub_goals_of_kind(&mut self, kind: GoalType) {
        self.sub_goals.retain(|g| g.goal_type() != kind);
    }

    /// Takes the reports gathered by this node and its processed sub-goals.
    pub(crate) fn take_reports(&mut self) -> Vec<GoalReport> {
        std::mem::take(&mut self.reports)
    }

    pub(crate) fn report(&mut self, report: GoalReport) {
        self.reports.push(report);
    }

    /// Processes the top sub-goal and pops it once terminal.
    ///
    /// Returns `Completed` only when the stack is empty afterwards, `Failed`
    /// when the top goal failed, and `Active` otherwise.
    pub fn process_sub_goals(&mut self, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        while self
            .sub_goals
            .last()
            .is_some_and(|g| g.status().is_terminal())
        {
            self.sub_goals.pop();
        }

        let Some(top) = self.sub_goals.last_mut() else {
            return Ok(GoalStatus::Completed);
        };

        let status = top.process(ctx)?;
        self.reports.append(&mut top.node.reports);
        if status.is_terminal() {
            tracing::trace!("pop sub-goal {} ({status})", top.goal_type());
            self.sub_goals.pop();
        }

        Ok(match status {
            GoalStatus::Completed if self.sub_goals.is_empty() => GoalStatus::Completed,
            GoalStatus::Failed => GoalStatus::Failed,
            _ => GoalStatus::Active,
        })
    }
}

/// Kind-specific goal state.
#[derive(Clone, Debug, strum::EnumDiscriminants)]
#[strum_discriminants(name(GoalType), derive(Hash, strum::Display))]
pub enum GoalKind {
    FollowPath(FollowPath),
    MoveUntilEnemy(MoveUntilEnemy),
    HitActor(HitActor),
    AttackActor(AttackActor),
    FleeFromActor(FleeFromActor),
    Explore(Explore),
    Guard(Guard),
    Patrol(Patrol),
    CastSpell(CastSpell),
    GetItem(GetItem),
    Retreat(Retreat),
    WinBattle(WinBattle),
    FindEnemyArmy(FindEnemyArmy),
    EngageEnemy(EngageEnemy),
    SearchHouse(SearchHouse),
    Thief(Thief),
}

/// A goal: kind-specific state plus the shared [`Node`].
#[derive(Clone, Debug)]
pub struct Goal {
    kind: GoalKind,
    node: Node,
}

impl Goal {
    pub fn new(kind: impl Into<GoalKind>) -> Self {
        Self {
            kind: kind.into(),
            node: Node::default(),
        }
    }

    /// Builds the goal a directive from another actor describes.
    pub fn from_directive(directive: &Directive, config: &GameConfig) -> Self {
        match *directive {
            Directive::AttackActor { target } => Goal::new(AttackActor::new(target)),
            Directive::MoveUntilEnemy { dx, dy } => Goal::new(MoveUntilEnemy::new(
                dx,
                dy,
                config.ai.battle.move_until_enemy_turns,
            )),
            Directive::Guard { at } => Goal::new(Guard::new(at)),
        }
    }

    pub fn with_hook(mut self, hook: GoalHook) -> Self {
        self.node.hook = Some(hook);
        self
    }

    pub fn kind(&self) -> &GoalKind {
        &self.kind
    }

    pub fn goal_type(&self) -> GoalType {
        GoalType::from(&self.kind)
    }

    pub fn status(&self) -> GoalStatus {
        self.node.status
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn sub_goals(&self) -> &[Goal] {
        &self.node.sub_goals
    }

    /// `true` for goals delivered through an order.
    pub fn is_injected(&self) -> bool {
        self.node.injected
    }

    pub(crate) fn mark_injected(&mut self) {
        self.node.injected = true;
    }

    /// Runs one turn of this goal.
    pub fn process(&mut self, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        let node = &mut self.node;
        let status = match &mut self.kind {
            GoalKind::FollowPath(g) => g.process(node, ctx),
            GoalKind::MoveUntilEnemy(g) => g.process(node, ctx),
            GoalKind::HitActor(g) => g.process(node, ctx),
            GoalKind::AttackActor(g) => g.process(node, ctx),
            GoalKind::FleeFromActor(g) => g.process(node, ctx),
            GoalKind::Explore(g) => g.process(node, ctx),
            GoalKind::Guard(g) => g.process(node, ctx),
            GoalKind::Patrol(g) => g.process(node, ctx),
            GoalKind::CastSpell(g) => g.process(node, ctx),
            GoalKind::GetItem(g) => g.process(node, ctx),
            GoalKind::Retreat(g) => g.process(node, ctx),
            GoalKind::WinBattle(g) => g.process(node, ctx),
            GoalKind::FindEnemyArmy(g) => g.process(node, ctx),
            GoalKind::EngageEnemy(g) => g.process(node, ctx),
            GoalKind::SearchHouse(g) => g.process(node, ctx),
            GoalKind::Thief(g) => g.process(node, ctx),
        }?;
        node.status = status;

        if let Some(hook) = node.hook {
            hook.run(node, ctx)?;
        }
        Ok(status)
    }
}

macro_rules! impl_from_kind {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for GoalKind {
                fn from(goal: $kind) -> Self {
                    GoalKind::$kind(goal)
                }
            }
        )*
    };
}

impl_from_kind!(
    FollowPath,
    MoveUntilEnemy,
    HitActor,
    AttackActor,
    FleeFromActor,
    Explore,
    Guard,
    Patrol,
    CastSpell,
    GetItem,
    Retreat,
    WinBattle,
    FindEnemyArmy,
    EngageEnemy,
    SearchHouse,
    Thief,
);

/// Path goal from the actor's cell to `to`, or `None` when `to` is
/// unreachable or already reached.
pub(crate) fn path_to(ctx: &GoalContext<'_>, to: Position) -> Result<Option<Goal>> {
    let from = ctx.position()?;
    Ok(ctx
        .level()
        .find_path(from, to)
        .filter(|path| !path.is_empty())
        .map(|path| Goal::new(FollowPath::new(path))))
}
