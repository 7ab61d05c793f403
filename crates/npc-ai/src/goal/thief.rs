//! Thief goals: roam the town, rob houses, fence the loot at shops.

use std::collections::BTreeSet;

use game_core::{ActionRequest, Position, ThiefConfig, Transaction, TransactionKind};
use rand::Rng;
use rand::seq::SliceRandom;

use super::{Explore, GetItem, Goal, GoalHook, GoalReport, Node, path_to};
use crate::context::GoalContext;
use crate::error::Result;
use crate::status::GoalStatus;

/// First visible cell holding an item nobody has claimed.
fn unclaimed_item_cell(ctx: &GoalContext<'_>) -> Option<Position> {
    ctx.seen_cells().into_iter().find(|&p| {
        ctx.level()
            .cell(p)
            .is_some_and(|c| c.items().iter().any(|i| !i.is_claimed()))
    })
}

fn is_active_shop(ctx: &GoalContext<'_>, pos: Position) -> bool {
    ctx.level()
        .cell(pos)
        .and_then(|c| c.shop())
        .is_some_and(|s| s.is_active())
}

fn has_door(ctx: &GoalContext<'_>, pos: Position) -> bool {
    ctx.level().cell(pos).is_some_and(|c| c.has_door())
}

/// Searches a house for a bounded number of turns, then leaves by a door.
#[derive(Clone, Debug)]
pub struct SearchHouse {
    budget: u32,
    entry: Position,
}

impl SearchHouse {
    /// `entry` is the door the search started from; the thief returns to it
    /// when the budget runs out elsewhere.
    pub fn new(search_time: u32, entry: Position) -> Self {
        Self {
            budget: search_time,
            entry,
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        if self.budget == 0 {
            return self.leave(node, ctx);
        }
        self.budget -= 1;

        if !node.has_sub_goals() {
            match self.next_step(ctx)? {
                Some(goal) => node.add_sub_goal(goal),
                None => return Ok(GoalStatus::Completed),
            }
        }
        // A finished or blocked step is replanned next turn.
        node.process_sub_goals(ctx)?;
        Ok(GoalStatus::Active)
    }

    fn next_step(&self, ctx: &mut GoalContext<'_>) -> Result<Option<Goal>> {
        if let Some(at) = unclaimed_item_cell(ctx) {
            return Ok(Some(Goal::new(GetItem::new(at))));
        }

        let pos = ctx.position()?;
        let floor: Vec<Position> = ctx
            .seen_cells()
            .into_iter()
            .filter(|&p| p != pos)
            .filter(|&p| ctx.level().cell(p).is_some_and(|c| c.is_house_floor()))
            .collect();
        match floor.choose(ctx.rng()).copied() {
            Some(waypoint) => path_to(ctx, waypoint),
            None => Ok(None),
        }
    }

    fn leave(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        let pos = ctx.position()?;
        if has_door(ctx, pos) {
            node.remove_all_sub_goals();
            let exit = pos.neighbours().find(|&p| {
                ctx.level()
                    .cell(p)
                    .is_some_and(|c| c.is_passable() && !c.is_house_floor() && !c.has_door())
                    && ctx.can_step(p)
            });
            match exit {
                Some(to) => ctx.post(ActionRequest::Move { to })?,
                None => tracing::debug!("{}: no way out of the door at {pos}", ctx.actor),
            }
            return Ok(GoalStatus::Completed);
        }

        if !node.has_sub_goals() {
            match path_to(ctx, self.entry)? {
                Some(goal) => node.add_sub_goal(goal),
                None => return Ok(GoalStatus::Failed),
            }
        }
        Ok(match node.process_sub_goals(ctx)? {
            GoalStatus::Failed => GoalStatus::Failed,
            _ => GoalStatus::Active,
        })
    }
}

/// What a thief knows across sales: cooldowns, shops and tried doors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThiefMemory {
    pub shop_cooldown: u32,
    pub door_cooldown: u32,
    pub shops: BTreeSet<Position>,
    pub visited_doors: BTreeSet<Position>,
}

/// Persistent thief loop.
///
/// Shops passed while exploring are remembered and never forgotten, even once
/// abandoned. Remembered shops currently seen inactive are skipped, and a
/// visible active shop always wins over memory. A sale completes the goal and
/// hands its [`ThiefMemory`] back up as a report, so the next loop resumes
/// with the same cooldowns and knowledge.
#[derive(Clone, Debug, Default)]
pub struct Thief {
    memory: ThiefMemory,
}

impl Thief {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resume(memory: ThiefMemory) -> Self {
        Self { memory }
    }

    pub fn memory(&self) -> &ThiefMemory {
        &self.memory
    }

    pub fn remembered_shops(&self) -> &BTreeSet<Position> {
        &self.memory.shops
    }

    pub fn remember_shop(&mut self, pos: Position) {
        if self.memory.shops.insert(pos) {
            tracing::debug!("thief remembers shop at {pos}");
        }
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();
        let memory = &mut self.memory;
        memory.shop_cooldown = memory.shop_cooldown.saturating_sub(1);
        memory.door_cooldown = memory.door_cooldown.saturating_sub(1);

        if !node.has_sub_goals() {
            let config = ctx.config().ai.thief.clone();
            if let Some(status) = self.plan(node, ctx, &config)? {
                return Ok(status);
            }
        }

        node.process_sub_goals(ctx)?;
        for report in node.take_reports() {
            if let GoalReport::ShopPassed(pos) = report {
                self.remember_shop(pos);
            }
        }
        Ok(GoalStatus::Active)
    }

    /// Picks the next plan. Returns a status when the turn is decided without
    /// a sub-goal.
    fn plan(
        &mut self,
        node: &mut Node,
        ctx: &mut GoalContext<'_>,
        config: &ThiefConfig,
    ) -> Result<Option<GoalStatus>> {
        let me = ctx.me()?;
        let pos = me.position;
        let goods: Vec<_> = me.inventory.iter().map(|i| (i.id, i.value)).collect();

        // 1. Fence one item where we stand.
        if !goods.is_empty() && is_active_shop(ctx, pos) {
            let (item, price) = goods[ctx.rng().gen_range(0..goods.len())];
            tracing::info!("{} sells {item:?} for {price}", ctx.actor);
            ctx.post(ActionRequest::Transaction(Transaction {
                kind: TransactionKind::Sell,
                item,
                shop: pos,
                price,
            }))?;
            self.memory.shop_cooldown = config.shop_cooldown;
            node.report(GoalReport::ThiefMemory(self.memory.clone()));
            return Ok(Some(GoalStatus::Completed));
        }

        // 2. Carry the loot to a shop.
        if !goods.is_empty() && self.memory.shop_cooldown == 0 {
            if let Some(goal) = self.shop_route(ctx, pos)? {
                node.add_sub_goal(goal);
                return Ok(None);
            }
        }

        // 3. Grab anything lying around.
        if let Some(at) = unclaimed_item_cell(ctx) {
            node.add_sub_goal(Goal::new(GetItem::new(at)));
            return Ok(None);
        }

        // 4. Walk up to a door not tried yet.
        if self.memory.door_cooldown == 0 {
            let door = ctx
                .seen_cells()
                .into_iter()
                .filter(|&p| p != pos && has_door(ctx, p) && !self.memory.visited_doors.contains(&p))
                .min_by_key(|p| p.distance_sq(pos));
            if let Some(door) = door {
                if let Some(goal) = path_to(ctx, door)? {
                    self.memory.visited_doors.insert(door);
                    self.memory.door_cooldown = config.door_cooldown;
                    node.add_sub_goal(goal);
                    return Ok(None);
                }
            }
        }

        // 5. On a door into a house: search it.
        let into_house = has_door(ctx, pos)
            && pos
                .neighbours()
                .any(|p| ctx.level().cell(p).is_some_and(|c| c.is_house_floor()));
        if into_house {
            self.memory.visited_doors.insert(pos);
            let (lo, hi) = (
                config.search_time_min.min(config.search_time_max),
                config.search_time_min.max(config.search_time_max),
            );
            let search_time = ctx.rng().gen_range(lo..=hi);
            tracing::info!("{} searches the house behind {pos} for {search_time} turns", ctx.actor);
            node.add_sub_goal(Goal::new(SearchHouse::new(search_time, pos)));
            return Ok(None);
        }

        // 6. Wander, noting shops on the way.
        node.add_sub_goal(Goal::new(Explore::new(config.explore_turns)).with_hook(GoalHook::NoteShops));
        Ok(None)
    }

    fn shop_route(&self, ctx: &GoalContext<'_>, pos: Position) -> Result<Option<Goal>> {
        let visible = ctx
            .seen_cells()
            .into_iter()
            .filter(|&p| is_active_shop(ctx, p))
            .min_by_key(|p| p.distance_sq(pos));
        let remembered = || {
            self.memory
                .shops
                .iter()
                .copied()
                .filter(|&p| !ctx.can_see(p) || is_active_shop(ctx, p))
                .min_by_key(|p| p.distance_sq(pos))
        };

        match visible.or_else(remembered) {
            Some(shop) => path_to(ctx, shop),
            None => Ok(None),
        }
    }
}
