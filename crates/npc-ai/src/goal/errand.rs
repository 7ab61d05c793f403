//! Goals that go somewhere and do one thing there.

use game_core::{ActionRequest, Position};

use super::{Node, path_to};
use crate::context::GoalContext;
use crate::error::Result;
use crate::status::GoalStatus;

/// Walks to a guard point and holds it for a turn.
#[derive(Clone, Debug)]
pub struct Guard {
    at: Position,
}

impl Guard {
    pub fn new(at: Position) -> Self {
        Self { at }
    }

    pub fn at(&self) -> Position {
        self.at
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();
        walk_then(node, ctx, self.at, |ctx| ctx.post(ActionRequest::Wait))
    }
}

/// Visits waypoints in order, one leg per goal instance.
///
/// The leg starts at the waypoint after the one the actor stands on, or at
/// the nearest waypoint when it stands on none.
#[derive(Clone, Debug)]
pub struct Patrol {
    waypoints: Vec<Position>,
    leg: Option<usize>,
}

impl Patrol {
    pub fn new(waypoints: Vec<Position>) -> Self {
        Self {
            waypoints,
            leg: None,
        }
    }

    /// Waypoint the current leg walks to, once activated.
    pub fn destination(&self) -> Option<Position> {
        self.leg.and_then(|i| self.waypoints.get(i).copied())
    }

    fn next_leg(&self, pos: Position) -> Option<usize> {
        if self.waypoints.is_empty() {
            return None;
        }
        match self.waypoints.iter().position(|&w| w == pos) {
            Some(i) => Some((i + 1) % self.waypoints.len()),
            None => self
                .waypoints
                .iter()
                .enumerate()
                .min_by_key(|(_, w)| w.distance_sq(pos))
                .map(|(i, _)| i),
        }
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        if node.activate_if_inactive() {
            self.leg = self.next_leg(ctx.position()?);
        }
        let Some(to) = self.destination() else {
            return Ok(GoalStatus::Failed);
        };
        walk_then(node, ctx, to, |ctx| ctx.post(ActionRequest::Wait))
    }
}

/// Walks to an item cell and picks up what lies there.
#[derive(Clone, Debug)]
pub struct GetItem {
    at: Position,
}

impl GetItem {
    pub fn new(at: Position) -> Self {
        Self { at }
    }

    pub fn at(&self) -> Position {
        self.at
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        let unclaimed = ctx
            .level()
            .cell(self.at)
            .is_some_and(|c| c.items().iter().any(|i| !i.is_claimed()));
        if !unclaimed {
            node.remove_all_sub_goals();
            return Ok(GoalStatus::Failed);
        }

        let pos = ctx.position()?;
        if pos == self.at || pos.is_adjacent(self.at) {
            node.remove_all_sub_goals();
            ctx.post(ActionRequest::Pickup { at: self.at })?;
            return Ok(GoalStatus::Completed);
        }
        walk_then(node, ctx, self.at, |_| Ok(()))
    }
}

/// Paths to `to`, then runs `arrive` and completes once standing there.
fn walk_then(
    node: &mut Node,
    ctx: &mut GoalContext<'_>,
    to: Position,
    arrive: impl FnOnce(&mut GoalContext<'_>) -> Result<()>,
) -> Result<GoalStatus> {
    if ctx.position()? == to {
        node.remove_all_sub_goals();
        arrive(ctx)?;
        return Ok(GoalStatus::Completed);
    }

    if !node.has_sub_goals() {
        match path_to(ctx, to)? {
            Some(goal) => node.add_sub_goal(goal),
            None => return Ok(GoalStatus::Failed),
        }
    }

    Ok(match node.process_sub_goals(ctx)? {
        GoalStatus::Failed => GoalStatus::Failed,
        _ => GoalStatus::Active,
    })
}
