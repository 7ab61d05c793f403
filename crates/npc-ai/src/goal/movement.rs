//! Atomic movement goals.

use std::collections::{BTreeSet, VecDeque};

use game_core::{ActionRequest, EntityId, Position};
use rand::seq::SliceRandom;

use super::Node;
use crate::context::GoalContext;
use crate::error::Result;
use crate::status::GoalStatus;

/// Walks a precomputed path, one step per turn.
#[derive(Clone, Debug)]
pub struct FollowPath {
    path: VecDeque<Position>,
}

impl FollowPath {
    pub fn new(path: impl IntoIterator<Item = Position>) -> Self {
        Self {
            path: path.into_iter().collect(),
        }
    }

    pub fn destination(&self) -> Option<Position> {
        self.path.back().copied()
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        let Some(next) = self.path.pop_front() else {
            return Ok(GoalStatus::Completed);
        };
        if !ctx.can_step(next) {
            tracing::debug!("{}: path step to {next} is blocked", ctx.actor);
            return Ok(GoalStatus::Failed);
        }
        ctx.post(ActionRequest::Move { to: next })?;

        Ok(if self.path.is_empty() {
            GoalStatus::Completed
        } else {
            GoalStatus::Active
        })
    }
}

/// Steps in a fixed direction until an enemy shows up.
///
/// A blocked step is retried 45 degrees to either side before failing.
#[derive(Clone, Debug)]
pub struct MoveUntilEnemy {
    dx: i32,
    dy: i32,
    turns_left: u32,
}

impl MoveUntilEnemy {
    pub fn new(dx: i32, dy: i32, turns: u32) -> Self {
        Self {
            dx: dx.signum(),
            dy: dy.signum(),
            turns_left: turns,
        }
    }

    pub fn direction(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    pub fn turns_left(&self) -> u32 {
        self.turns_left
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        if !ctx.seen_enemies().is_empty() || self.turns_left == 0 || (self.dx, self.dy) == (0, 0) {
            return Ok(GoalStatus::Completed);
        }
        self.turns_left -= 1;

        let pos = ctx.position()?;
        let step = [
            (self.dx, self.dy),
            rotate(self.dx, self.dy, 1),
            rotate(self.dx, self.dy, -1),
        ]
        .into_iter()
        .map(|(dx, dy)| pos.offset(dx, dy))
        .find(|&to| ctx.can_step(to));

        match step {
            Some(to) => {
                ctx.post(ActionRequest::Move { to })?;
                Ok(GoalStatus::Active)
            }
            None => Ok(GoalStatus::Failed),
        }
    }
}

/// Rotates a unit direction by 45 degrees (`turn` = 1 clockwise, -1 counter).
fn rotate(dx: i32, dy: i32, turn: i32) -> (i32, i32) {
    const RING: [(i32, i32); 8] = [
        (0, -1),
        (1, -1),
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
    ];
    match RING.iter().position(|&d| d == (dx, dy)) {
        Some(i) => RING[(i as i32 + turn).rem_euclid(8) as usize],
        None => (dx, dy),
    }
}

/// Steps away from a threat while it stays in sight.
#[derive(Clone, Debug)]
pub struct FleeFromActor {
    threat: EntityId,
    turns_left: u32,
}

impl FleeFromActor {
    pub fn new(threat: EntityId, turns: u32) -> Self {
        Self {
            threat,
            turns_left: turns,
        }
    }

    pub fn threat(&self) -> EntityId {
        self.threat
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        let Some(threat_pos) = ctx.visible_position(self.threat) else {
            return Ok(GoalStatus::Completed);
        };
        if self.turns_left == 0 {
            return Ok(GoalStatus::Completed);
        }
        self.turns_left -= 1;

        let pos = ctx.position()?;
        let current = pos.distance_sq(threat_pos);
        let best = pos
            .neighbours()
            .filter(|&to| ctx.can_step(to))
            .map(|to| (to.distance_sq(threat_pos), to))
            .filter(|&(d, _)| d > current)
            .max_by_key(|&(d, _)| d);

        match best {
            Some((_, to)) => {
                ctx.post(ActionRequest::Move { to })?;
                Ok(GoalStatus::Active)
            }
            None => {
                tracing::debug!("{} is cornered by {}", ctx.actor, self.threat);
                Ok(GoalStatus::Failed)
            }
        }
    }
}

/// Bounded random walk that prefers cells it has not stood on.
#[derive(Clone, Debug)]
pub struct Explore {
    turns_left: u32,
    visited: BTreeSet<Position>,
}

impl Explore {
    pub fn new(turns: u32) -> Self {
        Self {
            turns_left: turns,
            visited: BTreeSet::new(),
        }
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        if self.turns_left == 0 {
            return Ok(GoalStatus::Completed);
        }
        self.turns_left -= 1;

        let pos = ctx.position()?;
        self.visited.insert(pos);

        let open: Vec<Position> = pos.neighbours().filter(|&to| ctx.can_step(to)).collect();
        let fresh: Vec<Position> = open
            .iter()
            .copied()
            .filter(|p| !self.visited.contains(p))
            .collect();
        let pool = if fresh.is_empty() { &open } else { &fresh };

        let Some(&to) = pool.choose(ctx.rng()) else {
            return Ok(GoalStatus::Failed);
        };
        ctx.post(ActionRequest::Move { to })?;

        Ok(if self.turns_left == 0 {
            GoalStatus::Completed
        } else {
            GoalStatus::Active
        })
    }
}

/// Backs away from the centroid of every visible enemy.
#[derive(Clone, Debug)]
pub struct Retreat {
    turns_left: u32,
}

impl Retreat {
    pub fn new(turns: u32) -> Self {
        Self { turns_left: turns }
    }

    pub(crate) fn process(&mut self, node: &mut Node, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        node.activate_if_inactive();

        let enemies: Vec<Position> = ctx
            .seen_enemies()
            .into_iter()
            .filter_map(|id| ctx.world.actor(id).map(|a| a.position))
            .collect();
        if enemies.is_empty() || self.turns_left == 0 {
            return Ok(GoalStatus::Completed);
        }
        self.turns_left -= 1;

        let n = enemies.len() as f64;
        let cx = enemies.iter().map(|p| p.x as f64).sum::<f64>() / n;
        let cy = enemies.iter().map(|p| p.y as f64).sum::<f64>() / n;
        let away = |p: Position| (p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2);

        let pos = ctx.position()?;
        let current = away(pos);
        let best = pos
            .neighbours()
            .filter(|&to| ctx.can_step(to) && away(to) > current)
            .max_by(|a, b| away(*a).total_cmp(&away(*b)));

        match best {
            Some(to) => {
                ctx.post(ActionRequest::Move { to })?;
                Ok(GoalStatus::Active)
            }
            None => Ok(GoalStatus::Failed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::Goal;
    use crate::orders::OrderBoard;
    use game_core::{ActorState, FactionId, GameConfig, Level, World};

    fn world(rows: &[&str]) -> World {
        World::new(Level::from_ascii(rows).unwrap(), GameConfig::default(), 7)
    }

    fn spawn(world: &mut World, id: u32, at: Position, faction: u16) {
        world
            .spawn(ActorState::new(EntityId(id), "a", at, FactionId(faction)).with_health(10, 10))
            .unwrap();
    }

    fn requests(world: &World, id: u32) -> Vec<ActionRequest> {
        world.actor(EntityId(id)).unwrap().requests.clone()
    }

    #[test]
    fn follow_path_posts_one_step_and_completes_at_the_end() {
        let mut world = world(&["....."]);
        spawn(&mut world, 1, Position::new(0, 0), 1);
        let mut board = OrderBoard::new();
        let mut goal = Goal::new(FollowPath::new([Position::new(1, 0)]));

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(goal.process(&mut ctx).unwrap(), GoalStatus::Completed);
        assert_eq!(requests(&world, 1), vec![ActionRequest::Move { to: Position::new(1, 0) }]);
    }

    #[test]
    fn follow_path_fails_when_blocked() {
        let mut world = world(&["....."]);
        spawn(&mut world, 1, Position::new(0, 0), 1);
        spawn(&mut world, 2, Position::new(1, 0), 1);
        let mut board = OrderBoard::new();
        let mut goal = Goal::new(FollowPath::new([Position::new(1, 0), Position::new(2, 0)]));

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(goal.process(&mut ctx).unwrap(), GoalStatus::Failed);
        assert!(requests(&world, 1).is_empty());
    }

    #[test]
    fn move_until_enemy_sidesteps_a_wall() {
        let mut world = world(&["..#..", ".....", "....."]);
        spawn(&mut world, 1, Position::new(1, 0), 1);
        let mut board = OrderBoard::new();
        let mut goal = Goal::new(MoveUntilEnemy::new(1, 0, 10));

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(goal.process(&mut ctx).unwrap(), GoalStatus::Active);
        assert_eq!(requests(&world, 1), vec![ActionRequest::Move { to: Position::new(2, 1) }]);
    }

    #[test]
    fn move_until_enemy_stops_when_an_enemy_is_seen() {
        let mut world = world(&["....."]);
        spawn(&mut world, 1, Position::new(0, 0), 1);
        spawn(&mut world, 2, Position::new(4, 0), 2);
        world.add_enemy_group(EntityId(1), FactionId(2)).unwrap();
        let mut board = OrderBoard::new();
        let mut goal = Goal::new(MoveUntilEnemy::new(1, 0, 10));

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(goal.process(&mut ctx).unwrap(), GoalStatus::Completed);
    }

    #[test]
    fn flee_steps_away_and_fails_when_cornered() {
        let mut world = world(&["#####", "#...#", "#####"]);
        spawn(&mut world, 1, Position::new(2, 1), 1);
        spawn(&mut world, 2, Position::new(1, 1), 2);
        let mut board = OrderBoard::new();
        let mut goal = Goal::new(FleeFromActor::new(EntityId(2), 5));

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(goal.process(&mut ctx).unwrap(), GoalStatus::Active);
        assert_eq!(requests(&world, 1), vec![ActionRequest::Move { to: Position::new(3, 1) }]);

        world.actor_mut(EntityId(1)).unwrap().requests.clear();
        world.actor_mut(EntityId(1)).unwrap().position = Position::new(3, 1);
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(goal.process(&mut ctx).unwrap(), GoalStatus::Failed);
    }

    #[test]
    fn explore_runs_for_its_budget() {
        let mut world = world(&["....", "....", "...."]);
        spawn(&mut world, 1, Position::new(1, 1), 1);
        let mut board = OrderBoard::new();
        let mut goal = Goal::new(Explore::new(2));

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(goal.process(&mut ctx).unwrap(), GoalStatus::Active);
        assert_eq!(goal.process(&mut ctx).unwrap(), GoalStatus::Completed);
        assert_eq!(requests(&world, 1).len(), 2);
    }

    #[test]
    fn rotate_wraps_around_the_compass() {
        assert_eq!(rotate(0, -1, -1), (-1, -1));
        assert_eq!(rotate(-1, -1, 1), (0, -1));
        assert_eq!(rotate(1, 1, 1), (0, 1));
    }
}
