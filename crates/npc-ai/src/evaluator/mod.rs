//! Evaluators: utility scoring of candidate behaviors.
//!
//! An [`Evaluator`] answers two questions for its actor:
//!
//! 1. [`calculate_desirability`](Evaluator::calculate_desirability): how much
//!    does the actor want this behavior right now? Scores are recomputed on
//!    every call and are never cached. [`NOT_POSSIBLE`] means "does not apply".
//! 2. [`set_actor_goal`](Evaluator::set_actor_goal): once chosen, which goal
//!    realizes it? Targets picked while scoring are kept on the evaluator until
//!    then.
//!
//! Injected (order) evaluators carry a ready-made goal from another actor and
//! are recognized with [`Evaluator::is_order`].

mod registry;
mod spec;

pub use registry::{EvaluatorCtor, EvaluatorRegistry};
pub use spec::EvaluatorSpec;

use game_core::{EntityId, Markers, Position, SpellKind};
use rand::Rng;

use crate::context::GoalContext;
use crate::error::{AiError, Result};
use crate::goal::{
    AttackActor, CastSpell, Explore, FleeFromActor, Goal, GoalType, Guard, Patrol, Retreat, Thief,
    ThiefMemory, WinBattle,
};

/// Score of an evaluator that does not apply.
pub const NOT_POSSIBLE: f64 = 0.0;

/// Score of exploring while an enemy stands next to the actor.
pub const EXPLORE_WITH_ENEMY_ADJACENT: f64 = 0.01;

/// Own health fraction below which a heal is worth casting.
const HEAL_THRESHOLD: f64 = 0.5;

/// Category of an ordered goal, which scales the order's score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum OrderCategory {
    Kill,
    Move,
    Other,
}

impl OrderCategory {
    pub fn of(goal: GoalType) -> Self {
        match goal {
            GoalType::AttackActor | GoalType::HitActor => OrderCategory::Kill,
            GoalType::MoveUntilEnemy
            | GoalType::FollowPath
            | GoalType::Guard
            | GoalType::Patrol
            | GoalType::Retreat => OrderCategory::Move,
            _ => OrderCategory::Other,
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            OrderCategory::Kill => 0.5,
            OrderCategory::Move | OrderCategory::Other => 1.0,
        }
    }
}

/// Kind-specific evaluator state.
#[derive(Clone, Debug, strum::EnumDiscriminants)]
#[strum_discriminants(
    name(EvaluatorType),
    derive(
        Hash,
        PartialOrd,
        Ord,
        strum::Display,
        strum::EnumString,
        serde::Serialize,
        serde::Deserialize
    )
)]
pub enum EvaluatorKind {
    AttackActor {
        target: Option<EntityId>,
    },
    Flee {
        /// Sticky: kept while it stays in sight.
        threat: Option<EntityId>,
    },
    Explore,
    Guard {
        at: Position,
    },
    Patrol {
        waypoints: Vec<Position>,
    },
    Orders {
        src: EntityId,
        /// Taken when the order is acted upon.
        goal: Option<Goal>,
        category: OrderCategory,
    },
    CastSpell {
        /// `None` follows the world's configured cast probability.
        cast_probability: Option<f64>,
        choice: Option<(SpellKind, EntityId)>,
    },
    WinBattle,
    Retreat,
    Thief {
        /// Held between loops; lent to the running goal.
        memory: ThiefMemory,
    },
}

#[derive(Clone, Debug)]
pub struct Evaluator {
    bias: f64,
    kind: EvaluatorKind,
}

impl Evaluator {
    pub fn new(bias: f64, kind: EvaluatorKind) -> Self {
        Self { bias, kind }
    }

    pub fn attack_actor(bias: f64) -> Self {
        Self::new(bias, EvaluatorKind::AttackActor { target: None })
    }

    pub fn flee(bias: f64) -> Self {
        Self::new(bias, EvaluatorKind::Flee { threat: None })
    }

    pub fn explore(bias: f64) -> Self {
        Self::new(bias, EvaluatorKind::Explore)
    }

    pub fn guard(bias: f64, at: Position) -> Self {
        Self::new(bias, EvaluatorKind::Guard { at })
    }

    pub fn patrol(bias: f64, waypoints: Vec<Position>) -> Self {
        Self::new(bias, EvaluatorKind::Patrol { waypoints })
    }

    /// Evaluator carrying `goal`, ordered by `src`.
    pub fn orders(bias: f64, src: EntityId, goal: Goal) -> Self {
        let category = OrderCategory::of(goal.goal_type());
        Self::new(
            bias,
            EvaluatorKind::Orders {
                src,
                goal: Some(goal),
                category,
            },
        )
    }

    pub fn cast_spell(bias: f64, cast_probability: f64) -> Self {
        Self::new(
            bias,
            EvaluatorKind::CastSpell {
                cast_probability: Some(cast_probability),
                choice: None,
            },
        )
    }

    /// Spell casting that rolls against the configured cast probability.
    pub fn configured_cast_spell(bias: f64) -> Self {
        Self::new(
            bias,
            EvaluatorKind::CastSpell {
                cast_probability: None,
                choice: None,
            },
        )
    }

    pub fn win_battle(bias: f64) -> Self {
        Self::new(bias, EvaluatorKind::WinBattle)
    }

    pub fn retreat(bias: f64) -> Self {
        Self::new(bias, EvaluatorKind::Retreat)
    }

    pub fn thief(bias: f64) -> Self {
        Self::new(bias, EvaluatorKind::Thief { memory: ThiefMemory::default() })
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub fn kind(&self) -> &EvaluatorKind {
        &self.kind
    }

    pub fn evaluator_type(&self) -> EvaluatorType {
        EvaluatorType::from(&self.kind)
    }

    /// `true` for evaluators injected by an order.
    pub fn is_order(&self) -> bool {
        matches!(self.kind, EvaluatorKind::Orders { .. })
    }

    /// Actor that issued this order, if it is one.
    pub fn order_source(&self) -> Option<EntityId> {
        match self.kind {
            EvaluatorKind::Orders { src, .. } => Some(src),
            _ => None,
        }
    }

    /// Scores this behavior for the acting actor.
    pub fn calculate_desirability(&mut self, ctx: &mut GoalContext<'_>) -> f64 {
        let bias = self.bias;
        let Ok(me) = ctx.me() else {
            return NOT_POSSIBLE;
        };
        let (pos, markers, health) = (me.position, me.markers, me.health);

        match &mut self.kind {
            EvaluatorKind::AttackActor { target } => {
                let cells = ctx.seen_cells();
                *target = ctx
                    .world
                    .find_enemy_cell(ctx.actor, &cells)
                    .and_then(|cell| ctx.world.actor_at(cell))
                    .map(|a| a.id);
                if target.is_some() { bias * 2.0 } else { NOT_POSSIBLE }
            }

            EvaluatorKind::Flee { threat } => {
                let Some(health) = health else {
                    return NOT_POSSIBLE;
                };
                let enemies = ctx.seen_enemies();
                if enemies.is_empty() || health.hp <= 0 || health.max_hp <= 0 {
                    return NOT_POSSIBLE;
                }
                let f = health.fraction();
                if f >= bias {
                    return NOT_POSSIBLE;
                }
                if !threat.is_some_and(|t| enemies.contains(&t)) {
                    *threat = enemies.first().copied();
                }
                bias * (1.0 - f) / (f * f)
            }

            EvaluatorKind::Explore => {
                let enemy_adjacent = ctx.seen_enemies().into_iter().any(|id| {
                    ctx.world
                        .actor(id)
                        .is_some_and(|a| a.position.is_adjacent(pos))
                });
                if enemy_adjacent {
                    EXPLORE_WITH_ENEMY_ADJACENT
                } else {
                    bias
                }
            }

            EvaluatorKind::Guard { .. }
            | EvaluatorKind::Patrol { .. }
            | EvaluatorKind::Thief { .. } => bias,

            EvaluatorKind::Orders { src, goal, category } => {
                if goal.is_none() {
                    return NOT_POSSIBLE;
                }
                if !accepts_orders_from(ctx, *src) {
                    tracing::warn!("{} rejects order from {src}", ctx.actor);
                    return NOT_POSSIBLE;
                }
                bias * category.factor()
            }

            EvaluatorKind::CastSpell {
                cast_probability,
                choice,
            } => {
                *choice = None;
                let Some(book) = ctx.me().ok().and_then(|a| a.spellbook.clone()) else {
                    return NOT_POSSIBLE;
                };
                let power = ctx.me().map_or(0, |a| a.power());
                let affordable: Vec<_> = book.spells.iter().filter(|s| s.power <= power).collect();
                if affordable.is_empty() {
                    return NOT_POSSIBLE;
                }
                let probability =
                    cast_probability.unwrap_or(ctx.config().ai.spellcaster.cast_probability);
                if ctx.rng().r#gen::<f64>() >= probability {
                    return NOT_POSSIBLE;
                }

                let enemies = ctx.seen_enemies();
                *choice = affordable.into_iter().find_map(|spell| match spell.kind {
                    SpellKind::FrostBolt => enemies
                        .iter()
                        .copied()
                        .find(|&e| {
                            ctx.world
                                .actor(e)
                                .is_some_and(|a| a.position.distance(pos) <= spell.range)
                        })
                        .map(|e| (spell.kind, e)),
                    SpellKind::Heal => health
                        .filter(|h| h.fraction() < HEAL_THRESHOLD)
                        .map(|_| (spell.kind, ctx.actor)),
                    SpellKind::Haste => (!enemies.is_empty() && !markers.contains(Markers::HASTED))
                        .then_some((spell.kind, ctx.actor)),
                });
                if choice.is_some() { bias } else { NOT_POSSIBLE }
            }

            EvaluatorKind::WinBattle => {
                if markers.contains(Markers::IN_BATTLE) {
                    bias
                } else {
                    NOT_POSSIBLE
                }
            }

            EvaluatorKind::Retreat => {
                if !markers.contains(Markers::IN_BATTLE) {
                    return NOT_POSSIBLE;
                }
                let enemies = ctx.seen_enemies().len();
                let friends = ctx.seen_friends().len();
                if enemies > 2 * (friends + 1) { bias } else { NOT_POSSIBLE }
            }
        }
    }

    /// Builds the goal for this behavior.
    ///
    /// Fails with [`AiError::StaleTarget`] when the target picked while scoring
    /// is gone.
    pub fn set_actor_goal(&mut self, ctx: &mut GoalContext<'_>) -> Result<Goal> {
        let evaluator = self.evaluator_type();
        let actor = ctx.actor;
        let stale = || AiError::StaleTarget { actor, evaluator };

        let ai = ctx.config().ai.clone();
        let goal = match &mut self.kind {
            EvaluatorKind::AttackActor { target } => {
                let target = alive(ctx, target.take()).ok_or_else(stale)?;
                Goal::new(AttackActor::new(target))
            }
            EvaluatorKind::Flee { threat } => {
                let threat = alive(ctx, *threat).ok_or_else(stale)?;
                Goal::new(FleeFromActor::new(threat, ai.basic.flee_turns))
            }
            EvaluatorKind::Explore => Goal::new(Explore::new(ai.basic.explore_turns)),
            EvaluatorKind::Guard { at } => Goal::new(Guard::new(*at)),
            EvaluatorKind::Patrol { waypoints } => Goal::new(Patrol::new(waypoints.clone())),
            EvaluatorKind::Orders { src, goal, .. } => {
                let mut goal = goal.take().ok_or_else(stale)?;
                tracing::info!("{actor} follows order from {src}: {}", goal.goal_type());
                goal.mark_injected();
                goal
            }
            EvaluatorKind::CastSpell { choice, .. } => {
                let (spell, target) = choice.take().ok_or_else(stale)?;
                let target = alive(ctx, Some(target)).ok_or_else(stale)?;
                Goal::new(CastSpell::new(spell, target))
            }
            EvaluatorKind::WinBattle => Goal::new(WinBattle::new()),
            EvaluatorKind::Retreat => Goal::new(Retreat::new(ai.commander.retreat_turns)),
            EvaluatorKind::Thief { memory } => Goal::new(Thief::resume(std::mem::take(memory))),
        };
        Ok(goal)
    }

    /// Memory a thief evaluator keeps between loops.
    pub fn thief_memory(&self) -> Option<&ThiefMemory> {
        match &self.kind {
            EvaluatorKind::Thief { memory } => Some(memory),
            _ => None,
        }
    }

    pub(crate) fn thief_memory_mut(&mut self) -> Option<&mut ThiefMemory> {
        match &mut self.kind {
            EvaluatorKind::Thief { memory } => Some(memory),
            _ => None,
        }
    }

    /// Serializable description, `None` for orders.
    pub fn to_spec(&self) -> Option<EvaluatorSpec> {
        EvaluatorSpec::from_evaluator(self)
    }
}

fn alive(ctx: &GoalContext<'_>, id: Option<EntityId>) -> Option<EntityId> {
    id.filter(|&id| ctx.world.is_alive(id))
}

/// Orders are only followed when they come from a commander or the player.
fn accepts_orders_from(ctx: &GoalContext<'_>, src: EntityId) -> bool {
    src.is_player()
        || ctx
            .world
            .actor(src)
            .is_some_and(|a| a.is_player() || a.has(Markers::COMMANDER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{GoalKind, HitActor};
    use crate::orders::OrderBoard;
    use game_core::{ActorState, FactionId, GameConfig, Level, Spell, World};

    fn arena() -> World {
        arena_with(GameConfig::default())
    }

    fn arena_with(config: GameConfig) -> World {
        let mut world = World::new(
            Level::from_ascii(&["..........", "..........", ".........."]).unwrap(),
            config,
            99,
        );
        world
            .spawn(ActorState::new(EntityId(1), "me", Position::new(1, 1), FactionId(1)).with_health(100, 100))
            .unwrap();
        world.add_enemy_group(EntityId(1), FactionId(2)).unwrap();
        world
    }

    fn enemy(world: &mut World, id: u32, at: Position) {
        world
            .spawn(ActorState::new(EntityId(id), "foe", at, FactionId(2)).with_health(10, 10))
            .unwrap();
    }

    fn set_hp(world: &mut World, hp: i32) {
        world.actor_mut(EntityId(1)).unwrap().health.as_mut().unwrap().hp = hp;
    }

    #[test]
    fn attack_scores_double_bias_when_an_enemy_is_seen() {
        let mut world = arena();
        let mut board = OrderBoard::new();
        let mut ev = Evaluator::attack_actor(0.75);

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), NOT_POSSIBLE);

        enemy(&mut world, 2, Position::new(5, 1));
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), 1.5);
        let goal = ev.set_actor_goal(&mut ctx).unwrap();
        assert!(matches!(goal.kind(), GoalKind::AttackActor(a) if a.target() == EntityId(2)));
    }

    #[test]
    fn flee_follows_the_health_curve() {
        let mut world = arena();
        enemy(&mut world, 2, Position::new(4, 1));
        let mut board = OrderBoard::new();
        let mut ev = Evaluator::flee(0.3);

        set_hp(&mut world, 10);
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        let score = ev.calculate_desirability(&mut ctx);
        assert!((score - 27.0).abs() < 1e-9, "score {score}");
        assert_eq!(ev.calculate_desirability(&mut ctx), score);

        set_hp(&mut world, 50);
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), NOT_POSSIBLE);
    }

    #[test]
    fn flee_keeps_its_threat_while_visible() {
        let mut world = arena();
        enemy(&mut world, 2, Position::new(4, 1));
        enemy(&mut world, 3, Position::new(2, 2));
        set_hp(&mut world, 10);
        let mut board = OrderBoard::new();
        let mut ev = Evaluator::flee(0.3);

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        ev.calculate_desirability(&mut ctx);
        let EvaluatorKind::Flee { threat } = ev.kind() else { unreachable!() };
        let first = threat.unwrap();

        world.actor_mut(EntityId(3)).unwrap().position = Position::new(0, 0);
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        ev.calculate_desirability(&mut ctx);
        let EvaluatorKind::Flee { threat } = ev.kind() else { unreachable!() };
        assert_eq!(*threat, Some(first));
    }

    #[test]
    fn explore_backs_off_next_to_an_enemy() {
        let mut world = arena();
        let mut board = OrderBoard::new();
        let mut ev = Evaluator::explore(0.2);

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), 0.2);

        enemy(&mut world, 2, Position::new(2, 2));
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), EXPLORE_WITH_ENEMY_ADJACENT);
    }

    #[test]
    fn orders_need_an_accepted_source() {
        let mut world = arena();
        world
            .spawn(ActorState::new(EntityId(5), "grunt", Position::new(8, 1), FactionId(1)))
            .unwrap();
        world
            .spawn(
                ActorState::new(EntityId(6), "captain", Position::new(8, 2), FactionId(1))
                    .with_markers(Markers::COMMANDER),
            )
            .unwrap();
        let mut board = OrderBoard::new();

        let mut from_grunt = Evaluator::orders(0.7, EntityId(5), Goal::new(Guard::new(Position::ORIGIN)));
        let mut from_captain =
            Evaluator::orders(0.7, EntityId(6), Goal::new(HitActor::new(EntityId(9))));

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(from_grunt.calculate_desirability(&mut ctx), NOT_POSSIBLE);
        assert!((from_captain.calculate_desirability(&mut ctx) - 0.35).abs() < 1e-12);

        let goal = from_captain.set_actor_goal(&mut ctx).unwrap();
        assert!(goal.is_injected());
        assert_eq!(from_captain.calculate_desirability(&mut ctx), NOT_POSSIBLE);
        assert!(matches!(
            from_captain.set_actor_goal(&mut ctx),
            Err(AiError::StaleTarget { evaluator: EvaluatorType::Orders, .. })
        ));
    }

    #[test]
    fn stale_attack_target_is_fatal() {
        let mut world = arena();
        enemy(&mut world, 2, Position::new(3, 1));
        let mut board = OrderBoard::new();
        let mut ev = Evaluator::attack_actor(1.0);

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        ev.calculate_desirability(&mut ctx);
        ctx.world.actor_mut(EntityId(2)).unwrap().health.as_mut().unwrap().hp = 0;
        assert_eq!(
            ev.set_actor_goal(&mut ctx).unwrap_err(),
            AiError::StaleTarget { actor: EntityId(1), evaluator: EvaluatorType::AttackActor }
        );
    }

    #[test]
    fn cast_spell_roll_follows_the_probability() {
        let mut world = arena();
        enemy(&mut world, 2, Position::new(4, 1));
        {
            let me = world.actor_mut(EntityId(1)).unwrap();
            me.spell_power = Some(game_core::SpellPower::new(1000, 1000));
            me.spellbook = Some(game_core::Spellbook::new(vec![Spell::new(SpellKind::FrostBolt, 0, 5)]));
        }
        let mut board = OrderBoard::new();
        let mut ev = Evaluator::cast_spell(2.0, 0.25);

        let trials = 2000;
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        let cast = (0..trials)
            .filter(|_| ev.calculate_desirability(&mut ctx) > NOT_POSSIBLE)
            .count();
        let rate = cast as f64 / trials as f64;
        assert!((0.2..0.3).contains(&rate), "cast rate {rate}");
    }

    #[test]
    fn configured_cast_spell_rolls_against_the_loaded_tuning() {
        for (probability, expected) in [(0.0, NOT_POSSIBLE), (1.0, 2.0)] {
            let mut config = GameConfig::default();
            config.ai.spellcaster.cast_probability = probability;
            let mut world = arena_with(config);
            enemy(&mut world, 2, Position::new(4, 1));
            {
                let me = world.actor_mut(EntityId(1)).unwrap();
                me.spell_power = Some(game_core::SpellPower::new(10, 10));
                me.spellbook = Some(game_core::Spellbook::new(vec![Spell::new(SpellKind::FrostBolt, 1, 5)]));
            }
            let mut board = OrderBoard::new();
            let mut ev = EvaluatorRegistry::builtin().build("CastSpell", 2.0).unwrap();

            let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
            for _ in 0..20 {
                assert_eq!(ev.calculate_desirability(&mut ctx), expected);
            }
        }
    }

    #[test]
    fn cast_spell_needs_power_and_a_reason() {
        let mut world = arena();
        {
            let me = world.actor_mut(EntityId(1)).unwrap();
            me.spell_power = Some(game_core::SpellPower::new(2, 10));
            me.spellbook = Some(game_core::Spellbook::new(vec![
                Spell::new(SpellKind::FrostBolt, 5, 5),
                Spell::new(SpellKind::Heal, 1, 0),
            ]));
        }
        let mut board = OrderBoard::new();
        let mut ev = Evaluator::cast_spell(2.0, 1.0);

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), NOT_POSSIBLE);

        set_hp(&mut world, 20);
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), 2.0);
        let goal = ev.set_actor_goal(&mut ctx).unwrap();
        assert!(matches!(goal.kind(), GoalKind::CastSpell(c) if c.spell() == SpellKind::Heal));
    }

    #[test]
    fn retreat_needs_to_be_outnumbered_in_battle() {
        let mut world = arena();
        for (i, x) in (2..5).enumerate() {
            enemy(&mut world, 10 + i as u32, Position::new(x + 3, 0));
        }
        let mut board = OrderBoard::new();
        let mut ev = Evaluator::retreat(5.0);

        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), NOT_POSSIBLE);

        world.actor_mut(EntityId(1)).unwrap().markers.insert(Markers::IN_BATTLE);
        let mut ctx = GoalContext::new(EntityId(1), &mut world, &mut board);
        assert_eq!(ev.calculate_desirability(&mut ctx), 5.0);
    }

    #[test]
    fn order_categories_scale_scores() {
        assert_eq!(OrderCategory::of(GoalType::AttackActor), OrderCategory::Kill);
        assert_eq!(OrderCategory::of(GoalType::MoveUntilEnemy), OrderCategory::Move);
        assert_eq!(OrderCategory::of(GoalType::Thief), OrderCategory::Other);
        assert_eq!(OrderCategory::Kill.factor(), 0.5);
    }
}
