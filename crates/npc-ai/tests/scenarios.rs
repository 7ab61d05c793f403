//! Multi-actor scenarios driven through brains and the request resolver.

use game_core::{
    ActionRequest, ActorState, Directive, EntityId, FactionId, GameConfig, Item, ItemId, Level,
    Markers, Outcome, Position, World, resolve_requests,
};
use npc_ai::goal::SearchHouse;
use npc_ai::{
    Brain, Brains, Evaluator, Goal, GoalStatus, GoalTop, GoalType, Order, Role, BiasTable,
};

const TOWN: [&str; 5] = [
    "..........",
    ".####.....",
    ".#,,+...$.",
    ".####.....",
    "..........",
];

fn open_field(width: usize, height: usize, seed: u64) -> World {
    let rows = vec![".".repeat(width); height];
    World::new(Level::from_ascii(&rows).unwrap(), GameConfig::default(), seed)
}

fn soldier(id: u32, at: Position, faction: u16) -> ActorState {
    ActorState::new(EntityId(id), format!("soldier-{id}"), at, FactionId(faction)).with_health(10, 10)
}

fn hostile(world: &mut World, a: u16, b: u16) {
    for id in world.actor_ids() {
        let faction = world.actor(id).unwrap().faction;
        let other = if faction == FactionId(a) { FactionId(b) } else { FactionId(a) };
        world.add_enemy_group(id, other).unwrap();
    }
}

fn brain(world: &mut World, id: u32, role: Role) -> Brain {
    let ai = world.config().ai.clone();
    Brain::new(EntityId(id), GoalTop::for_role(role, &ai, world.rng()))
}

#[test]
fn thief_sells_its_loot_in_a_shop() {
    let mut world = World::new(Level::from_ascii(&TOWN).unwrap(), GameConfig::default(), 3);
    let shop = Position::new(8, 2);
    world
        .spawn(
            ActorState::new(EntityId(1), "thief", shop, FactionId(3))
                .with_item(Item::new(ItemId(4), "silver spoon", 12).with_owner(EntityId(1))),
        )
        .unwrap();
    let mut brains = Brains::new();
    let thief = brain(&mut world, 1, Role::Thief);
    brains.insert(thief);

    let status = brains.take_turn(EntityId(1), &mut world).unwrap();
    assert_eq!(status, Some(GoalStatus::Completed));
    assert!(brains.get(EntityId(1)).unwrap().top().status().is_inactive());

    let outcomes = resolve_requests(&mut world, EntityId(1)).unwrap();
    assert!(matches!(outcomes.as_slice(), [Outcome::Traded { price: 12, .. }]));
    let thief = world.actor(EntityId(1)).unwrap();
    assert_eq!(thief.gold, 12);
    assert!(world.level().cell(shop).unwrap().items()[0].is_unpaid());
}

#[test]
fn exhausted_house_search_leaves_through_the_door() {
    let mut world = World::new(Level::from_ascii(&TOWN).unwrap(), GameConfig::default(), 3);
    let door = Position::new(4, 2);
    world
        .spawn(ActorState::new(EntityId(1), "thief", door, FactionId(3)))
        .unwrap();
    let mut brains = Brains::new();
    let mut thief = brain(&mut world, 1, Role::Thief);
    thief.top_mut().add_goal(Goal::new(SearchHouse::new(0, door)));
    brains.insert(thief);

    let status = brains.take_turn(EntityId(1), &mut world).unwrap();
    assert_eq!(status, Some(GoalStatus::Completed));

    resolve_requests(&mut world, EntityId(1)).unwrap();
    let at = world.actor(EntityId(1)).unwrap().position;
    assert_ne!(at, door);
    let cell = world.level().cell(at).unwrap();
    assert!(!cell.is_house_floor() && !cell.has_door());
}

#[test]
fn badly_hurt_soldier_flees_instead_of_fighting() {
    let mut world = open_field(12, 5, 8);
    world.spawn(soldier(1, Position::new(5, 2), 1)).unwrap();
    world.spawn(soldier(2, Position::new(6, 2), 2)).unwrap();
    hostile(&mut world, 1, 2);
    world.actor_mut(EntityId(1)).unwrap().health.as_mut().unwrap().hp = 1;

    let mut top = GoalTop::new(Role::Basic, BiasTable::default());
    top.add_evaluator(Evaluator::attack_actor(1.0));
    top.add_evaluator(Evaluator::flee(0.3));
    let mut brains = Brains::new();
    brains.insert(Brain::new(EntityId(1), top));

    brains.take_turn(EntityId(1), &mut world).unwrap();
    let goal = brains.get(EntityId(1)).unwrap().top().current_goal().unwrap();
    assert_eq!(goal.goal_type(), GoalType::FleeFromActor);

    resolve_requests(&mut world, EntityId(1)).unwrap();
    assert!(world.actor(EntityId(1)).unwrap().position.x < 5);
}

#[test]
fn commander_marches_the_army_toward_the_center() {
    let mut world = open_field(20, 20, 11);
    world
        .spawn(
            ActorState::new(EntityId(1), "captain", Position::new(2, 2), FactionId(1))
                .with_markers(Markers::COMMANDER | Markers::IN_BATTLE),
        )
        .unwrap();
    world.spawn(soldier(2, Position::new(3, 2), 1)).unwrap();
    world.spawn(soldier(3, Position::new(2, 3), 1)).unwrap();
    world.spawn(soldier(9, Position::new(18, 18), 2)).unwrap();
    hostile(&mut world, 1, 2);

    let mut brains = Brains::new();
    for (id, role) in [(1, Role::Commander), (2, Role::Basic), (3, Role::Basic)] {
        let b = brain(&mut world, id, role);
        brains.insert(b);
    }

    assert_eq!(
        brains.take_turn(EntityId(1), &mut world).unwrap(),
        Some(GoalStatus::Active)
    );
    let plan = brains.get(EntityId(1)).unwrap().top().current_goal().unwrap();
    assert_eq!(plan.goal_type(), GoalType::WinBattle);
    assert_eq!(plan.sub_goals()[0].goal_type(), GoalType::FindEnemyArmy);

    let march = Directive::MoveUntilEnemy { dx: 1, dy: 1 };
    for friend in [EntityId(2), EntityId(3), EntityId(1)] {
        assert_eq!(
            brains.board().pending(friend),
            &[Order::new(EntityId(1), march.clone())][..]
        );
    }

    brains.take_turn(EntityId(2), &mut world).unwrap();
    let top = brains.get(EntityId(2)).unwrap().top();
    let goal = top.current_goal().unwrap();
    assert_eq!(goal.goal_type(), GoalType::MoveUntilEnemy);
    assert!(goal.is_injected());
    assert!(brains.board().pending(EntityId(2)).is_empty());
}

#[test]
fn engage_orders_reach_the_player_as_requests() {
    let mut world = open_field(12, 6, 2);
    world
        .spawn(
            ActorState::new(EntityId(1), "captain", Position::new(2, 2), FactionId(1))
                .with_markers(Markers::COMMANDER | Markers::IN_BATTLE),
        )
        .unwrap();
    world
        .spawn(
            ActorState::new(EntityId::PLAYER, "hero", Position::new(2, 3), FactionId(1))
                .with_markers(Markers::PLAYER),
        )
        .unwrap();
    world.spawn(soldier(2, Position::new(3, 2), 1)).unwrap();
    world.spawn(soldier(9, Position::new(6, 2), 2)).unwrap();
    hostile(&mut world, 1, 2);

    let mut brains = Brains::new();
    let commander = brain(&mut world, 1, Role::Commander);
    brains.insert(commander);
    brains.take_turn(EntityId(1), &mut world).unwrap();

    let plan = brains.get(EntityId(1)).unwrap().top().current_goal().unwrap();
    assert_eq!(plan.sub_goals()[0].goal_type(), GoalType::EngageEnemy);

    let attack = Directive::AttackActor { target: EntityId(9) };
    assert_eq!(
        brains.board().pending(EntityId(2)),
        &[Order::new(EntityId(1), attack.clone())][..]
    );
    assert!(brains.board().pending(EntityId::PLAYER).is_empty());
    let player = world.actor(EntityId::PLAYER).unwrap();
    assert_eq!(player.order_requests.len(), 1);
    assert_eq!(player.order_requests[0].directive, attack);
}

#[test]
fn a_new_order_terminates_the_running_one() {
    let mut world = open_field(10, 4, 5);
    world
        .spawn(
            ActorState::new(EntityId(1), "captain", Position::new(0, 0), FactionId(1))
                .with_markers(Markers::COMMANDER),
        )
        .unwrap();
    world.spawn(soldier(2, Position::new(4, 1), 1)).unwrap();
    let mut brains = Brains::new();
    let private = brain(&mut world, 2, Role::Basic);
    brains.insert(private);

    let config = world.config().clone();
    let guard = Order::new(EntityId(1), Directive::Guard { at: Position::new(8, 1) });
    brains.get_mut(EntityId(2)).unwrap().receive(guard, &config);
    brains.take_turn(EntityId(2), &mut world).unwrap();
    let top = brains.get(EntityId(2)).unwrap().top();
    assert_eq!(top.current_goal().unwrap().goal_type(), GoalType::Guard);

    let march = Order::new(EntityId(1), Directive::MoveUntilEnemy { dx: -1, dy: 0 });
    brains.get_mut(EntityId(2)).unwrap().receive(march, &config);
    let top = brains.get(EntityId(2)).unwrap().top();
    assert!(top.status().is_inactive());
    assert!(top.current_goal().is_none());

    brains.take_turn(EntityId(2), &mut world).unwrap();
    let top = brains.get(EntityId(2)).unwrap().top();
    assert_eq!(top.current_goal().unwrap().goal_type(), GoalType::MoveUntilEnemy);
    assert_eq!(top.orders().count(), 1);
}

#[test]
fn ties_go_to_the_first_evaluator() {
    let mut world = open_field(6, 1, 1);
    world.spawn(soldier(1, Position::new(2, 0), 1)).unwrap();

    let mut top = GoalTop::new(Role::Basic, BiasTable::default());
    top.add_evaluator(Evaluator::guard(0.5, Position::new(0, 0)));
    top.add_evaluator(Evaluator::guard(0.5, Position::new(5, 0)));
    let mut brains = Brains::new();
    brains.insert(Brain::new(EntityId(1), top));

    brains.take_turn(EntityId(1), &mut world).unwrap();
    assert_eq!(
        world.actor(EntityId(1)).unwrap().requests,
        vec![ActionRequest::Move { to: Position::new(1, 0) }]
    );
}

#[test]
fn finished_goals_re_arm_the_root_for_the_next_turn() {
    let mut world = open_field(6, 1, 1);
    world.spawn(soldier(1, Position::new(2, 0), 1)).unwrap();

    let mut top = GoalTop::new(Role::Basic, BiasTable::default());
    top.add_evaluator(Evaluator::guard(0.5, Position::new(4, 0)));
    top.add_goal(Goal::new(npc_ai::goal::FollowPath::new(vec![Position::new(3, 0)])));
    let mut brains = Brains::new();
    brains.insert(Brain::new(EntityId(1), top));

    // The pushed path bypasses arbitration and finishes this turn.
    assert_eq!(
        brains.take_turn(EntityId(1), &mut world).unwrap(),
        Some(GoalStatus::Completed)
    );
    assert!(brains.get(EntityId(1)).unwrap().top().status().is_inactive());
    resolve_requests(&mut world, EntityId(1)).unwrap();

    brains.take_turn(EntityId(1), &mut world).unwrap();
    let top = brains.get(EntityId(1)).unwrap().top();
    assert_eq!(top.current_goal().unwrap().goal_type(), GoalType::Guard);
}

#[test]
fn two_squads_fight_it_out() {
    let mut world = open_field(10, 6, 17);
    world.spawn(soldier(1, Position::new(1, 2), 1)).unwrap();
    world.spawn(soldier(2, Position::new(1, 3), 1)).unwrap();
    world.spawn(soldier(3, Position::new(6, 2), 2)).unwrap();
    world.spawn(soldier(4, Position::new(6, 3), 2)).unwrap();
    hostile(&mut world, 1, 2);

    let mut brains = Brains::new();
    for id in 1..=4 {
        let b = brain(&mut world, id, Role::Basic);
        brains.insert(b);
    }

    let mut hits = 0;
    for _ in 0..40 {
        for id in world.actor_ids() {
            brains.take_turn(id, &mut world).unwrap();
            let outcomes = resolve_requests(&mut world, id).unwrap();
            hits += outcomes
                .iter()
                .filter(|o| matches!(o, Outcome::Hit { .. }))
                .count();
        }
        world.advance_turn();
    }

    assert!(hits > 0);
    assert_eq!(world.turn(), 40);
}
