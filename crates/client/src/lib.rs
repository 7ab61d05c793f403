//! Headless skirmish driver.
//!
//! # Architecture
//!
//! ```text
//! Skirmish
//!   ├─→ World  (level, actors, seeded random source)
//!   └─→ Brains (one GoalTop per brain-driven actor, shared order board)
//! ```
//!
//! Each round every actor takes one turn in id order: its brain decides, then
//! the requests it posted are resolved against the world. Actors without a
//! brain (the player) only have their order requests reported.

pub mod config;

pub use config::SkirmishConfig;

use std::collections::BTreeSet;

use anyhow::Result;
use game_content::{ConfigLoader, Scenario, ScenarioLoader};
use game_core::{EntityId, ErrorSeverity, Markers, Outcome, World, resolve_requests};
use npc_ai::{Brain, Brains, GoalTop, Role};

/// Tuning used when no configuration file is given.
pub const DEFAULT_CONFIG: &str = include_str!("../data/config.toml");

/// Town skirmish played when no scenario file is given.
pub const DEFAULT_SCENARIO: &str = include_str!("../data/skirmish.ron");

/// Tally of resolved requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub moves: u32,
    pub hits: u32,
    pub kills: u32,
    pub casts: u32,
    pub pickups: u32,
    pub trades: u32,
    /// Decision errors; the failing actor loses its turn.
    pub errors: u32,
}

impl RoundReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Moved { .. } => self.moves += 1,
            Outcome::Hit { killed, .. } => {
                self.hits += 1;
                if *killed {
                    self.kills += 1;
                }
            }
            Outcome::Cast { .. } => self.casts += 1,
            Outcome::PickedUp { items, .. } if *items > 0 => self.pickups += 1,
            Outcome::Traded { .. } => self.trades += 1,
            _ => {}
        }
    }

    fn absorb(&mut self, other: &RoundReport) {
        self.moves += other.moves;
        self.hits += other.hits;
        self.kills += other.kills;
        self.casts += other.casts;
        self.pickups += other.pickups;
        self.trades += other.trades;
        self.errors += other.errors;
    }
}

pub struct Skirmish {
    world: World,
    brains: Brains,
}

impl Skirmish {
    /// Loads configuration and scenario, falling back to the built-in ones.
    pub fn from_config(config: &SkirmishConfig) -> Result<Self> {
        let game = match &config.config_path {
            Some(path) => ConfigLoader::load(path)?,
            None => ConfigLoader::parse(DEFAULT_CONFIG)?,
        };
        let spec = match &config.level_path {
            Some(path) => ScenarioLoader::load(path)?,
            None => ScenarioLoader::parse(DEFAULT_SCENARIO)?,
        };
        Self::new(spec.build(game, config.seed)?)
    }

    pub fn new(scenario: Scenario) -> Result<Self> {
        let Scenario {
            mut world,
            brains: roles,
        } = scenario;
        let ai = world.config().ai.clone();

        let mut brains = Brains::new();
        for (id, name) in roles {
            let role: Role = name
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown brain role '{}' for actor {}", name, id))?;
            let top = GoalTop::for_role(role, &ai, world.rng());
            tracing::debug!("{id} thinks as {role} (attack bias {:.2})", top.biases().attack);
            brains.insert(Brain::new(id, top));
        }
        Ok(Self { world, brains })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn brains(&self) -> &Brains {
        &self.brains
    }

    /// Plays one turn of every actor.
    pub fn play_round(&mut self) -> Result<RoundReport> {
        let mut report = RoundReport::default();

        for id in self.world.actor_ids() {
            if let Err(e) = self.brains.take_turn(id, &mut self.world) {
                report.errors += 1;
                match e.severity() {
                    ErrorSeverity::Validation => tracing::warn!("{id}: {e}"),
                    ErrorSeverity::Fatal => {
                        tracing::error!("{id}: {e} ({})", e.severity().as_str())
                    }
                }
            }
            self.report_player_orders(id);

            for outcome in resolve_requests(&mut self.world, id)? {
                tracing::debug!("{outcome:?}");
                report.record(&outcome);
            }
        }

        self.world.advance_turn();
        Ok(report)
    }

    /// Plays up to `rounds` rounds, stopping early once the battle is decided.
    pub fn run(&mut self, rounds: u32) -> Result<RoundReport> {
        let mut total = RoundReport::default();
        for _ in 0..rounds {
            let report = self.play_round()?;
            if report.kills > 0 {
                tracing::info!("turn {}: {} fallen", self.world.turn(), report.kills);
            }
            total.absorb(&report);

            if self.is_decided() {
                tracing::info!("battle decided after {} turns", self.world.turn());
                break;
            }
        }
        Ok(total)
    }

    /// True once at most one faction still has living battle participants.
    pub fn is_decided(&self) -> bool {
        let standing: BTreeSet<_> = self
            .world
            .actors()
            .filter(|a| a.is_alive() && a.has(Markers::IN_BATTLE))
            .map(|a| a.faction)
            .collect();
        standing.len() <= 1
    }

    fn report_player_orders(&mut self, id: EntityId) {
        let Some(player) = self.world.actor_mut(id).filter(|a| a.is_player()) else {
            return;
        };
        for request in std::mem::take(&mut player.order_requests) {
            tracing::info!("{} asks the player: {:?}", request.src, request.directive);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_content_builds_every_brain() {
        let skirmish = Skirmish::from_config(&SkirmishConfig::default()).unwrap();
        let brains: Vec<_> = skirmish.brains().actors().collect();
        assert_eq!(brains.len(), 9);
        let thief = skirmish.brains().get(EntityId(20)).unwrap();
        assert_eq!(thief.top().role(), Role::Thief);
        assert!(!skirmish.is_decided());
    }

    #[test]
    fn builtin_scenario_carries_battle_markers() {
        let scenario = ScenarioLoader::parse(DEFAULT_SCENARIO)
            .unwrap()
            .build(game_core::GameConfig::default(), 7)
            .unwrap();
        let world = &scenario.world;
        for commander in [EntityId(1), EntityId(11)] {
            assert!(world.actor(commander).unwrap().has(Markers::COMMANDER | Markers::IN_BATTLE));
        }
        assert!(world.actor(EntityId(2)).unwrap().has(Markers::IN_BATTLE));
        assert!(!world.actor(EntityId(20)).unwrap().has(Markers::IN_BATTLE));
    }

    #[test]
    fn rounds_are_played_without_decision_errors() {
        let mut skirmish = Skirmish::from_config(&SkirmishConfig::default()).unwrap();
        let report = skirmish.run(30).unwrap();
        assert_eq!(report.errors, 0);
        assert!(report.moves > 0);
        assert!(skirmish.world().turn() <= 30);
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let spec = ScenarioLoader::parse(
            r#"(level: (rows: ["..."]), actors: [(id: 1, name: "bard", faction: 1, at: (x: 0, y: 0), brain: Some("Bard"))])"#,
        )
        .unwrap();
        let scenario = spec.build(game_core::GameConfig::default(), 1).unwrap();
        let err = Skirmish::new(scenario).err().unwrap();
        assert!(err.to_string().contains("Bard"));
    }
}
