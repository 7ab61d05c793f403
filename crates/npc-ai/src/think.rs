//! Role-specialized top goals.
//!
//! A role fixes which evaluators an actor starts with and the bias table its
//! orders are scored with:
//!
//! - **Basic**: attack, flee, explore
//! - **Spellcaster**: basic plus spell casting
//! - **Commander**: basic with a lower attack bias, plus battle goals
//! - **Thief**: basic plus the thief loop

use std::collections::HashMap;

use game_core::AiConfig;
use rand::Rng;

use crate::evaluator::{Evaluator, EvaluatorType};
use crate::top::GoalTop;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Role {
    Basic,
    Spellcaster,
    Commander,
    Thief,
}

/// Per-actor biases shared by every role.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiasTable {
    pub attack: f64,
    pub explore: f64,
    pub flee: f64,
    pub order: f64,
    pub patrol: f64,
}

impl Default for BiasTable {
    fn default() -> Self {
        let basic = game_core::BasicBiases::default();
        Self {
            attack: basic.attack_max,
            explore: basic.explore,
            flee: basic.flee,
            order: basic.order,
            patrol: basic.patrol,
        }
    }
}

impl BiasTable {
    /// Draws the attack bias from the configured range.
    pub fn roll(config: &AiConfig, rng: &mut impl Rng) -> Self {
        let basic = &config.basic;
        let (lo, hi) = (
            basic.attack_min.min(basic.attack_max),
            basic.attack_min.max(basic.attack_max),
        );
        let attack = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        Self {
            attack,
            explore: basic.explore,
            flee: basic.flee,
            order: basic.order,
            patrol: basic.patrol,
        }
    }

    /// Copies the entries of `biases` that map onto this table.
    pub fn apply(&mut self, biases: &HashMap<EvaluatorType, f64>) {
        for (&kind, &bias) in biases {
            match kind {
                EvaluatorType::AttackActor => self.attack = bias,
                EvaluatorType::Explore => self.explore = bias,
                EvaluatorType::Flee => self.flee = bias,
                EvaluatorType::Orders => self.order = bias,
                EvaluatorType::Patrol => self.patrol = bias,
                _ => {}
            }
        }
    }
}

impl GoalTop {
    /// Default brain: attack, flee and explore.
    pub fn think_basic(config: &AiConfig, rng: &mut impl Rng) -> Self {
        let biases = BiasTable::roll(config, rng);
        Self::with_basic_evaluators(Role::Basic, biases)
    }

    /// Basic brain that also casts spells.
    pub fn think_spellcaster(config: &AiConfig, rng: &mut impl Rng) -> Self {
        let biases = BiasTable::roll(config, rng);
        let mut top = Self::with_basic_evaluators(Role::Spellcaster, biases);
        top.add_evaluator(Evaluator::cast_spell(
            config.spellcaster.cast_spell,
            config.spellcaster.cast_probability,
        ));
        top
    }

    /// Battle leader: attacks less eagerly and pursues battle goals.
    pub fn think_commander(config: &AiConfig, rng: &mut impl Rng) -> Self {
        let mut biases = BiasTable::roll(config, rng);
        biases.attack = config.commander.attack;
        let mut top = Self::with_basic_evaluators(Role::Commander, biases);
        top.add_evaluator(Evaluator::win_battle(config.commander.win_battle));
        top.add_evaluator(Evaluator::retreat(config.commander.retreat));
        top
    }

    /// Basic brain that roams for loot when nothing else is pressing.
    pub fn think_thief(config: &AiConfig, rng: &mut impl Rng) -> Self {
        let biases = BiasTable::roll(config, rng);
        let mut top = Self::with_basic_evaluators(Role::Thief, biases);
        top.add_evaluator(Evaluator::thief(config.thief.bias));
        top
    }

    /// Top goal for `role`.
    pub fn for_role(role: Role, config: &AiConfig, rng: &mut impl Rng) -> Self {
        match role {
            Role::Basic => Self::think_basic(config, rng),
            Role::Spellcaster => Self::think_spellcaster(config, rng),
            Role::Commander => Self::think_commander(config, rng),
            Role::Thief => Self::think_thief(config, rng),
        }
    }

    fn with_basic_evaluators(role: Role, biases: BiasTable) -> Self {
        let mut top = Self::new(role, biases);
        top.add_evaluator(Evaluator::attack_actor(biases.attack));
        top.add_evaluator(Evaluator::flee(biases.flee));
        top.add_evaluator(Evaluator::explore(biases.explore));
        top
    }
}
