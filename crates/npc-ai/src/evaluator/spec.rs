//! Serializable evaluator descriptions for save/restore.
//!
//! A spec holds the constructor arguments of an evaluator, never its transient
//! targets. Orders carry a live goal from another actor and have no spec.

use game_core::Position;
use serde::{Deserialize, Serialize};

use super::{Evaluator, EvaluatorKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EvaluatorSpec {
    AttackActor { bias: f64 },
    Flee { bias: f64 },
    Explore { bias: f64 },
    Guard { bias: f64, at: Position },
    Patrol { bias: f64, waypoints: Vec<Position> },
    CastSpell {
        bias: f64,
        /// Absent when the evaluator follows the configured probability.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cast_probability: Option<f64>,
    },
    WinBattle { bias: f64 },
    Retreat { bias: f64 },
    Thief { bias: f64 },
}

impl EvaluatorSpec {
    pub(super) fn from_evaluator(evaluator: &Evaluator) -> Option<Self> {
        let bias = evaluator.bias;
        Some(match &evaluator.kind {
            EvaluatorKind::AttackActor { .. } => Self::AttackActor { bias },
            EvaluatorKind::Flee { .. } => Self::Flee { bias },
            EvaluatorKind::Explore => Self::Explore { bias },
            EvaluatorKind::Guard { at } => Self::Guard { bias, at: *at },
            EvaluatorKind::Patrol { waypoints } => Self::Patrol {
                bias,
                waypoints: waypoints.clone(),
            },
            EvaluatorKind::Orders { .. } => return None,
            EvaluatorKind::CastSpell {
                cast_probability, ..
            } => Self::CastSpell {
                bias,
                cast_probability: *cast_probability,
            },
            EvaluatorKind::WinBattle => Self::WinBattle { bias },
            EvaluatorKind::Retreat => Self::Retreat { bias },
            EvaluatorKind::Thief { .. } => Self::Thief { bias },
        })
    }
}

impl From<EvaluatorSpec> for Evaluator {
    fn from(spec: EvaluatorSpec) -> Self {
        match spec {
            EvaluatorSpec::AttackActor { bias } => Evaluator::attack_actor(bias),
            EvaluatorSpec::Flee { bias } => Evaluator::flee(bias),
            EvaluatorSpec::Explore { bias } => Evaluator::explore(bias),
            EvaluatorSpec::Guard { bias, at } => Evaluator::guard(bias, at),
            EvaluatorSpec::Patrol { bias, waypoints } => Evaluator::patrol(bias, waypoints),
            EvaluatorSpec::CastSpell {
                bias,
                cast_probability,
            } => match cast_probability {
                Some(p) => Evaluator::cast_spell(bias, p),
                None => Evaluator::configured_cast_spell(bias),
            },
            EvaluatorSpec::WinBattle { bias } => Evaluator::win_battle(bias),
            EvaluatorSpec::Retreat { bias } => Evaluator::retreat(bias),
            EvaluatorSpec::Thief { bias } => Evaluator::thief(bias),
        }
    }
}
