//! Errors surfaced by the decision system.
//!
//! Only configuration mistakes and broken invariants are errors. An evaluator
//! that has nothing to do scores [`NOT_POSSIBLE`](crate::NOT_POSSIBLE), and a
//! rejected order is logged and ignored.

use game_core::{EntityId, ErrorSeverity};
use thiserror::Error;

use crate::evaluator::EvaluatorType;

pub type Result<T> = std::result::Result<T, AiError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    #[error("actor {actor} has no evaluators to arbitrate between")]
    NoEvaluators { actor: EntityId },

    #[error("{evaluator} evaluator of actor {actor} lost its target before the goal was set")]
    StaleTarget {
        actor: EntityId,
        evaluator: EvaluatorType,
    },

    #[error("unknown evaluator name {0:?}")]
    UnknownEvaluator(String),

    #[error("evaluator name {0:?} is already registered")]
    DuplicateEvaluator(&'static str),

    #[error("actor {0} does not exist in the world")]
    MissingActor(EntityId),
}

impl AiError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEvaluator(_) | Self::DuplicateEvaluator(_) => ErrorSeverity::Validation,
            Self::NoEvaluators { .. } | Self::StaleTarget { .. } | Self::MissingActor(_) => {
                ErrorSeverity::Fatal
            }
        }
    }
}
