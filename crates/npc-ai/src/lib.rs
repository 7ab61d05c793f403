//! Goal-oriented decision making for non-player actors.
//!
//! Every actor with a brain owns a [`GoalTop`]: a set of [`Evaluator`]s that
//! score candidate behaviors, plus a stack of running [`Goal`]s. Once per turn
//! the top goal either arbitrates (when inactive) or keeps driving the goal it
//! chose. Goals never touch the world directly; they post
//! [`game_core::ActionRequest`]s that the world resolves afterwards.
//!
//! Actors coordinate through orders: a commander posts an [`Order`] on the
//! shared [`OrderBoard`] and the target turns it into an injected evaluator at
//! the start of its own turn (see [`Brain::take_turn`]).
//!
//! Module map:
//! - [`status`]: goal lifecycle states
//! - [`goal`]: the goal node, its sub-goal stack and every concrete goal
//! - [`evaluator`]: desirability scoring, save specs and the name registry
//! - [`top`]: arbitration and the external control surface
//! - [`think`]: per-role evaluator sets
//! - [`brain`]: turn driver tying tops to the order board
pub mod brain;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod goal;
pub mod orders;
pub mod status;
pub mod think;
pub mod top;

pub use brain::{Brain, Brains};
pub use context::GoalContext;
pub use error::{AiError, Result};
pub use evaluator::{
    Evaluator, EvaluatorKind, EvaluatorRegistry, EvaluatorSpec, EvaluatorType, NOT_POSSIBLE,
    OrderCategory,
};
pub use goal::{Goal, GoalKind, GoalType, Node};
pub use orders::{Order, OrderBoard};
pub use status::GoalStatus;
pub use think::{BiasTable, Role};
pub use top::GoalTop;
