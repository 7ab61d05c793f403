//! Arbitration root of an actor's goal tree.
//!
//! [`GoalTop`] owns the actor's evaluators and a one-deep stack holding the
//! goal chosen by the last arbitration. Each turn it arbitrates when inactive,
//! drives the chosen goal and, once that goal finishes either way, re-arms to
//! `Inactive` so the next turn arbitrates again. The root never terminates.

use std::collections::HashMap;

use game_core::EntityId;

use crate::context::GoalContext;
use crate::error::{AiError, Result};
use crate::evaluator::{Evaluator, EvaluatorRegistry, EvaluatorSpec, EvaluatorType};
use crate::goal::{Goal, GoalReport, Node};
use crate::status::GoalStatus;
use crate::think::{BiasTable, Role};

#[derive(Clone, Debug)]
pub struct GoalTop {
    node: Node,
    /// Scored in registration order; earlier evaluators win ties.
    evaluators: Vec<Evaluator>,
    biases: BiasTable,
    role: Role,
}

impl GoalTop {
    pub fn new(role: Role, biases: BiasTable) -> Self {
        Self {
            node: Node::default(),
            evaluators: Vec::new(),
            biases,
            role,
        }
    }

    /// Rebuilds a top goal from saved evaluator specs.
    pub fn from_specs(role: Role, biases: BiasTable, specs: impl IntoIterator<Item = EvaluatorSpec>) -> Self {
        let mut top = Self::new(role, biases);
        top.evaluators.extend(specs.into_iter().map(Evaluator::from));
        top
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn biases(&self) -> &BiasTable {
        &self.biases
    }

    pub fn status(&self) -> GoalStatus {
        self.node.status()
    }

    pub fn evaluators(&self) -> &[Evaluator] {
        &self.evaluators
    }

    /// Injected evaluators currently held.
    pub fn orders(&self) -> impl Iterator<Item = &Evaluator> {
        self.evaluators.iter().filter(|e| e.is_order())
    }

    /// Goal chosen by the last arbitration, while it runs.
    pub fn current_goal(&self) -> Option<&Goal> {
        self.node.sub_goals().last()
    }

    /// Runs one turn: arbitrate if inactive, then drive the chosen goal.
    ///
    /// Returns the status bubbled up from the chosen goal. When that status
    /// is terminal the root itself is already re-armed to `Inactive`.
    pub fn process(&mut self, ctx: &mut GoalContext<'_>) -> Result<GoalStatus> {
        if self.node.status().is_inactive() {
            self.arbitrate(ctx)?;
        }

        let status = self.node.process_sub_goals(ctx)?;
        for report in self.node.take_reports() {
            self.absorb(report);
        }

        if status.is_terminal() {
            tracing::debug!("{}: goal finished ({status}), re-arming", ctx.actor);
            self.node.remove_all_sub_goals();
            self.node.set_status(GoalStatus::Inactive);
            self.drop_own_orders(ctx.actor);
        } else {
            self.node.set_status(status);
        }
        Ok(status)
    }

    /// Scores every evaluator and adopts the goal of the best one.
    ///
    /// Only a strictly greater score replaces the current best, which starts
    /// at zero: ties go to the earlier evaluator, and a round where nothing
    /// applies adopts no goal.
    pub fn arbitrate(&mut self, ctx: &mut GoalContext<'_>) -> Result<()> {
        if self.evaluators.is_empty() {
            return Err(AiError::NoEvaluators { actor: ctx.actor });
        }

        let mut best_score = 0.0;
        let mut best = None;
        for (index, evaluator) in self.evaluators.iter_mut().enumerate() {
            let score = evaluator.calculate_desirability(ctx);
            tracing::debug!(
                "  {} evaluator {}: score={score:.3} (bias={:.3})",
                ctx.actor,
                evaluator.evaluator_type(),
                evaluator.bias()
            );
            if score > best_score {
                best_score = score;
                best = Some(index);
            }
        }

        self.node.set_status(GoalStatus::Active);
        self.node.remove_all_sub_goals();

        let Some(index) = best else {
            tracing::debug!("{}: nothing to do this turn", ctx.actor);
            return Ok(());
        };
        let goal = self.evaluators[index].set_actor_goal(ctx)?;
        tracing::debug!(
            "{}: best evaluator = {} (score={best_score:.3}) -> {}",
            ctx.actor,
            self.evaluators[index].evaluator_type(),
            goal.goal_type()
        );
        self.node.add_sub_goal(goal);
        Ok(())
    }

    /// Orders an actor gave itself belong to the goal that issued them.
    fn drop_own_orders(&mut self, actor: EntityId) {
        let before = self.evaluators.len();
        self.evaluators.retain(|e| e.order_source() != Some(actor));
        if self.evaluators.len() < before {
            tracing::debug!("{actor}: dropped the orders it gave itself");
        }
    }

    /// Stores state a finished goal handed back to its evaluator.
    fn absorb(&mut self, report: GoalReport) {
        if let GoalReport::ThiefMemory(memory) = report {
            if let Some(slot) = self.evaluators.iter_mut().find_map(Evaluator::thief_memory_mut) {
                *slot = memory;
            }
        }
    }

    // ========================================================================
    // Control surface
    // ========================================================================

    /// Pushes `goal` on top of the current plan, bypassing arbitration.
    pub fn add_goal(&mut self, goal: Goal) {
        self.node.add_sub_goal(goal);
        self.node.set_status(GoalStatus::Active);
    }

    pub fn add_evaluator(&mut self, evaluator: Evaluator) {
        self.evaluators.push(evaluator);
    }

    /// Adds an evaluator built through the builtin registry.
    pub fn add_eval_by_name(&mut self, name: &str, bias: f64) -> Result<()> {
        self.add_eval_from(EvaluatorRegistry::builtin(), name, bias)
    }

    pub fn add_eval_from(&mut self, registry: &EvaluatorRegistry, name: &str, bias: f64) -> Result<()> {
        let evaluator = registry.build(name, bias)?;
        self.add_evaluator(evaluator);
        Ok(())
    }

    /// Re-tunes the bias of every evaluator whose kind appears in `biases`.
    pub fn set_bias(&mut self, biases: &HashMap<EvaluatorType, f64>) {
        for evaluator in &mut self.evaluators {
            if let Some(&bias) = biases.get(&evaluator.evaluator_type()) {
                evaluator.set_bias(bias);
            }
        }
        self.biases.apply(biases);
    }

    /// Appends an injected evaluator.
    pub fn give_orders(&mut self, evaluator: Evaluator) {
        debug_assert!(evaluator.is_order());
        self.evaluators.push(evaluator);
    }

    /// Revokes every order: drops the injected evaluators and terminates a
    /// running injected goal, re-arming the root. No-op without orders.
    pub fn clear_orders(&mut self) {
        let before = self.evaluators.len();
        self.evaluators.retain(|e| !e.is_order());
        let removed = before - self.evaluators.len();

        let running_injected = self.node.sub_goals().iter().any(Goal::is_injected);
        if running_injected {
            self.node.remove_all_sub_goals();
            self.node.set_status(GoalStatus::Inactive);
        }
        if removed > 0 || running_injected {
            tracing::debug!("cleared {removed} orders (goal terminated: {running_injected})");
        }
    }

    /// Specs of every non-order evaluator, in registration order.
    pub fn evaluator_specs(&self) -> Vec<EvaluatorSpec> {
        self.evaluators.iter().filter_map(Evaluator::to_spec).collect()
    }

    /// JSON array of [`Self::evaluator_specs`].
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.evaluator_specs())
    }
}
