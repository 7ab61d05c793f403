//! Name → constructor lookup for evaluators.
//!
//! Names are validated when registered, so a typo in content or a duplicate
//! registration fails at load time instead of during arbitration.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::Evaluator;
use crate::error::{AiError, Result};

/// Builds an evaluator from its bias.
pub type EvaluatorCtor = fn(f64) -> Evaluator;

static BUILTIN: OnceLock<EvaluatorRegistry> = OnceLock::new();

#[derive(Clone, Debug, Default)]
pub struct EvaluatorRegistry {
    ctors: BTreeMap<&'static str, EvaluatorCtor>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of every evaluator that needs nothing but a bias. Spell
    /// casting built here rolls against the world's configured probability.
    pub fn builtin() -> &'static EvaluatorRegistry {
        BUILTIN.get_or_init(|| {
            let entries: [(&'static str, EvaluatorCtor); 7] = [
                ("AttackActor", Evaluator::attack_actor),
                ("Flee", Evaluator::flee),
                ("Explore", Evaluator::explore),
                ("CastSpell", Evaluator::configured_cast_spell),
                ("WinBattle", Evaluator::win_battle),
                ("Retreat", Evaluator::retreat),
                ("Thief", Evaluator::thief),
            ];
            Self {
                ctors: entries.into_iter().collect(),
            }
        })
    }

    pub fn register(&mut self, name: &'static str, ctor: EvaluatorCtor) -> Result<()> {
        if self.ctors.contains_key(name) {
            return Err(AiError::DuplicateEvaluator(name));
        }
        self.ctors.insert(name, ctor);
        Ok(())
    }

    pub fn build(&self, name: &str, bias: f64) -> Result<Evaluator> {
        self.ctors
            .get(name)
            .map(|ctor| ctor(bias))
            .ok_or_else(|| AiError::UnknownEvaluator(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ctors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ctors.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorType;

    #[test]
    fn builtin_builds_by_name() {
        let ev = EvaluatorRegistry::builtin().build("Flee", 0.4).unwrap();
        assert_eq!(ev.evaluator_type(), EvaluatorType::Flee);
        assert_eq!(ev.bias(), 0.4);
    }

    #[test]
    fn unknown_names_fail_fast() {
        let err = EvaluatorRegistry::builtin().build("Sleep", 1.0).unwrap_err();
        assert_eq!(err, AiError::UnknownEvaluator("Sleep".into()));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = EvaluatorRegistry::new();
        registry.register("Explore", Evaluator::explore).unwrap();
        assert_eq!(
            registry.register("Explore", Evaluator::explore),
            Err(AiError::DuplicateEvaluator("Explore"))
        );
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Explore"]);
    }
}
