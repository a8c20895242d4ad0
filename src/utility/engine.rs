//! Utility decision engine: competing scored actions, highest wins
//!
//! Scores are clamped to [0,1], weighted by the action's base priority,
//! then nudged by symmetric jitter so near-equal candidates trade wins.
//! With jitter amplitude 0 selection is deterministic and exact ties go
//! to the first-registered action.

use ordered_float::OrderedFloat;
use rand::RngCore;

use crate::context::DecisionContext;
use crate::core::rng::jitter;
use crate::entity::agent::Agent;
use crate::utility::scorers::clamp01;

/// One named candidate behavior competing for selection each tick
pub trait UtilityAction: Send + Sync {
    fn name(&self) -> &'static str;

    /// Priority weight applied after clamping; defaults to 1.0, may
    /// exceed it to express inherent urgency (e.g. fleeing)
    fn base_priority(&self) -> f32 {
        1.0
    }

    /// Pure scoring function of the context; the engine clamps the result
    fn score(&self, ctx: &DecisionContext) -> f32;

    /// Apply the action. Only observable effects: agent state + animation,
    /// velocity set or zeroed, cooldown timestamps stamped.
    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext);
}

/// Ordered registry of actions
pub struct UtilityEngine {
    actions: Vec<Box<dyn UtilityAction>>,
    jitter_amplitude: f32,
}

impl UtilityEngine {
    pub fn new(jitter_amplitude: f32) -> Self {
        Self { actions: Vec::new(), jitter_amplitude }
    }

    pub fn register(&mut self, action: Box<dyn UtilityAction>) -> &mut Self {
        self.actions.push(action);
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Highest-scoring action, or `None` when nothing scores above zero
    /// (callers fall back to idle)
    pub fn select_best(
        &self,
        ctx: &DecisionContext,
        rng: &mut dyn RngCore,
    ) -> Option<&dyn UtilityAction> {
        let mut best: Option<(&dyn UtilityAction, f32)> = None;
        for action in &self.actions {
            let weighted = clamp01(action.score(ctx)) * action.base_priority();
            let final_score = weighted + jitter(rng, self.jitter_amplitude);
            // Strict > keeps the first-registered action on exact ties
            if best.map_or(true, |(_, b)| final_score > b) {
                best = Some((action.as_ref(), final_score));
            }
        }
        match best {
            Some((action, score)) if score > 0.0 => {
                tracing::trace!(action = action.name(), score, "action selected");
                Some(action)
            }
            _ => None,
        }
    }

    /// Jitter-free scores of every action, descending — for diagnostics
    /// and deterministic tests
    pub fn score_all(&self, ctx: &DecisionContext) -> Vec<(&'static str, f32)> {
        let mut scored: Vec<(&'static str, f32)> = self
            .actions
            .iter()
            .map(|a| (a.name(), clamp01(a.score(ctx)) * a.base_priority()))
            .collect();
        scored.sort_by_key(|&(_, s)| std::cmp::Reverse(OrderedFloat(s)));
        scored
    }
}
