//! Steering pipeline: composes weighted behaviors into one bounded command

use rand::RngCore;

use crate::context::DecisionContext;
use crate::core::types::Vec2;
use crate::steering::behaviors::{SteeringBehavior, SteeringOutput};

/// How weighted contributions combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionMode {
    /// Sum everything, then truncate to the force cap
    WeightedSum,
    /// Registration order is priority: each behavior spends from a force
    /// budget; once it runs dry, later behaviors contribute nothing.
    /// Evasion registered first can never be diluted by wander.
    PriorityBudget,
}

pub struct SteeringPipeline {
    behaviors: Vec<(Box<dyn SteeringBehavior>, f32)>,
    mode: CompositionMode,
    max_force: f32,
}

impl SteeringPipeline {
    pub fn new(mode: CompositionMode, max_force: f32) -> Self {
        Self { behaviors: Vec::new(), mode, max_force }
    }

    pub fn with(mut self, behavior: Box<dyn SteeringBehavior>, weight: f32) -> Self {
        self.behaviors.push((behavior, weight));
        self
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Compose all contributions; output magnitude never exceeds the cap
    pub fn calculate(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> SteeringOutput {
        match self.mode {
            CompositionMode::WeightedSum => self.weighted_sum(ctx, rng),
            CompositionMode::PriorityBudget => self.priority_budget(ctx, rng),
        }
    }

    fn weighted_sum(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> SteeringOutput {
        let mut force = Vec2::ZERO;
        let mut turn = 0.0;
        for (behavior, weight) in &self.behaviors {
            let out = behavior.steer(ctx, rng);
            force += out.force * *weight;
            turn += out.turn * *weight;
        }
        SteeringOutput { force: force.truncate(self.max_force), turn }
    }

    fn priority_budget(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> SteeringOutput {
        let mut budget = self.max_force;
        let mut force = Vec2::ZERO;
        let mut turn = 0.0;
        for (behavior, weight) in &self.behaviors {
            if budget <= 0.0 {
                break;
            }
            let out = behavior.steer(ctx, rng);
            let contribution = out.force * *weight;
            let magnitude = contribution.length();
            if magnitude <= budget {
                force += contribution;
                turn += out.turn * *weight;
                budget -= magnitude;
            } else {
                // Partial fit: spend whatever budget remains
                force += contribution.truncate(budget);
                turn += out.turn * *weight * (budget / magnitude);
                budget = 0.0;
            }
        }
        SteeringOutput { force, turn }
    }
}
