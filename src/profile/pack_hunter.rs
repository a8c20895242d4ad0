//! Pack hunter: bold in numbers, coordinated in pursuit
//!
//! Chasing blends pursuit with alignment/cohesion so a pack converges on
//! prey without scattering. Fleeing is already discounted by pack size
//! inside the Flee action's own scoring.

use rand::RngCore;

use crate::context::DecisionContext;
use crate::core::config::AiConfig;
use crate::core::rng::roll;
use crate::core::types::TimeMs;
use crate::entity::agent::{Agent, BehaviorState};
use crate::entity::species::Archetype;
use crate::profile::{clear_stale_target, drive_motion, BehaviorProfile};
use crate::steering::behaviors::{Alignment, Cohesion, Evade, Pursuit, WanderDrift};
use crate::steering::{CompositionMode, SteeringPipeline};
use crate::utility::actions::{Attack, Chase, Flee, Idle, Roar, Wander};
use crate::utility::UtilityEngine;

pub struct PackHunterProfile {
    engine: UtilityEngine,
    chase: SteeringPipeline,
    flee: SteeringPipeline,
    wander: SteeringPipeline,
    attack_commit_ms: TimeMs,
    roar_commit_ms: TimeMs,
    /// Chance per idle tick to get up and roam even when sated
    restless_chance: f32,
}

impl PackHunterProfile {
    pub fn new(cfg: &AiConfig) -> Self {
        let mut engine = UtilityEngine::new(cfg.score_jitter);
        engine
            .register(Box::new(Flee))
            .register(Box::new(Attack))
            .register(Box::new(Chase))
            .register(Box::new(Roar))
            .register(Box::new(Wander))
            .register(Box::new(Idle));

        let chase = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(Pursuit), 1.0)
            .with(Box::new(Alignment), 0.4)
            .with(Box::new(Cohesion), 0.3);

        let flee = SteeringPipeline::new(CompositionMode::PriorityBudget, cfg.max_steering_force)
            .with(Box::new(Evade { panic_radius: cfg.panic_radius }), 1.0)
            .with(Box::new(Cohesion), 0.5);

        let wander = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(WanderDrift { heading_jitter: cfg.wander_jitter }), 1.0)
            .with(Box::new(Cohesion), 0.2);

        Self {
            engine,
            chase,
            flee,
            wander,
            attack_commit_ms: cfg.attack_commit_ms,
            roar_commit_ms: cfg.roar_commit_ms,
            restless_chance: 0.02,
        }
    }
}

impl BehaviorProfile for PackHunterProfile {
    fn archetype(&self) -> Archetype {
        Archetype::PackHunter
    }

    fn tick(&self, agent: &mut Agent, ctx: &DecisionContext, rng: &mut dyn RngCore) {
        clear_stale_target(agent, ctx);

        // Committed states run out their animation first
        match agent.state {
            BehaviorState::Attacking if ctx.time_in_state < self.attack_commit_ms => return,
            BehaviorState::Attacking => {
                if agent.target.is_some() {
                    agent.enter_state(BehaviorState::Chasing, "run", ctx.now);
                } else {
                    agent.enter_state(BehaviorState::Idle, "idle", ctx.now);
                }
            }
            BehaviorState::Roaring if ctx.time_in_state < self.roar_commit_ms => return,
            BehaviorState::Roaring => agent.enter_state(BehaviorState::Idle, "idle", ctx.now),
            _ => {}
        }

        // Restlessness overrides this tick's scoring: get up and move
        if agent.state == BehaviorState::Idle && roll(rng, self.restless_chance) {
            agent.enter_state(BehaviorState::Wandering, "walk", ctx.now);
            drive_motion(agent, ctx, rng, &self.chase, &self.flee, &self.wander);
            return;
        }

        match self.engine.select_best(ctx, rng) {
            Some(action) => action.execute(agent, ctx),
            None => agent.enter_state(BehaviorState::Idle, "idle", ctx.now),
        }

        drive_motion(agent, ctx, rng, &self.chase, &self.flee, &self.wander);
    }
}
