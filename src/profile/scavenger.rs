//! Scavenger/flyer: feeds opportunistically, first to leave a fight
//!
//! No attack in its repertoire at all; anything that reads as a threat
//! sends it airborne. Eating self-expires so a feeding bird re-evaluates
//! its surroundings instead of gorging forever.

use rand::RngCore;

use crate::context::DecisionContext;
use crate::core::config::AiConfig;
use crate::core::rng::roll;
use crate::core::types::TimeMs;
use crate::entity::agent::{Agent, BehaviorState};
use crate::entity::species::Archetype;
use crate::profile::{clear_stale_target, drive_motion, BehaviorProfile};
use crate::steering::behaviors::{Alignment, Arrive, Cohesion, Evade, WanderDrift};
use crate::steering::{CompositionMode, SteeringPipeline};
use crate::utility::actions::{Flee, Idle, Scavenge, Wander};
use crate::utility::UtilityEngine;

pub struct ScavengerFlyerProfile {
    engine: UtilityEngine,
    chase: SteeringPipeline,
    flee: SteeringPipeline,
    wander: SteeringPipeline,
    /// Feeding bout length before re-evaluating (ms)
    feed_ms: TimeMs,
    /// Chance per wandering tick to settle and loiter
    settle_chance: f32,
}

impl ScavengerFlyerProfile {
    pub fn new(cfg: &AiConfig) -> Self {
        let mut engine = UtilityEngine::new(cfg.score_jitter);
        engine
            .register(Box::new(Flee))
            .register(Box::new(Scavenge))
            .register(Box::new(Wander))
            .register(Box::new(Idle));

        let chase = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(Arrive { slow_radius: cfg.arrive_slow_radius }), 1.0)
            .with(Box::new(Alignment), 0.3);

        // Evasion first and fully funded; flock cohesion gets leftovers
        let flee = SteeringPipeline::new(CompositionMode::PriorityBudget, cfg.max_steering_force)
            .with(Box::new(Evade { panic_radius: cfg.panic_radius }), 1.0)
            .with(Box::new(Cohesion), 0.6)
            .with(Box::new(Alignment), 0.4);

        let wander = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(WanderDrift { heading_jitter: cfg.wander_jitter * 1.5 }), 1.0)
            .with(Box::new(Cohesion), 0.3);

        Self {
            engine,
            chase,
            flee,
            wander,
            feed_ms: 4_000,
            settle_chance: 0.01,
        }
    }
}

impl BehaviorProfile for ScavengerFlyerProfile {
    fn archetype(&self) -> Archetype {
        Archetype::ScavengerFlyer
    }

    fn tick(&self, agent: &mut Agent, ctx: &DecisionContext, rng: &mut dyn RngCore) {
        clear_stale_target(agent, ctx);

        // Feeding interrupts for threats immediately, unlike committed
        // attack states: drop the carcass and go
        if agent.state == BehaviorState::Eating {
            if ctx.perception.has_threats {
                agent.target = None;
                agent.enter_state(BehaviorState::Fleeing, "takeoff", ctx.now);
            } else if ctx.time_in_state < self.feed_ms {
                return;
            } else {
                agent.enter_state(BehaviorState::Idle, "idle", ctx.now);
            }
        }

        // Settling overrides this tick's scoring: land and fold up
        if agent.state == BehaviorState::Wandering && roll(rng, self.settle_chance) {
            agent.enter_state(BehaviorState::Idle, "perch", ctx.now);
            agent.velocity.x = 0.0;
            agent.velocity.z = 0.0;
            return;
        }

        match self.engine.select_best(ctx, rng) {
            Some(action) => action.execute(agent, ctx),
            None => agent.enter_state(BehaviorState::Idle, "idle", ctx.now),
        }

        drive_motion(agent, ctx, rng, &self.chase, &self.flee, &self.wander);
    }
}
