//! Territorial apex predator: roars first, patrols claimed ground
//!
//! The apex never flees. It answers intruders with a roar display, then
//! closes and attacks; with nothing around it patrols, leaning on the
//! territory danger probe to sweep the contested edges of its range.

use rand::RngCore;

use crate::context::DecisionContext;
use crate::core::config::AiConfig;
use crate::core::rng::roll;
use crate::core::types::TimeMs;
use crate::entity::agent::{Agent, BehaviorState};
use crate::entity::species::Archetype;
use crate::profile::{clear_stale_target, drive_motion, BehaviorProfile};
use crate::steering::behaviors::{Pursuit, Seek, WanderDrift};
use crate::steering::{CompositionMode, SteeringPipeline};
use crate::utility::actions::{Attack, Chase, Defend, Idle, Patrol, Roar, Wander};
use crate::utility::UtilityEngine;

pub struct TerritorialApexProfile {
    engine: UtilityEngine,
    chase: SteeringPipeline,
    flee: SteeringPipeline,
    wander: SteeringPipeline,
    attack_commit_ms: TimeMs,
    roar_commit_ms: TimeMs,
    /// Chance per wandering tick of an unprompted dominance display
    display_chance: f32,
}

impl TerritorialApexProfile {
    pub fn new(cfg: &AiConfig) -> Self {
        let mut engine = UtilityEngine::new(cfg.score_jitter);
        engine
            .register(Box::new(Attack))
            .register(Box::new(Roar))
            .register(Box::new(Defend))
            .register(Box::new(Chase))
            .register(Box::new(Patrol))
            .register(Box::new(Wander))
            .register(Box::new(Idle));

        let chase = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(Pursuit), 1.0)
            .with(Box::new(Seek), 0.3);

        // Never used in anger; present so shared motion dispatch stays total
        let flee = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force);

        let wander = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(WanderDrift { heading_jitter: cfg.wander_jitter * 0.5 }), 1.0);

        Self {
            engine,
            chase,
            flee,
            wander,
            attack_commit_ms: cfg.attack_commit_ms,
            roar_commit_ms: cfg.roar_commit_ms,
            display_chance: 0.005,
        }
    }
}

impl BehaviorProfile for TerritorialApexProfile {
    fn archetype(&self) -> Archetype {
        Archetype::TerritorialApex
    }

    fn tick(&self, agent: &mut Agent, ctx: &DecisionContext, rng: &mut dyn RngCore) {
        clear_stale_target(agent, ctx);

        match agent.state {
            BehaviorState::Attacking if ctx.time_in_state < self.attack_commit_ms => return,
            BehaviorState::Attacking => {
                if agent.target.is_some() {
                    agent.enter_state(BehaviorState::Chasing, "stomp_run", ctx.now);
                } else {
                    agent.enter_state(BehaviorState::Idle, "idle", ctx.now);
                }
            }
            BehaviorState::Roaring if ctx.time_in_state < self.roar_commit_ms => return,
            BehaviorState::Roaring => {
                // A roar commits forward: close on whatever provoked it
                if ctx.perception.has_threats || ctx.perception.has_target {
                    agent.enter_state(BehaviorState::Chasing, "stomp_run", ctx.now);
                } else {
                    agent.enter_state(BehaviorState::Wandering, "patrol", ctx.now);
                }
            }
            _ => {}
        }

        // Unprompted dominance display while patrolling
        if agent.state == BehaviorState::Wandering
            && ctx.roar_ready
            && roll(rng, self.display_chance)
        {
            agent.enter_state(BehaviorState::Roaring, "roar", ctx.now);
            agent.last_roar_at = Some(ctx.now);
            return;
        }

        match self.engine.select_best(ctx, rng) {
            Some(action) => action.execute(agent, ctx),
            None => agent.enter_state(BehaviorState::Idle, "idle", ctx.now),
        }

        drive_motion(agent, ctx, rng, &self.chase, &self.flee, &self.wander);
    }
}
