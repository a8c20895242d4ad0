//! Ambush predator: patience, then one explosive strike
//!
//! Holds an ambush crouch while prey is near but out of strike range.
//! Pounce outranks chase inside strike range; a failed strike gives up
//! quickly rather than running prey down.

use rand::RngCore;

use crate::context::DecisionContext;
use crate::core::config::AiConfig;
use crate::core::rng::roll;
use crate::core::types::TimeMs;
use crate::entity::agent::{Agent, BehaviorState};
use crate::entity::species::Archetype;
use crate::profile::{clear_stale_target, drive_motion, BehaviorProfile};
use crate::steering::behaviors::{Arrive, Evade, WanderDrift};
use crate::steering::{CompositionMode, SteeringPipeline};
use crate::utility::actions::{Ambush, Attack, Chase, Flee, Idle, Pounce, Wander};
use crate::utility::UtilityEngine;

pub struct AmbushPredatorProfile {
    engine: UtilityEngine,
    chase: SteeringPipeline,
    flee: SteeringPipeline,
    wander: SteeringPipeline,
    attack_commit_ms: TimeMs,
    /// Chance per tick of abandoning a stale ambush that caught nothing
    give_up_chance: f32,
    /// Ambush older than this is eligible for abandonment (ms)
    stale_ambush_ms: TimeMs,
}

impl AmbushPredatorProfile {
    pub fn new(cfg: &AiConfig) -> Self {
        let mut engine = UtilityEngine::new(cfg.score_jitter);
        engine
            .register(Box::new(Flee))
            .register(Box::new(Pounce))
            .register(Box::new(Attack))
            .register(Box::new(Ambush))
            .register(Box::new(Chase))
            .register(Box::new(Wander))
            .register(Box::new(Idle));

        // Creep rather than sprint: arrive keeps the approach slow and
        // controlled near the quarry
        let chase = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(Arrive { slow_radius: cfg.arrive_slow_radius }), 1.0);

        let flee = SteeringPipeline::new(CompositionMode::PriorityBudget, cfg.max_steering_force)
            .with(Box::new(Evade { panic_radius: cfg.panic_radius }), 1.0);

        let wander = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(WanderDrift { heading_jitter: cfg.wander_jitter }), 1.0);

        Self {
            engine,
            chase,
            flee,
            wander,
            attack_commit_ms: cfg.attack_commit_ms,
            give_up_chance: 0.01,
            stale_ambush_ms: 10_000,
        }
    }
}

impl BehaviorProfile for AmbushPredatorProfile {
    fn archetype(&self) -> Archetype {
        Archetype::AmbushPredator
    }

    fn tick(&self, agent: &mut Agent, ctx: &DecisionContext, rng: &mut dyn RngCore) {
        clear_stale_target(agent, ctx);

        match agent.state {
            BehaviorState::Attacking if ctx.time_in_state < self.attack_commit_ms => return,
            BehaviorState::Attacking => {
                // Strike resolved; whether it landed is the combat
                // system's business. Drop back to cover.
                agent.target = None;
                agent.enter_state(BehaviorState::Idle, "idle", ctx.now);
            }
            _ => {}
        }

        // A long-held ambush that caught nothing eventually breaks; the
        // roll overrides this tick's scoring so the crouch is not
        // immediately re-entered
        if agent.state == BehaviorState::Idle
            && agent.animation == "ambush_crouch"
            && ctx.time_in_state > self.stale_ambush_ms
            && roll(rng, self.give_up_chance)
        {
            agent.target = None;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::seeded;
    use crate::core::types::{AgentId, Vec2, Vec3};
    use crate::entity::species::SpeciesDef;
    use crate::perception::{PerceptionSnapshot, SensedPrey};
    use std::sync::Arc;

    fn cfg_no_jitter() -> AiConfig {
        AiConfig { score_jitter: 0.0, ..AiConfig::default() }
    }

    fn lurker() -> Agent {
        Agent::spawn(Arc::new(SpeciesDef::marsh_lurker()), Vec3::ZERO)
    }

    fn prey_at(distance: f32) -> PerceptionSnapshot {
        PerceptionSnapshot {
            prey: Some(SensedPrey {
                id: AgentId::new(),
                position: Vec2::new(distance, 0.0),
                distance,
            }),
            has_prey: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_hungry_lurker_sets_ambush_outside_strike_range() {
        let cfg = cfg_no_jitter();
        let profile = AmbushPredatorProfile::new(&cfg);
        let mut agent = lurker();
        agent.hunger = 80.0;
        let observer = agent.clone();
        let snap = prey_at(5.0); // inside ambush range 10, outside strike 3
        let ctx = DecisionContext::build(&observer, &snap, &cfg, 0.0, 0, 0.1);

        profile.tick(&mut agent, &ctx, &mut seeded(0));
        assert_eq!(agent.state, BehaviorState::Idle);
        assert_eq!(agent.animation, "ambush_crouch");
        assert!(agent.target.is_some(), "locked on the quarry");
    }

    #[test]
    fn test_prey_in_strike_range_triggers_pounce() {
        let cfg = cfg_no_jitter();
        let profile = AmbushPredatorProfile::new(&cfg);
        let mut agent = lurker();
        agent.hunger = 80.0;
        let observer = agent.clone();
        let snap = prey_at(2.5);
        let ctx = DecisionContext::build(&observer, &snap, &cfg, 0.0, 500, 0.1);

        profile.tick(&mut agent, &ctx, &mut seeded(0));
        assert_eq!(agent.state, BehaviorState::Attacking);
        assert_eq!(agent.animation, "pounce");
        assert_eq!(agent.last_attack_at, Some(500));
        assert!(agent.velocity.x > 0.0, "burst toward the quarry");
    }

    #[test]
    fn test_strike_resolves_back_to_cover() {
        let cfg = cfg_no_jitter();
        let profile = AmbushPredatorProfile::new(&cfg);
        let mut agent = lurker();
        agent.enter_state(BehaviorState::Attacking, "pounce", 0);
        agent.last_attack_at = Some(0);
        let observer = agent.clone();
        let snap = PerceptionSnapshot::default();
        let ctx = DecisionContext::build(&observer, &snap, &cfg, 0.0, 1_000, 0.1);

        profile.tick(&mut agent, &ctx, &mut seeded(0));
        assert_ne!(agent.state, BehaviorState::Attacking);
        assert!(agent.target.is_none());
    }

    #[test]
    fn test_stale_ambush_abandoned() {
        let cfg = cfg_no_jitter();
        let mut profile = AmbushPredatorProfile::new(&cfg);
        profile.give_up_chance = 1.0; // force the roll
        let mut agent = lurker();
        agent.hunger = 80.0;
        let mut snap = prey_at(5.0);
        snap.has_target = true;
        agent.target = snap.prey.as_ref().map(|p| p.id);
        agent.enter_state(BehaviorState::Idle, "ambush_crouch", 0);
        let observer = agent.clone();
        // 11s crouched on the same unreachable quarry
        let ctx = DecisionContext::build(&observer, &snap, &cfg, 0.0, 11_000, 0.1);

        profile.tick(&mut agent, &ctx, &mut seeded(0));
        assert_eq!(agent.state, BehaviorState::Wandering);
        assert_eq!(agent.animation, "walk");
        assert!(agent.target.is_none(), "quarry lock released");
    }
}
