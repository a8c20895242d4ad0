//! Cave dweller: short senses, hard den defense
//!
//! Perception radii are tight, so the world is mostly empty to it; the
//! interesting transitions happen when something walks into the den.
//! The danger probe reads high inside its lair, which feeds Defend.

use rand::RngCore;

use crate::context::DecisionContext;
use crate::core::config::AiConfig;
use crate::core::rng::roll;
use crate::core::types::TimeMs;
use crate::entity::agent::{Agent, BehaviorState};
use crate::entity::species::Archetype;
use crate::profile::{clear_stale_target, drive_motion, BehaviorProfile};
use crate::steering::behaviors::{FleeThreat, Pursuit, WanderDrift};
use crate::steering::{CompositionMode, SteeringPipeline};
use crate::utility::actions::{Attack, Defend, Flee, Idle, Pounce, Wander};
use crate::utility::UtilityEngine;

pub struct CaveDwellerProfile {
    engine: UtilityEngine,
    chase: SteeringPipeline,
    flee: SteeringPipeline,
    wander: SteeringPipeline,
    attack_commit_ms: TimeMs,
    /// Chance per idle tick to prowl the den mouth
    prowl_chance: f32,
    /// Holding a defensive stance past this with no threat relaxes (ms)
    stand_down_ms: TimeMs,
}

impl CaveDwellerProfile {
    pub fn new(cfg: &AiConfig) -> Self {
        let mut engine = UtilityEngine::new(cfg.score_jitter);
        engine
            .register(Box::new(Defend))
            .register(Box::new(Pounce))
            .register(Box::new(Attack))
            .register(Box::new(Flee))
            .register(Box::new(Wander))
            .register(Box::new(Idle));

        let chase = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(Pursuit), 1.0);

        let flee = SteeringPipeline::new(CompositionMode::PriorityBudget, cfg.max_steering_force)
            .with(Box::new(FleeThreat { panic_radius: cfg.panic_radius }), 1.0);

        let wander = SteeringPipeline::new(CompositionMode::WeightedSum, cfg.max_steering_force)
            .with(Box::new(WanderDrift { heading_jitter: cfg.wander_jitter * 0.7 }), 1.0);

        Self {
            engine,
            chase,
            flee,
            wander,
            attack_commit_ms: cfg.attack_commit_ms,
            prowl_chance: 0.01,
            stand_down_ms: 3_000,
        }
    }
}

impl BehaviorProfile for CaveDwellerProfile {
    fn archetype(&self) -> Archetype {
        Archetype::CaveDweller
    }

    fn tick(&self, agent: &mut Agent, ctx: &DecisionContext, rng: &mut dyn RngCore) {
        clear_stale_target(agent, ctx);

        match agent.state {
            BehaviorState::Attacking if ctx.time_in_state < self.attack_commit_ms => return,
            BehaviorState::Attacking => {
                agent.enter_state(BehaviorState::Defending, "defend_stance", ctx.now);
            }
            // Defensive stance relaxes once the intruder is gone a while
            BehaviorState::Defending
                if !ctx.perception.has_threats && ctx.time_in_state > self.stand_down_ms =>
            {
                agent.enter_state(BehaviorState::Idle, "idle", ctx.now);
            }
            _ => {}
        }

        // A prowl roll overrides this tick's scoring
        if agent.state == BehaviorState::Idle && roll(rng, self.prowl_chance) {
            agent.enter_state(BehaviorState::Wandering, "prowl", ctx.now);
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
    use crate::perception::{PerceptionSnapshot, SensedThreat};
    use std::sync::Arc;

    fn cfg_no_jitter() -> AiConfig {
        AiConfig { score_jitter: 0.0, ..AiConfig::default() }
    }

    fn stalker() -> Agent {
        Agent::spawn(Arc::new(SpeciesDef::cave_stalker()), Vec3::ZERO)
    }

    #[test]
    fn test_intruder_in_den_triggers_defense() {
        let cfg = cfg_no_jitter();
        let profile = CaveDwellerProfile::new(&cfg);
        let mut agent = stalker();
        let observer = agent.clone();
        let snap = PerceptionSnapshot {
            threat: Some(SensedThreat {
                id: AgentId::new(),
                position: Vec2::new(10.0, 0.0),
                velocity: Vec2::ZERO,
                distance: 10.0,
            }),
            has_threats: true,
            ..Default::default()
        };
        // Deep in the den: probe reads 1.0
        let ctx = DecisionContext::build(&observer, &snap, &cfg, 1.0, 0, 0.1);

        profile.tick(&mut agent, &ctx, &mut seeded(0));
        assert_eq!(agent.state, BehaviorState::Defending);
        assert_eq!(agent.flat_vel(), Vec2::ZERO, "holds ground");
    }

    #[test]
    fn test_stance_relaxes_after_intruder_leaves() {
        let cfg = cfg_no_jitter();
        let profile = CaveDwellerProfile::new(&cfg);
        let mut agent = stalker();
        agent.hunger = 0.0;
        agent.enter_state(BehaviorState::Defending, "defend_stance", 0);
        let observer = agent.clone();
        let snap = PerceptionSnapshot::default();
        let ctx = DecisionContext::build(&observer, &snap, &cfg, 1.0, 4_000, 0.1);

        profile.tick(&mut agent, &ctx, &mut seeded(0));
        assert_eq!(agent.state, BehaviorState::Idle);
    }

    #[test]
    fn test_outside_den_wounded_stalker_flees() {
        let cfg = cfg_no_jitter();
        let profile = CaveDwellerProfile::new(&cfg);
        let mut agent = stalker();
        agent.health = 30.0;
        let observer = agent.clone();
        let snap = PerceptionSnapshot {
            threat: Some(SensedThreat {
                id: AgentId::new(),
                position: Vec2::new(5.0, 0.0),
                velocity: Vec2::ZERO,
                distance: 5.0,
            }),
            has_threats: true,
            ..Default::default()
        };
        // Far from the den: probe reads 0, so Defend scores nothing
        let ctx = DecisionContext::build(&observer, &snap, &cfg, 0.0, 0, 0.1);

        profile.tick(&mut agent, &ctx, &mut seeded(0));
        assert_eq!(agent.state, BehaviorState::Fleeing);
    }

    #[test]
    fn test_prowl_roll_breaks_idle() {
        let cfg = cfg_no_jitter();
        let mut profile = CaveDwellerProfile::new(&cfg);
        profile.prowl_chance = 1.0; // force the roll
        let mut agent = stalker();
        agent.hunger = 0.0; // idle would otherwise win selection
        let observer = agent.clone();
        let snap = PerceptionSnapshot::default();
        let ctx = DecisionContext::build(&observer, &snap, &cfg, 0.0, 0, 0.1);

        profile.tick(&mut agent, &ctx, &mut seeded(0));
        assert_eq!(agent.state, BehaviorState::Wandering);
        assert_eq!(agent.animation, "prowl");
        assert!(agent.flat_vel().length() > 0.0, "starts moving the same tick");
    }
}
