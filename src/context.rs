//! Immutable per-tick decision context
//!
//! Built once per agent per tick from the agent's own scalars plus its
//! perception snapshot; scoring and steering read it, never the live
//! agent population.

use crate::core::config::AiConfig;
use crate::core::types::{TimeMs, Vec2};
use crate::entity::agent::{Agent, BehaviorState};
use crate::entity::species::SpeciesDef;
use crate::perception::PerceptionSnapshot;

pub struct DecisionContext<'a> {
    pub perception: &'a PerceptionSnapshot,
    pub species: &'a SpeciesDef,

    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: f32,

    /// Health as a 0..1 fraction
    pub health_frac: f32,
    /// 0 = sated, 100 = starving
    pub hunger: f32,
    /// External aggression multiplier, 1.0 baseline
    pub aggression: f32,

    pub state: BehaviorState,
    pub time_in_state: TimeMs,

    /// Cooldowns already resolved against config
    pub attack_ready: bool,
    pub roar_ready: bool,

    /// Territory danger classification at the agent's position,
    /// supplied by an external probe; 0.0 when none is installed
    pub danger_level: f32,

    pub now: TimeMs,
    /// Seconds since the previous tick
    pub dt: f32,
}

impl<'a> DecisionContext<'a> {
    pub fn build(
        agent: &'a Agent,
        perception: &'a PerceptionSnapshot,
        config: &AiConfig,
        danger_level: f32,
        now: TimeMs,
        dt: f32,
    ) -> Self {
        Self {
            perception,
            species: &agent.species,
            position: agent.flat_pos(),
            velocity: agent.flat_vel(),
            heading: agent.heading,
            health_frac: agent.health_frac(),
            hunger: agent.hunger,
            aggression: agent.aggression,
            state: agent.state,
            time_in_state: agent.time_in_state(now),
            attack_ready: agent.attack_ready(now, config.attack_cooldown_ms),
            roar_ready: agent.roar_ready(now, config.roar_cooldown_ms),
            danger_level,
            now,
            dt,
        }
    }

    /// Distance to the locked target, falling back to nearest prey
    ///
    /// This is the distance every engagement action gates on.
    pub fn engage_distance(&self) -> Option<f32> {
        if let Some(target) = self.perception.target_position {
            return Some(self.position.distance(&target));
        }
        self.perception.prey.map(|p| p.distance)
    }

    /// Position backing [`Self::engage_distance`]
    pub fn engage_position(&self) -> Option<Vec2> {
        self.perception
            .target_position
            .or_else(|| self.perception.prey.map(|p| p.position))
    }
}
