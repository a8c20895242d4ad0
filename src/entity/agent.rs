//! Live agent state
//!
//! An [`Agent`] is mutated only by its own tick; external systems set the
//! aggression multiplier, apply damage, and handle death/despawn.

use std::sync::Arc;

use crate::core::types::{AgentId, TimeMs, Vec2, Vec3};
use crate::entity::species::SpeciesDef;

/// Coarse behavioral state owned by the species profile FSM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorState {
    Idle,
    Wandering,
    Chasing,
    Attacking,
    Defending,
    Fleeing,
    Roaring,
    Eating,
}

/// One simulated creature
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Facing angle on the ground plane, radians
    pub heading: f32,

    pub health: f32,
    pub max_health: f32,
    /// 0 = sated, 100 = starving
    pub hunger: f32,
    /// > 0 means tranquilized; the orchestrator skips sedated agents
    pub sedation: f32,

    pub state: BehaviorState,
    /// Animation tag emitted with the current state; consumed by the
    /// rendering layer, opaque here
    pub animation: &'static str,
    pub state_entered_at: TimeMs,
    pub last_attack_at: Option<TimeMs>,
    pub last_roar_at: Option<TimeMs>,

    /// External scalar (time-of-day, world events) scaling aggressive
    /// action scores; 1.0 is baseline
    pub aggression: f32,

    /// Current chase/flee target, if the profile has locked one
    pub target: Option<AgentId>,

    pub species: Arc<SpeciesDef>,
}

impl Agent {
    pub fn spawn(species: Arc<SpeciesDef>, position: Vec3) -> Self {
        Self {
            id: AgentId::new(),
            position,
            velocity: Vec3::ZERO,
            heading: 0.0,
            health: species.max_health,
            max_health: species.max_health,
            hunger: 20.0,
            sedation: 0.0,
            state: BehaviorState::Idle,
            animation: "idle",
            state_entered_at: 0,
            last_attack_at: None,
            last_roar_at: None,
            aggression: 1.0,
            target: None,
            species,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_sedated(&self) -> bool {
        self.sedation > 0.0
    }

    /// Health as a 0..1 fraction
    pub fn health_frac(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Enter a state and its animation atomically
    ///
    /// Re-entering the current state keeps the original entry timestamp,
    /// so elapsed-in-state transitions still fire while an action keeps
    /// winning selection tick after tick.
    pub fn enter_state(&mut self, state: BehaviorState, animation: &'static str, now: TimeMs) {
        if self.state != state {
            self.state_entered_at = now;
        }
        self.state = state;
        self.animation = animation;
    }

    /// Milliseconds spent in the current state
    pub fn time_in_state(&self, now: TimeMs) -> TimeMs {
        now.saturating_sub(self.state_entered_at)
    }

    pub fn attack_ready(&self, now: TimeMs, cooldown_ms: TimeMs) -> bool {
        self.last_attack_at
            .map_or(true, |t| now.saturating_sub(t) >= cooldown_ms)
    }

    pub fn roar_ready(&self, now: TimeMs, cooldown_ms: TimeMs) -> bool {
        self.last_roar_at
            .map_or(true, |t| now.saturating_sub(t) >= cooldown_ms)
    }

    /// Ground-plane position
    pub fn flat_pos(&self) -> Vec2 {
        self.position.flat()
    }

    /// Ground-plane velocity
    pub fn flat_vel(&self) -> Vec2 {
        self.velocity.flat()
    }

    /// Apply a ground-plane steering force: damp velocity toward the
    /// desired direction, cap at species speed, and turn the heading.
    pub fn apply_steering(&mut self, force: Vec2, turn: f32, dt: f32) {
        let mut vel = self.flat_vel() + force * dt;
        vel = vel.truncate(self.species.base_speed);
        self.velocity.x = vel.x;
        self.velocity.z = vel.y;
        if vel.length_sq() > 1e-6 {
            self.heading = vel.angle();
        }
        self.heading += turn * dt;
    }
}
