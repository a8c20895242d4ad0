//! Concrete utility actions
//!
//! Each action is a self-contained scoring + execution unit. Scoring
//! gates on distance-versus-range and cooldowns, then scales by the
//! aggression multiplier or hunger. Execution only touches agent state,
//! animation, velocity, and cooldown stamps.

use crate::context::DecisionContext;
use crate::core::types::Vec3;
use crate::entity::agent::{Agent, BehaviorState};
use crate::utility::engine::UtilityAction;
use crate::utility::scorers::{clamp01, inverse, linear, multiply};

fn zero_ground_velocity(agent: &mut Agent) {
    agent.velocity = Vec3::new(0.0, agent.velocity.y, 0.0);
}

/// Strike the engaged target when it is inside attack range
pub struct Attack;

impl UtilityAction for Attack {
    fn name(&self) -> &'static str {
        "attack"
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        if !ctx.attack_ready {
            return 0.0;
        }
        let Some(dist) = ctx.engage_distance() else {
            return 0.0;
        };
        if dist > ctx.species.attack_range {
            return 0.0;
        }
        clamp01(0.9 * ctx.aggression)
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.enter_state(BehaviorState::Attacking, "attack_bite", ctx.now);
        zero_ground_velocity(agent);
        agent.last_attack_at = Some(ctx.now);
    }
}

/// Close distance to the engaged target; yields to Attack inside range
pub struct Chase;

impl UtilityAction for Chase {
    fn name(&self) -> &'static str {
        "chase"
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        let Some(dist) = ctx.engage_distance() else {
            return 0.0;
        };
        // Inside attack range the attack action owns the decision
        if dist <= ctx.species.attack_range || dist > ctx.species.chase_range {
            return 0.0;
        }
        let closeness = inverse(ctx.species.attack_range, ctx.species.chase_range, dist);
        clamp01(0.8 * (0.3 + 0.7 * closeness) * ctx.aggression)
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        if agent.target.is_none() {
            agent.target = ctx.perception.prey.map(|p| p.id);
        }
        agent.enter_state(BehaviorState::Chasing, "run", ctx.now);
    }
}

/// Short explosive strike from concealment, preferred inside strike range
pub struct Pounce;

impl UtilityAction for Pounce {
    fn name(&self) -> &'static str {
        "pounce"
    }

    fn base_priority(&self) -> f32 {
        1.1
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        if !ctx.attack_ready {
            return 0.0;
        }
        let Some(dist) = ctx.engage_distance() else {
            return 0.0;
        };
        if dist > ctx.species.strike_range {
            return 0.0;
        }
        clamp01((0.7 + ctx.hunger / 250.0) * ctx.aggression)
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.enter_state(BehaviorState::Attacking, "pounce", ctx.now);
        if let Some(pos) = ctx.engage_position() {
            let burst = (pos - ctx.position).normalize() * (ctx.species.base_speed * 1.5);
            agent.velocity = Vec3::new(burst.x, agent.velocity.y, burst.y);
        }
        agent.last_attack_at = Some(ctx.now);
    }
}

/// Run from the nearest threat; urgency rises as health falls and the
/// threat closes in. Pack courage discounts it when allies are present.
pub struct Flee;

impl UtilityAction for Flee {
    fn name(&self) -> &'static str {
        "flee"
    }

    fn base_priority(&self) -> f32 {
        1.5
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        let Some(threat) = ctx.perception.threat else {
            return 0.0;
        };
        let proximity = inverse(0.0, ctx.species.threat_radius, threat.distance);
        let wounded = 1.0 - ctx.health_frac;
        let raw = multiply(proximity, 0.5 + 0.5 * wounded);

        let pack_courage = if ctx.species.pack_size > 1 {
            linear(0.0, ctx.species.pack_size as f32, ctx.perception.allies.len() as f32)
        } else {
            0.0
        };
        clamp01(raw * (1.0 - 0.5 * pack_courage))
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.target = None;
        agent.enter_state(BehaviorState::Fleeing, "sprint", ctx.now);
    }
}

/// Hold ground against an intruder; driven by the territory danger probe
pub struct Defend;

impl UtilityAction for Defend {
    fn name(&self) -> &'static str {
        "defend"
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        if !ctx.perception.has_threats {
            return 0.0;
        }
        let standing = 0.4 + 0.6 * ctx.health_frac;
        clamp01(multiply(ctx.danger_level, standing) * ctx.aggression)
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.enter_state(BehaviorState::Defending, "defend_stance", ctx.now);
        zero_ground_velocity(agent);
    }
}

/// Warn off rivals; cooldown-gated display that costs nothing but time
pub struct Roar;

impl UtilityAction for Roar {
    fn name(&self) -> &'static str {
        "roar"
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        if !ctx.roar_ready || !ctx.perception.has_threats {
            return 0.0;
        }
        clamp01(0.6 * ctx.aggression * ctx.health_frac)
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.enter_state(BehaviorState::Roaring, "roar", ctx.now);
        zero_ground_velocity(agent);
        agent.last_roar_at = Some(ctx.now);
    }
}

/// Aimless locomotion; the baseline everything else must beat
pub struct Wander;

impl UtilityAction for Wander {
    fn name(&self) -> &'static str {
        "wander"
    }

    fn score(&self, _ctx: &DecisionContext) -> f32 {
        0.4
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.enter_state(BehaviorState::Wandering, "walk", ctx.now);
    }
}

/// Sweep claimed ground; stronger where the territory reads dangerous
pub struct Patrol;

impl UtilityAction for Patrol {
    fn name(&self) -> &'static str {
        "patrol"
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        if ctx.perception.has_threats {
            return 0.0;
        }
        clamp01(0.3 + 0.3 * ctx.danger_level)
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.enter_state(BehaviorState::Wandering, "patrol", ctx.now);
    }
}

/// Freeze near prey and wait for it to blunder into strike range
pub struct Ambush;

impl UtilityAction for Ambush {
    fn name(&self) -> &'static str {
        "ambush"
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        let Some(prey) = ctx.perception.prey else {
            return 0.0;
        };
        if prey.distance > ctx.species.ambush_range
            || prey.distance <= ctx.species.strike_range
        {
            return 0.0;
        }
        clamp01(0.9 * linear(0.0, 100.0, ctx.hunger))
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.target = ctx.perception.prey.map(|p| p.id);
        agent.enter_state(BehaviorState::Idle, "ambush_crouch", ctx.now);
        zero_ground_velocity(agent);
    }
}

/// Hunt carrion and easy meals; abandoned the moment threats appear
pub struct Scavenge;

impl UtilityAction for Scavenge {
    fn name(&self) -> &'static str {
        "scavenge"
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        if ctx.perception.has_threats {
            return 0.0;
        }
        clamp01(0.7 * linear(20.0, 100.0, ctx.hunger))
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        match ctx.perception.prey {
            Some(prey) if prey.distance <= ctx.species.attack_range => {
                agent.target = Some(prey.id);
                agent.enter_state(BehaviorState::Eating, "feed", ctx.now);
                zero_ground_velocity(agent);
            }
            Some(prey) => {
                agent.target = Some(prey.id);
                agent.enter_state(BehaviorState::Chasing, "scavenge", ctx.now);
            }
            None => {
                agent.enter_state(BehaviorState::Wandering, "soar", ctx.now);
            }
        }
    }
}

/// Do nothing; attractive only when sated and safe
pub struct Idle;

impl UtilityAction for Idle {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn score(&self, ctx: &DecisionContext) -> f32 {
        0.5 * inverse(0.0, 100.0, ctx.hunger)
    }

    fn execute(&self, agent: &mut Agent, ctx: &DecisionContext) {
        agent.enter_state(BehaviorState::Idle, "idle", ctx.now);
        zero_ground_velocity(agent);
    }
}
