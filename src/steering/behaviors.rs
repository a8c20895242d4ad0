//! Individual steering behaviors
//!
//! Every behavior computes a desired velocity from perception/target data
//! and returns `desired − current` as its force, so the pipeline damps
//! toward the desired motion instead of snapping to it. Missing inputs
//! (no target, no threat, empty ally list) yield a zero output.

use rand::RngCore;

use crate::context::DecisionContext;
use crate::core::rng::jitter;
use crate::core::types::Vec2;

/// Composed motion command: ground-plane force plus an angular delta
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    pub force: Vec2,
    pub turn: f32,
}

impl SteeringOutput {
    pub const NONE: Self = Self { force: Vec2::ZERO, turn: 0.0 };
}

/// One motion contribution (seek, flee, wander, ...)
pub trait SteeringBehavior: Send + Sync {
    fn name(&self) -> &'static str;
    fn steer(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> SteeringOutput;
}

fn toward(ctx: &DecisionContext, point: Vec2, speed: f32) -> SteeringOutput {
    let desired = (point - ctx.position).normalize() * speed;
    SteeringOutput { force: desired - ctx.velocity, turn: 0.0 }
}

/// Head straight for the engaged target at full speed
pub struct Seek;

impl SteeringBehavior for Seek {
    fn name(&self) -> &'static str {
        "seek"
    }

    fn steer(&self, ctx: &DecisionContext, _rng: &mut dyn RngCore) -> SteeringOutput {
        match ctx.engage_position() {
            Some(point) => toward(ctx, point, ctx.species.base_speed),
            None => SteeringOutput::NONE,
        }
    }
}

/// Seek that slows inside the slowing radius and stops on the point
pub struct Arrive {
    pub slow_radius: f32,
}

impl SteeringBehavior for Arrive {
    fn name(&self) -> &'static str {
        "arrive"
    }

    fn steer(&self, ctx: &DecisionContext, _rng: &mut dyn RngCore) -> SteeringOutput {
        let Some(point) = ctx.engage_position() else {
            return SteeringOutput::NONE;
        };
        let offset = point - ctx.position;
        let dist = offset.length();
        if dist < 1e-3 {
            // On the point: cancel remaining velocity
            return SteeringOutput { force: ctx.velocity * -1.0, turn: 0.0 };
        }
        let speed = if dist < self.slow_radius {
            ctx.species.base_speed * (dist / self.slow_radius)
        } else {
            ctx.species.base_speed
        };
        let desired = offset.normalize() * speed;
        SteeringOutput { force: desired - ctx.velocity, turn: 0.0 }
    }
}

/// Run directly away from the nearest threat, panicking with closeness
pub struct FleeThreat {
    pub panic_radius: f32,
}

impl SteeringBehavior for FleeThreat {
    fn name(&self) -> &'static str {
        "flee"
    }

    fn steer(&self, ctx: &DecisionContext, _rng: &mut dyn RngCore) -> SteeringOutput {
        let Some(threat) = ctx.perception.threat else {
            return SteeringOutput::NONE;
        };
        let away = (ctx.position - threat.position).normalize();
        if away == Vec2::ZERO {
            // Threat exactly on top of us; any direction beats none
            return SteeringOutput { force: Vec2::new(ctx.species.base_speed, 0.0), turn: 0.0 };
        }
        let panic = 1.0 - (threat.distance / self.panic_radius).clamp(0.0, 1.0);
        let speed = ctx.species.base_speed * (0.4 + 0.6 * panic);
        SteeringOutput { force: away * speed - ctx.velocity, turn: 0.0 }
    }
}

/// Flee from where the threat is going to be, not where it is
pub struct Evade {
    pub panic_radius: f32,
}

impl SteeringBehavior for Evade {
    fn name(&self) -> &'static str {
        "evade"
    }

    fn steer(&self, ctx: &DecisionContext, _rng: &mut dyn RngCore) -> SteeringOutput {
        let Some(threat) = ctx.perception.threat else {
            return SteeringOutput::NONE;
        };
        let lookahead = if ctx.species.base_speed > 0.0 {
            (threat.distance / ctx.species.base_speed).min(1.0)
        } else {
            0.0
        };
        let predicted = threat.position + threat.velocity * lookahead;
        let away = (ctx.position - predicted).normalize();
        if away == Vec2::ZERO {
            return SteeringOutput { force: Vec2::new(ctx.species.base_speed, 0.0), turn: 0.0 };
        }
        let panic = 1.0 - (threat.distance / self.panic_radius).clamp(0.0, 1.0);
        let speed = ctx.species.base_speed * (0.4 + 0.6 * panic);
        SteeringOutput { force: away * speed - ctx.velocity, turn: 0.0 }
    }
}

/// Meander: jitter the heading and drift forward at half speed
pub struct WanderDrift {
    /// Half-amplitude of the per-tick heading jitter, radians
    pub heading_jitter: f32,
}

impl SteeringBehavior for WanderDrift {
    fn name(&self) -> &'static str {
        "wander"
    }

    fn steer(&self, ctx: &DecisionContext, rng: &mut dyn RngCore) -> SteeringOutput {
        let turn = jitter(rng, self.heading_jitter * 2.0);
        let heading = ctx.heading + turn;
        let desired = Vec2::new(heading.cos(), heading.sin()) * (ctx.species.base_speed * 0.5);
        SteeringOutput { force: desired - ctx.velocity, turn }
    }
}

/// Intercept the engaged target's predicted position
pub struct Pursuit;

impl SteeringBehavior for Pursuit {
    fn name(&self) -> &'static str {
        "pursuit"
    }

    fn steer(&self, ctx: &DecisionContext, _rng: &mut dyn RngCore) -> SteeringOutput {
        let Some(point) = ctx.engage_position() else {
            return SteeringOutput::NONE;
        };
        let target_vel = ctx.perception.target_velocity.unwrap_or(Vec2::ZERO);
        let dist = ctx.position.distance(&point);
        let lookahead = if ctx.species.base_speed > 0.0 {
            (dist / ctx.species.base_speed).min(1.0)
        } else {
            0.0
        };
        toward(ctx, point + target_vel * lookahead, ctx.species.base_speed)
    }
}

/// Match the average heading of nearby allies
pub struct Alignment;

impl SteeringBehavior for Alignment {
    fn name(&self) -> &'static str {
        "alignment"
    }

    fn steer(&self, ctx: &DecisionContext, _rng: &mut dyn RngCore) -> SteeringOutput {
        let allies = &ctx.perception.allies;
        if allies.is_empty() {
            return SteeringOutput::NONE;
        }
        let mut sum = Vec2::ZERO;
        for ally in allies {
            sum += ally.velocity;
        }
        let avg = sum * (1.0 / allies.len() as f32);
        SteeringOutput { force: avg - ctx.velocity, turn: 0.0 }
    }
}

/// Drift toward the centroid of nearby allies
pub struct Cohesion;

impl SteeringBehavior for Cohesion {
    fn name(&self) -> &'static str {
        "cohesion"
    }

    fn steer(&self, ctx: &DecisionContext, _rng: &mut dyn RngCore) -> SteeringOutput {
        let allies = &ctx.perception.allies;
        if allies.is_empty() {
            return SteeringOutput::NONE;
        }
        let mut sum = Vec2::ZERO;
        for ally in allies {
            sum += ally.position;
        }
        let centroid = sum * (1.0 / allies.len() as f32);
        toward(ctx, centroid, ctx.species.base_speed * 0.6)
    }
}
