//! Species behavior profiles
//!
//! Each archetype owns a finite-state machine over
//! {Idle, Wandering, Chasing, Attacking, Defending, Fleeing, Roaring,
//! Eating}, consulting the utility engine for decisions and a steering
//! pipeline for locomotion. Attacking and Roaring are committed states:
//! they self-expire after the configured duration and cannot be
//! interrupted mid-animation. Death/removal is handled outside the FSM.

pub mod ambusher;
pub mod apex;
pub mod cave_dweller;
pub mod pack_hunter;
pub mod scavenger;

use rand::RngCore;

use crate::context::DecisionContext;
use crate::entity::agent::{Agent, BehaviorState};
use crate::entity::species::Archetype;
use crate::steering::{SteeringOutput, SteeringPipeline};

pub use ambusher::AmbushPredatorProfile;
pub use apex::TerritorialApexProfile;
pub use cave_dweller::CaveDwellerProfile;
pub use pack_hunter::PackHunterProfile;
pub use scavenger::ScavengerFlyerProfile;

/// Per-species finite-state machine driving one agent tick
pub trait BehaviorProfile: Send + Sync {
    fn archetype(&self) -> Archetype;

    /// Advance the FSM one tick: honor commitments, transition, decide,
    /// and steer. Mutates only the given agent.
    fn tick(&self, agent: &mut Agent, ctx: &DecisionContext, rng: &mut dyn RngCore);
}

/// Drop a locked target the current snapshot can no longer resolve
/// (despawned or out of every radius), so no profile chases a stale id.
pub(crate) fn clear_stale_target(agent: &mut Agent, ctx: &DecisionContext) {
    if agent.target.is_some() && !ctx.perception.has_target {
        agent.target = None;
    }
}

/// Shared movement dispatch: map the current state to a pipeline and
/// apply the resulting bounded force. Committed/stationary states steer
/// nothing.
pub(crate) fn drive_motion(
    agent: &mut Agent,
    ctx: &DecisionContext,
    rng: &mut dyn RngCore,
    chase: &SteeringPipeline,
    flee: &SteeringPipeline,
    wander: &SteeringPipeline,
) {
    let out = match agent.state {
        BehaviorState::Chasing => chase.calculate(ctx, rng),
        BehaviorState::Fleeing => flee.calculate(ctx, rng),
        BehaviorState::Wandering => wander.calculate(ctx, rng),
        BehaviorState::Idle
        | BehaviorState::Attacking
        | BehaviorState::Defending
        | BehaviorState::Roaring
        | BehaviorState::Eating => SteeringOutput::NONE,
    };
    if out != SteeringOutput::NONE {
        agent.apply_steering(out.force, out.turn, ctx.dt);
    }
}
