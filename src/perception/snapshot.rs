//! Time-bounded summary of what an agent currently senses

use crate::core::types::{AgentId, TimeMs, Vec2};

/// Nearest hostile within threat radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensedThreat {
    pub id: AgentId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub distance: f32,
}

/// Nearest huntable creature within prey radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensedPrey {
    pub id: AgentId,
    pub position: Vec2,
    pub distance: f32,
}

/// A same-species neighbor, for flocking math
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensedAlly {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Everything one agent knows about its surroundings, captured at
/// `taken_at` and valid until the cache TTL elapses.
///
/// "Nothing nearby" is the normal empty case, not an error: every field
/// degrades to `None`/empty and consumers must treat that as idle-safe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerceptionSnapshot {
    pub threat: Option<SensedThreat>,
    pub prey: Option<SensedPrey>,
    pub allies: Vec<SensedAlly>,

    pub has_target: bool,
    pub has_threats: bool,
    pub has_prey: bool,

    /// Resolved position of the agent's locked target, if it still exists
    pub target_position: Option<Vec2>,
    /// Target's velocity, for pursuit prediction
    pub target_velocity: Option<Vec2>,

    pub taken_at: TimeMs,
}

impl PerceptionSnapshot {
    /// Clear for pool reuse; ally capacity is retained
    pub fn reset(&mut self) {
        self.threat = None;
        self.prey = None;
        self.allies.clear();
        self.has_target = false;
        self.has_threats = false;
        self.has_prey = false;
        self.target_position = None;
        self.target_velocity = None;
        self.taken_at = 0;
    }

    /// Snapshot age relative to `now`
    pub fn age(&self, now: TimeMs) -> TimeMs {
        now.saturating_sub(self.taken_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_but_keeps_capacity() {
        let mut snap = PerceptionSnapshot::default();
        snap.allies.reserve(32);
        snap.allies.push(SensedAlly { position: Vec2::ZERO, velocity: Vec2::ZERO });
        snap.has_prey = true;
        snap.taken_at = 99;

        let cap = snap.allies.capacity();
        snap.reset();

        assert_eq!(snap, PerceptionSnapshot::default());
        assert_eq!(snap.allies.capacity(), cap);
    }

    #[test]
    fn test_age_saturates() {
        let snap = PerceptionSnapshot { taken_at: 100, ..Default::default() };
        assert_eq!(snap.age(150), 50);
        assert_eq!(snap.age(50), 0);
    }
}
