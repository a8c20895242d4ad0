//! AI configuration with documented constants
//!
//! All tuned values are collected here with explanations of their purpose
//! and how they interact with each other.

use serde::{Deserialize, Serialize};

use crate::core::error::{AiError, Result};

/// Configuration for the creature AI subsystem
///
/// These values have been tuned to produce believable predator/prey
/// behavior at interactive rates. Changing them affects pacing and feel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    // === SPATIAL SYSTEM ===
    /// Size of each cell in the spatial hash grid (world units)
    ///
    /// Should be roughly 1/3 to 1/5 of the largest perception radius.
    /// Smaller = more cells swept per query, fewer agents filtered per cell.
    pub grid_cell_size: f32,

    // === PERCEPTION ===
    /// Maximum age of a cached perception snapshot (wall-clock ms)
    ///
    /// Within this window every system asking "what's nearby" gets the
    /// same snapshot without re-querying the grid. Under load spikes
    /// perception may lag the world by up to this much; that staleness
    /// is an accepted bound, not a bug.
    pub perception_ttl_ms: u64,

    /// Capacity of the snapshot pool
    ///
    /// One snapshot per live agent is the steady state; the pool caps
    /// how many released snapshots are kept warm. Exhaustion falls back
    /// to direct allocation.
    pub snapshot_pool_capacity: usize,

    // === DECISION ENGINE ===
    /// Symmetric random jitter added to final weighted scores
    ///
    /// At 0.05, actions within ±0.025 of each other trade wins at random,
    /// which reads as naturalistic variety. Set to 0.0 for deterministic
    /// selection in tests.
    pub score_jitter: f32,

    // === STEERING ===
    /// Hard cap on composed steering force magnitude
    pub max_steering_force: f32,

    /// Radius inside which Arrive starts slowing down (world units)
    pub arrive_slow_radius: f32,

    /// Radius inside which Flee/Evade panic is at full strength
    pub panic_radius: f32,

    /// Wander heading jitter per tick (radians, half-amplitude)
    pub wander_jitter: f32,

    // === ACTION COMMITMENT ===
    /// Minimum interval between attacks (ms)
    pub attack_cooldown_ms: u64,

    /// Minimum interval between roars (ms)
    pub roar_cooldown_ms: u64,

    /// Duration an attack animation commits the agent (ms)
    ///
    /// While committed, the FSM will not leave Attacking. Matches the
    /// strike animation so attacks cannot be interrupted mid-swing.
    pub attack_commit_ms: u64,

    /// Duration a roar commits the agent (ms)
    pub roar_commit_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            grid_cell_size: 16.0,

            perception_ttl_ms: 100,
            snapshot_pool_capacity: 256,

            score_jitter: 0.05,

            max_steering_force: 10.0,
            arrive_slow_radius: 8.0,
            panic_radius: 12.0,
            wander_jitter: 0.4,

            attack_cooldown_ms: 2_000,
            roar_cooldown_ms: 8_000,
            attack_commit_ms: 700,
            roar_commit_ms: 1_500,
        }
    }
}

impl AiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.grid_cell_size <= 0.0 {
            return Err(AiError::InvalidConfig(
                "grid_cell_size must be positive".into(),
            ));
        }
        if self.max_steering_force <= 0.0 {
            return Err(AiError::InvalidConfig(
                "max_steering_force must be positive".into(),
            ));
        }
        if self.score_jitter < 0.0 {
            return Err(AiError::InvalidConfig(
                "score_jitter must be >= 0".into(),
            ));
        }
        // Commitment shorter than cooldown, otherwise agents re-enter
        // Attacking before the previous strike has resolved.
        if self.attack_commit_ms >= self.attack_cooldown_ms {
            return Err(AiError::InvalidConfig(format!(
                "attack_commit_ms ({}) must be < attack_cooldown_ms ({})",
                self.attack_commit_ms, self.attack_cooldown_ms
            )));
        }
        Ok(())
    }
}
