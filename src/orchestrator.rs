//! Per-tick driver for the full agent population
//!
//! Ticks are cooperative: each agent's tick runs to completion before the
//! next begins, and never blocks on I/O. The registration set and the
//! perception cache are lock-guarded because despawns can arrive from
//! outside the tick loop; the grid is only written between agent ticks.

use std::sync::{Mutex, RwLock};
use std::time::Instant;

use ahash::AHashSet;
use rand_chacha::ChaCha8Rng;

use crate::context::DecisionContext;
use crate::core::config::AiConfig;
use crate::core::error::Result;
use crate::core::rng::seeded;
use crate::core::types::{AgentId, TimeMs, Vec3};
use crate::entity::agent::Agent;
use crate::entity::species::Archetype;
use crate::perception::{PerceptionCache, WorldView};
use crate::pool::PoolStats;
use crate::profile::{
    AmbushPredatorProfile, BehaviorProfile, CaveDwellerProfile, PackHunterProfile,
    ScavengerFlyerProfile, TerritorialApexProfile,
};
use crate::spatial::SpatialHashGrid;

/// Territory/danger classification supplied by the world system
pub type DangerProbe = Box<dyn Fn(Vec3) -> f32 + Send + Sync>;

pub struct Orchestrator {
    config: AiConfig,
    grid: RwLock<SpatialHashGrid>,
    cache: PerceptionCache,
    profiles: ahash::AHashMap<Archetype, Box<dyn BehaviorProfile>>,
    registered: RwLock<AHashSet<AgentId>>,
    rng: Mutex<ChaCha8Rng>,
    danger_probe: Option<DangerProbe>,
    epoch: Instant,
    last_tick_at: Mutex<Option<TimeMs>>,
}

impl Orchestrator {
    pub fn new(config: AiConfig) -> Result<Self> {
        Self::with_seed(config, 0xFE9A_11FD)
    }

    /// Fully deterministic construction for tests
    pub fn with_seed(config: AiConfig, seed: u64) -> Result<Self> {
        config.validate()?;

        let mut profiles: ahash::AHashMap<Archetype, Box<dyn BehaviorProfile>> =
            ahash::AHashMap::new();
        profiles.insert(
            Archetype::PackHunter,
            Box::new(PackHunterProfile::new(&config)),
        );
        profiles.insert(
            Archetype::TerritorialApex,
            Box::new(TerritorialApexProfile::new(&config)),
        );
        profiles.insert(
            Archetype::AmbushPredator,
            Box::new(AmbushPredatorProfile::new(&config)),
        );
        profiles.insert(
            Archetype::ScavengerFlyer,
            Box::new(ScavengerFlyerProfile::new(&config)),
        );
        profiles.insert(
            Archetype::CaveDweller,
            Box::new(CaveDwellerProfile::new(&config)),
        );

        Ok(Self {
            grid: RwLock::new(SpatialHashGrid::new(config.grid_cell_size)),
            cache: PerceptionCache::new(config.perception_ttl_ms, config.snapshot_pool_capacity),
            profiles,
            registered: RwLock::new(AHashSet::new()),
            rng: Mutex::new(seeded(seed)),
            danger_probe: None,
            epoch: Instant::now(),
            last_tick_at: Mutex::new(None),
            config,
        })
    }

    /// Install the external territory danger classifier
    pub fn set_danger_probe(&mut self, probe: DangerProbe) {
        self.danger_probe = Some(probe);
    }

    /// Replace a species profile (e.g. a test double)
    pub fn set_profile(&mut self, archetype: Archetype, profile: Box<dyn BehaviorProfile>) {
        self.profiles.insert(archetype, profile);
    }

    pub fn register_agent(&self, agent: &Agent) {
        let mut registered = self.registered.write().unwrap_or_else(|e| e.into_inner());
        registered.insert(agent.id);
        drop(registered);
        let mut grid = self.grid.write().unwrap_or_else(|e| e.into_inner());
        grid.insert(agent.id, agent.flat_pos());
    }

    /// Idempotent: unregistering twice, or an agent never registered,
    /// is a no-op
    pub fn unregister_agent(&self, id: AgentId) {
        let mut registered = self.registered.write().unwrap_or_else(|e| e.into_inner());
        registered.remove(&id);
        drop(registered);
        let mut grid = self.grid.write().unwrap_or_else(|e| e.into_inner());
        grid.remove(id);
        drop(grid);
        self.cache.forget(id);
    }

    /// Wall-clock milliseconds since this orchestrator was built
    pub fn now_ms(&self) -> TimeMs {
        self.epoch.elapsed().as_millis() as TimeMs
    }

    /// Tick one agent against a prepared world view, at an explicit time
    ///
    /// `tick_all` drives this for the whole population; tests drive it
    /// directly to control time.
    pub fn tick_at(&self, agent: &mut Agent, view: &WorldView, now: TimeMs, dt: f32) {
        if agent.is_dead() || agent.is_sedated() {
            tracing::trace!(agent = ?agent.id, "skipping dead or sedated agent");
            return;
        }
        let Some(profile) = self.profiles.get(&agent.species.archetype) else {
            tracing::warn!(
                agent = ?agent.id,
                archetype = ?agent.species.archetype,
                "agent has no behavior profile; skipping tick"
            );
            return;
        };

        let snapshot = {
            let grid = self.grid.read().unwrap_or_else(|e| e.into_inner());
            self.cache.perceive(agent, view, &grid, now)
        };
        let danger = self
            .danger_probe
            .as_ref()
            .map_or(0.0, |probe| probe(agent.position));

        {
            let observed = agent.clone();
            let ctx = DecisionContext::build(&observed, &snapshot, &self.config, danger, now, dt);
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            profile.tick(agent, &ctx, &mut *rng);
        }

        // Integrate and refresh index membership from the new position
        agent.position = agent.position + agent.velocity * dt;
        let mut grid = self.grid.write().unwrap_or_else(|e| e.into_inner());
        grid.update(agent.id, agent.flat_pos());
    }

    /// Tick one agent using wall-clock time
    pub fn tick(&self, agent: &mut Agent, view: &WorldView) {
        let now = self.now_ms();
        let dt = self.step_dt(now);
        self.tick_at(agent, view, now, dt);
    }

    /// Tick the whole population once
    pub fn tick_all(&self, agents: &mut [Agent]) {
        let now = self.now_ms();
        let dt = self.step_dt(now);
        let view = WorldView::from_agents(agents);
        for agent in agents.iter_mut() {
            let is_registered = {
                let registered = self.registered.read().unwrap_or_else(|e| e.into_inner());
                registered.contains(&agent.id)
            };
            if is_registered {
                self.tick_at(agent, &view, now, dt);
            }
        }
    }

    fn step_dt(&self, now: TimeMs) -> f32 {
        let mut last = self.last_tick_at.lock().unwrap_or_else(|e| e.into_inner());
        let dt = match *last {
            Some(prev) => (now.saturating_sub(prev) as f32 / 1_000.0).clamp(0.001, 0.25),
            None => 0.05,
        };
        *last = Some(now);
        dt
    }

    // === Diagnostics ===

    pub fn agent_count(&self) -> usize {
        let registered = self.registered.read().unwrap_or_else(|e| e.into_inner());
        registered.len()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.cache.pool_stats()
    }

    /// Perception recomputes since construction
    pub fn perception_refreshes(&self) -> u64 {
        self.cache.refresh_count()
    }
}
