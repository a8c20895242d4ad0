//! Per-agent perception cache with a wall-clock TTL
//!
//! Bounds per-tick cost: the expensive grid scans run at most once per
//! TTL window per agent, no matter how many systems ask. The entry map
//! is lock-guarded because despawns arrive from outside the tick loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use ahash::AHashMap;

use crate::core::types::{AgentId, TimeMs, Vec3};
use crate::entity::agent::Agent;
use crate::entity::species::SpeciesDef;
use crate::perception::snapshot::{PerceptionSnapshot, SensedAlly, SensedPrey, SensedThreat};
use crate::pool::{ObjectPool, PoolStats};
use crate::spatial::SpatialHashGrid;

/// Read-only copy of another agent's sensable state
#[derive(Debug, Clone)]
pub struct AgentView {
    pub position: Vec3,
    pub velocity: Vec3,
    pub species: Arc<SpeciesDef>,
}

/// Per-tick lookup table of every live agent's sensable state
#[derive(Default)]
pub struct WorldView {
    agents: AHashMap<AgentId, AgentView>,
}

impl WorldView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_agents(agents: &[Agent]) -> Self {
        let mut view = Self::new();
        for agent in agents {
            if !agent.is_dead() {
                view.insert(agent);
            }
        }
        view
    }

    pub fn insert(&mut self, agent: &Agent) {
        self.agents.insert(
            agent.id,
            AgentView {
                position: agent.position,
                velocity: agent.velocity,
                species: Arc::clone(&agent.species),
            },
        );
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentView> {
        self.agents.get(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

pub struct PerceptionCache {
    ttl_ms: TimeMs,
    entries: RwLock<AHashMap<AgentId, Arc<PerceptionSnapshot>>>,
    pool: ObjectPool<PerceptionSnapshot>,
    /// Number of full recomputes, for diagnostics and TTL tests
    refreshes: AtomicU64,
}

impl PerceptionCache {
    pub fn new(ttl_ms: TimeMs, pool_capacity: usize) -> Self {
        Self {
            ttl_ms,
            entries: RwLock::new(AHashMap::new()),
            pool: ObjectPool::new(
                pool_capacity,
                PerceptionSnapshot::default,
                PerceptionSnapshot::reset,
            ),
            refreshes: AtomicU64::new(0),
        }
    }

    /// What does this agent sense right now?
    ///
    /// Returns the cached snapshot verbatim while it is younger than the
    /// TTL; otherwise recycles it and recomputes from the grid. Always
    /// yields a valid snapshot, even for a never-seen agent with nothing
    /// nearby.
    pub fn perceive(
        &self,
        agent: &Agent,
        view: &WorldView,
        grid: &SpatialHashGrid,
        now: TimeMs,
    ) -> Arc<PerceptionSnapshot> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = entries.get(&agent.id) {
                if cached.age(now) <= self.ttl_ms {
                    return Arc::clone(cached);
                }
            }
        }
        self.refresh(agent, view, grid, now)
    }

    fn refresh(
        &self,
        agent: &Agent,
        view: &WorldView,
        grid: &SpatialHashGrid,
        now: TimeMs,
    ) -> Arc<PerceptionSnapshot> {
        self.refreshes.fetch_add(1, Ordering::Relaxed);

        // Shelve the stale snapshot first so the acquire below can reuse
        // its buffer; recycling only works when no caller still holds it
        let old = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.remove(&agent.id)
        };
        if let Some(old) = old {
            if let Ok(inner) = Arc::try_unwrap(old) {
                self.pool.release(inner);
            }
        }

        let mut snap = self.pool.acquire();
        self.populate(&mut snap, agent, view, grid, now);
        let arc = Arc::new(snap);
        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.insert(agent.id, Arc::clone(&arc));
        }

        tracing::trace!(agent = ?agent.id, age_limit_ms = self.ttl_ms, "perception refreshed");
        arc
    }

    fn populate(
        &self,
        snap: &mut PerceptionSnapshot,
        agent: &Agent,
        view: &WorldView,
        grid: &SpatialHashGrid,
        now: TimeMs,
    ) {
        let pos = agent.flat_pos();
        let my_rank = agent.species.threat_rank;
        let species = &agent.species;

        let outranks_me = |id: AgentId| {
            id != agent.id
                && view
                    .get(id)
                    .map_or(false, |v| v.species.threat_rank > my_rank)
        };
        if let Some((id, distance)) = grid.find_nearest(pos, species.threat_radius, outranks_me) {
            if let Some(v) = view.get(id) {
                snap.threat = Some(SensedThreat {
                    id,
                    position: v.position.flat(),
                    velocity: v.velocity.flat(),
                    distance,
                });
            }
        }

        let below_me = |id: AgentId| {
            id != agent.id
                && view
                    .get(id)
                    .map_or(false, |v| v.species.threat_rank < my_rank)
        };
        if let Some((id, distance)) = grid.find_nearest(pos, species.prey_radius, below_me) {
            if let Some(v) = view.get(id) {
                snap.prey = Some(SensedPrey {
                    id,
                    position: v.position.flat(),
                    distance,
                });
            }
        }

        if species.ally_radius > 0.0 {
            let same_species = |id: AgentId| {
                id != agent.id
                    && view
                        .get(id)
                        .map_or(false, |v| v.species.name == species.name)
            };
            for id in grid.query_radius(pos, species.ally_radius, same_species) {
                if let Some(v) = view.get(id) {
                    snap.allies.push(SensedAlly {
                        position: v.position.flat(),
                        velocity: v.velocity.flat(),
                    });
                }
            }
        }

        let target_view = agent.target.and_then(|id| view.get(id));
        snap.target_position = target_view.map(|v| v.position.flat());
        snap.target_velocity = target_view.map(|v| v.velocity.flat());
        snap.has_target = snap.target_position.is_some();
        snap.has_threats = snap.threat.is_some();
        snap.has_prey = snap.prey.is_some();
        snap.taken_at = now;
    }

    /// Drop an agent's cached entry; idempotent, safe during iteration
    /// from another thread
    pub fn forget(&self, id: AgentId) {
        let old = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.remove(&id)
        };
        if let Some(old) = old {
            if let Ok(inner) = Arc::try_unwrap(old) {
                self.pool.release(inner);
            }
        }
    }

    /// Total recomputes since construction
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;
    use crate::entity::species::SpeciesDef;

    fn world(agents: &[Agent]) -> (WorldView, SpatialHashGrid) {
        let view = WorldView::from_agents(agents);
        let mut grid = SpatialHashGrid::new(16.0);
        for a in agents {
            grid.insert(a.id, a.flat_pos());
        }
        (view, grid)
    }

    fn raptor_at(x: f32, z: f32) -> Agent {
        Agent::spawn(Arc::new(SpeciesDef::pack_raptor()), Vec3::new(x, 0.0, z))
    }

    #[test]
    fn test_empty_world_yields_valid_empty_snapshot() {
        let observer = raptor_at(0.0, 0.0);
        let (view, grid) = world(std::slice::from_ref(&observer));
        let cache = PerceptionCache::new(100, 8);

        let snap = cache.perceive(&observer, &view, &grid, 0);
        assert!(!snap.has_threats);
        assert!(!snap.has_prey);
        assert!(!snap.has_target);
        assert!(snap.allies.is_empty());
    }

    #[test]
    fn test_within_ttl_returns_identical_snapshot() {
        let observer = raptor_at(0.0, 0.0);
        let other = raptor_at(5.0, 0.0);
        let agents = vec![observer.clone(), other];
        let (view, grid) = world(&agents);
        let cache = PerceptionCache::new(100, 8);

        let first = cache.perceive(&observer, &view, &grid, 0);
        let second = cache.perceive(&observer, &view, &grid, 50);
        assert_eq!(*first, *second);
        assert_eq!(cache.refresh_count(), 1);
    }

    #[test]
    fn test_past_ttl_triggers_recompute() {
        let observer = raptor_at(0.0, 0.0);
        let (view, grid) = world(std::slice::from_ref(&observer));
        let cache = PerceptionCache::new(100, 8);

        let _ = cache.perceive(&observer, &view, &grid, 0);
        let snap = cache.perceive(&observer, &view, &grid, 150);
        assert_eq!(cache.refresh_count(), 2);
        assert_eq!(snap.taken_at, 150);
    }

    #[test]
    fn test_threat_and_prey_classified_by_rank() {
        let mut agents = vec![raptor_at(0.0, 0.0)];
        let apex = Agent::spawn(
            Arc::new(SpeciesDef::apex_tyrant()),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let flyer = Agent::spawn(
            Arc::new(SpeciesDef::carrion_wing()),
            Vec3::new(0.0, 0.0, 8.0),
        );
        agents.push(apex);
        agents.push(flyer);
        let (view, grid) = world(&agents);
        let cache = PerceptionCache::new(100, 8);

        let snap = cache.perceive(&agents[0], &view, &grid, 0);
        let threat = snap.threat.expect("apex outranks raptor");
        assert!((threat.distance - 10.0).abs() < 1e-3);
        let prey = snap.prey.expect("flyer ranks below raptor");
        assert!((prey.distance - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_allies_are_same_species_only() {
        let agents = vec![
            raptor_at(0.0, 0.0),
            raptor_at(4.0, 0.0),
            raptor_at(0.0, 4.0),
            Agent::spawn(
                Arc::new(SpeciesDef::carrion_wing()),
                Vec3::new(2.0, 0.0, 2.0),
            ),
        ];
        let (view, grid) = world(&agents);
        let cache = PerceptionCache::new(100, 8);

        let snap = cache.perceive(&agents[0], &view, &grid, 0);
        assert_eq!(snap.allies.len(), 2);
    }

    #[test]
    fn test_target_resolved_through_view() {
        let mut observer = raptor_at(0.0, 0.0);
        let quarry = Agent::spawn(
            Arc::new(SpeciesDef::carrion_wing()),
            Vec3::new(6.0, 0.0, 0.0),
        );
        observer.target = Some(quarry.id);
        let agents = vec![observer.clone(), quarry];
        let (view, grid) = world(&agents);
        let cache = PerceptionCache::new(100, 8);

        let snap = cache.perceive(&observer, &view, &grid, 0);
        assert!(snap.has_target);
        assert_eq!(snap.target_position.unwrap().x, 6.0);
    }

    #[test]
    fn test_forget_is_idempotent_and_frees_entry() {
        let observer = raptor_at(0.0, 0.0);
        let (view, grid) = world(std::slice::from_ref(&observer));
        let cache = PerceptionCache::new(100, 8);

        let _ = cache.perceive(&observer, &view, &grid, 0);
        cache.forget(observer.id);
        cache.forget(observer.id); // no-op

        // Next perceive recomputes even though within TTL
        let _ = cache.perceive(&observer, &view, &grid, 10);
        assert_eq!(cache.refresh_count(), 2);
    }

    #[test]
    fn test_snapshots_are_pooled_across_refreshes() {
        let observer = raptor_at(0.0, 0.0);
        let (view, grid) = world(std::slice::from_ref(&observer));
        let cache = PerceptionCache::new(10, 8);

        let first = cache.perceive(&observer, &view, &grid, 0);
        drop(first); // release the only outside reference
        let _ = cache.perceive(&observer, &view, &grid, 50);
        assert!(cache.pool_stats().reused >= 1);
    }

    #[test]
    fn test_stale_snapshot_recycled_before_allocation() {
        let observer = raptor_at(0.0, 0.0);
        let (view, grid) = world(std::slice::from_ref(&observer));
        let cache = PerceptionCache::new(10, 8);

        drop(cache.perceive(&observer, &view, &grid, 0));
        drop(cache.perceive(&observer, &view, &grid, 50));
        drop(cache.perceive(&observer, &view, &grid, 100));

        // One buffer circulates through every refresh
        let stats = cache.pool_stats();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.reused, 2);
    }
}
