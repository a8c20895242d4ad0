//! Sparse hash grid for bounded-cost neighbor queries
//!
//! Cells hold stable agent ids, never live references; the grid also
//! remembers each agent's last indexed position so membership can be
//! re-derived without trusting a cached cell key.

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::types::{AgentId, Vec2};

/// Pack a cell coordinate pair into one map key
#[inline]
fn pack(cx: i32, cz: i32) -> i64 {
    ((cx as i64) << 32) | (cz as i64 & 0xFFFF_FFFF)
}

/// Uniform sparse grid over the ground plane
pub struct SpatialHashGrid {
    cell_size: f32,
    cells: AHashMap<i64, Vec<AgentId>>,
    /// Last position each agent was indexed at; source of truth for
    /// which cell an id currently occupies.
    tracked: AHashMap<AgentId, Vec2>,
}

impl SpatialHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
            tracked: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    #[inline]
    fn cell_key(&self, pos: Vec2) -> i64 {
        let (cx, cz) = self.cell_coord(pos);
        pack(cx, cz)
    }

    /// Number of tracked agents
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.tracked.clear();
    }

    pub fn insert(&mut self, agent: AgentId, pos: Vec2) {
        if self.tracked.contains_key(&agent) {
            // Re-insert of a known agent is an update
            self.update(agent, pos);
            return;
        }
        let key = self.cell_key(pos);
        self.cells.entry(key).or_default().push(agent);
        self.tracked.insert(agent, pos);
    }

    /// Remove an agent; removing an absent id is a no-op
    pub fn remove(&mut self, agent: AgentId) {
        let Some(pos) = self.tracked.remove(&agent) else {
            return;
        };
        let key = self.cell_key(pos);
        if let Some(bucket) = self.cells.get_mut(&key) {
            bucket.retain(|&a| a != agent);
            if bucket.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    /// Refresh an agent's cell membership after movement
    ///
    /// No-op when the cell key is unchanged. Unknown agents are inserted,
    /// so a missed `insert` never poisons later queries.
    pub fn update(&mut self, agent: AgentId, pos: Vec2) {
        let Some(&old_pos) = self.tracked.get(&agent) else {
            self.insert(agent, pos);
            return;
        };
        let old_key = self.cell_key(old_pos);
        let new_key = self.cell_key(pos);
        if old_key == new_key {
            self.tracked.insert(agent, pos);
            return;
        }
        if let Some(bucket) = self.cells.get_mut(&old_key) {
            bucket.retain(|&a| a != agent);
            if bucket.is_empty() {
                self.cells.remove(&old_key);
            }
        }
        self.cells.entry(new_key).or_default().push(agent);
        self.tracked.insert(agent, pos);
    }

    /// Last indexed position of an agent
    pub fn position_of(&self, agent: AgentId) -> Option<Vec2> {
        self.tracked.get(&agent).copied()
    }

    /// All agents within `radius` of `center` (inclusive) passing `predicate`
    ///
    /// Sweeps the bounding box of cells overlapping the circle, then
    /// filters candidates by exact squared distance. Cost scales with
    /// agents in the swept cells, not total population.
    pub fn query_radius<F>(&self, center: Vec2, radius: f32, mut predicate: F) -> Vec<AgentId>
    where
        F: FnMut(AgentId) -> bool,
    {
        let mut out = Vec::new();
        self.for_each_in_radius(center, radius, |id, _| {
            if predicate(id) {
                out.push(id);
            }
        });
        out
    }

    /// Nearest agent within `max_radius` passing `predicate`, with distance
    pub fn find_nearest<F>(
        &self,
        center: Vec2,
        max_radius: f32,
        mut predicate: F,
    ) -> Option<(AgentId, f32)>
    where
        F: FnMut(AgentId) -> bool,
    {
        let mut best: Option<(AgentId, OrderedFloat<f32>)> = None;
        self.for_each_in_radius(center, max_radius, |id, dist_sq| {
            if !predicate(id) {
                return;
            }
            let d = OrderedFloat(dist_sq);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((id, d));
            }
        });
        best.map(|(id, d)| (id, d.into_inner().sqrt()))
    }

    /// Visit every tracked agent within `radius`, with squared distance
    fn for_each_in_radius<F>(&self, center: Vec2, radius: f32, mut visit: F)
    where
        F: FnMut(AgentId, f32),
    {
        if radius < 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        let (min_cx, min_cz) = self.cell_coord(Vec2::new(center.x - radius, center.y - radius));
        let (max_cx, max_cz) = self.cell_coord(Vec2::new(center.x + radius, center.y + radius));

        for cx in min_cx..=max_cx {
            for cz in min_cz..=max_cz {
                let Some(bucket) = self.cells.get(&pack(cx, cz)) else {
                    continue;
                };
                for &id in bucket {
                    let Some(&pos) = self.tracked.get(&id) else {
                        continue;
                    };
                    let dist_sq = (pos - center).length_sq();
                    if dist_sq <= radius_sq {
                        visit(id, dist_sq);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid16() -> SpatialHashGrid {
        SpatialHashGrid::new(16.0)
    }

    #[test]
    fn test_insert_and_query() {
        let mut grid = grid16();
        let a = AgentId::new();
        grid.insert(a, Vec2::new(5.0, 5.0));
        let found = grid.query_radius(Vec2::new(0.0, 0.0), 10.0, |_| true);
        assert_eq!(found, vec![a]);
    }

    #[test]
    fn test_query_radius_inclusive_boundary() {
        let mut grid = grid16();
        let a = AgentId::new();
        grid.insert(a, Vec2::new(10.0, 0.0));
        assert_eq!(grid.query_radius(Vec2::ZERO, 10.0, |_| true).len(), 1);
        assert_eq!(grid.query_radius(Vec2::ZERO, 9.99, |_| true).len(), 0);
    }

    #[test]
    fn test_cell_boundary_straddle() {
        // x=15.999 and x=16.001 land in adjacent cells under cellSize=16
        let mut grid = grid16();
        let a = AgentId::new();
        let b = AgentId::new();
        grid.insert(a, Vec2::new(15.999, 0.0));
        grid.insert(b, Vec2::new(16.001, 0.0));

        let found = grid.query_radius(Vec2::new(16.0, 0.0), 1.0, |_| true);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_negative_coordinates_floor_correctly() {
        let mut grid = grid16();
        let a = AgentId::new();
        grid.insert(a, Vec2::new(-0.5, -0.5));
        let found = grid.query_radius(Vec2::new(-1.0, -1.0), 2.0, |_| true);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_update_reflects_new_position_immediately() {
        let mut grid = grid16();
        let a = AgentId::new();
        grid.insert(a, Vec2::new(0.0, 0.0));
        grid.update(a, Vec2::new(100.0, 100.0));

        assert!(grid.query_radius(Vec2::ZERO, 5.0, |_| true).is_empty());
        assert_eq!(
            grid.query_radius(Vec2::new(100.0, 100.0), 5.0, |_| true).len(),
            1
        );
    }

    #[test]
    fn test_update_same_cell_keeps_exact_position() {
        let mut grid = grid16();
        let a = AgentId::new();
        grid.insert(a, Vec2::new(1.0, 1.0));
        grid.update(a, Vec2::new(2.0, 2.0)); // same cell

        // Exact-distance filtering must use the refreshed position
        assert!(grid.query_radius(Vec2::new(2.0, 2.0), 0.5, |_| true).len() == 1);
        assert!(grid.query_radius(Vec2::new(1.0, 1.0), 0.5, |_| true).is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut grid = grid16();
        grid.remove(AgentId::new());
        assert!(grid.is_empty());

        let a = AgentId::new();
        grid.insert(a, Vec2::ZERO);
        grid.remove(a);
        grid.remove(a); // second removal is also fine
        assert!(grid.is_empty());
    }

    #[test]
    fn test_find_nearest_picks_closest() {
        let mut grid = grid16();
        let near = AgentId::new();
        let far = AgentId::new();
        grid.insert(far, Vec2::new(8.0, 0.0));
        grid.insert(near, Vec2::new(3.0, 0.0));

        let (id, dist) = grid.find_nearest(Vec2::ZERO, 50.0, |_| true).unwrap();
        assert_eq!(id, near);
        assert!((dist - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_find_nearest_respects_predicate() {
        let mut grid = grid16();
        let near = AgentId::new();
        let far = AgentId::new();
        grid.insert(near, Vec2::new(3.0, 0.0));
        grid.insert(far, Vec2::new(8.0, 0.0));

        let (id, _) = grid.find_nearest(Vec2::ZERO, 50.0, |id| id != near).unwrap();
        assert_eq!(id, far);
    }

    #[test]
    fn test_query_independent_of_insertion_order() {
        let positions = [
            Vec2::new(1.0, 1.0),
            Vec2::new(-4.0, 3.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(6.0, -2.0),
        ];
        let mut forward = grid16();
        let mut backward = grid16();
        let ids: Vec<AgentId> = (0..4).map(|_| AgentId::new()).collect();

        for (id, pos) in ids.iter().zip(positions.iter()) {
            forward.insert(*id, *pos);
        }
        for (id, pos) in ids.iter().zip(positions.iter()).rev() {
            backward.insert(*id, *pos);
        }

        let mut f = forward.query_radius(Vec2::ZERO, 8.0, |_| true);
        let mut b = backward.query_radius(Vec2::ZERO, 8.0, |_| true);
        f.sort_by_key(|id| id.0);
        b.sort_by_key(|id| id.0);
        assert_eq!(f, b);
        assert_eq!(f.len(), 3); // all but (20,20)
    }
}
