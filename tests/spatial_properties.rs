//! Property tests: the spatial index against a brute-force oracle, and
//! the hard bounds the steering and selection layers promise.

use std::sync::Arc;

use proptest::prelude::*;

use feralmind::context::DecisionContext;
use feralmind::core::config::AiConfig;
use feralmind::core::rng::{jitter, seeded};
use feralmind::core::types::{AgentId, Vec2, Vec3};
use feralmind::entity::agent::Agent;
use feralmind::entity::species::SpeciesDef;
use feralmind::perception::{PerceptionSnapshot, SensedPrey, SensedThreat};
use feralmind::spatial::SpatialHashGrid;
use feralmind::steering::behaviors::{FleeThreat, Seek};
use feralmind::steering::{CompositionMode, SteeringPipeline};

fn point() -> impl Strategy<Value = (f32, f32)> {
    (-200.0f32..200.0, -200.0f32..200.0)
}

proptest! {
    #[test]
    fn radius_query_matches_brute_force(
        points in prop::collection::vec(point(), 0..60),
        (cx, cy) in point(),
        radius in 0.1f32..80.0,
    ) {
        let mut grid = SpatialHashGrid::new(16.0);
        let mut entries = Vec::new();
        for (x, y) in points {
            let id = AgentId::new();
            let pos = Vec2::new(x, y);
            grid.insert(id, pos);
            entries.push((id, pos));
        }

        let center = Vec2::new(cx, cy);
        let mut found = grid.query_radius(center, radius, |_| true);
        let mut expected: Vec<AgentId> = entries
            .iter()
            .filter(|(_, pos)| (*pos - center).length_sq() <= radius * radius)
            .map(|(id, _)| *id)
            .collect();

        found.sort_by_key(|id| id.0);
        expected.sort_by_key(|id| id.0);
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn radius_query_correct_after_moves(
        points in prop::collection::vec((point(), point()), 1..40),
        (cx, cy) in point(),
        radius in 0.1f32..80.0,
    ) {
        let mut grid = SpatialHashGrid::new(16.0);
        let mut entries = Vec::new();
        for ((x0, y0), (x1, y1)) in points {
            let id = AgentId::new();
            grid.insert(id, Vec2::new(x0, y0));
            // Move after insertion; queries must see only the new position
            let moved = Vec2::new(x1, y1);
            grid.update(id, moved);
            entries.push((id, moved));
        }

        let center = Vec2::new(cx, cy);
        let mut found = grid.query_radius(center, radius, |_| true);
        let mut expected: Vec<AgentId> = entries
            .iter()
            .filter(|(_, pos)| (*pos - center).length_sq() <= radius * radius)
            .map(|(id, _)| *id)
            .collect();

        found.sort_by_key(|id| id.0);
        expected.sort_by_key(|id| id.0);
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn find_nearest_agrees_with_brute_force_distance(
        points in prop::collection::vec(point(), 1..40),
        (cx, cy) in point(),
    ) {
        let mut grid = SpatialHashGrid::new(16.0);
        let center = Vec2::new(cx, cy);
        let mut best = f32::INFINITY;
        for (x, y) in points {
            let pos = Vec2::new(x, y);
            grid.insert(AgentId::new(), pos);
            best = best.min(pos.distance(&center));
        }

        // Radius large enough to cover the whole point cloud
        let found = grid.find_nearest(center, 1_000.0, |_| true);
        prop_assert!(found.is_some());
        let (_, dist) = found.unwrap();
        prop_assert!((dist - best).abs() < 1e-3);
    }

    #[test]
    fn composed_steering_never_exceeds_force_cap(
        (px, py) in point(),
        (tx, ty) in point(),
        max_force in 0.5f32..20.0,
        seed in any::<u64>(),
    ) {
        let cfg = AiConfig::default();
        let agent = Agent::spawn(Arc::new(SpeciesDef::pack_raptor()), Vec3::ZERO);
        let snap = PerceptionSnapshot {
            prey: Some(SensedPrey {
                id: AgentId::new(),
                position: Vec2::new(px, py),
                distance: Vec2::new(px, py).length(),
            }),
            has_prey: true,
            threat: Some(SensedThreat {
                id: AgentId::new(),
                position: Vec2::new(tx, ty),
                velocity: Vec2::ZERO,
                distance: Vec2::new(tx, ty).length(),
            }),
            has_threats: true,
            ..Default::default()
        };
        let ctx = DecisionContext::build(&agent, &snap, &cfg, 0.0, 0, 0.1);
        let mut rng = seeded(seed);

        for mode in [CompositionMode::WeightedSum, CompositionMode::PriorityBudget] {
            let pipeline = SteeringPipeline::new(mode, max_force)
                .with(Box::new(Seek), 3.0)
                .with(Box::new(FleeThreat { panic_radius: cfg.panic_radius }), 2.0);
            let out = pipeline.calculate(&ctx, &mut rng);
            prop_assert!(out.force.length() <= max_force + 1e-3);
        }
    }

    #[test]
    fn selection_jitter_stays_within_half_amplitude(
        amplitude in 0.0f32..2.0,
        seed in any::<u64>(),
    ) {
        let mut rng = seeded(seed);
        for _ in 0..100 {
            let j = jitter(&mut rng, amplitude);
            prop_assert!(j.abs() <= amplitude / 2.0 + 1e-6);
        }
    }

    #[test]
    fn truncate_preserves_direction(
        (x, y) in point(),
        cap in 0.1f32..50.0,
    ) {
        let v = Vec2::new(x, y);
        let t = v.truncate(cap);
        prop_assert!(t.length() <= cap + 1e-3);
        if v.length() > 1e-3 {
            // Angle unchanged when the vector is meaningful
            let cross = v.x * t.y - v.y * t.x;
            prop_assert!(cross.abs() < 1e-2 * v.length().max(1.0));
        }
    }
}
