//! Immutable species definitions and archetype presets
//!
//! A [`SpeciesDef`] is shared read-only data; agents hold it behind an
//! `Arc` and never mutate it. The five archetype presets carry tuned
//! ranges that the utility actions and behavior profiles gate on.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{AiError, Result};

/// Coarse behavioral archetype, selects the FSM profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Hunts in groups, flanks, flees when alone and outmatched
    PackHunter,
    /// Large solitary predator that holds and patrols territory
    TerritorialApex,
    /// Waits motionless near prey, strikes from short range
    AmbushPredator,
    /// Flies or roams widely, feeds opportunistically, avoids fights
    ScavengerFlyer,
    /// Lurks in dark enclosed spaces, defends its den aggressively
    CaveDweller,
}

/// Immutable per-species tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesDef {
    pub name: String,
    pub archetype: Archetype,

    pub base_speed: f32,
    pub max_health: f32,
    pub damage: f32,
    /// Preferred group size; pack hunters grow bolder near this many allies
    pub pack_size: u32,

    /// How dangerous this species reads to others; anything with a higher
    /// rank is a threat, anything lower is potential prey.
    pub threat_rank: u8,

    // Perception radii (world units)
    pub threat_radius: f32,
    pub prey_radius: f32,
    pub ally_radius: f32,

    // Action ranges
    pub attack_range: f32,
    pub chase_range: f32,
    pub ambush_range: f32,
    pub strike_range: f32,
}

impl SpeciesDef {
    /// Mid-size coordinated pack predator
    pub fn pack_raptor() -> Self {
        Self {
            name: "pack_raptor".into(),
            archetype: Archetype::PackHunter,
            base_speed: 9.0,
            max_health: 180.0,
            damage: 22.0,
            pack_size: 4,
            threat_rank: 5,
            threat_radius: 40.0,
            prey_radius: 35.0,
            ally_radius: 25.0,
            attack_range: 2.0,
            chase_range: 30.0,
            ambush_range: 10.0,
            strike_range: 3.0,
        }
    }

    /// Apex predator that answers intrusion with a roar before closing
    pub fn apex_tyrant() -> Self {
        Self {
            name: "apex_tyrant".into(),
            archetype: Archetype::TerritorialApex,
            base_speed: 7.0,
            max_health: 600.0,
            damage: 60.0,
            pack_size: 1,
            threat_rank: 9,
            threat_radius: 50.0,
            prey_radius: 45.0,
            ally_radius: 0.0,
            attack_range: 3.5,
            chase_range: 40.0,
            ambush_range: 12.0,
            strike_range: 4.0,
        }
    }

    /// Still hunter; scores pounce over chase inside strike range
    pub fn marsh_lurker() -> Self {
        Self {
            name: "marsh_lurker".into(),
            archetype: Archetype::AmbushPredator,
            base_speed: 6.0,
            max_health: 260.0,
            damage: 45.0,
            pack_size: 1,
            threat_rank: 6,
            threat_radius: 30.0,
            prey_radius: 25.0,
            ally_radius: 0.0,
            attack_range: 2.5,
            chase_range: 12.0,
            ambush_range: 10.0,
            strike_range: 3.0,
        }
    }

    /// Wide-ranging opportunist, low threat, quick to flee
    pub fn carrion_wing() -> Self {
        Self {
            name: "carrion_wing".into(),
            archetype: Archetype::ScavengerFlyer,
            base_speed: 11.0,
            max_health: 90.0,
            damage: 8.0,
            pack_size: 3,
            threat_rank: 2,
            threat_radius: 45.0,
            prey_radius: 40.0,
            ally_radius: 30.0,
            attack_range: 1.5,
            chase_range: 10.0,
            ambush_range: 8.0,
            strike_range: 2.0,
        }
    }

    /// Den-bound lurker; defends hard, rarely roams
    pub fn cave_stalker() -> Self {
        Self {
            name: "cave_stalker".into(),
            archetype: Archetype::CaveDweller,
            base_speed: 8.0,
            max_health: 220.0,
            damage: 30.0,
            pack_size: 2,
            threat_rank: 6,
            threat_radius: 20.0,
            prey_radius: 15.0,
            ally_radius: 12.0,
            attack_range: 2.0,
            chase_range: 15.0,
            ambush_range: 9.0,
            strike_range: 2.5,
        }
    }
}

/// Registry of species definitions keyed by name
pub struct SpeciesTable {
    entries: ahash::AHashMap<String, Arc<SpeciesDef>>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self { entries: ahash::AHashMap::new() }
    }

    /// Table pre-loaded with the five archetype presets
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for def in [
            SpeciesDef::pack_raptor(),
            SpeciesDef::apex_tyrant(),
            SpeciesDef::marsh_lurker(),
            SpeciesDef::carrion_wing(),
            SpeciesDef::cave_stalker(),
        ] {
            table.register(def);
        }
        table
    }

    pub fn register(&mut self, def: SpeciesDef) -> Arc<SpeciesDef> {
        let arc = Arc::new(def);
        self.entries.insert(arc.name.clone(), Arc::clone(&arc));
        arc
    }

    pub fn get(&self, name: &str) -> Result<Arc<SpeciesDef>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| AiError::UnknownSpecies(name.to_string()))
    }

    /// Load additional definitions from a JSON array, overriding presets
    /// that share a name
    pub fn load_json(&mut self, json: &str) -> Result<usize> {
        let defs: Vec<SpeciesDef> = serde_json::from_str(json)
            .map_err(|e| AiError::InvalidConfig(format!("species data: {e}")))?;
        let count = defs.len();
        for def in defs {
            self.register(def);
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
