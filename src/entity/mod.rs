pub mod agent;
pub mod species;

pub use agent::{Agent, BehaviorState};
pub use species::{Archetype, SpeciesDef, SpeciesTable};
