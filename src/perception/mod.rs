pub mod cache;
pub mod snapshot;

pub use cache::{AgentView, PerceptionCache, WorldView};
pub use snapshot::{PerceptionSnapshot, SensedAlly, SensedPrey, SensedThreat};
