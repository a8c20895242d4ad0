pub mod behaviors;
pub mod pipeline;

pub use behaviors::{SteeringBehavior, SteeringOutput};
pub use pipeline::{CompositionMode, SteeringPipeline};
