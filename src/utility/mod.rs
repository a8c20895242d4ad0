pub mod actions;
pub mod engine;
pub mod scorers;

pub use engine::{UtilityAction, UtilityEngine};
