//! Feralmind - Creature decision and locomotion AI

pub mod context;
pub mod core;
pub mod entity;
pub mod orchestrator;
pub mod perception;
pub mod pool;
pub mod profile;
pub mod spatial;
pub mod steering;
pub mod utility;
