pub mod hash_grid;

pub use hash_grid::SpatialHashGrid;
