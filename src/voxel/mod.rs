//! Voxel data model

pub mod grid;

pub use grid::VoxelGrid;
