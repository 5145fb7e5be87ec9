//! Blocky - converts voxelized 3D models into buildable brick layouts
//!
//! The pipeline turns a dense occupancy grid into a list of brick-shaped
//! blocks with stability and connectivity scores, plus per-layer build
//! instructions:
//!
//! 1. Critical-region detection (overhangs, occupancy transitions)
//! 2. Greedy largest-fit layout building
//! 3. Support-ratio stability refinement
//! 4. Per-layer greedy brick merging
//! 5. Nearest-catalog-color assignment
//! 6. Instruction + metrics emission

pub mod core;
pub mod voxel;
pub mod catalog;
pub mod layout;
pub mod instructions;
pub mod pipeline;

pub use crate::core::{Error, Result};
pub use crate::pipeline::{Conversion, Pipeline, PipelineConfig, ScoreHook};
