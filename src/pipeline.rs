//! Conversion pipeline: voxel grid in, bricks + instructions + metrics out.
//!
//! Stage order is fixed: critical-region detection, layout building,
//! optional score hook, stability refinement, connection merging, color
//! assignment, instruction emission. Layout and stability are sequential
//! bottom-to-top; merging and coloring run on disjoint data and
//! parallelize internally.
//!
//! A pipeline owns read-only catalogs and a config; each conversion owns
//! its grid and brick lists, so concurrent conversions share nothing
//! mutable.

use serde::{Deserialize, Serialize};

use crate::catalog::{BrickCatalog, ColorCatalog};
use crate::core::Result;
use crate::instructions::{compute_metrics, emit_layers, LayerInstruction, ModelMetrics};
use crate::layout::{builder, color, connect, stability, Brick, CriticalMap};
use crate::voxel::VoxelGrid;

/// Tunable thresholds for one pipeline instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum support ratio before a brick is reinforced
    pub min_support: f32,
    /// Minimum normalized overlap for a merge
    pub min_overlap: f32,
    /// Physical height of one grid layer
    pub brick_height_unit: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_support: 0.3,
            min_overlap: 0.25,
            brick_height_unit: 1.2,
        }
    }
}

/// Pluggable per-brick score adjustment, applied right after layout
/// building.
///
/// The hosting service uses this to blend in scores learned from
/// previously accepted models; the pipeline itself stays persistence-free.
pub trait ScoreHook: Send + Sync {
    fn adjust(&self, brick: Brick) -> Brick;
}

/// Complete result of one conversion.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Conversion {
    pub bricks: Vec<Brick>,
    pub instructions: Vec<LayerInstruction>,
    pub metrics: ModelMetrics,
}

/// Orchestrates the conversion stages over injected catalogs.
pub struct Pipeline {
    brick_catalog: BrickCatalog,
    color_catalog: ColorCatalog,
    config: PipelineConfig,
    score_hook: Option<Box<dyn ScoreHook>>,
}

impl Pipeline {
    /// Create a pipeline with default thresholds.
    pub fn new(brick_catalog: BrickCatalog, color_catalog: ColorCatalog) -> Self {
        Self::with_config(brick_catalog, color_catalog, PipelineConfig::default())
    }

    pub fn with_config(
        brick_catalog: BrickCatalog,
        color_catalog: ColorCatalog,
        config: PipelineConfig,
    ) -> Self {
        Self {
            brick_catalog,
            color_catalog,
            config,
            score_hook: None,
        }
    }

    /// Install a score hook.
    pub fn with_score_hook(mut self, hook: Box<dyn ScoreHook>) -> Self {
        self.score_hook = Some(hook);
        self
    }

    /// Run the full conversion.
    ///
    /// Degenerate grids (zero dimension or nothing filled) produce an empty
    /// result, not an error.
    pub fn convert(&self, grid: &VoxelGrid) -> Result<Conversion> {
        if grid.is_degenerate() {
            log::info!("conversion skipped: degenerate grid {:?}", grid.dims());
            return Ok(Conversion::default());
        }

        let critical = CriticalMap::detect(grid);
        log::debug!("critical map: {} flagged cells", critical.count());

        let mut bricks = builder::build_layout(grid, &self.brick_catalog)?;

        if let Some(hook) = &self.score_hook {
            bricks = bricks.into_iter().map(|b| hook.adjust(b)).collect();
        }

        let bricks = stability::refine(
            grid,
            &critical,
            bricks,
            &self.brick_catalog,
            self.config.min_support,
        );
        let bricks = connect::optimize(bricks, &self.brick_catalog, self.config.min_overlap);
        let bricks = color::assign(grid, &self.color_catalog, bricks);

        let instructions = emit_layers(
            &bricks,
            self.config.brick_height_unit,
            self.config.min_support,
            self.config.min_overlap,
        );
        let metrics = compute_metrics(&bricks);

        log::info!(
            "conversion done: {} bricks in {} layers, avg stability {:.2}",
            metrics.total_bricks,
            instructions.len(),
            metrics.avg_stability
        );

        Ok(Conversion {
            bricks,
            instructions,
            metrics,
        })
    }
}
