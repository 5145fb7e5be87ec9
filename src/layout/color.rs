//! Nearest-catalog-color assignment.
//!
//! Each brick takes the mean color of its covered voxel region, then the
//! closest catalog color by squared RGB distance. Bricks are disjoint, so
//! the pass parallelizes per brick. Skipped entirely when the grid has no
//! color channel or the catalog is empty.

use rayon::prelude::*;

use crate::catalog::ColorCatalog;
use crate::layout::Brick;
use crate::voxel::VoxelGrid;

/// Assign catalog colors to every brick.
///
/// Returns the input unchanged when no color data is available.
pub fn assign(grid: &VoxelGrid, catalog: &ColorCatalog, bricks: Vec<Brick>) -> Vec<Brick> {
    if !grid.has_colors() || catalog.is_empty() {
        log::debug!("color: no color data, keeping default brick colors");
        return bricks;
    }

    bricks
        .into_par_iter()
        .map(|mut brick| {
            if let Some(avg) = grid.average_color(brick.position, brick.size) {
                if let Some(entry) = catalog.nearest(avg) {
                    brick.color = entry.rgb;
                }
            }
            brick
        })
        .collect()
}
