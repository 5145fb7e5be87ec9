//! Greedy largest-fit layout builder.
//!
//! Scans each z-layer bottom to top in row-major (y, x) order. At every
//! filled, unclaimed cell it tries all catalog sizes (largest volume first)
//! with the cell as minimum corner, scores fitting candidates by
//! `volume * preliminary_stability`, and places the best. Strictly-greater
//! comparison plus the stable scan order makes output deterministic.

use glam::Vec3;

use crate::catalog::{BrickCatalog, CatalogEntry};
use crate::core::{Error, Result};
use crate::layout::Brick;
use crate::voxel::VoxelGrid;

/// Tracks which cells are already claimed by a placed brick.
struct VisitedMask {
    nx: usize,
    ny: usize,
    cells: Vec<bool>,
}

impl VisitedMask {
    fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            nx,
            ny,
            cells: vec![false; nx * ny * nz],
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize, z: usize) -> bool {
        self.cells[(z * self.ny + y) * self.nx + x]
    }

    fn mark(&mut self, brick: &Brick) {
        let (bx, by, bz) = brick.position;
        let (w, l, h) = brick.size;
        for z in bz..bz + h {
            for y in by..by + l {
                for x in bx..bx + w {
                    self.cells[(z * self.ny + y) * self.nx + x] = true;
                }
            }
        }
    }
}

/// Pack every filled cell of the grid into bricks.
///
/// Errors with `PlacementInvariant` if any filled cell ends up unclaimed;
/// with a validated catalog (1x1x1 fallback present) this cannot happen and
/// indicates an algorithm bug rather than bad input.
pub fn build_layout(grid: &VoxelGrid, catalog: &BrickCatalog) -> Result<Vec<Brick>> {
    let (nx, ny, nz) = grid.dims();
    let mut visited = VisitedMask::new(nx, ny, nz);
    let mut bricks = Vec::new();

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                if !grid.is_filled(x, y, z) || visited.get(x, y, z) {
                    continue;
                }
                let brick = best_fit(grid, &visited, catalog, x, y, z)
                    .ok_or(Error::PlacementInvariant { x, y, z })?;
                visited.mark(&brick);
                bricks.push(brick);
            }
        }
    }

    log::debug!(
        "layout: packed {} filled cells into {} bricks",
        grid.filled_count(),
        bricks.len()
    );
    Ok(bricks)
}

/// Best-scoring catalog size with (x, y, z) as minimum corner.
fn best_fit(
    grid: &VoxelGrid,
    visited: &VisitedMask,
    catalog: &BrickCatalog,
    x: usize,
    y: usize,
    z: usize,
) -> Option<Brick> {
    let mut best: Option<(f32, &CatalogEntry, f32)> = None;

    for entry in catalog.entries() {
        if !can_place(grid, visited, x, y, z, entry.size) {
            continue;
        }
        let stability = preliminary_stability(grid, x, y, z, entry.size);
        let score = entry.volume() as f32 * stability;
        // Strict comparison: the first candidate at a given score wins.
        if best.map_or(true, |(s, _, _)| score > s) {
            best = Some((score, entry, stability));
        }
    }

    best.map(|(_, entry, stability)| Brick {
        position: (x, y, z),
        size: entry.size,
        color: Vec3::ONE,
        stability_score: stability,
        connection_score: 0.0,
        format: entry.format,
        manufacturer: entry.manufacturer,
    })
}

/// A size fits when it stays in bounds and covers only filled, unclaimed
/// cells.
fn can_place(
    grid: &VoxelGrid,
    visited: &VisitedMask,
    x: usize,
    y: usize,
    z: usize,
    size: (usize, usize, usize),
) -> bool {
    let (nx, ny, nz) = grid.dims();
    let (w, l, h) = size;
    if x + w > nx || y + l > ny || z + h > nz {
        return false;
    }
    for dz in 0..h {
        for dy in 0..l {
            for dx in 0..w {
                if !grid.is_filled(x + dx, y + dy, z + dz) || visited.get(x + dx, y + dy, z + dz) {
                    return false;
                }
            }
        }
    }
    true
}

/// Support ratio against the voxels directly below the footprint.
///
/// 1.0 on the ground layer. Refinement against actually-placed bricks
/// happens later in the stability stage.
fn preliminary_stability(
    grid: &VoxelGrid,
    x: usize,
    y: usize,
    z: usize,
    size: (usize, usize, usize),
) -> f32 {
    if z == 0 {
        return 1.0;
    }
    let (w, l, _) = size;
    let mut support = 0usize;
    for dy in 0..l {
        for dx in 0..w {
            if grid.is_filled(x + dx, y + dy, z - 1) {
                support += 1;
            }
        }
    }
    support as f32 / (w * l) as f32
}
