//! Critical-region detection: cells needing structural attention.
//!
//! A cell is critical when it is an overhang (filled with empty space
//! directly below) or sits on an occupancy transition (any axis-aligned
//! neighbor differs). One pass over the grid; the map is read-only for the
//! rest of the pipeline.

use crate::layout::Brick;
use crate::voxel::VoxelGrid;

/// Boolean map of critical cells, same shape as the source grid.
#[derive(Clone, Debug)]
pub struct CriticalMap {
    nx: usize,
    ny: usize,
    nz: usize,
    cells: Vec<bool>,
}

impl CriticalMap {
    /// Detect critical cells in one pass over the grid.
    pub fn detect(grid: &VoxelGrid) -> Self {
        let (nx, ny, nz) = grid.dims();
        let mut cells = vec![false; nx * ny * nz];

        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let filled = grid.is_filled(x, y, z);

                    // Overhang: filled cell with nothing under it. Ground
                    // cells are never overhangs.
                    let overhang = filled && z > 0 && !grid.is_filled(x, y, z - 1);

                    let transition = overhang || Self::on_transition(grid, x, y, z, filled);
                    cells[(z * ny + y) * nx + x] = transition;
                }
            }
        }

        Self { nx, ny, nz, cells }
    }

    /// Any in-bounds axis neighbor with different occupancy.
    fn on_transition(grid: &VoxelGrid, x: usize, y: usize, z: usize, filled: bool) -> bool {
        let (nx, ny, nz) = grid.dims();
        let mut neighbors = Vec::with_capacity(6);
        if x > 0 {
            neighbors.push((x - 1, y, z));
        }
        if x + 1 < nx {
            neighbors.push((x + 1, y, z));
        }
        if y > 0 {
            neighbors.push((x, y - 1, z));
        }
        if y + 1 < ny {
            neighbors.push((x, y + 1, z));
        }
        if z > 0 {
            neighbors.push((x, y, z - 1));
        }
        if z + 1 < nz {
            neighbors.push((x, y, z + 1));
        }
        neighbors
            .into_iter()
            .any(|(ax, ay, az)| grid.is_filled(ax, ay, az) != filled)
    }

    #[inline]
    pub fn is_critical(&self, x: usize, y: usize, z: usize) -> bool {
        debug_assert!(x < self.nx && y < self.ny && z < self.nz);
        self.cells[(z * self.ny + y) * self.nx + x]
    }

    /// Whether any cell of a brick's occupied region is critical.
    pub fn intersects(&self, brick: &Brick) -> bool {
        brick.cells().any(|(x, y, z)| self.is_critical(x, y, z))
    }

    /// Number of critical cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
