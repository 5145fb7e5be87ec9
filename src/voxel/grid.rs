//! Dense 3D occupancy grid with optional per-voxel color.
//!
//! Produced by an external voxelizer, consumed read-only by the conversion
//! pipeline. Indexing is `[z][y][x]` with z as the vertical build axis.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Dense boolean occupancy grid plus optional same-shaped RGB colors.
///
/// Dimensions are fixed at construction. The pipeline only ever reads the
/// grid; mutation happens while the external voxelizer fills it in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoxelGrid {
    nx: usize,
    ny: usize,
    nz: usize,
    /// Occupancy, flat `[z][y][x]`
    filled: Vec<bool>,
    /// Optional RGB colors, same shape as `filled`
    colors: Option<Vec<Vec3>>,
}

impl VoxelGrid {
    /// Create an empty grid of the given dimensions (x, y, z).
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            nx,
            ny,
            nz,
            filled: vec![false; nx * ny * nz],
            colors: None,
        }
    }

    /// Create an empty grid that also carries a color channel.
    pub fn with_colors(nx: usize, ny: usize, nz: usize) -> Self {
        let mut grid = Self::new(nx, ny, nz);
        grid.colors = Some(vec![Vec3::ZERO; nx * ny * nz]);
        grid
    }

    /// Grid dimensions as (x, y, z).
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.nx && y < self.ny && z < self.nz);
        (z * self.ny + y) * self.nx + x
    }

    /// Whether the cell at (x, y, z) is filled.
    #[inline]
    pub fn is_filled(&self, x: usize, y: usize, z: usize) -> bool {
        self.filled[self.index(x, y, z)]
    }

    /// Mark a cell filled. Used by the voxelizer while building the grid.
    pub fn set_filled(&mut self, x: usize, y: usize, z: usize) {
        let idx = self.index(x, y, z);
        self.filled[idx] = true;
    }

    /// Set the color of a cell. No-op on grids without a color channel.
    pub fn set_color(&mut self, x: usize, y: usize, z: usize, color: Vec3) {
        let idx = self.index(x, y, z);
        if let Some(colors) = &mut self.colors {
            colors[idx] = color;
        }
    }

    /// Color of a cell, if the grid carries colors.
    pub fn color_at(&self, x: usize, y: usize, z: usize) -> Option<Vec3> {
        let idx = self.index(x, y, z);
        self.colors.as_ref().map(|c| c[idx])
    }

    /// Whether the grid carries a color channel.
    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        self.filled.iter().filter(|&&f| f).count()
    }

    /// True when the grid has a zero dimension or no filled cell at all.
    ///
    /// Degenerate grids produce an empty conversion result, not an error.
    pub fn is_degenerate(&self) -> bool {
        self.nx == 0 || self.ny == 0 || self.nz == 0 || !self.filled.iter().any(|&f| f)
    }

    /// Average color over a box region, counting only filled cells.
    ///
    /// Returns None when the grid has no colors or the region covers no
    /// filled cell.
    pub fn average_color(
        &self,
        origin: (usize, usize, usize),
        size: (usize, usize, usize),
    ) -> Option<Vec3> {
        let colors = self.colors.as_ref()?;
        let (x0, y0, z0) = origin;
        let (w, l, h) = size;

        let mut sum = Vec3::ZERO;
        let mut count = 0u32;
        for z in z0..(z0 + h).min(self.nz) {
            for y in y0..(y0 + l).min(self.ny) {
                for x in x0..(x0 + w).min(self.nx) {
                    let idx = self.index(x, y, z);
                    if self.filled[idx] {
                        sum += colors[idx];
                        count += 1;
                    }
                }
            }
        }

        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }
}
