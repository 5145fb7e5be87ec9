//! Brick layout stages: critical regions, packing, stability, merging, color.
//!
//! Stages run in a fixed order and each consumes the brick list of the
//! previous one. Bricks are immutable values; a stage builds a new list
//! rather than mutating shared state, so no aliasing survives across
//! stages.

pub mod critical;
pub mod builder;
pub mod stability;
pub mod connect;
pub mod color;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::catalog::{BrickFormat, Manufacturer};

pub use critical::CriticalMap;

/// A placed brick: grid-cell origin, size in cells, scores, and tags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Minimum-corner grid cell (x, y, z)
    pub position: (usize, usize, usize),
    /// Extent in grid cells (width, length, height)
    pub size: (usize, usize, usize),
    /// Assigned RGB color
    pub color: Vec3,
    /// Support ratio in [0,1]; 1.0 for ground-layer bricks
    pub stability_score: f32,
    /// Merge-quality score in [0,1]; 0.0 for never-merged bricks
    pub connection_score: f32,
    pub format: BrickFormat,
    pub manufacturer: Manufacturer,
}

impl Brick {
    /// Footprint area in cells (width * length).
    pub fn footprint_area(&self) -> usize {
        self.size.0 * self.size.1
    }

    pub fn volume(&self) -> usize {
        self.size.0 * self.size.1 * self.size.2
    }

    /// One past the top cell layer (`z + height`).
    pub fn top(&self) -> usize {
        self.position.2 + self.size.2
    }

    /// Whether this brick occupies the cell (x, y, z).
    pub fn covers(&self, x: usize, y: usize, z: usize) -> bool {
        let (bx, by, bz) = self.position;
        let (w, l, h) = self.size;
        x >= bx && x < bx + w && y >= by && y < by + l && z >= bz && z < bz + h
    }

    /// Footprint overlap area with another brick, ignoring z.
    pub fn footprint_overlap(&self, other: &Brick) -> usize {
        let (x1, y1, _) = self.position;
        let (w1, l1, _) = self.size;
        let (x2, y2, _) = other.position;
        let (w2, l2, _) = other.size;

        let ox = (x1 + w1).min(x2 + w2).saturating_sub(x1.max(x2));
        let oy = (y1 + l1).min(y2 + l2).saturating_sub(y1.max(y2));
        ox * oy
    }

    /// Visit every cell the brick occupies.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let (bx, by, bz) = self.position;
        let (w, l, h) = self.size;
        (bz..bz + h).flat_map(move |z| {
            (by..by + l).flat_map(move |y| (bx..bx + w).map(move |x| (x, y, z)))
        })
    }
}

/// Canonical brick ordering: by (z, y, x) origin, then size.
///
/// Applied after every parallel stage so pipeline output is deterministic.
pub fn sort_bricks(bricks: &mut [Brick]) {
    bricks.sort_by_key(|b| (b.position.2, b.position.1, b.position.0, b.size));
}

/// Plain brick for unit tests.
#[cfg(test)]
pub(crate) fn test_brick(position: (usize, usize, usize), size: (usize, usize, usize)) -> Brick {
    Brick {
        position,
        size,
        color: Vec3::ONE,
        stability_score: 1.0,
        connection_score: 0.0,
        format: BrickFormat::Standard,
        manufacturer: Manufacturer::Official,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers() {
        let brick = test_brick((1, 2, 3), (2, 1, 1));
        assert!(brick.covers(1, 2, 3));
        assert!(brick.covers(2, 2, 3));
        assert!(!brick.covers(3, 2, 3));
        assert!(!brick.covers(1, 2, 4));
    }

    #[test]
    fn test_footprint_overlap() {
        let a = test_brick((0, 0, 0), (2, 2, 1));
        let b = test_brick((1, 1, 5), (2, 2, 1));
        assert_eq!(a.footprint_overlap(&b), 1);

        let c = test_brick((2, 0, 0), (2, 2, 1));
        assert_eq!(a.footprint_overlap(&c), 0);
    }

    #[test]
    fn test_cells_count() {
        let brick = test_brick((0, 0, 0), (2, 3, 2));
        assert_eq!(brick.cells().count(), 12);
    }

    #[test]
    fn test_sort_is_canonical() {
        let mut bricks = vec![
            test_brick((1, 0, 1), (1, 1, 1)),
            test_brick((0, 0, 0), (1, 1, 1)),
            test_brick((0, 1, 0), (1, 1, 1)),
        ];
        sort_bricks(&mut bricks);
        assert_eq!(bricks[0].position, (0, 0, 0));
        assert_eq!(bricks[1].position, (0, 1, 0));
        assert_eq!(bricks[2].position, (1, 0, 1));
    }
}
