//! Support-ratio refinement and reinforcement of weak bricks.
//!
//! Bricks are processed bottom to top. Bricks touching the critical map get
//! their stability recomputed against the top faces of already-processed
//! lower bricks. Under-supported bricks are reinforced: a narrow footprint
//! may be widened when that is geometrically legal, and the score is floored
//! at `min_support` either way. Reinforcement never fails; a brick that
//! cannot be reshaped keeps its footprint and is surfaced later via tips.

use crate::catalog::BrickCatalog;
use crate::layout::{sort_bricks, Brick, CriticalMap};
use crate::voxel::VoxelGrid;

/// Refine stability scores, reinforcing under-supported critical bricks.
///
/// Consumes the layout-builder output and returns a new list. Footprints
/// only change through the guarded widen rule, which preserves the
/// cell-partition property (vacated cells are re-covered by 1x1 fillers).
pub fn refine(
    grid: &VoxelGrid,
    critical: &CriticalMap,
    mut bricks: Vec<Brick>,
    catalog: &BrickCatalog,
    min_support: f32,
) -> Vec<Brick> {
    sort_bricks(&mut bricks);

    let mut processed: Vec<Brick> = Vec::with_capacity(bricks.len());
    let mut reinforced = 0usize;

    for (i, brick) in bricks.iter().enumerate() {
        if !critical.intersects(brick) {
            // Outside critical regions the preliminary score stands.
            processed.push(brick.clone());
            continue;
        }

        let support = support_score(brick, &processed);
        if support >= min_support {
            let mut refined = brick.clone();
            refined.stability_score = support;
            processed.push(refined);
            continue;
        }

        reinforced += 1;
        let others = bricks[..i].iter().chain(bricks[i + 1..].iter());
        match try_widen(grid, others.chain(processed.iter()), catalog, brick) {
            Some((mut widened, fillers)) => {
                widened.stability_score = support.max(min_support);
                for mut filler in fillers {
                    filler.stability_score = widened.stability_score;
                    processed.push(filler);
                }
                processed.push(widened);
            }
            None => {
                let mut clamped = brick.clone();
                clamped.stability_score = support.max(min_support);
                processed.push(clamped);
            }
        }
    }

    if reinforced > 0 {
        log::debug!("stability: reinforced {} under-supported bricks", reinforced);
    }
    sort_bricks(&mut processed);
    processed
}

/// Fraction of the footprint resting on lower bricks' top faces.
fn support_score(brick: &Brick, lower: &[Brick]) -> f32 {
    if brick.position.2 == 0 {
        return 1.0;
    }
    let area = brick.footprint_area();
    let supported: usize = lower
        .iter()
        .filter(|b| b.top() == brick.position.2)
        .map(|b| brick.footprint_overlap(b))
        .sum();
    supported as f32 / area as f32
}

/// The single reinforcement heuristic: a 1-wide brick longer than 2 grows
/// to width 2 and shrinks by one in length.
///
/// Applies only when the reshape is legal: both new sizes exist in the
/// catalog, the widened footprint stays in bounds and claims only filled
/// cells owned by no other brick, and each vacated cell is re-covered by a
/// 1x1 filler of the same height. Returns the widened brick plus fillers.
fn try_widen<'a>(
    grid: &VoxelGrid,
    others: impl Iterator<Item = &'a Brick> + Clone,
    catalog: &BrickCatalog,
    brick: &Brick,
) -> Option<(Brick, Vec<Brick>)> {
    let (w, l, h) = brick.size;
    if w != 1 || l <= 2 {
        return None;
    }
    let (new_w, new_l) = (2, l - 1);
    if !catalog.contains_size(new_w, new_l, h) || !catalog.contains_size(1, 1, h) {
        return None;
    }

    let (x, y, z) = brick.position;
    let (nx, ny, _) = grid.dims();
    if x + new_w > nx || y + new_l > ny {
        return None;
    }

    // Cells gained by the wider footprint must be filled and unclaimed.
    for dz in 0..h {
        for dy in 0..new_l {
            let (gx, gy, gz) = (x + 1, y + dy, z + dz);
            if !grid.is_filled(gx, gy, gz) {
                return None;
            }
            if others.clone().any(|b| b.covers(gx, gy, gz)) {
                return None;
            }
        }
    }

    let mut widened = brick.clone();
    widened.size = (new_w, new_l, h);
    if let Some(entry) = catalog.lookup(new_w, new_l, h) {
        widened.format = entry.format;
        widened.manufacturer = entry.manufacturer;
    }

    // Vacated tail cell becomes a 1x1 filler so no voxel loses coverage.
    let mut fillers = Vec::new();
    let filler_entry = catalog.lookup(1, 1, h)?;
    let mut filler = brick.clone();
    filler.position = (x, y + new_l, z);
    filler.size = (1, 1, h);
    filler.format = filler_entry.format;
    filler.manufacturer = filler_entry.manufacturer;
    filler.connection_score = 0.0;
    fillers.push(filler);

    Some((widened, fillers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_brick;

    #[test]
    fn test_ground_bricks_stay_full_stability() {
        let mut grid = VoxelGrid::new(2, 1, 1);
        grid.set_filled(0, 0, 0);
        grid.set_filled(1, 0, 0);
        let critical = CriticalMap::detect(&grid);

        let bricks = vec![test_brick((0, 0, 0), (2, 1, 1))];
        let refined = refine(&grid, &critical, bricks, &BrickCatalog::standard(), 0.3);
        assert_eq!(refined[0].stability_score, 1.0);
    }

    #[test]
    fn test_overhang_floored_to_min_support() {
        // 1x1 brick with nothing below: support 0, un-reshapeable, floored.
        let mut grid = VoxelGrid::new(1, 1, 2);
        grid.set_filled(0, 0, 1);
        let critical = CriticalMap::detect(&grid);

        let mut brick = test_brick((0, 0, 1), (1, 1, 1));
        brick.stability_score = 0.0;
        let refined = refine(&grid, &critical, vec![brick], &BrickCatalog::standard(), 0.3);

        assert_eq!(refined.len(), 1);
        assert_eq!(refined[0].size, (1, 1, 1));
        assert_eq!(refined[0].stability_score, 0.3);
    }

    #[test]
    fn test_partial_support_refined() {
        // 1x2 brick resting half on a 1x1 support: score becomes 0.5.
        let mut grid = VoxelGrid::new(1, 2, 2);
        grid.set_filled(0, 0, 0);
        grid.set_filled(0, 0, 1);
        grid.set_filled(0, 1, 1);
        let critical = CriticalMap::detect(&grid);

        let base = test_brick((0, 0, 0), (1, 1, 1));
        let mut upper = test_brick((0, 0, 1), (1, 2, 1));
        upper.stability_score = 0.5;
        let refined = refine(
            &grid,
            &critical,
            vec![base, upper],
            &BrickCatalog::standard(),
            0.3,
        );

        let upper = refined.iter().find(|b| b.position.2 == 1).unwrap();
        assert_eq!(upper.stability_score, 0.5);
    }

    #[test]
    fn test_widen_rule_fires_when_legal() {
        // A 1x4 brick with 1/4 support and a free filled column beside it:
        // widened to 2x3, the vacated tail cell re-covered by a filler.
        let mut grid = VoxelGrid::new(2, 4, 2);
        grid.set_filled(0, 0, 0);
        for y in 0..4 {
            grid.set_filled(0, y, 1);
        }
        for y in 0..3 {
            grid.set_filled(1, y, 1);
        }
        let critical = CriticalMap::detect(&grid);

        let base = test_brick((0, 0, 0), (1, 1, 1));
        let mut weak = test_brick((0, 0, 1), (1, 4, 1));
        weak.stability_score = 0.25;

        let refined = refine(
            &grid,
            &critical,
            vec![base, weak],
            &BrickCatalog::standard(),
            0.3,
        );

        let widened = refined.iter().find(|b| b.size == (2, 3, 1)).unwrap();
        assert_eq!(widened.position, (0, 0, 1));
        assert_eq!(widened.stability_score, 0.3);

        let filler = refined.iter().find(|b| b.position == (0, 3, 1)).unwrap();
        assert_eq!(filler.size, (1, 1, 1));

        // Every filled cell at z=1 is covered exactly once.
        for y in 0..4 {
            for x in 0..2 {
                let owners = refined.iter().filter(|b| b.covers(x, y, 1)).count();
                let expected = usize::from(grid.is_filled(x, y, 1));
                assert_eq!(owners, expected, "cell ({x}, {y}, 1)");
            }
        }
    }

    #[test]
    fn test_widen_refused_when_cells_owned() {
        // Same shape, but the side column already belongs to another brick:
        // the weak brick keeps its footprint and only the score is floored.
        let mut grid = VoxelGrid::new(2, 4, 2);
        grid.set_filled(0, 0, 0);
        for y in 0..4 {
            grid.set_filled(0, y, 1);
        }
        for y in 0..3 {
            grid.set_filled(1, y, 1);
        }
        let critical = CriticalMap::detect(&grid);

        let base = test_brick((0, 0, 0), (1, 1, 1));
        let mut weak = test_brick((0, 0, 1), (1, 4, 1));
        weak.stability_score = 0.25;
        let mut side = test_brick((1, 0, 1), (1, 3, 1));
        side.stability_score = 0.0;

        let refined = refine(
            &grid,
            &critical,
            vec![base, weak, side],
            &BrickCatalog::standard(),
            0.3,
        );

        let kept = refined.iter().find(|b| b.position == (0, 0, 1)).unwrap();
        assert_eq!(kept.size, (1, 4, 1));
        assert_eq!(kept.stability_score, 0.3);
    }
}
