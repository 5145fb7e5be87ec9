//! Greedy per-layer brick merging.
//!
//! Bricks sharing `(z, height)` form a layer group. Within a group the
//! optimizer repeatedly scans all pairs, merges the highest-scoring
//! mergeable pair, and rescans until no pair qualifies. That is O(n^2) per scan,
//! worst case O(n^3) per layer, which bounds practical layer sizes to a few
//! hundred bricks. Groups are independent and processed in parallel.
//!
//! A merge is only legal when the merged rectangle equals the exact union
//! of the two inputs and its footprint exists in the catalog; anything
//! looser would fabricate cells and break the voxel partition.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::catalog::BrickCatalog;
use crate::layout::{sort_bricks, Brick};

/// Merge bricks within each layer, then collapse exact vertical stacks.
///
/// A vertical merge can expose a fresh horizontal opportunity (taller
/// bricks land in a new layer group), so both passes repeat until the
/// brick count stops shrinking. Every merge removes a brick, so the loop
/// terminates.
pub fn optimize(bricks: Vec<Brick>, catalog: &BrickCatalog, min_overlap: f32) -> Vec<Brick> {
    let before = bricks.len();

    let mut current = bricks;
    loop {
        let count = current.len();
        current = merge_horizontal(current, catalog, min_overlap);
        current = merge_vertical(current, catalog);
        if current.len() == count {
            break;
        }
    }

    sort_bricks(&mut current);
    log::debug!("connect: {} bricks -> {}", before, current.len());
    current
}

/// One horizontal pass: every (z, height) group merged to fixed point,
/// groups in parallel.
fn merge_horizontal(bricks: Vec<Brick>, catalog: &BrickCatalog, min_overlap: f32) -> Vec<Brick> {
    // Group by (z, height); BTreeMap keeps group order deterministic.
    let mut groups: BTreeMap<(usize, usize), Vec<Brick>> = BTreeMap::new();
    for brick in bricks {
        groups
            .entry((brick.position.2, brick.size.2))
            .or_default()
            .push(brick);
    }

    let layers: Vec<Vec<Brick>> = groups.into_values().collect();
    let mut merged: Vec<Brick> = layers
        .into_par_iter()
        .map(|layer| optimize_layer(layer, catalog, min_overlap))
        .reduce(Vec::new, |mut acc, mut layer| {
            acc.append(&mut layer);
            acc
        });

    sort_bricks(&mut merged);
    merged
}

/// Repeatedly merge the best pair in one layer until fixed point.
fn optimize_layer(mut layer: Vec<Brick>, catalog: &BrickCatalog, min_overlap: f32) -> Vec<Brick> {
    loop {
        let mut best: Option<(usize, usize, f32)> = None;
        for i in 0..layer.len() {
            for j in (i + 1)..layer.len() {
                if !mergeable(&layer[i], &layer[j], catalog, min_overlap) {
                    continue;
                }
                let score = connection_score(&layer[i], &layer[j]);
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((i, j, score));
                }
            }
        }

        match best {
            Some((i, j, score)) => {
                let b = layer.remove(j);
                let a = layer.remove(i);
                layer.push(merge_pair(&a, &b, catalog, score));
            }
            None => return layer,
        }
    }
}

/// Edge-adjacency along exactly one axis with matching perpendicular
/// extents, normalized overlap above threshold, and a catalog-representable
/// merged footprint.
pub(crate) fn mergeable(a: &Brick, b: &Brick, catalog: &BrickCatalog, min_overlap: f32) -> bool {
    if a.position.2 != b.position.2 || a.size.2 != b.size.2 {
        return false;
    }
    let (x1, y1, _) = a.position;
    let (w1, l1, h) = a.size;
    let (x2, y2, _) = b.position;
    let (w2, l2, _) = b.size;

    let x_adjacent = x1 + w1 == x2 || x2 + w2 == x1;
    let y_adjacent = y1 + l1 == y2 || y2 + l2 == y1;

    if x_adjacent && y1 == y2 && l1 == l2 {
        return overlap(a, b) >= min_overlap && catalog.contains_size(w1 + w2, l1, h);
    }
    if y_adjacent && x1 == x2 && w1 == w2 {
        return overlap(a, b) >= min_overlap && catalog.contains_size(w1, l1 + l2, h);
    }
    false
}

/// Normalized overlap along the axis perpendicular to the adjacency,
/// relative to the smaller brick's extent on that axis.
pub(crate) fn overlap(a: &Brick, b: &Brick) -> f32 {
    let (x1, y1, _) = a.position;
    let (w1, l1, _) = a.size;
    let (x2, y2, _) = b.position;
    let (w2, l2, _) = b.size;

    if x1 + w1 == x2 || x2 + w2 == x1 {
        let seg = (y1 + l1).min(y2 + l2).saturating_sub(y1.max(y2));
        seg as f32 / l1.min(l2) as f32
    } else {
        let seg = (x1 + w1).min(x2 + w2).saturating_sub(x1.max(x2));
        seg as f32 / w1.min(w2) as f32
    }
}

/// Merge score: favors merges producing larger, more standard footprints.
fn connection_score(a: &Brick, b: &Brick) -> f32 {
    let size_score = (a.size.0 + b.size.0).min(a.size.1 + b.size.1) as f32 / 8.0;
    overlap(a, b) * size_score
}

fn merge_pair(a: &Brick, b: &Brick, catalog: &BrickCatalog, score: f32) -> Brick {
    let x = a.position.0.min(b.position.0);
    let y = a.position.1.min(b.position.1);
    let z = a.position.2;
    let h = a.size.2;

    let (w, l) = if a.position.0 == b.position.0 {
        (a.size.0, a.size.1 + b.size.1)
    } else {
        (a.size.0 + b.size.0, a.size.1)
    };

    let area_a = a.footprint_area() as f32;
    let area_b = b.footprint_area() as f32;
    let stability =
        (a.stability_score * area_a + b.stability_score * area_b) / (area_a + area_b);

    let mut merged = a.clone();
    merged.position = (x, y, z);
    merged.size = (w, l, h);
    merged.stability_score = stability;
    merged.connection_score = score.clamp(0.0, 1.0);
    if let Some(entry) = catalog.lookup(w, l, h) {
        merged.format = entry.format;
        merged.manufacturer = entry.manufacturer;
    }
    merged
}

/// Collapse exactly-stacked bricks (same origin and footprint, touching
/// along z) into taller catalog bricks.
fn merge_vertical(bricks: Vec<Brick>, catalog: &BrickCatalog) -> Vec<Brick> {
    let mut stacked = bricks;
    stacked.sort_by_key(|b| (b.position.0, b.position.1, b.size.0, b.size.1, b.position.2));

    let mut result: Vec<Brick> = Vec::with_capacity(stacked.len());
    for brick in stacked {
        if let Some(prev) = result.last_mut() {
            let same_column = prev.position.0 == brick.position.0
                && prev.position.1 == brick.position.1
                && prev.size.0 == brick.size.0
                && prev.size.1 == brick.size.1;
            let touching = prev.top() == brick.position.2;
            let new_h = prev.size.2 + brick.size.2;

            if same_column && touching && catalog.contains_size(prev.size.0, prev.size.1, new_h) {
                let vol_prev = prev.volume() as f32;
                let vol_cur = brick.volume() as f32;
                prev.stability_score = (prev.stability_score * vol_prev
                    + brick.stability_score * vol_cur)
                    / (vol_prev + vol_cur);
                prev.connection_score = (prev.connection_score * vol_prev
                    + brick.connection_score * vol_cur)
                    / (vol_prev + vol_cur);
                prev.size.2 = new_h;
                if let Some(entry) = catalog.lookup(prev.size.0, prev.size.1, new_h) {
                    prev.format = entry.format;
                    prev.manufacturer = entry.manufacturer;
                }
                continue;
            }
        }
        result.push(brick);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_brick;

    fn no_mergeable_pair(bricks: &[Brick], catalog: &BrickCatalog, min_overlap: f32) -> bool {
        for i in 0..bricks.len() {
            for j in (i + 1)..bricks.len() {
                if mergeable(&bricks[i], &bricks[j], catalog, min_overlap) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_two_adjacent_unit_bricks_merge() {
        let catalog = BrickCatalog::standard();
        let bricks = vec![test_brick((0, 0, 0), (1, 1, 1)), test_brick((1, 0, 0), (1, 1, 1))];

        let merged = optimize(bricks, &catalog, 0.25);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].position, (0, 0, 0));
        assert!(merged[0].size == (2, 1, 1) || merged[0].size == (1, 2, 1));
        assert!(merged[0].connection_score > 0.0);
    }

    #[test]
    fn test_merge_reaches_fixed_point() {
        let catalog = BrickCatalog::standard();
        let bricks: Vec<Brick> = (0..9).map(|x| test_brick((x, 0, 0), (1, 1, 1))).collect();

        let merged = optimize(bricks, &catalog, 0.25);
        // Nine cells cannot fit one catalog brick (max length 8).
        assert!(merged.len() >= 2);
        assert!(no_mergeable_pair(&merged, &catalog, 0.25));

        // The row stays exactly covered.
        let covered: usize = merged.iter().map(|b| b.volume()).sum();
        assert_eq!(covered, 9);
    }

    #[test]
    fn test_no_merge_across_layers() {
        let catalog = BrickCatalog::standard();
        let bricks = vec![test_brick((0, 0, 0), (1, 1, 1)), test_brick((1, 0, 1), (1, 1, 1))];

        let merged = optimize(bricks, &catalog, 0.25);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_misaligned_pair_not_merged() {
        let catalog = BrickCatalog::standard();
        // Touching along x but offset in y: union is not a rectangle.
        let bricks = vec![test_brick((0, 0, 0), (1, 2, 1)), test_brick((1, 1, 0), (1, 2, 1))];

        let merged = optimize(bricks, &catalog, 0.25);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merged_stability_is_area_weighted() {
        let catalog = BrickCatalog::standard();
        let mut a = test_brick((0, 0, 0), (1, 1, 1));
        a.stability_score = 1.0;
        let mut b = test_brick((1, 0, 0), (1, 1, 1));
        b.stability_score = 0.5;

        let merged = optimize(vec![a, b], &catalog, 0.25);
        assert_eq!(merged.len(), 1);
        assert!((merged[0].stability_score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_stack_collapses() {
        let catalog = BrickCatalog::standard();
        let bricks = vec![test_brick((0, 0, 0), (2, 2, 1)), test_brick((0, 0, 1), (2, 2, 1))];

        let merged = optimize(bricks, &catalog, 0.25);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].size, (2, 2, 2));
        assert_eq!(merged[0].position, (0, 0, 0));
    }

    #[test]
    fn test_vertical_stack_kept_when_not_in_catalog() {
        let catalog = BrickCatalog::standard();
        // (2,4,2) is not a catalog size, so the stack must stay split.
        let bricks = vec![test_brick((0, 0, 0), (2, 4, 1)), test_brick((0, 0, 1), (2, 4, 1))];

        let merged = optimize(bricks, &catalog, 0.25);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merged_footprints_stay_in_catalog() {
        let catalog = BrickCatalog::standard();
        let bricks: Vec<Brick> = (0..6)
            .flat_map(|x| (0..4).map(move |y| test_brick((x, y, 0), (1, 1, 1))))
            .collect();

        let merged = optimize(bricks, &catalog, 0.25);
        for brick in &merged {
            assert!(
                catalog.contains_size(brick.size.0, brick.size.1, brick.size.2),
                "footprint {:?} not in catalog",
                brick.size
            );
        }
        let covered: usize = merged.iter().map(|b| b.volume()).sum();
        assert_eq!(covered, 24);
    }
}
