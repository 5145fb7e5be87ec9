//! Build instruction emission and aggregate model metrics.
//!
//! Final bricks are grouped into per-layer instructions ordered by
//! increasing z, each with stability tips for weak bricks. Metrics
//! summarize the whole brick list once per conversion.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::layout::Brick;

/// One brick within a layer instruction (2D placement view).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedBrick {
    /// Footprint origin (x, y)
    pub position: (usize, usize),
    /// Footprint extent (width, length)
    pub size: (usize, usize),
    /// Brick height in cells
    pub height: usize,
    pub stability: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TipKind {
    Warning,
    Suggestion,
}

/// Advice attached to a layer: which placements need attention.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tip {
    pub kind: TipKind,
    pub message: String,
    pub positions: Vec<(usize, usize)>,
}

/// Build instructions for one z-layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerInstruction {
    /// Layer index (brick-origin z)
    pub layer: usize,
    /// Absolute layer height (`z * brick_height_unit`)
    pub height: f32,
    pub bricks: Vec<PlacedBrick>,
    pub stability_tips: Vec<Tip>,
}

/// Aggregate statistics over the final brick list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ModelMetrics {
    pub total_bricks: usize,
    /// Model extents in cells (x, y, z)
    pub dimensions: (usize, usize, usize),
    pub avg_stability: f32,
    pub avg_connection: f32,
    /// Count per "WxLxH" size key
    pub size_distribution: BTreeMap<String, usize>,
    pub format_distribution: BTreeMap<String, usize>,
    pub manufacturer_distribution: BTreeMap<String, usize>,
}

impl ModelMetrics {
    /// Whether the layout clears the acceptance thresholds used when
    /// deciding if a conversion is worth keeping.
    pub fn meets_quality_thresholds(&self) -> bool {
        self.total_bricks > 0 && self.avg_stability > 0.7 && self.avg_connection > 0.6
    }
}

/// Group bricks into per-layer instructions, ordered by increasing z.
pub fn emit_layers(
    bricks: &[Brick],
    brick_height_unit: f32,
    min_support: f32,
    min_overlap: f32,
) -> Vec<LayerInstruction> {
    let mut layers: BTreeMap<usize, Vec<&Brick>> = BTreeMap::new();
    for brick in bricks {
        layers.entry(brick.position.2).or_default().push(brick);
    }

    layers
        .into_iter()
        .map(|(z, layer_bricks)| {
            let placed: Vec<PlacedBrick> = layer_bricks
                .iter()
                .map(|b| PlacedBrick {
                    position: (b.position.0, b.position.1),
                    size: (b.size.0, b.size.1),
                    height: b.size.2,
                    stability: b.stability_score,
                })
                .collect();

            LayerInstruction {
                layer: z,
                height: z as f32 * brick_height_unit,
                stability_tips: stability_tips(&placed, min_support, min_overlap),
                bricks: placed,
            }
        })
        .collect()
}

/// Tips for one layer: a warning for under-supported bricks and a
/// suggestion for weakly-connected ones.
fn stability_tips(bricks: &[PlacedBrick], min_support: f32, min_overlap: f32) -> Vec<Tip> {
    let mut tips = Vec::new();

    let unstable: Vec<(usize, usize)> = bricks
        .iter()
        .filter(|b| b.stability < min_support)
        .map(|b| b.position)
        .collect();
    if !unstable.is_empty() {
        tips.push(Tip {
            kind: TipKind::Warning,
            message: "some bricks lack support".into(),
            positions: unstable,
        });
    }

    let weak: Vec<(usize, usize)> = bricks
        .iter()
        .filter(|b| b.stability < min_overlap)
        .map(|b| b.position)
        .collect();
    if !weak.is_empty() {
        tips.push(Tip {
            kind: TipKind::Suggestion,
            message: "reinforce these connections with plates".into(),
            positions: weak,
        });
    }

    tips
}

/// Compute aggregate metrics over the full brick list.
pub fn compute_metrics(bricks: &[Brick]) -> ModelMetrics {
    if bricks.is_empty() {
        return ModelMetrics::default();
    }

    let dimensions = (
        bricks.iter().map(|b| b.position.0 + b.size.0).max().unwrap_or(0),
        bricks.iter().map(|b| b.position.1 + b.size.1).max().unwrap_or(0),
        bricks.iter().map(|b| b.top()).max().unwrap_or(0),
    );

    let count = bricks.len() as f32;
    let avg_stability = bricks.iter().map(|b| b.stability_score).sum::<f32>() / count;
    let avg_connection = bricks.iter().map(|b| b.connection_score).sum::<f32>() / count;

    let mut size_distribution = BTreeMap::new();
    let mut format_distribution = BTreeMap::new();
    let mut manufacturer_distribution = BTreeMap::new();
    for brick in bricks {
        let size_key = format!("{}x{}x{}", brick.size.0, brick.size.1, brick.size.2);
        *size_distribution.entry(size_key).or_insert(0) += 1;
        *format_distribution
            .entry(brick.format.name().to_string())
            .or_insert(0) += 1;
        *manufacturer_distribution
            .entry(brick.manufacturer.name().to_string())
            .or_insert(0) += 1;
    }

    ModelMetrics {
        total_bricks: bricks.len(),
        dimensions,
        avg_stability,
        avg_connection,
        size_distribution,
        format_distribution,
        manufacturer_distribution,
    }
}
