//! Color catalog merged from two external part databases.
//!
//! Entries keep their source order (official first) so nearest-color
//! lookups break distance ties deterministically.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Which database a color came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSource {
    Official,
    ThirdParty,
}

/// One catalog color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub id: String,
    pub rgb: Vec3,
    pub source: ColorSource,
}

/// JSON layout for a single color source file.
#[derive(Deserialize)]
struct ColorFile {
    colors: Vec<ColorConfig>,
}

#[derive(Deserialize)]
struct ColorConfig {
    id: String,
    rgb: [f32; 3],
}

/// Immutable merged color catalog.
///
/// May be empty, in which case the color-assignment stage is skipped.
#[derive(Clone, Debug, Default)]
pub struct ColorCatalog {
    entries: Vec<ColorEntry>,
}

impl ColorCatalog {
    /// Empty catalog (color assignment disabled).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from explicit entries, preserving order.
    pub fn new(entries: Vec<ColorEntry>) -> Self {
        Self { entries }
    }

    /// Merge two source files: official colors first, then third-party.
    pub fn load_merged(official: &Path, third_party: &Path) -> Result<Self> {
        let mut entries = Vec::new();
        Self::load_source(official, ColorSource::Official, &mut entries)?;
        Self::load_source(third_party, ColorSource::ThirdParty, &mut entries)?;
        Ok(Self { entries })
    }

    fn load_source(path: &Path, source: ColorSource, out: &mut Vec<ColorEntry>) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        let file: ColorFile = serde_json::from_str(&text)?;
        for color in file.colors {
            out.push(ColorEntry {
                id: color.id,
                rgb: Vec3::from_array(color.rgb),
                source,
            });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    /// Entry minimizing squared RGB distance to `target`.
    ///
    /// First minimum wins on exact ties, so the official source is
    /// preferred when both list the same color.
    pub fn nearest(&self, target: Vec3) -> Option<&ColorEntry> {
        let mut best: Option<&ColorEntry> = None;
        let mut best_dist = f32::INFINITY;
        for entry in &self.entries {
            let dist = (entry.rgb - target).length_squared();
            if dist < best_dist {
                best_dist = dist;
                best = Some(entry);
            }
        }
        best
    }
}
