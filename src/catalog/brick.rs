//! Brick size catalog: the set of manufacturable footprint/height combos.
//!
//! Sizes are grouped into format families and tried largest-volume-first by
//! the layout builder. A `(1,1,1)` entry is mandatory; it is what
//! guarantees the builder can always cover a lone filled cell.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Brick format family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrickFormat {
    /// Standard one-unit-tall bricks
    Standard,
    /// Two-unit-tall bricks
    Tall,
}

impl BrickFormat {
    pub fn name(&self) -> &'static str {
        match self {
            BrickFormat::Standard => "standard",
            BrickFormat::Tall => "tall",
        }
    }
}

/// Which part database a size was sourced from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Manufacturer {
    Official,
    ThirdParty,
}

impl Manufacturer {
    pub fn name(&self) -> &'static str {
        match self {
            Manufacturer::Official => "official",
            Manufacturer::ThirdParty => "third_party",
        }
    }
}

/// One allowed brick size with its family tags.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Size in grid cells (width, length, height)
    pub size: (usize, usize, usize),
    pub format: BrickFormat,
    pub manufacturer: Manufacturer,
}

impl CatalogEntry {
    pub fn volume(&self) -> usize {
        self.size.0 * self.size.1 * self.size.2
    }
}

/// JSON layout for catalog config files.
#[derive(Deserialize)]
struct CatalogFile {
    families: Vec<FamilyConfig>,
}

#[derive(Deserialize)]
struct FamilyConfig {
    format: BrickFormat,
    manufacturer: Manufacturer,
    sizes: Vec<(usize, usize, usize)>,
}

/// Immutable set of allowed brick sizes, sorted largest-volume-first.
#[derive(Clone, Debug)]
pub struct BrickCatalog {
    entries: Vec<CatalogEntry>,
}

impl BrickCatalog {
    /// Build a catalog from explicit entries.
    ///
    /// Sorts largest-volume-first (ties keep input order, so iteration is
    /// deterministic) and rejects catalogs without a `(1,1,1)` fallback.
    pub fn new(mut entries: Vec<CatalogEntry>) -> Result<Self> {
        entries.sort_by(|a, b| b.volume().cmp(&a.volume()));
        let catalog = Self { entries };
        if !catalog.contains_size(1, 1, 1) {
            return Err(Error::CatalogMisconfigured(
                "no (1,1,1) fallback brick; layout building cannot terminate".into(),
            ));
        }
        Ok(catalog)
    }

    /// The builtin size table: standard and tall families, official parts.
    pub fn standard() -> Self {
        let mut entries = Vec::new();
        let standard = [
            (1, 1, 1), (1, 2, 1), (1, 3, 1), (1, 4, 1), (1, 6, 1), (1, 8, 1),
            (2, 2, 1), (2, 3, 1), (2, 4, 1), (2, 6, 1), (2, 8, 1),
        ];
        let tall = [(1, 1, 2), (1, 2, 2), (2, 2, 2), (2, 3, 2)];

        for size in standard {
            entries.push(CatalogEntry {
                size,
                format: BrickFormat::Standard,
                manufacturer: Manufacturer::Official,
            });
        }
        for size in tall {
            entries.push(CatalogEntry {
                size,
                format: BrickFormat::Tall,
                manufacturer: Manufacturer::Official,
            });
        }

        // The builtin table always carries (1,1,1).
        Self::new(entries).unwrap_or_else(|_| unreachable!())
    }

    /// Load a catalog from a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(text)?;
        let mut entries = Vec::new();
        for family in file.families {
            for size in family.sizes {
                entries.push(CatalogEntry {
                    size,
                    format: family.format,
                    manufacturer: family.manufacturer,
                });
            }
        }
        Self::new(entries)
    }

    /// Entries in decreasing-volume order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Whether an exact (w, l, h) size exists, allowing 90-degree rotation
    /// of the footprint.
    pub fn contains_size(&self, w: usize, l: usize, h: usize) -> bool {
        self.lookup(w, l, h).is_some()
    }

    /// Find the entry for a size, allowing footprint rotation.
    pub fn lookup(&self, w: usize, l: usize, h: usize) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.size == (w, l, h) || e.size == (l, w, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_standard_has_fallback() {
        let catalog = BrickCatalog::standard();
        assert!(catalog.contains_size(1, 1, 1));
    }

    #[test]
    fn test_volume_ordering() {
        let catalog = BrickCatalog::standard();
        let volumes: Vec<usize> = catalog.entries().iter().map(|e| e.volume()).collect();
        for pair in volumes.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_rotated_lookup() {
        let catalog = BrickCatalog::standard();
        // Catalog lists (1,2,1); a (2,1) footprint is the same part rotated.
        assert!(catalog.contains_size(2, 1, 1));
        assert!(!catalog.contains_size(3, 3, 1));
    }

    #[test]
    fn test_missing_fallback_rejected() {
        let entries = vec![CatalogEntry {
            size: (2, 2, 1),
            format: BrickFormat::Standard,
            manufacturer: Manufacturer::Official,
        }];
        match BrickCatalog::new(entries) {
            Err(Error::CatalogMisconfigured(_)) => {}
            other => panic!("expected CatalogMisconfigured, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_load_from_json_file() {
        let json = r#"{
            "families": [
                {
                    "format": "standard",
                    "manufacturer": "official",
                    "sizes": [[1, 1, 1], [1, 2, 1], [2, 2, 1]]
                },
                {
                    "format": "tall",
                    "manufacturer": "third_party",
                    "sizes": [[2, 2, 2]]
                }
            ]
        }"#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = BrickCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.entries().len(), 4);
        let tall = catalog.lookup(2, 2, 2).unwrap();
        assert_eq!(tall.format, BrickFormat::Tall);
        assert_eq!(tall.manufacturer, Manufacturer::ThirdParty);
    }
}
