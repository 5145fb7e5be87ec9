//! Static brick and color catalogs.
//!
//! Catalogs are constructed once (from builtin tables or JSON config),
//! validated, and injected into the pipeline read-only. They are the only
//! state shared between concurrent conversions.

pub mod brick;
pub mod color;

pub use brick::{BrickCatalog, BrickFormat, CatalogEntry, Manufacturer};
pub use color::{ColorCatalog, ColorEntry, ColorSource};
