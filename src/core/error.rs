//! Error types for the conversion pipeline

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// The brick catalog cannot guarantee full coverage (no 1x1x1 fallback).
    #[error("catalog misconfigured: {0}")]
    CatalogMisconfigured(String),

    /// A filled voxel was left unassigned after layout building.
    ///
    /// This is an internal assertion: with a validated catalog it indicates
    /// an algorithm bug, never bad input.
    #[error("placement invariant violated: filled cell ({x}, {y}, {z}) left unassigned")]
    PlacementInvariant { x: usize, y: usize, z: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
