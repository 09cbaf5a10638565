//! Load-time validation errors for definition records
//!
//! Definition files are parsed by a loader collaborator (or the preview
//! binary); this crate only sees already-parsed records. Validation runs
//! once at load time and collects every problem instead of failing lazily
//! mid-generation.

use thiserror::Error;

/// A problem found while validating biome or dungeon definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("biome matrix references unknown biome id '{id}'")]
    UnknownBiomeId { id: String },

    #[error("fallback biome '{id}' is not defined")]
    UnknownFallbackBiome { id: String },

    #[error("biome matrix is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    MatrixShape {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("{axis} thresholds are not strictly ascending")]
    UnsortedThresholds { axis: &'static str },

    #[error("dungeon '{id}': unknown generator tag '{tag}' (will fall back at runtime)")]
    UnknownGeneratorTag { id: String, tag: String },

    #[error("dungeon '{id}': empty or inverted {what} range")]
    EmptyRange { id: String, what: &'static str },

    #[error("dungeon '{id}': map size {width}x{height} below minimum {min}x{min}")]
    MapTooSmall {
        id: String,
        width: usize,
        height: usize,
        min: usize,
    },

    #[error("dungeon '{id}': rule for '{rule}' has chance/density {value} outside [0, 1]")]
    BadProbability { id: String, rule: String, value: f64 },

    #[error("duplicate definition id '{id}'")]
    DuplicateId { id: String },
}
