//! Biome definitions and threshold-matrix classification
//!
//! Elevation and moisture samples (both in [0, 1]) index into a band matrix:
//! the elevation bands pick a row, the moisture bands a column, and the
//! matrix cell names the biome. Definitions are loaded once from external
//! configuration and immutable afterwards.
//!
//! Tie rule: a sample exactly equal to a band's upper threshold belongs to
//! that band (`sample <= threshold`); samples above every threshold land in
//! the open-ended top band.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::definitions::DefinitionError;
use crate::tiles::{ResourceKind, TileKind};

/// Visual and density parameters for one biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeDefinition {
    /// Identifier referenced from the band matrix
    pub id: String,
    /// Base terrain tile for this biome
    pub tile: TileKind,
    /// Resource scattered into this biome's chunks, if any
    #[serde(default)]
    pub resource: Option<ResourceKind>,
    /// Per-tile probability of a resource placement (0.0-1.0)
    #[serde(default)]
    pub resource_density: f32,
    /// Display color override as (r, g, b); falls back to the tile color
    #[serde(default)]
    pub color: Option<(u8, u8, u8)>,
}

impl BiomeDefinition {
    pub fn color(&self) -> (u8, u8, u8) {
        self.color.unwrap_or_else(|| self.tile.color())
    }
}

/// The full classification table: thresholds, band matrix, biome registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BiomeTable {
    /// Upper bounds of the elevation bands, strictly ascending; the last
    /// band is open-ended above the final threshold
    pub elevation_thresholds: Vec<f32>,
    /// Upper bounds of the moisture bands, same convention
    pub moisture_thresholds: Vec<f32>,
    /// `matrix[elevation_band][moisture_band]` = biome id
    pub matrix: Vec<Vec<String>>,
    /// Biome definitions keyed by id
    pub biomes: HashMap<String, BiomeDefinition>,
    /// Designated fallback when the matrix names an unknown biome
    pub fallback: String,
}

impl BiomeTable {
    /// Classify a sample pair into a biome definition.
    ///
    /// Never fails: an unknown id in the matrix degrades to the fallback
    /// biome with a warning, so world generation always produces a valid
    /// tile.
    pub fn classify(&self, elevation: f32, moisture: f32) -> &BiomeDefinition {
        let row = band_index(&self.elevation_thresholds, elevation);
        let col = band_index(&self.moisture_thresholds, moisture);
        let id = &self.matrix[row][col];
        self.lookup(id)
    }

    /// Look up a biome by id, degrading to the fallback if unknown.
    pub fn lookup(&self, id: &str) -> &BiomeDefinition {
        match self.biomes.get(id) {
            Some(def) => def,
            None => {
                warn!(biome = id, fallback = %self.fallback, "unknown biome id, using fallback");
                self.biomes
                    .get(&self.fallback)
                    .expect("fallback biome validated at load time")
            }
        }
    }

    /// Validate the table, collecting every problem.
    pub fn validate(&self) -> Vec<DefinitionError> {
        let mut errors = Vec::new();

        if !is_strictly_ascending(&self.elevation_thresholds) {
            errors.push(DefinitionError::UnsortedThresholds { axis: "elevation" });
        }
        if !is_strictly_ascending(&self.moisture_thresholds) {
            errors.push(DefinitionError::UnsortedThresholds { axis: "moisture" });
        }

        let expected_rows = self.elevation_thresholds.len() + 1;
        let expected_cols = self.moisture_thresholds.len() + 1;
        let rows = self.matrix.len();
        let cols = self.matrix.first().map_or(0, Vec::len);
        if rows != expected_rows || self.matrix.iter().any(|r| r.len() != expected_cols) {
            errors.push(DefinitionError::MatrixShape {
                rows,
                cols,
                expected_rows,
                expected_cols,
            });
        }

        for row in &self.matrix {
            for id in row {
                if !self.biomes.contains_key(id) {
                    errors.push(DefinitionError::UnknownBiomeId { id: id.clone() });
                }
            }
        }

        if !self.biomes.contains_key(&self.fallback) {
            errors.push(DefinitionError::UnknownFallbackBiome {
                id: self.fallback.clone(),
            });
        }

        errors
    }

    /// Parse a table from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, Vec<DefinitionError>> {
        let table: Self = serde_json::from_str(json).map_err(|e| {
            vec![DefinitionError::UnknownBiomeId {
                id: format!("<parse error: {e}>"),
            }]
        })?;
        let errors = table.validate();
        if errors.is_empty() {
            Ok(table)
        } else {
            Err(errors)
        }
    }

    /// Built-in table used when no external configuration is supplied.
    pub fn default_table() -> Self {
        fn biome(
            id: &str,
            tile: TileKind,
            resource: Option<ResourceKind>,
            density: f32,
        ) -> (String, BiomeDefinition) {
            (
                id.to_string(),
                BiomeDefinition {
                    id: id.to_string(),
                    tile,
                    resource,
                    resource_density: density,
                    color: None,
                },
            )
        }

        let biomes = HashMap::from([
            biome("deep_ocean", TileKind::DeepWater, None, 0.0),
            biome("ocean", TileKind::Water, None, 0.0),
            biome("beach", TileKind::Sand, None, 0.0),
            biome("marsh", TileKind::Ground, Some(ResourceKind::Herbs), 0.04),
            biome("desert", TileKind::Sand, Some(ResourceKind::Stone), 0.01),
            biome("grassland", TileKind::Ground, Some(ResourceKind::Herbs), 0.02),
            biome("forest", TileKind::Forest, Some(ResourceKind::Wood), 0.10),
            biome("mountain", TileKind::Mountain, Some(ResourceKind::IronOre), 0.03),
            biome("snow_peak", TileKind::Snow, Some(ResourceKind::Crystal), 0.01),
        ]);

        let row = |ids: [&str; 3]| ids.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            elevation_thresholds: vec![0.22, 0.34, 0.48, 0.80],
            moisture_thresholds: vec![0.33, 0.66],
            matrix: vec![
                row(["deep_ocean", "deep_ocean", "deep_ocean"]),
                row(["ocean", "ocean", "ocean"]),
                row(["beach", "beach", "marsh"]),
                row(["desert", "grassland", "forest"]),
                row(["mountain", "mountain", "snow_peak"]),
            ],
            biomes,
            fallback: "grassland".to_string(),
        }
    }
}

/// Index of the first band whose upper threshold is >= the sample.
///
/// A sample above every threshold selects the open-ended last band.
fn band_index(thresholds: &[f32], sample: f32) -> usize {
    thresholds
        .iter()
        .position(|&t| sample <= t)
        .unwrap_or(thresholds.len())
}

fn is_strictly_ascending(values: &[f32]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}
