//! Seed management for world generation
//!
//! Provides separate seeds for each generation system, all derived from a
//! single master seed, plus context-scoped derivation for per-chunk and
//! per-floor sub-seeds. Identical inputs always yield identical outputs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for all world generation systems.
///
/// Each system gets its own seed, derived from a master seed by default.
/// Individual seeds can be overridden for experimentation.
#[derive(Clone, Debug)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Overworld terrain shape (elevation noise)
    pub terrain: u64,
    /// Moisture distribution (drives biome banding together with terrain)
    pub moisture: u64,
    /// Harvestable resource scattering inside chunks
    pub resources: u64,
    /// Dungeon floor layouts
    pub dungeons: u64,
    /// Post-generation feature and hazard placement
    pub features: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            terrain: derive_seed(master, &"terrain"),
            moisture: derive_seed(master, &"moisture"),
            resources: derive_seed(master, &"resources"),
            dungeons: derive_seed(master, &"dungeons"),
            features: derive_seed(master, &"features"),
        }
    }

    /// Sub-seed for one overworld chunk's terrain.
    pub fn chunk_terrain(&self, cx: i32, cy: i32) -> u64 {
        derive_seed(self.terrain, &("chunk", cx, cy))
    }

    /// Sub-seed for one overworld chunk's resource scatter.
    ///
    /// Derived from a different system seed than the terrain so the two
    /// streams show no visible correlation.
    pub fn chunk_resources(&self, cx: i32, cy: i32) -> u64 {
        derive_seed(self.resources, &("chunk", cx, cy))
    }

    /// Sub-seed for one dungeon floor's layout.
    pub fn dungeon_floor(&self, dungeon_id: &str, floor: u32) -> u64 {
        derive_seed(self.dungeons, &(dungeon_id, floor))
    }

    /// Sub-seed for feature/hazard placement on one dungeon floor.
    pub fn floor_features(&self, dungeon_id: &str, floor: u32) -> u64 {
        derive_seed(self.features, &(dungeon_id, floor))
    }
}

impl Default for WorldSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Derive a sub-seed from a parent seed and a hashable context.
///
/// The context is any composite of semantically distinct values (a label
/// string, a chunk coordinate pair, a dungeon id plus floor number).
/// `DefaultHasher::new()` uses fixed keys, so derivation is stable across
/// runs for the same inputs.
pub fn derive_seed<C: Hash>(parent: u64, context: &C) -> u64 {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    context.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, terrain: {}, moisture: {}, resources: {}, \
             dungeons: {}, features: {} }}",
            self.master, self.terrain, self.moisture, self.resources, self.dungeons, self.features,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let seeds1 = WorldSeeds::from_master(12345);
        let seeds2 = WorldSeeds::from_master(12345);

        assert_eq!(seeds1.terrain, seeds2.terrain);
        assert_eq!(seeds1.moisture, seeds2.moisture);
        assert_eq!(seeds1.dungeons, seeds2.dungeons);
    }

    #[test]
    fn test_different_systems_get_different_seeds() {
        let seeds = WorldSeeds::from_master(12345);

        assert_ne!(seeds.terrain, seeds.moisture);
        assert_ne!(seeds.moisture, seeds.resources);
        assert_ne!(seeds.resources, seeds.dungeons);
    }

    #[test]
    fn test_chunk_contexts_decorrelate() {
        let seeds = WorldSeeds::from_master(42);

        // Same chunk, different purposes
        assert_ne!(seeds.chunk_terrain(3, -7), seeds.chunk_resources(3, -7));
        // Same purpose, different chunks
        assert_ne!(seeds.chunk_terrain(3, -7), seeds.chunk_terrain(-7, 3));
        // Stable on repeat
        assert_eq!(seeds.chunk_terrain(3, -7), seeds.chunk_terrain(3, -7));
    }

    #[test]
    fn test_floor_contexts_stable_and_distinct() {
        let seeds = WorldSeeds::from_master(42);

        assert_eq!(
            seeds.dungeon_floor("burial_barrow", 3),
            seeds.dungeon_floor("burial_barrow", 3)
        );
        assert_ne!(
            seeds.dungeon_floor("burial_barrow", 3),
            seeds.dungeon_floor("burial_barrow", 4)
        );
        assert_ne!(
            seeds.dungeon_floor("burial_barrow", 3),
            seeds.dungeon_floor("sunken_crypt", 3)
        );
    }
}
