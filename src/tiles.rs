//! Tile vocabulary shared by overworld chunks and dungeon floors
//!
//! Each map cell is a [`TileRecord`]: a kind tag plus the flags renderers and
//! movement code care about (walkable, transparent), a display glyph/color,
//! and an optional harvestable resource. Records are mutable after
//! generation (harvesting clears a resource) but all mutation lives in
//! collaborator systems, not here.

use serde::{Deserialize, Serialize};

/// Every tile kind the generators can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    // === Overworld terrain ===
    /// Open ground, biome-colored
    #[default]
    Ground,
    /// Shallow water, not walkable but transparent
    Water,
    /// Deep water / ocean
    DeepWater,
    /// Trees and heavy vegetation (blocks sight)
    Forest,
    /// Impassable rock
    Mountain,
    /// Loose sand
    Sand,
    /// Snow cover
    Snow,

    // === Dungeon structure ===
    /// Solid dungeon wall
    Wall,
    /// Walkable dungeon floor
    Floor,
    /// Doorway at a room/corridor boundary
    Door,
    /// Stairs leading down to the next floor
    StairsDown,
    /// Stairs leading up to the previous floor
    StairsUp,

    // === Mine tunnels ===
    /// Vertical shaft at a tunnel intersection
    Shaft,
    /// Non-walkable wooden support beam along a tunnel edge
    SupportBeam,
    /// Harvestable ore embedded in wall rock
    OreVein,
    /// Collapsed tunnel section
    Rubble,

    // === Sewers / waterways ===
    /// Hazardous liquid channel along a tunnel centerline
    Channel,
    /// Maintenance platform beside a channel
    Platform,

    // === Fortress / tower furniture ===
    /// Defensive corner structure
    Battlement,
    /// Gatehouse opening through a ring wall
    Gate,
    /// Central pedestal or spiral-stair column
    Pedestal,
}

impl TileKind {
    /// Whether an actor can stand on this tile.
    pub fn walkable(&self) -> bool {
        matches!(
            self,
            TileKind::Ground
                | TileKind::Forest
                | TileKind::Sand
                | TileKind::Snow
                | TileKind::Floor
                | TileKind::Door
                | TileKind::StairsDown
                | TileKind::StairsUp
                | TileKind::Shaft
                | TileKind::Channel
                | TileKind::Platform
                | TileKind::Gate
                | TileKind::Rubble
        )
    }

    /// Whether sight lines pass through this tile.
    pub fn transparent(&self) -> bool {
        !matches!(
            self,
            TileKind::Wall
                | TileKind::Mountain
                | TileKind::Forest
                | TileKind::SupportBeam
                | TileKind::Battlement
                | TileKind::Pedestal
        )
    }

    /// Whether this tile is a vertical connector between floors.
    pub fn is_stairs(&self) -> bool {
        matches!(self, TileKind::StairsDown | TileKind::StairsUp)
    }

    /// Whether this tile damages actors standing on it.
    pub fn is_hazardous(&self) -> bool {
        matches!(self, TileKind::Channel)
    }

    /// Display glyph for ASCII rendering.
    pub fn glyph(&self) -> char {
        match self {
            TileKind::Ground => '.',
            TileKind::Water => '~',
            TileKind::DeepWater => '≈',
            TileKind::Forest => '♣',
            TileKind::Mountain => '^',
            TileKind::Sand => ',',
            TileKind::Snow => '*',
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::Door => '+',
            TileKind::StairsDown => '>',
            TileKind::StairsUp => '<',
            TileKind::Shaft => 'O',
            TileKind::SupportBeam => 'I',
            TileKind::OreVein => '$',
            TileKind::Rubble => '%',
            TileKind::Channel => '=',
            TileKind::Platform => '_',
            TileKind::Battlement => '@',
            TileKind::Gate => '/',
            TileKind::Pedestal => '&',
        }
    }

    /// Base display color as (r, g, b).
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            TileKind::Ground => (110, 140, 80),
            TileKind::Water => (70, 110, 180),
            TileKind::DeepWater => (35, 60, 130),
            TileKind::Forest => (40, 100, 50),
            TileKind::Mountain => (130, 120, 110),
            TileKind::Sand => (210, 190, 130),
            TileKind::Snow => (235, 240, 245),
            TileKind::Wall => (90, 85, 80),
            TileKind::Floor => (160, 150, 140),
            TileKind::Door => (150, 110, 60),
            TileKind::StairsDown | TileKind::StairsUp => (220, 220, 180),
            TileKind::Shaft => (60, 55, 50),
            TileKind::SupportBeam => (120, 90, 50),
            TileKind::OreVein => (200, 170, 60),
            TileKind::Rubble => (100, 95, 90),
            TileKind::Channel => (90, 140, 70),
            TileKind::Platform => (140, 130, 120),
            TileKind::Battlement => (80, 80, 95),
            TileKind::Gate => (150, 120, 80),
            TileKind::Pedestal => (190, 180, 160),
        }
    }
}

/// Harvestable resource kinds referenced from tiles.
///
/// Opaque to this crate beyond identity; the harvest system resolves what
/// each one yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Wood,
    Stone,
    IronOre,
    CopperOre,
    Herbs,
    Mushrooms,
    Crystal,
}

/// One map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub kind: TileKind,
    /// Cached from the kind at creation so collaborators can toggle it
    /// (e.g. a smashed door) without changing the kind.
    pub walkable: bool,
    /// Cached transparency flag for the visibility system.
    pub transparent: bool,
    /// Harvestable resource on this tile, if any.
    pub resource: Option<ResourceKind>,
}

impl TileRecord {
    /// Create a record with flags derived from the kind.
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            walkable: kind.walkable(),
            transparent: kind.transparent(),
            resource: None,
        }
    }

    /// Create a record carrying a harvestable resource.
    pub fn with_resource(kind: TileKind, resource: ResourceKind) -> Self {
        Self {
            resource: Some(resource),
            ..Self::new(kind)
        }
    }
}

impl Default for TileRecord {
    fn default() -> Self {
        Self::new(TileKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_kind() {
        let wall = TileRecord::new(TileKind::Wall);
        assert!(!wall.walkable);
        assert!(!wall.transparent);

        let floor = TileRecord::new(TileKind::Floor);
        assert!(floor.walkable);
        assert!(floor.transparent);
    }

    #[test]
    fn test_water_transparent_not_walkable() {
        let water = TileRecord::new(TileKind::Water);
        assert!(!water.walkable);
        assert!(water.transparent);
    }

    #[test]
    fn test_resource_tile() {
        let ore = TileRecord::with_resource(TileKind::OreVein, ResourceKind::IronOre);
        assert_eq!(ore.resource, Some(ResourceKind::IronOre));
        assert_eq!(ore.kind, TileKind::OreVein);
    }
}
