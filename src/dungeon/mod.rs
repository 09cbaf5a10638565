//! Data-driven dungeon generation
//!
//! A [`DungeonDefinition`] names a generator strategy plus its parameters;
//! the registry resolves the strategy tag to one of the layout algorithms
//! and runs the shared pipeline: derive a floor seed, run the layout, carve
//! entry/exit stairs, repair connectivity, then hand the floor to the
//! feature placer.

pub mod bsp;
pub mod cellular;
pub mod connectivity;
pub mod fortress;
pub mod mine;
pub mod rooms;
pub mod sewer;
pub mod temple;
pub mod tower;

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::definitions::DefinitionError;
use crate::features;
use crate::seeds::WorldSeeds;
use crate::tilemap::{MapModel, RoomTag};
use crate::tiles::TileKind;

/// Smallest map edge any definition may request.
pub const MIN_MAP_EDGE: usize = 16;

/// One feature-placement rule from a dungeon definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRule {
    /// Opaque feature id resolved by the entity spawner
    pub feature: String,
    /// Independent spawn chance per matching room (0.0-1.0)
    pub chance: f64,
    /// Room type tags this rule applies to; empty = any room
    #[serde(default)]
    pub room_tags: Vec<String>,
    /// Blocking placements are rejected if they would sever reachability
    #[serde(default)]
    pub blocking: bool,
}

/// One hazard-placement rule from a dungeon definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardRule {
    /// Opaque hazard id resolved by collaborators
    pub hazard: String,
    /// Independent per-walkable-tile roll (0.0-1.0)
    pub density: f64,
}

/// A dungeon type, loaded once from external configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DungeonDefinition {
    pub id: String,
    pub name: String,
    /// Generator strategy tag; unknown tags resolve to the default strategy
    pub generator: String,
    pub width_range: (usize, usize),
    pub height_range: (usize, usize),
    /// Inclusive floor-count range
    pub floor_range: (u32, u32),
    /// Algorithm-specific parameters
    #[serde(default)]
    pub params: HashMap<String, f64>,
    /// Enemy pool ids, resolved by the entity spawner
    #[serde(default)]
    pub enemy_pools: Vec<String>,
    /// Loot table ids, resolved by the loot generator
    #[serde(default)]
    pub loot_tables: Vec<String>,
    #[serde(default)]
    pub features: Vec<FeatureRule>,
    #[serde(default)]
    pub hazards: Vec<HazardRule>,
}

impl DungeonDefinition {
    /// Fetch an algorithm parameter with a default.
    pub fn param(&self, key: &str, default: f64) -> f64 {
        self.params.get(key).copied().unwrap_or(default)
    }

    pub fn param_usize(&self, key: &str, default: usize) -> usize {
        self.param(key, default as f64).max(0.0) as usize
    }

    /// Validate this definition, collecting every problem.
    pub fn validate(&self) -> Vec<DefinitionError> {
        let mut errors = Vec::new();
        let id = self.id.clone();

        if GeneratorKind::from_tag(&self.generator).is_none() {
            errors.push(DefinitionError::UnknownGeneratorTag {
                id: id.clone(),
                tag: self.generator.clone(),
            });
        }
        if self.width_range.0 > self.width_range.1 {
            errors.push(DefinitionError::EmptyRange {
                id: id.clone(),
                what: "width",
            });
        }
        if self.height_range.0 > self.height_range.1 {
            errors.push(DefinitionError::EmptyRange {
                id: id.clone(),
                what: "height",
            });
        }
        if self.floor_range.0 > self.floor_range.1 {
            errors.push(DefinitionError::EmptyRange {
                id: id.clone(),
                what: "floor",
            });
        }
        if self.width_range.0 < MIN_MAP_EDGE || self.height_range.0 < MIN_MAP_EDGE {
            errors.push(DefinitionError::MapTooSmall {
                id: id.clone(),
                width: self.width_range.0,
                height: self.height_range.0,
                min: MIN_MAP_EDGE,
            });
        }
        for rule in &self.features {
            if !(0.0..=1.0).contains(&rule.chance) {
                errors.push(DefinitionError::BadProbability {
                    id: id.clone(),
                    rule: rule.feature.clone(),
                    value: rule.chance,
                });
            }
        }
        for rule in &self.hazards {
            if !(0.0..=1.0).contains(&rule.density) {
                errors.push(DefinitionError::BadProbability {
                    id: id.clone(),
                    rule: rule.hazard.clone(),
                    value: rule.density,
                });
            }
        }

        errors
    }
}

/// The closed set of layout algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// Rectangular rooms joined by corridors (also the safe default)
    RoomsAndCorridors,
    /// Cellular-automata caves
    CellularCaves,
    /// Lattice of mining tunnels with shafts and ore veins
    MineTunnels,
    /// Binary-space-partitioned rooms
    BspRooms,
    /// Circular floors with radial wedges; stacks upward
    TowerFloors,
    /// Concentric ring walls around a central keep
    ConcentricFortress,
    /// Quadrant-mirrored temple
    MirroredTemple,
    /// Meandering tunnels with liquid channels
    WindingTunnels,
}

impl GeneratorKind {
    pub fn all() -> &'static [GeneratorKind] {
        &[
            GeneratorKind::RoomsAndCorridors,
            GeneratorKind::CellularCaves,
            GeneratorKind::MineTunnels,
            GeneratorKind::BspRooms,
            GeneratorKind::TowerFloors,
            GeneratorKind::ConcentricFortress,
            GeneratorKind::MirroredTemple,
            GeneratorKind::WindingTunnels,
        ]
    }

    /// Configuration tag for this strategy.
    pub fn tag(&self) -> &'static str {
        match self {
            GeneratorKind::RoomsAndCorridors => "rooms",
            GeneratorKind::CellularCaves => "cellular",
            GeneratorKind::MineTunnels => "mine",
            GeneratorKind::BspRooms => "bsp",
            GeneratorKind::TowerFloors => "tower",
            GeneratorKind::ConcentricFortress => "fortress",
            GeneratorKind::MirroredTemple => "temple",
            GeneratorKind::WindingTunnels => "winding",
        }
    }

    pub fn from_tag(tag: &str) -> Option<GeneratorKind> {
        Self::all().iter().copied().find(|k| k.tag() == tag)
    }

    /// Resolve a tag, degrading to the default strategy with a warning.
    pub fn resolve(tag: &str) -> GeneratorKind {
        Self::from_tag(tag).unwrap_or_else(|| {
            warn!(tag, "unknown generator tag, using default strategy");
            GeneratorKind::RoomsAndCorridors
        })
    }

    /// Whether this dungeon's floors stack upward (towers) rather than down.
    pub fn stacks_upward(&self) -> bool {
        matches!(self, GeneratorKind::TowerFloors)
    }

    /// Run the layout algorithm into a fresh map.
    fn run(
        &self,
        def: &DungeonDefinition,
        width: usize,
        height: usize,
        rng: &mut ChaCha8Rng,
    ) -> MapModel {
        match self {
            GeneratorKind::RoomsAndCorridors => rooms::generate(def, width, height, rng),
            GeneratorKind::CellularCaves => cellular::generate(def, width, height, rng),
            GeneratorKind::MineTunnels => mine::generate(def, width, height, rng),
            GeneratorKind::BspRooms => bsp::generate(def, width, height, rng),
            GeneratorKind::TowerFloors => tower::generate(def, width, height, rng),
            GeneratorKind::ConcentricFortress => fortress::generate(def, width, height, rng),
            GeneratorKind::MirroredTemple => temple::generate(def, width, height, rng),
            GeneratorKind::WindingTunnels => sewer::generate(def, width, height, rng),
        }
    }
}

/// Generate one dungeon floor.
///
/// Pure in (definition, floor, seeds): two calls with identical inputs
/// produce identical maps.
pub fn generate_floor(def: &DungeonDefinition, floor: u32, seeds: &WorldSeeds) -> MapModel {
    let layout_seed = seeds.dungeon_floor(&def.id, floor);
    let mut rng = ChaCha8Rng::seed_from_u64(layout_seed);
    let kind = GeneratorKind::resolve(&def.generator);

    let width = sample_range(def.width_range, &mut rng);
    let height = sample_range(def.height_range, &mut rng);

    let mut map = kind.run(def, width, height, &mut rng);
    map.id = format!("{}:{}", def.id, floor);
    map.floor = floor;
    map.dungeon_id = Some(def.id.clone());
    map.seal_border(TileKind::Wall);

    place_stairs(&mut map, kind, &mut rng);
    features::place(&mut map, def, seeds.floor_features(&def.id, floor));
    map
}

fn sample_range((lo, hi): (usize, usize), rng: &mut ChaCha8Rng) -> usize {
    if lo >= hi {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

/// Carve entry and exit stairs and enforce the connectivity invariant.
///
/// Entry goes in the first recorded room (or the first walkable tile);
/// repair then merges every other walkable region into the entry's region,
/// and the exit lands on the reachable tile farthest from the entry,
/// preferring a room tagged `End`. A strategy may pre-place its exit
/// (tower floors center their stairs); a pre-placed exit is kept.
fn place_stairs(map: &mut MapModel, kind: GeneratorKind, rng: &mut ChaCha8Rng) {
    let preset_exit = map.exit != (0, 0);

    let entry = map
        .rooms
        .first()
        .map(|r| r.bounds.center())
        .filter(|&(x, y)| map.is_walkable(x, y))
        .or_else(|| first_walkable(map));
    let Some(entry) = entry else {
        // Degenerate layout with no floor at all: carve a minimal chamber
        // rather than failing.
        let (cx, cy) = (map.width() / 2, map.height() / 2);
        map.carve_rect(crate::tilemap::Rect::new(cx - 2, cy - 2, 5, 5), TileKind::Floor);
        map.entry = (cx - 1, cy);
        map.exit = (cx + 1, cy);
        set_stair_tiles(map, kind);
        return;
    };
    map.entry = entry;

    connectivity::repair(map, rng);

    if !preset_exit {
        let distances = connectivity::bfs_distances(map, map.entry);
        let end_room = map
            .rooms
            .iter()
            .find(|r| r.tag == Some(RoomTag::End))
            .cloned();

        let mut best = map.entry;
        let mut best_dist = 0u32;
        for ((x, y), d) in &distances {
            if map.excluded.contains(&(*x, *y)) {
                continue;
            }
            if let Some(room) = &end_room {
                if !room.contains(*x, *y) {
                    continue;
                }
            }
            if *d > best_dist {
                best_dist = *d;
                best = (*x, *y);
            }
        }
        // An End room disjoint from the reachable set falls back to the
        // globally farthest tile.
        if best == map.entry && end_room.is_some() {
            for ((x, y), d) in &distances {
                if !map.excluded.contains(&(*x, *y)) && *d > best_dist {
                    best_dist = *d;
                    best = (*x, *y);
                }
            }
        }
        map.exit = best;
    }

    set_stair_tiles(map, kind);
}

fn set_stair_tiles(map: &mut MapModel, kind: GeneratorKind) {
    let (down, up) = (TileKind::StairsDown, TileKind::StairsUp);
    // Towers are climbed: the entry comes from below, the exit continues up.
    let (entry_kind, exit_kind) = if kind.stacks_upward() { (down, up) } else { (up, down) };
    let (ex, ey) = map.entry;
    map.set_kind(ex, ey, entry_kind);
    let (xx, xy) = map.exit;
    map.set_kind(xx, xy, exit_kind);
}

fn first_walkable(map: &MapModel) -> Option<(usize, usize)> {
    map.tiles
        .iter()
        .find(|(_, _, t)| t.walkable)
        .map(|(x, y, _)| (x, y))
}

/// Lookup table of dungeon definitions plus the fallback definition.
pub struct DungeonRegistry {
    defs: HashMap<String, DungeonDefinition>,
    fallback: DungeonDefinition,
}

impl DungeonRegistry {
    /// Build a registry from parsed definitions, collecting validation
    /// problems. Duplicate ids and invalid records are reported; valid
    /// records are still registered.
    pub fn new(defs: Vec<DungeonDefinition>) -> (Self, Vec<DefinitionError>) {
        let mut errors = Vec::new();
        let mut map = HashMap::new();
        for def in defs {
            errors.extend(def.validate());
            if map.contains_key(&def.id) {
                errors.push(DefinitionError::DuplicateId { id: def.id.clone() });
                continue;
            }
            map.insert(def.id.clone(), def);
        }
        (
            Self {
                defs: map,
                fallback: fallback_definition(),
            },
            errors,
        )
    }

    /// Parse definitions from a JSON array and build a registry.
    pub fn from_json(json: &str) -> Result<Self, Vec<DefinitionError>> {
        let defs: Vec<DungeonDefinition> = serde_json::from_str(json).map_err(|e| {
            vec![DefinitionError::UnknownGeneratorTag {
                id: "<parse error>".to_string(),
                tag: e.to_string(),
            }]
        })?;
        let (registry, errors) = Self::new(defs);
        if errors.is_empty() {
            Ok(registry)
        } else {
            Err(errors)
        }
    }

    /// Registry with the built-in dungeon set.
    pub fn builtin() -> Self {
        let (registry, errors) = Self::new(builtin_definitions());
        debug_assert!(errors.is_empty(), "builtin definitions must validate");
        registry
    }

    /// Look up a definition, degrading to the fallback when unknown.
    pub fn definition(&self, dungeon_id: &str) -> &DungeonDefinition {
        match self.defs.get(dungeon_id) {
            Some(def) => def,
            None => {
                warn!(dungeon = dungeon_id, "unknown dungeon id, using fallback definition");
                &self.fallback
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Generate a floor of the named dungeon.
    pub fn generate_floor(&self, dungeon_id: &str, floor: u32, seeds: &WorldSeeds) -> MapModel {
        generate_floor(self.definition(dungeon_id), floor, seeds)
    }
}

/// Session-lifetime cache of generated floors, keyed by (dungeon id, floor).
///
/// Revisited floors keep any player-caused tile mutations. Mutated only by
/// the single game-logic thread.
#[derive(Default)]
pub struct FloorCache {
    floors: HashMap<(String, u32), MapModel>,
}

impl FloorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_generate(
        &mut self,
        registry: &DungeonRegistry,
        dungeon_id: &str,
        floor: u32,
        seeds: &WorldSeeds,
    ) -> &mut MapModel {
        self.floors
            .entry((dungeon_id.to_string(), floor))
            .or_insert_with(|| registry.generate_floor(dungeon_id, floor, seeds))
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }
}

/// The documented fallback used when a dungeon id is unknown: a small
/// rooms-and-corridors cave.
fn fallback_definition() -> DungeonDefinition {
    DungeonDefinition {
        id: "fallback_cave".to_string(),
        name: "Forgotten Cave".to_string(),
        generator: "rooms".to_string(),
        width_range: (40, 40),
        height_range: (30, 30),
        floor_range: (1, 1),
        params: HashMap::new(),
        enemy_pools: vec!["cave_vermin".to_string()],
        loot_tables: vec!["common_scraps".to_string()],
        features: Vec::new(),
        hazards: Vec::new(),
    }
}

/// Built-in dungeon roster, one per layout algorithm.
pub fn builtin_definitions() -> Vec<DungeonDefinition> {
    fn def(
        id: &str,
        name: &str,
        generator: &str,
        width: (usize, usize),
        height: (usize, usize),
        floors: (u32, u32),
        params: &[(&str, f64)],
        features: Vec<FeatureRule>,
        hazards: Vec<HazardRule>,
    ) -> DungeonDefinition {
        DungeonDefinition {
            id: id.to_string(),
            name: name.to_string(),
            generator: generator.to_string(),
            width_range: width,
            height_range: height,
            floor_range: floors,
            params: params.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            enemy_pools: vec![format!("{id}_enemies")],
            loot_tables: vec![format!("{id}_loot")],
            features,
            hazards,
        }
    }

    let chest = |chance: f64, tags: &[&str]| FeatureRule {
        feature: "treasure_chest".to_string(),
        chance,
        room_tags: tags.iter().map(|s| s.to_string()).collect(),
        blocking: false,
    };

    vec![
        def(
            "burial_barrow",
            "Burial Barrow",
            "rooms",
            (42, 56),
            (32, 44),
            (3, 5),
            &[("min_rooms", 6.0), ("max_rooms", 11.0)],
            vec![
                chest(0.35, &[]),
                FeatureRule {
                    feature: "sarcophagus".to_string(),
                    chance: 0.6,
                    room_tags: vec!["end".to_string()],
                    blocking: true,
                },
            ],
            vec![HazardRule {
                hazard: "grave_miasma".to_string(),
                density: 0.01,
            }],
        ),
        def(
            "limestone_caverns",
            "Limestone Caverns",
            "cellular",
            (48, 64),
            (40, 52),
            (2, 4),
            &[
                ("fill_probability", 0.45),
                ("birth_limit", 4.0),
                ("death_limit", 3.0),
                ("iterations", 5.0),
            ],
            vec![chest(0.2, &[])],
            vec![HazardRule {
                hazard: "stalactite_fall".to_string(),
                density: 0.008,
            }],
        ),
        def(
            "abandoned_mine",
            "Abandoned Mine",
            "mine",
            (48, 64),
            (40, 56),
            (4, 6),
            &[
                ("tunnel_spacing", 9.0),
                ("tunnel_width", 2.0),
                ("shaft_chance", 0.15),
                ("ore_clusters", 10.0),
            ],
            vec![chest(0.25, &[])],
            vec![HazardRule {
                hazard: "gas_pocket".to_string(),
                density: 0.006,
            }],
        ),
        def(
            "fallen_keep",
            "Fallen Keep",
            "bsp",
            (48, 60),
            (40, 52),
            (2, 3),
            &[("min_room_size", 5.0), ("max_room_size", 11.0)],
            vec![
                chest(0.3, &["armory"]),
                FeatureRule {
                    feature: "weapon_rack".to_string(),
                    chance: 0.5,
                    room_tags: vec!["armory".to_string(), "barracks".to_string()],
                    blocking: false,
                },
            ],
            Vec::new(),
        ),
        def(
            "wizards_spire",
            "Wizard's Spire",
            "tower",
            (37, 45),
            (37, 45),
            (5, 8),
            &[("core_radius", 3.0), ("wedge_count", 6.0)],
            vec![FeatureRule {
                feature: "arcane_lectern".to_string(),
                chance: 0.4,
                room_tags: vec!["wedge".to_string()],
                blocking: false,
            }],
            Vec::new(),
        ),
        def(
            "ringed_citadel",
            "Ringed Citadel",
            "fortress",
            (52, 64),
            (52, 64),
            (1, 2),
            &[("ring_spacing", 6.0)],
            vec![chest(0.5, &["keep"])],
            Vec::new(),
        ),
        def(
            "sunken_temple",
            "Sunken Temple",
            "temple",
            (48, 60),
            (40, 52),
            (2, 3),
            &[("hall_width", 2.0)],
            vec![FeatureRule {
                feature: "votive_altar".to_string(),
                chance: 0.7,
                room_tags: vec!["sanctum".to_string()],
                blocking: false,
            }],
            Vec::new(),
        ),
        def(
            "old_sewers",
            "Old Sewers",
            "winding",
            (56, 72),
            (36, 48),
            (2, 4),
            &[
                ("tunnel_width", 3.0),
                ("branch_interval", 9.0),
                ("branch_chance", 0.5),
            ],
            vec![chest(0.15, &[])],
            vec![HazardRule {
                hazard: "foul_spill".to_string(),
                density: 0.01,
            }],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::connectivity::bfs_distances;

    fn seeds() -> WorldSeeds {
        WorldSeeds::from_master(42)
    }

    #[test]
    fn test_registry_resolves_all_tags() {
        for kind in GeneratorKind::all() {
            assert_eq!(GeneratorKind::resolve(kind.tag()), *kind);
        }
    }

    #[test]
    fn test_unknown_tag_falls_back() {
        assert_eq!(
            GeneratorKind::resolve("crystal_maze"),
            GeneratorKind::RoomsAndCorridors
        );
    }

    #[test]
    fn test_unknown_dungeon_uses_fallback_definition() {
        let registry = DungeonRegistry::builtin();
        let map = registry.generate_floor("no_such_place", 0, &seeds());
        assert_eq!(map.dungeon_id.as_deref(), Some("fallback_cave"));
        assert!(map.walkable_count() > 0);
    }

    #[test]
    fn test_floor_generation_deterministic() {
        let registry = DungeonRegistry::builtin();
        let s = seeds();
        let a = registry.generate_floor("burial_barrow", 3, &s);
        let b = registry.generate_floor("burial_barrow", 3, &s);

        assert_eq!(a.tiles, b.tiles);
        assert_eq!(a.entry, b.entry);
        assert_eq!(a.exit, b.exit);
        assert_eq!(a.rooms.len(), b.rooms.len());
        for (ra, rb) in a.rooms.iter().zip(&b.rooms) {
            assert_eq!(ra.bounds, rb.bounds);
        }
        assert_eq!(a.features, b.features);
        assert_eq!(a.hazards, b.hazards);
    }

    #[test]
    fn test_floors_differ_by_number_and_seed() {
        let registry = DungeonRegistry::builtin();
        let a = registry.generate_floor("burial_barrow", 1, &seeds());
        let b = registry.generate_floor("burial_barrow", 2, &seeds());
        let c = registry.generate_floor("burial_barrow", 1, &WorldSeeds::from_master(43));
        assert_ne!(a.tiles, b.tiles);
        assert_ne!(a.tiles, c.tiles);
    }

    #[test]
    fn test_every_builtin_dungeon_is_connected() {
        let registry = DungeonRegistry::builtin();
        let s = seeds();
        for id in ["burial_barrow", "limestone_caverns", "abandoned_mine", "fallen_keep",
                   "wizards_spire", "ringed_citadel", "sunken_temple", "old_sewers"] {
            for floor in 0..2 {
                let map = registry.generate_floor(id, floor, &s);
                let reachable = bfs_distances(&map, map.entry);
                // Every retained walkable tile is reachable from the entry
                let mut unreachable = 0;
                for (x, y, t) in map.tiles.iter() {
                    if t.walkable && !map.excluded.contains(&(x, y)) && !reachable.contains_key(&(x, y)) {
                        unreachable += 1;
                    }
                }
                assert_eq!(unreachable, 0, "{id} floor {floor} has unreachable tiles");
                assert!(reachable.contains_key(&map.exit), "{id} exit unreachable");
                assert_ne!(map.entry, map.exit, "{id} stairs overlap");
            }
        }
    }

    #[test]
    fn test_borders_are_solid_everywhere() {
        let registry = DungeonRegistry::builtin();
        let s = seeds();
        for id in registry.ids().collect::<Vec<_>>() {
            let map = registry.generate_floor(id, 0, &s);
            let (w, h) = (map.width(), map.height());
            for x in 0..w {
                assert!(!map.is_walkable(x, 0), "{id} open border tile");
                assert!(!map.is_walkable(x, h - 1), "{id} open border tile");
            }
            for y in 0..h {
                assert!(!map.is_walkable(0, y), "{id} open border tile");
                assert!(!map.is_walkable(w - 1, y), "{id} open border tile");
            }
        }
    }

    #[test]
    fn test_tower_stairs_stack_upward() {
        let registry = DungeonRegistry::builtin();
        let map = registry.generate_floor("wizards_spire", 1, &seeds());
        assert_eq!(map.kind(map.exit.0, map.exit.1), TileKind::StairsUp);
        assert_eq!(map.kind(map.entry.0, map.entry.1), TileKind::StairsDown);
    }

    #[test]
    fn test_floor_cache_returns_same_instance() {
        let registry = DungeonRegistry::builtin();
        let mut cache = FloorCache::new();
        let s = seeds();

        let entry = cache
            .get_or_generate(&registry, "burial_barrow", 1, &s)
            .entry;
        // Mutate through the cache, then fetch again
        cache
            .get_or_generate(&registry, "burial_barrow", 1, &s)
            .features
            .clear();
        let again = cache.get_or_generate(&registry, "burial_barrow", 1, &s);
        assert_eq!(again.entry, entry);
        assert!(again.features.is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_definition_validation_collects_errors() {
        let mut def = fallback_definition();
        def.generator = "mystery".to_string();
        def.width_range = (50, 40);
        def.features.push(FeatureRule {
            feature: "bad".to_string(),
            chance: 1.5,
            room_tags: Vec::new(),
            blocking: false,
        });

        let errors = def.validate();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_builtin_definitions_validate() {
        for def in builtin_definitions() {
            assert!(def.validate().is_empty(), "{} invalid", def.id);
        }
    }
}
