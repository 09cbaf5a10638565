//! Post-generation feature and hazard placement
//!
//! Runs after layout and stair carving. Feature rules roll once per
//! matching room and then search for a legal tile inside it; hazard rules
//! roll independently per retained walkable tile. Placement never touches
//! the tile grid, features and hazards are entity-level annotations
//! resolved by the spawner.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::dungeon::connectivity;
use crate::dungeon::{DungeonDefinition, FeatureRule};
use crate::tilemap::{MapModel, PlacedFeature, PlacedHazard, Room};

/// Position draws per room before a rule gives up on that room.
const POSITION_ATTEMPTS: usize = 10;

/// Apply a definition's feature and hazard rules to a generated floor.
///
/// Pure in (map, definition, seed): placement order follows rule order,
/// then room order, then row-major tile order.
pub fn place(map: &mut MapModel, def: &DungeonDefinition, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let rooms = map.rooms.clone();
    for rule in &def.features {
        for room in &rooms {
            if !rule_matches_room(rule, room) {
                continue;
            }
            if !rng.gen_bool(rule.chance.clamp(0.0, 1.0)) {
                continue;
            }
            if let Some((x, y)) = find_position(map, rule, room, &mut rng) {
                map.features.push(PlacedFeature {
                    id: rule.feature.clone(),
                    x,
                    y,
                    blocking: rule.blocking,
                });
            }
        }
    }

    for rule in &def.hazards {
        let density = rule.density.clamp(0.0, 1.0);
        let (w, h) = (map.width(), map.height());
        for y in 0..h {
            for x in 0..w {
                if !eligible(map, x, y) || !rng.gen_bool(density) {
                    continue;
                }
                map.hazards.push(PlacedHazard {
                    id: rule.hazard.clone(),
                    x,
                    y,
                });
            }
        }
    }
}

/// Empty tag list matches every room.
fn rule_matches_room(rule: &FeatureRule, room: &Room) -> bool {
    if rule.room_tags.is_empty() {
        return true;
    }
    room.tag
        .map(|t| rule.room_tags.iter().any(|wanted| wanted == t.as_str()))
        .unwrap_or(false)
}

/// Draw candidate tiles inside the room until one passes all checks.
fn find_position(
    map: &MapModel,
    rule: &FeatureRule,
    room: &Room,
    rng: &mut ChaCha8Rng,
) -> Option<(usize, usize)> {
    for _ in 0..POSITION_ATTEMPTS {
        let (x, y) = match &room.tiles {
            Some(tiles) if !tiles.is_empty() => tiles[rng.gen_range(0..tiles.len())],
            Some(_) => return None,
            None => (
                rng.gen_range(room.bounds.x..room.bounds.x + room.bounds.w),
                rng.gen_range(room.bounds.y..room.bounds.y + room.bounds.h),
            ),
        };
        if !eligible(map, x, y) {
            continue;
        }
        if rule.blocking && !blocking_allowed(map, x, y) {
            continue;
        }
        return Some((x, y));
    }
    None
}

fn eligible(map: &MapModel, x: usize, y: usize) -> bool {
    map.is_walkable(x, y)
        && (x, y) != map.entry
        && (x, y) != map.exit
        && !map.is_occupied(x, y)
        && !map.excluded.contains(&(x, y))
}

/// A blocking feature may not cut any retained tile, or the exit, off from
/// the entry. Tiles next to an existing blocking feature are rejected
/// outright so two placements cannot combine into a plug.
fn blocking_allowed(map: &MapModel, x: usize, y: usize) -> bool {
    let beside_blocker = map.features.iter().any(|f| {
        f.blocking && f.x.abs_diff(x) <= 1 && f.y.abs_diff(y) <= 1
    });
    if beside_blocker {
        return false;
    }

    let reachable = connectivity::reachable_without(map, map.entry, (x, y));
    if !reachable.contains(&map.exit) {
        return false;
    }
    let retained = map
        .tiles
        .iter()
        .filter(|&(tx, ty, t)| t.walkable && !map.excluded.contains(&(tx, ty)))
        .count();
    // Everything retained except the candidate itself must stay reachable
    reachable.len() == retained - 1
}
