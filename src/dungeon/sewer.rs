//! Winding sewer tunnels
//!
//! A drifting trunk tunnel carved edge to edge with side branches at
//! intervals, a liquid channel running down the trunk centerline, and
//! maintenance platforms beside the channel. Channel tiles stay walkable
//! but hazardous, so the liquid never splits the floor.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::DungeonDefinition;
use crate::tilemap::{MapModel, Rect, Room};
use crate::tiles::TileKind;

pub fn generate(
    def: &DungeonDefinition,
    width: usize,
    height: usize,
    rng: &mut ChaCha8Rng,
) -> MapModel {
    let tunnel_width = def.param_usize("tunnel_width", 3).clamp(2, 5);
    let branch_interval = def.param_usize("branch_interval", 9).max(3);
    let branch_chance = def.param("branch_chance", 0.5).clamp(0.0, 1.0);
    let drift_chance = def.param("drift_chance", 0.3).clamp(0.0, 1.0);
    let platform_chance = def.param("platform_chance", 0.1).clamp(0.0, 1.0);

    let mut map = MapModel::filled(String::new(), width, height, TileKind::Wall);

    // Trunk: west edge to east edge, drifting vertically
    let mut y = rng.gen_range(height / 3..=2 * height / 3);
    let y_max = height - 2 - tunnel_width;
    let mut centerline = Vec::new();
    let mut prev_y = y;
    for x in 1..width - 1 {
        let lo = prev_y.min(y);
        let hi = prev_y.max(y) + tunnel_width;
        for cy in lo..hi.min(height - 1) {
            map.set_kind(x, cy, TileKind::Floor);
        }
        centerline.push((x, y + tunnel_width / 2));

        if x % branch_interval == 0 && rng.gen_bool(branch_chance) {
            carve_branch(&mut map, x, y, tunnel_width, rng);
        }

        prev_y = y;
        if rng.gen_bool(drift_chance) {
            if rng.gen_bool(0.5) {
                y = (y + 1).min(y_max);
            } else {
                y = y.saturating_sub(1).max(2);
            }
        }
    }

    // Liquid channel down the trunk centerline, wide tunnels only so a dry
    // walkway remains on both sides
    if tunnel_width >= 3 {
        for &(cx, cy) in &centerline {
            if map.kind(cx, cy) == TileKind::Floor {
                map.set_kind(cx, cy, TileKind::Channel);
            }
        }
        place_platforms(&mut map, &centerline, platform_chance, rng);
    }

    map
}

/// A side branch walking toward the top or bottom edge, ending in a small
/// chamber recorded as a room.
fn carve_branch(
    map: &mut MapModel,
    start_x: usize,
    start_y: usize,
    tunnel_width: usize,
    rng: &mut ChaCha8Rng,
) {
    let (w, h) = (map.width(), map.height());
    let going_up = rng.gen_bool(0.5);
    let length = rng.gen_range(5..=h / 2);
    let x_max = w - 2 - tunnel_width;

    let mut x = start_x.clamp(2, x_max);
    let mut prev_x = x;
    let mut y = start_y;
    let mut end = (x, y);
    for _ in 0..length {
        let next_y = if going_up { y.saturating_sub(1) } else { y + 1 };
        if next_y < 2 || next_y > h - 3 {
            break;
        }
        y = next_y;
        let lo = prev_x.min(x);
        let hi = prev_x.max(x) + tunnel_width;
        for cx in lo..hi.min(w - 1) {
            map.set_kind(cx, y, TileKind::Floor);
        }
        end = (x, y);

        prev_x = x;
        if rng.gen_bool(0.25) {
            if rng.gen_bool(0.5) {
                x = (x + 1).min(x_max);
            } else {
                x = x.saturating_sub(1).max(2);
            }
        }
    }

    // Terminal chamber
    let size = rng.gen_range(3..=5);
    let cx = end.0.saturating_sub(size / 2).max(1);
    let cy = end.1.saturating_sub(size / 2).max(1);
    let chamber = Rect::new(cx, cy, size, size);
    map.carve_rect(chamber, TileKind::Floor);
    map.rooms.push(Room::rect(chamber));
}

/// Maintenance platforms on floor tiles beside the channel.
fn place_platforms(
    map: &mut MapModel,
    centerline: &[(usize, usize)],
    chance: f64,
    rng: &mut ChaCha8Rng,
) {
    let mut placements = Vec::new();
    for &(cx, cy) in centerline {
        if map.kind(cx, cy) != TileKind::Channel {
            continue;
        }
        for (nx, ny) in map.tiles.neighbors(cx, cy) {
            if map.kind(nx, ny) == TileKind::Floor && rng.gen_bool(chance) {
                placements.push((nx, ny));
            }
        }
    }
    for (x, y) in placements {
        map.set_kind(x, y, TileKind::Platform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::connectivity::walkable_regions;
    use rand::SeedableRng;

    fn def() -> DungeonDefinition {
        super::super::builtin_definitions()
            .into_iter()
            .find(|d| d.id == "old_sewers")
            .unwrap()
    }

    #[test]
    fn test_tunnels_form_one_region() {
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate(&def(), 64, 40, &mut rng);
            assert_eq!(walkable_regions(&map).len(), 1, "seed {seed} disconnected");
        }
    }

    #[test]
    fn test_trunk_spans_map_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let map = generate(&def(), 64, 40, &mut rng);
        for x in 1..63 {
            let column_open = (1..39).any(|y| map.is_walkable(x, y));
            assert!(column_open, "no open tile in column {x}");
        }
    }

    #[test]
    fn test_channel_is_walkable_and_hazardous() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let map = generate(&def(), 64, 40, &mut rng);
        let channels: Vec<_> = map
            .tiles
            .iter()
            .filter(|(_, _, t)| t.kind == TileKind::Channel)
            .collect();
        assert!(!channels.is_empty());
        for (_, _, t) in channels {
            assert!(t.walkable);
            assert!(t.kind.is_hazardous());
        }
    }

    #[test]
    fn test_platforms_touch_the_channel() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = generate(&def(), 64, 40, &mut rng);
        for (x, y, t) in map.tiles.iter() {
            if t.kind == TileKind::Platform {
                let beside = map
                    .tiles
                    .neighbors(x, y)
                    .iter()
                    .any(|&(nx, ny)| map.kind(nx, ny) == TileKind::Channel);
                assert!(beside, "stranded platform at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_narrow_tunnels_skip_the_channel() {
        let mut d = def();
        d.params.insert("tunnel_width".to_string(), 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let map = generate(&d, 64, 40, &mut rng);
        assert!(map.tiles.iter().all(|(_, _, t)| t.kind != TileKind::Channel));
    }
}
