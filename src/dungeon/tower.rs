//! Circular tower floors
//!
//! A disk carved around the center, subdivided into angular wedges by
//! radial wall segments that stop short of an open inner core. The spiral
//! stair sits at the exact center, so tower floors stack upward and every
//! wedge reaches the stairs through the core.

use std::f64::consts::TAU;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::DungeonDefinition;
use crate::tilemap::{MapModel, Rect, Room, RoomTag};
use crate::tiles::TileKind;

pub fn generate(
    def: &DungeonDefinition,
    width: usize,
    height: usize,
    rng: &mut ChaCha8Rng,
) -> MapModel {
    let core_radius = def.param("core_radius", 3.0).max(2.0);
    let wedge_count = def.param_usize("wedge_count", 6).clamp(2, 12);
    let feature_chance = def.param("wedge_feature_chance", 0.5);

    let mut map = MapModel::filled(String::new(), width, height, TileKind::Wall);
    let cx = width / 2;
    let cy = height / 2;
    let radius = (width.min(height) as f64 - 4.0) / 2.0;

    // Carve the disk
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if dist(x, y, cx, cy) <= radius {
                map.set_kind(x, y, TileKind::Floor);
            }
        }
    }

    // Radial wall segments, rotated by a random phase, leaving the core open
    let phase = rng.gen_range(0.0..TAU);
    for k in 0..wedge_count {
        let angle = phase + TAU * k as f64 / wedge_count as f64;
        let mut r = core_radius + 1.0;
        while r <= radius {
            let x = (cx as f64 + r * angle.cos()).round() as i64;
            let y = (cy as f64 + r * angle.sin()).round() as i64;
            if map.tiles.in_bounds(x as i32, y as i32) {
                map.set_kind(x as usize, y as usize, TileKind::Wall);
            }
            r += 0.5;
        }
    }

    record_wedges(&mut map, cx, cy, core_radius, radius, phase, wedge_count);
    scatter_wedge_features(&mut map, feature_chance, rng);

    // Central spiral stair: the floor's exit continues upward from here
    map.set_kind(cx, cy, TileKind::Floor);
    map.exit = (cx, cy);

    map
}

fn dist(x: usize, y: usize, cx: usize, cy: usize) -> f64 {
    let dx = x as f64 - cx as f64;
    let dy = y as f64 - cy as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Group the ring tiles (outside the core) into angular wedge rooms.
fn record_wedges(
    map: &mut MapModel,
    cx: usize,
    cy: usize,
    core_radius: f64,
    radius: f64,
    phase: f64,
    wedge_count: usize,
) {
    let mut bins: Vec<Vec<(usize, usize)>> = vec![Vec::new(); wedge_count];
    for (x, y, tile) in map.tiles.iter() {
        if !tile.walkable {
            continue;
        }
        let d = dist(x, y, cx, cy);
        if d <= core_radius || d > radius {
            continue;
        }
        let angle = (y as f64 - cy as f64).atan2(x as f64 - cx as f64);
        let rel = (angle - phase).rem_euclid(TAU);
        let bin = ((rel / TAU * wedge_count as f64) as usize).min(wedge_count - 1);
        bins[bin].push((x, y));
    }

    for tiles in bins {
        if tiles.is_empty() {
            continue;
        }
        let min_x = tiles.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = tiles.iter().map(|p| p.0).max().unwrap_or(0);
        let min_y = tiles.iter().map(|p| p.1).min().unwrap_or(0);
        let max_y = tiles.iter().map(|p| p.1).max().unwrap_or(0);
        let bounds = Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1);
        map.rooms.push(Room::irregular(bounds, tiles, Some(RoomTag::Wedge)));
    }
}

/// Scatter pedestal features into the wedges. Only well-surrounded tiles
/// are used so a pedestal cannot pinch a wedge throat shut.
fn scatter_wedge_features(map: &mut MapModel, chance: f64, rng: &mut ChaCha8Rng) {
    let chance = chance.clamp(0.0, 1.0);
    let mut placements = Vec::new();
    for room in &map.rooms {
        if room.tag != Some(RoomTag::Wedge) || !rng.gen_bool(chance) {
            continue;
        }
        let Some(tiles) = &room.tiles else { continue };
        for _ in 0..8 {
            let (x, y) = tiles[rng.gen_range(0..tiles.len())];
            let open = map
                .tiles
                .neighbors_8(x, y)
                .iter()
                .filter(|&&(nx, ny)| map.is_walkable(nx, ny))
                .count();
            if open >= 7 {
                placements.push((x, y));
                break;
            }
        }
    }
    for (x, y) in placements {
        map.set_kind(x, y, TileKind::Pedestal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::connectivity::bfs_distances;
    use rand::SeedableRng;

    fn def() -> DungeonDefinition {
        super::super::builtin_definitions()
            .into_iter()
            .find(|d| d.id == "wizards_spire")
            .unwrap()
    }

    #[test]
    fn test_center_reaches_every_wedge() {
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate(&def(), 41, 41, &mut rng);
            let dist = bfs_distances(&map, map.exit);
            for room in &map.rooms {
                let tiles = room.tiles.as_ref().unwrap();
                let reached = tiles.iter().filter(|p| dist.contains_key(p)).count();
                // The odd pedestal aside, wedges connect through the core
                assert!(
                    reached * 10 >= tiles.len() * 9,
                    "seed {seed}: wedge mostly unreachable"
                );
            }
        }
    }

    #[test]
    fn test_disk_bounded_by_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let map = generate(&def(), 41, 41, &mut rng);
        let radius = (41f64 - 4.0) / 2.0;
        for (x, y, t) in map.tiles.iter() {
            if t.walkable {
                assert!(dist(x, y, 20, 20) <= radius + 0.01);
            }
        }
    }

    #[test]
    fn test_wedge_rooms_recorded() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = generate(&def(), 41, 41, &mut rng);
        let wedges = map
            .rooms
            .iter()
            .filter(|r| r.tag == Some(RoomTag::Wedge))
            .count();
        assert!(wedges >= 2);
    }

    #[test]
    fn test_exit_preset_at_center() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let map = generate(&def(), 41, 41, &mut rng);
        assert_eq!(map.exit, (20, 20));
        assert!(map.is_walkable(20, 20));
    }
}
