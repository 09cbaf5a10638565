//! Symmetric temple halls
//!
//! A central sanctum on a crossing of wide hallways, with side chambers
//! laid out in one quadrant and mirrored across both axes. The whole floor
//! is made bilaterally symmetric at the end by reflecting the west half
//! east and the north half south.

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
    let sanctum_size = def.param_usize("sanctum_size", 9).max(5) | 1;
    let hall_width = def.param_usize("hall_width", 3).clamp(1, 5);
    let chamber_count = def.param_usize("chamber_count", 4);

    let mut map = MapModel::filled(String::new(), width, height, TileKind::Wall);
    let cx = width / 2;
    let cy = height / 2;

    // Crossing hallways through the center
    let hx = cy.saturating_sub(hall_width / 2);
    let vx = cx.saturating_sub(hall_width / 2);
    map.carve_rect(Rect::new(1, hx, width - 2, hall_width), TileKind::Floor);
    map.carve_rect(Rect::new(vx, 1, hall_width, height - 2), TileKind::Floor);

    // Central sanctum
    let half = sanctum_size / 2;
    let sanctum = Rect::new(cx - half, cy - half, sanctum_size, sanctum_size);
    map.carve_rect(sanctum, TileKind::Floor);

    // Side chambers in the northwest quadrant, joined to the sanctum
    let quadrant = Rect::new(2, 2, cx.saturating_sub(half + 3), cy.saturating_sub(half + 3));
    let chambers = carve_quadrant_chambers(&mut map, quadrant, chamber_count, (cx, cy), rng);

    // Pedestal ring inside the sanctum
    for (px, py) in [
        (cx - half + 1, cy - half + 1),
        (cx + half - 1, cy - half + 1),
        (cx - half + 1, cy + half - 1),
        (cx + half - 1, cy + half - 1),
    ] {
        map.set_kind(px, py, TileKind::Pedestal);
    }

    mirror(&mut map);
    record_rooms(&mut map, sanctum, &chambers, width, height);
    map
}

/// Place chambers inside `quadrant` by bounded retries and connect each to
/// the sanctum center with an L corridor.
fn carve_quadrant_chambers(
    map: &mut MapModel,
    quadrant: Rect,
    count: usize,
    center: (usize, usize),
    rng: &mut ChaCha8Rng,
) -> Vec<Rect> {
    let mut chambers: Vec<Rect> = Vec::new();
    if quadrant.w < 6 || quadrant.h < 6 {
        return chambers;
    }
    for _ in 0..count {
        for _ in 0..20 {
            let w = rng.gen_range(4..=(quadrant.w - 2).min(7));
            let h = rng.gen_range(4..=(quadrant.h - 2).min(7));
            let x = rng.gen_range(quadrant.x..=quadrant.x + quadrant.w - w);
            let y = rng.gen_range(quadrant.y..=quadrant.y + quadrant.h - h);
            let candidate = Rect::new(x, y, w, h);
            if chambers.iter().all(|c| !candidate.intersects_with_gap(c, 1)) {
                map.carve_rect(candidate, TileKind::Floor);
                carve_l(map, candidate.center(), center);
                chambers.push(candidate);
                break;
            }
        }
    }
    chambers
}

fn carve_l(map: &mut MapModel, from: (usize, usize), to: (usize, usize)) {
    let (w, h) = (map.width(), map.height());
    for x in from.0.min(to.0)..=from.0.max(to.0) {
        if x >= 1 && x < w - 1 && from.1 >= 1 && from.1 < h - 1 && !map.is_walkable(x, from.1) {
            map.set_kind(x, from.1, TileKind::Floor);
        }
    }
    for y in from.1.min(to.1)..=from.1.max(to.1) {
        if to.0 >= 1 && to.0 < w - 1 && y >= 1 && y < h - 1 && !map.is_walkable(to.0, y) {
            map.set_kind(to.0, y, TileKind::Floor);
        }
    }
}

/// Reflect the west half east, then the north half south.
fn mirror(map: &mut MapModel) {
    let (w, h) = (map.width(), map.height());
    for y in 0..h {
        for x in 0..w / 2 {
            let tile = map.tiles.get(x, y).clone();
            map.tiles.set(w - 1 - x, y, tile);
        }
    }
    for y in 0..h / 2 {
        for x in 0..w {
            let tile = map.tiles.get(x, y).clone();
            map.tiles.set(x, h - 1 - y, tile);
        }
    }
}

fn record_rooms(map: &mut MapModel, sanctum: Rect, chambers: &[Rect], width: usize, height: usize) {
    map.rooms.push(Room::rect_tagged(sanctum, RoomTag::Sanctum));
    for c in chambers {
        let mx = width - c.x - c.w;
        let my = height - c.y - c.h;
        for rect in [
            *c,
            Rect::new(mx, c.y, c.w, c.h),
            Rect::new(c.x, my, c.w, c.h),
            Rect::new(mx, my, c.w, c.h),
        ] {
            map.rooms.push(Room::rect(rect));
        }
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
            .find(|d| d.id == "sunken_temple")
            .unwrap()
    }

    #[test]
    fn test_floor_is_symmetric() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let map = generate(&def(), 49, 49, &mut rng);
        let (w, h) = (map.width(), map.height());
        for (x, y, t) in map.tiles.iter() {
            assert_eq!(t.kind, map.kind(w - 1 - x, y), "x-mirror broken at ({x}, {y})");
            assert_eq!(t.kind, map.kind(x, h - 1 - y), "y-mirror broken at ({x}, {y})");
        }
    }

    #[test]
    fn test_single_connected_region() {
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate(&def(), 49, 49, &mut rng);
            assert_eq!(walkable_regions(&map).len(), 1, "seed {seed} disconnected");
        }
    }

    #[test]
    fn test_sanctum_room_at_center() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let map = generate(&def(), 49, 49, &mut rng);
        let sanctum = map
            .rooms
            .iter()
            .find(|r| r.tag == Some(RoomTag::Sanctum))
            .expect("sanctum room");
        assert_eq!(sanctum.bounds.center(), (24, 24));
    }

    #[test]
    fn test_pedestals_mirrored() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = generate(&def(), 49, 49, &mut rng);
        let pedestals: Vec<_> = map
            .tiles
            .iter()
            .filter(|(_, _, t)| t.kind == TileKind::Pedestal)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!pedestals.is_empty());
        for &(x, y) in &pedestals {
            assert!(pedestals.contains(&(48 - x, y)));
            assert!(pedestals.contains(&(x, 48 - y)));
        }
    }
}
