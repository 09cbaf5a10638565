//! Binary-space-partitioned rooms
//!
//! The play area is recursively split until leaves approach twice the
//! minimum room size, one room is carved per leaf, and sibling subtrees are
//! joined bottom-up so every leaf is transitively connected. Some rooms get
//! purpose tags used by feature rules.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::DungeonDefinition;
use crate::tilemap::{MapModel, Rect, Room, RoomTag};
use crate::tiles::TileKind;

struct SplitParams {
    min_room: usize,
    max_room: usize,
}

pub fn generate(
    def: &DungeonDefinition,
    width: usize,
    height: usize,
    rng: &mut ChaCha8Rng,
) -> MapModel {
    let min_room = def.param_usize("min_room_size", 5).max(3);
    let max_room = def.param_usize("max_room_size", 11).max(min_room);
    let params = SplitParams { min_room, max_room };

    let mut map = MapModel::filled(String::new(), width, height, TileKind::Wall);
    let area = Rect::new(1, 1, width - 2, height - 2);
    let mut rooms = Vec::new();
    split(&mut map, area, &params, rng, &mut rooms);

    // Purpose tags by random draw; the farthest room from the first becomes
    // the exit host.
    for room in rooms.iter_mut().skip(1) {
        room.tag = match rng.gen_range(0..10) {
            0 => Some(RoomTag::Courtyard),
            1 => Some(RoomTag::Armory),
            2 | 3 => Some(RoomTag::Barracks),
            _ => None,
        };
    }
    if let Some((first, rest)) = rooms.split_first() {
        let (fx, fy) = first.bounds.center();
        if let Some(far) = rest
            .iter()
            .enumerate()
            .max_by_key(|(_, r)| {
                let (cx, cy) = r.bounds.center();
                cx.abs_diff(fx) + cy.abs_diff(fy)
            })
            .map(|(i, _)| i + 1)
        {
            rooms[far].tag = Some(RoomTag::End);
        }
    }

    map.rooms = rooms;
    map
}

/// Recursively split `area`, carve one room per leaf, and connect the two
/// halves. Returns the rooms in this subtree.
fn split(
    map: &mut MapModel,
    area: Rect,
    params: &SplitParams,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Room>,
) {
    // A side must fit two child regions of min_room plus walls to split.
    let splittable_w = area.w >= 2 * (params.min_room + 2);
    let splittable_h = area.h >= 2 * (params.min_room + 2);

    if !splittable_w && !splittable_h {
        out.push(carve_leaf_room(map, area, params, rng));
        return;
    }

    // Orientation: size-driven for skewed regions, random otherwise
    let vertical = if splittable_w && !splittable_h {
        true
    } else if splittable_h && !splittable_w {
        false
    } else if area.w as f64 > area.h as f64 * 1.25 {
        true
    } else if area.h as f64 > area.w as f64 * 1.25 {
        false
    } else {
        rng.gen_bool(0.5)
    };

    let first_count = out.len();
    if vertical {
        let min = params.min_room + 2;
        let cut = rng.gen_range(min..=area.w - min);
        let left = Rect::new(area.x, area.y, cut, area.h);
        let right = Rect::new(area.x + cut, area.y, area.w - cut, area.h);
        split(map, left, params, rng, out);
        let mid_count = out.len();
        split(map, right, params, rng, out);
        join_halves(map, out, first_count, mid_count, rng);
    } else {
        let min = params.min_room + 2;
        let cut = rng.gen_range(min..=area.h - min);
        let top = Rect::new(area.x, area.y, area.w, cut);
        let bottom = Rect::new(area.x, area.y + cut, area.w, area.h - cut);
        split(map, top, params, rng, out);
        let mid_count = out.len();
        split(map, bottom, params, rng, out);
        join_halves(map, out, first_count, mid_count, rng);
    }
}

/// Carve a randomly sized and positioned room inside a leaf.
///
/// Degenerate leaves (smaller than the minimum room plus walls) still get a
/// single room filling what space there is rather than failing.
fn carve_leaf_room(
    map: &mut MapModel,
    leaf: Rect,
    params: &SplitParams,
    rng: &mut ChaCha8Rng,
) -> Room {
    let max_w = (leaf.w.saturating_sub(2)).min(params.max_room);
    let max_h = (leaf.h.saturating_sub(2)).min(params.max_room);
    let w = if max_w <= params.min_room {
        max_w.max(2)
    } else {
        rng.gen_range(params.min_room..=max_w)
    };
    let h = if max_h <= params.min_room {
        max_h.max(2)
    } else {
        rng.gen_range(params.min_room..=max_h)
    };
    let x = leaf.x + 1 + rng.gen_range(0..=leaf.w.saturating_sub(2 + w));
    let y = leaf.y + 1 + rng.gen_range(0..=leaf.h.saturating_sub(2 + h));

    let bounds = Rect::new(x, y, w, h);
    map.carve_rect(bounds, TileKind::Floor);
    Room::rect(bounds)
}

/// Join the two halves of a split by a corridor between one room of each.
fn join_halves(
    map: &mut MapModel,
    rooms: &[Room],
    first: usize,
    mid: usize,
    rng: &mut ChaCha8Rng,
) {
    if first >= mid || mid >= rooms.len() {
        return;
    }
    let a = rooms[rng.gen_range(first..mid)].bounds.center();
    let b = rooms[rng.gen_range(mid..rooms.len())].bounds.center();
    let corner = if rng.gen_bool(0.5) { (b.0, a.1) } else { (a.0, b.1) };
    carve_line(map, a, corner);
    carve_line(map, corner, b);
}

fn carve_line(map: &mut MapModel, from: (usize, usize), to: (usize, usize)) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::connectivity::walkable_regions;
    use rand::SeedableRng;

    fn def() -> DungeonDefinition {
        super::super::builtin_definitions()
            .into_iter()
            .find(|d| d.id == "fallen_keep")
            .unwrap()
    }

    #[test]
    fn test_room_sizes_within_bounds() {
        let d = def();
        let min = d.param_usize("min_room_size", 5);
        let max = d.param_usize("max_room_size", 11);
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate(&d, 56, 48, &mut rng);
            for room in &map.rooms {
                assert!(
                    room.bounds.w >= min && room.bounds.w <= max,
                    "seed {seed}: width {} outside [{min}, {max}]",
                    room.bounds.w
                );
                assert!(
                    room.bounds.h >= min && room.bounds.h <= max,
                    "seed {seed}: height {} outside [{min}, {max}]",
                    room.bounds.h
                );
            }
        }
    }

    #[test]
    fn test_all_leaves_connected() {
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate(&def(), 56, 48, &mut rng);
            assert!(map.rooms.len() >= 2);
            assert_eq!(walkable_regions(&map).len(), 1, "seed {seed} disconnected");
        }
    }

    #[test]
    fn test_one_end_room_tagged() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let map = generate(&def(), 56, 48, &mut rng);
        let ends = map
            .rooms
            .iter()
            .filter(|r| r.tag == Some(RoomTag::End))
            .count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn test_tiny_map_degrades_to_single_room() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut d = def();
        d.params.insert("min_room_size".to_string(), 12.0);
        let map = generate(&d, 20, 20, &mut rng);
        assert_eq!(map.rooms.len(), 1);
        assert!(map.walkable_count() > 0);
    }
}
