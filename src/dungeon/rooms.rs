//! Rectangular rooms joined by corridors
//!
//! The classic layout and the registry's safe default: place N
//! non-overlapping rooms by bounded random retries, then connect each room
//! to its nearest already-connected neighbor with an L-shaped corridor,
//! with doors where corridors pierce room walls.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::DungeonDefinition;
use crate::tilemap::{MapModel, Rect, Room, RoomTag};
use crate::tiles::TileKind;

/// Placement retries per room before giving up on it.
const PLACEMENT_RETRIES: usize = 30;

pub fn generate(
    def: &DungeonDefinition,
    width: usize,
    height: usize,
    rng: &mut ChaCha8Rng,
) -> MapModel {
    let min_rooms = def.param_usize("min_rooms", 5);
    let max_rooms = def.param_usize("max_rooms", 10).max(min_rooms);
    let min_size = def.param_usize("min_room_size", 4);
    let max_size = def.param_usize("max_room_size", 9).max(min_size);
    let corridor_width = def.param_usize("corridor_width", 1).max(1);

    let mut map = MapModel::filled(String::new(), width, height, TileKind::Wall);
    let room_count = rng.gen_range(min_rooms..=max_rooms);

    // Bounded random placement
    let mut rects: Vec<Rect> = Vec::new();
    for _ in 0..room_count {
        for _ in 0..PLACEMENT_RETRIES {
            let w = rng.gen_range(min_size..=max_size.min(width.saturating_sub(4)).max(min_size));
            let h = rng.gen_range(min_size..=max_size.min(height.saturating_sub(4)).max(min_size));
            if w + 2 >= width || h + 2 >= height {
                continue;
            }
            let x = rng.gen_range(1..width - w - 1);
            let y = rng.gen_range(1..height - h - 1);
            let candidate = Rect::new(x, y, w, h);
            if rects.iter().all(|r| !candidate.intersects_with_gap(r, 1)) {
                rects.push(candidate);
                break;
            }
        }
    }

    for rect in &rects {
        map.carve_rect(*rect, TileKind::Floor);
    }

    // Connect each room to its nearest already-connected neighbor
    for i in 1..rects.len() {
        let (cx, cy) = rects[i].center();
        let Some(nearest) = (0..i).min_by_key(|&j| {
            let (ox, oy) = rects[j].center();
            cx.abs_diff(ox) + cy.abs_diff(oy)
        }) else {
            continue;
        };
        let target = rects[nearest].center();
        carve_corridor(&mut map, &rects, (cx, cy), target, corridor_width, rng);
    }

    // The last-placed room hosts the exit
    for (i, rect) in rects.iter().enumerate() {
        let tag = (i + 1 == rects.len()).then_some(RoomTag::End);
        map.rooms.push(Room {
            bounds: *rect,
            tiles: None,
            tag,
        });
    }

    map
}

/// Carve an L-shaped corridor between two room centers, turning wall cells
/// on a room's perimeter into doors.
fn carve_corridor(
    map: &mut MapModel,
    rooms: &[Rect],
    from: (usize, usize),
    to: (usize, usize),
    width: usize,
    rng: &mut ChaCha8Rng,
) {
    let corner = if rng.gen_bool(0.5) {
        (to.0, from.1)
    } else {
        (from.0, to.1)
    };
    carve_leg(map, rooms, from, corner, width);
    carve_leg(map, rooms, corner, to, width);
}

fn carve_leg(
    map: &mut MapModel,
    rooms: &[Rect],
    from: (usize, usize),
    to: (usize, usize),
    width: usize,
) {
    let mut cells = Vec::new();
    for x in from.0.min(to.0)..=from.0.max(to.0) {
        for o in 0..width {
            cells.push((x, from.1 + o));
        }
    }
    for y in from.1.min(to.1)..=from.1.max(to.1) {
        for o in 0..width {
            cells.push((to.0 + o, y));
        }
    }

    let (w, h) = (map.width(), map.height());
    for (x, y) in cells {
        if x < 1 || y < 1 || x >= w - 1 || y >= h - 1 {
            continue;
        }
        if map.is_walkable(x, y) {
            continue;
        }
        let kind = if on_room_perimeter(rooms, x, y) {
            TileKind::Door
        } else {
            TileKind::Floor
        };
        map.set_kind(x, y, kind);
    }
}

/// Whether (x, y) sits on the one-tile wall ring around any room.
fn on_room_perimeter(rooms: &[Rect], x: usize, y: usize) -> bool {
    rooms.iter().any(|r| {
        let inside_expanded = x + 1 >= r.x
            && x < r.x + r.w + 1
            && y + 1 >= r.y
            && y < r.y + r.h + 1;
        inside_expanded && !r.contains(x, y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::connectivity::walkable_regions;
    use crate::dungeon::builtin_definitions;
    use rand::SeedableRng;

    fn def() -> DungeonDefinition {
        builtin_definitions()
            .into_iter()
            .find(|d| d.id == "burial_barrow")
            .unwrap()
    }

    #[test]
    fn test_rooms_do_not_overlap() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let map = generate(&def(), 50, 40, &mut rng);
        for (i, a) in map.rooms.iter().enumerate() {
            for b in &map.rooms[i + 1..] {
                assert!(!a.bounds.intersects_with_gap(&b.bounds, 0));
            }
        }
    }

    #[test]
    fn test_single_region_by_construction() {
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate(&def(), 50, 40, &mut rng);
            assert_eq!(walkable_regions(&map).len(), 1, "seed {seed} disconnected");
        }
    }

    #[test]
    fn test_last_room_tagged_end() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let map = generate(&def(), 50, 40, &mut rng);
        assert_eq!(map.rooms.last().unwrap().tag, Some(RoomTag::End));
        assert!(map.rooms[..map.rooms.len() - 1]
            .iter()
            .all(|r| r.tag.is_none()));
    }

    #[test]
    fn test_doors_sit_on_room_perimeters() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let map = generate(&def(), 50, 40, &mut rng);
        let rects: Vec<Rect> = map.rooms.iter().map(|r| r.bounds).collect();
        for (x, y, t) in map.tiles.iter() {
            if t.kind == TileKind::Door {
                assert!(on_room_perimeter(&rects, x, y));
            }
        }
    }
}
