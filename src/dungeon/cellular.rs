//! Cellular-automata caves
//!
//! Random wall/floor seeding eroded by a neighbor-counting birth/death rule
//! into organic cave shapes, followed by gentler smoothing passes. The
//! result is usually fragmented; the shared connectivity repair merges the
//! pockets afterwards.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::DungeonDefinition;
use crate::tilemap::{MapModel, Rect, Room};
use crate::tiles::TileKind;

/// Regions smaller than this are not recorded as rooms.
const MIN_ROOM_REGION: usize = 10;

pub fn generate(
    def: &DungeonDefinition,
    width: usize,
    height: usize,
    rng: &mut ChaCha8Rng,
) -> MapModel {
    let fill_probability = def.param("fill_probability", 0.45);
    let birth_limit = def.param("birth_limit", 4.0) as u32;
    let death_limit = def.param("death_limit", 3.0) as u32;
    let iterations = def.param_usize("iterations", 5);
    let smoothing_passes = def.param_usize("smoothing_passes", 2);

    // true = wall; border forced to wall
    let mut walls = vec![true; width * height];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            walls[y * width + x] = rng.gen_bool(fill_probability);
        }
    }

    for _ in 0..iterations {
        walls = step(&walls, width, height, birth_limit, death_limit);
    }
    // Relaxed thresholds: walls need more support, floors flip less readily
    for _ in 0..smoothing_passes {
        walls = step(&walls, width, height, birth_limit + 1, death_limit + 2);
    }

    let mut map = MapModel::filled(String::new(), width, height, TileKind::Wall);
    for y in 0..height {
        for x in 0..width {
            if !walls[y * width + x] {
                map.set_kind(x, y, TileKind::Floor);
            }
        }
    }

    // Degenerate parameters can erode everything back to rock; fall back to
    // a single central chamber instead of failing.
    if map.walkable_count() < (width * height) / 12 {
        let (cx, cy) = (width / 2, height / 2);
        let (rw, rh) = (width / 3, height / 3);
        map.carve_rect(Rect::new(cx - rw / 2, cy - rh / 2, rw, rh), TileKind::Floor);
    }

    record_pocket_rooms(&mut map);
    map
}

/// One automaton step.
///
/// A cell is wall next step when its 8-neighborhood wall count reaches
/// `birth_limit` if already wall, or `death_limit` if currently floor.
/// Off-map neighbors count as wall, which keeps edges closed.
fn step(walls: &[bool], width: usize, height: usize, birth_limit: u32, death_limit: u32) -> Vec<bool> {
    let mut next = vec![true; width * height];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut count = 0;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0
                        || ny < 0
                        || nx >= width as i32
                        || ny >= height as i32
                        || walls[ny as usize * width + nx as usize]
                    {
                        count += 1;
                    }
                }
            }
            let was_wall = walls[y * width + x];
            let limit = if was_wall { birth_limit } else { death_limit };
            next[y * width + x] = count >= limit;
        }
    }
    next
}

/// Record each sizeable cave pocket as an irregular, untagged room.
fn record_pocket_rooms(map: &mut MapModel) {
    let regions = super::connectivity::walkable_regions(map);
    for region in regions {
        if region.len() < MIN_ROOM_REGION {
            continue;
        }
        let min_x = region.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = region.iter().map(|p| p.0).max().unwrap_or(0);
        let min_y = region.iter().map(|p| p.1).min().unwrap_or(0);
        let max_y = region.iter().map(|p| p.1).max().unwrap_or(0);
        let bounds = Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1);
        map.rooms.push(Room::irregular(bounds, region, None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn def() -> DungeonDefinition {
        super::super::builtin_definitions()
            .into_iter()
            .find(|d| d.id == "limestone_caverns")
            .unwrap()
    }

    #[test]
    fn test_border_is_solid() {
        for seed in 0..6 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate(&def(), 50, 50, &mut rng);
            for x in 0..50 {
                assert!(!map.is_walkable(x, 0));
                assert!(!map.is_walkable(x, 49));
            }
            for y in 0..50 {
                assert!(!map.is_walkable(0, y));
                assert!(!map.is_walkable(49, y));
            }
        }
    }

    #[test]
    fn test_produces_usable_floor_area() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = generate(&def(), 50, 50, &mut rng);
        assert!(map.walkable_count() >= 50 * 50 / 12);
    }

    #[test]
    fn test_rooms_are_irregular_regions() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = generate(&def(), 50, 50, &mut rng);
        assert!(!map.rooms.is_empty());
        for room in &map.rooms {
            let tiles = room.tiles.as_ref().expect("cave rooms are irregular");
            assert!(tiles.len() >= MIN_ROOM_REGION);
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = generate(&def(), 50, 50, &mut ChaCha8Rng::seed_from_u64(9));
        let b = generate(&def(), 50, 50, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a.tiles, b.tiles);
    }
}
