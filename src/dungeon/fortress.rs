//! Concentric fortress rings
//!
//! An open field divided by concentric square curtain walls around a
//! central keep. Every wall ring has a gate at each cardinal midpoint, all
//! aligned with the center axes, so the layout is connected by
//! construction. Corners carry battlements and the bands between rings are
//! recorded as courtyard rooms.

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
    let ring_spacing = def.param_usize("ring_spacing", 6).max(4);
    let keep_size = def.param_usize("keep_size", 7).max(5) | 1; // odd, so gates center
    let battlement_chance = def.param("battlement_chance", 0.75);

    let mut map = MapModel::filled(String::new(), width, height, TileKind::Wall);
    map.carve_rect(Rect::new(1, 1, width - 2, height - 2), TileKind::Floor);

    let cx = width / 2;
    let cy = height / 2;
    let keep_half = keep_size / 2;
    let max_half = (width.min(height) / 2).saturating_sub(2);

    // Curtain walls from the keep outwards
    let mut ring_halves = Vec::new();
    let mut half = keep_half;
    while half <= max_half {
        draw_ring(&mut map, cx, cy, half, battlement_chance, rng);
        ring_halves.push(half);
        half += ring_spacing;
    }

    record_rooms(&mut map, cx, cy, keep_half, &ring_halves);
    map
}

/// One square wall ring with gates at the four cardinal midpoints and
/// battlements near the corners.
fn draw_ring(
    map: &mut MapModel,
    cx: usize,
    cy: usize,
    half: usize,
    battlement_chance: f64,
    rng: &mut ChaCha8Rng,
) {
    let (w, h) = (map.width(), map.height());
    let x0 = cx.saturating_sub(half).max(1);
    let x1 = (cx + half).min(w - 2);
    let y0 = cy.saturating_sub(half).max(1);
    let y1 = (cy + half).min(h - 2);

    for x in x0..=x1 {
        map.set_kind(x, y0, TileKind::Wall);
        map.set_kind(x, y1, TileKind::Wall);
    }
    for y in y0..=y1 {
        map.set_kind(x0, y, TileKind::Wall);
        map.set_kind(x1, y, TileKind::Wall);
    }

    // Gates on the center axes; every ring's gates line up
    map.set_kind(cx, y0, TileKind::Gate);
    map.set_kind(cx, y1, TileKind::Gate);
    map.set_kind(x0, cy, TileKind::Gate);
    map.set_kind(x1, cy, TileKind::Gate);

    let chance = battlement_chance.clamp(0.0, 1.0);
    for (bx, by) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
        if rng.gen_bool(chance) {
            map.set_kind(bx, by, TileKind::Battlement);
        }
    }
}

/// The keep interior is a rect room; each band between consecutive rings is
/// an irregular courtyard room.
fn record_rooms(map: &mut MapModel, cx: usize, cy: usize, keep_half: usize, ring_halves: &[usize]) {
    if keep_half >= 1 {
        let keep = Rect::new(
            cx - keep_half + 1,
            cy - keep_half + 1,
            2 * keep_half - 1,
            2 * keep_half - 1,
        );
        map.rooms.push(Room::rect_tagged(keep, RoomTag::Keep));
    }

    for pair in ring_halves.windows(2) {
        let (inner, outer) = (pair[0], pair[1]);
        let mut tiles = Vec::new();
        for (x, y, tile) in map.tiles.iter() {
            if !tile.walkable {
                continue;
            }
            let d = x.abs_diff(cx).max(y.abs_diff(cy));
            if d > inner && d < outer {
                tiles.push((x, y));
            }
        }
        if tiles.is_empty() {
            continue;
        }
        let min_x = tiles.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = tiles.iter().map(|p| p.0).max().unwrap_or(0);
        let min_y = tiles.iter().map(|p| p.1).min().unwrap_or(0);
        let max_y = tiles.iter().map(|p| p.1).max().unwrap_or(0);
        let bounds = Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1);
        map.rooms
            .push(Room::irregular(bounds, tiles, Some(RoomTag::Courtyard)));
    }
}
