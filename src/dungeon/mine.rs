//! Mining tunnel lattice
//!
//! Evenly spaced horizontal and vertical tunnels with shafts at some
//! intersections, support beams along tunnel edges, ore-vein clusters in the
//! surrounding rock, and a few collapsed sections. Rubble is walkable, so
//! collapses never disconnect the lattice.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::DungeonDefinition;
use crate::tilemap::{MapModel, Rect, Room};
use crate::tiles::{ResourceKind, TileKind};

pub fn generate(
    def: &DungeonDefinition,
    width: usize,
    height: usize,
    rng: &mut ChaCha8Rng,
) -> MapModel {
    let spacing = def.param_usize("tunnel_spacing", 8).max(4);
    let tunnel_width = def.param_usize("tunnel_width", 2).clamp(1, 4);
    let shaft_chance = def.param("shaft_chance", 0.15);
    let beam_chance = def.param("beam_chance", 0.2);
    let ore_clusters = def.param_usize("ore_clusters", 8);
    let collapse_count = def.param_usize("collapse_count", 3);

    let mut map = MapModel::filled(String::new(), width, height, TileKind::Wall);

    // Lattice lines, kept off the border
    let xs: Vec<usize> = (1..).map(|i| i * spacing).take_while(|&x| x + tunnel_width < width - 1).collect();
    let ys: Vec<usize> = (1..).map(|i| i * spacing).take_while(|&y| y + tunnel_width < height - 1).collect();

    for &y in &ys {
        map.carve_rect(Rect::new(1, y, width - 2, tunnel_width), TileKind::Floor);
    }
    for &x in &xs {
        map.carve_rect(Rect::new(x, 1, tunnel_width, height - 2), TileKind::Floor);
    }

    // Shafts at lattice intersections; the intersection squares double as
    // the floor's rooms so feature rules have somewhere to land.
    for &y in &ys {
        for &x in &xs {
            let bounds = Rect::new(x, y, tunnel_width, tunnel_width);
            map.rooms.push(Room::rect(bounds));
            if rng.gen_bool(shaft_chance.clamp(0.0, 1.0)) {
                let (cx, cy) = bounds.center();
                map.set_kind(cx, cy, TileKind::Shaft);
            }
        }
    }

    place_support_beams(&mut map, &xs, &ys, tunnel_width, beam_chance, rng);
    scatter_ore(&mut map, ore_clusters, rng);
    collapse_sections(&mut map, &xs, &ys, tunnel_width, collapse_count, rng);

    map
}

/// Decorative beams along tunnel edges. Beams only replace floor in tunnels
/// at least two tiles wide, so they never pinch a passage shut.
fn place_support_beams(
    map: &mut MapModel,
    xs: &[usize],
    ys: &[usize],
    tunnel_width: usize,
    beam_chance: f64,
    rng: &mut ChaCha8Rng,
) {
    if tunnel_width < 2 {
        return;
    }
    let chance = beam_chance.clamp(0.0, 1.0);
    let width = map.width();
    let height = map.height();

    // Beams go on edge cells only (floor with rock on one side), which
    // keeps intersections and the far tunnel row clear.
    for &y in ys {
        for x in (2..width - 2).step_by(3) {
            if rng.gen_bool(chance) && is_tunnel_edge(map, x, y) {
                map.set_kind(x, y, TileKind::SupportBeam);
            }
        }
    }
    for &x in xs {
        for y in (2..height - 2).step_by(3) {
            if rng.gen_bool(chance) && is_tunnel_edge(map, x, y) {
                map.set_kind(x, y, TileKind::SupportBeam);
            }
        }
    }
}

fn is_tunnel_edge(map: &MapModel, x: usize, y: usize) -> bool {
    map.kind(x, y) == TileKind::Floor
        && map
            .tiles
            .neighbors(x, y)
            .iter()
            .any(|&(nx, ny)| map.kind(nx, ny) == TileKind::Wall)
}

/// Random-walk ore clusters through wall rock.
fn scatter_ore(map: &mut MapModel, clusters: usize, rng: &mut ChaCha8Rng) {
    let (w, h) = (map.width(), map.height());
    for _ in 0..clusters {
        let mut x = rng.gen_range(1..w - 1);
        let mut y = rng.gen_range(1..h - 1);
        let size = rng.gen_range(3..=6);
        let rich = rng.gen_bool(0.3);
        let resource = if rich {
            ResourceKind::CopperOre
        } else {
            ResourceKind::IronOre
        };

        for _ in 0..size {
            if map.kind(x, y) == TileKind::Wall {
                map.tiles
                    .set(x, y, crate::tiles::TileRecord::with_resource(TileKind::OreVein, resource));
            }
            let (dx, dy): (i32, i32) = match rng.gen_range(0..4) {
                0 => (1, 0),
                1 => (-1, 0),
                2 => (0, 1),
                _ => (0, -1),
            };
            x = (x as i32 + dx).clamp(1, w as i32 - 2) as usize;
            y = (y as i32 + dy).clamp(1, h as i32 - 2) as usize;
        }
    }
}

/// Turn a few short tunnel sections into rubble. Rubble stays walkable, so
/// the lattice remains connected.
fn collapse_sections(
    map: &mut MapModel,
    xs: &[usize],
    ys: &[usize],
    tunnel_width: usize,
    count: usize,
    rng: &mut ChaCha8Rng,
) {
    for _ in 0..count {
        let horizontal = rng.gen_bool(0.5);
        let len = rng.gen_range(2..=4);
        if horizontal {
            let Some(&y) = pick(ys, rng) else { continue };
            let x0 = rng.gen_range(1..map.width().saturating_sub(len + 1).max(2));
            for x in x0..x0 + len {
                for oy in 0..tunnel_width {
                    if map.kind(x, y + oy) == TileKind::Floor {
                        map.set_kind(x, y + oy, TileKind::Rubble);
                    }
                }
            }
        } else {
            let Some(&x) = pick(xs, rng) else { continue };
            let y0 = rng.gen_range(1..map.height().saturating_sub(len + 1).max(2));
            for y in y0..y0 + len {
                for ox in 0..tunnel_width {
                    if map.kind(x + ox, y) == TileKind::Floor {
                        map.set_kind(x + ox, y, TileKind::Rubble);
                    }
                }
            }
        }
    }
}

fn pick<'a, T>(slice: &'a [T], rng: &mut ChaCha8Rng) -> Option<&'a T> {
    if slice.is_empty() {
        None
    } else {
        Some(&slice[rng.gen_range(0..slice.len())])
    }
}
