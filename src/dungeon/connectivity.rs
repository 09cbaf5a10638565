//! Flood-fill connectivity checking and repair
//!
//! Every generated floor must end with a single walkable region reachable
//! from the entry. Algorithms that can fragment the floor (caves, collapsed
//! tunnels, mirrored quadrants) rely on this pass to carve minimal
//! connectors; when the connector budget runs out, the leftover regions are
//! recorded in `MapModel::excluded` and dropped from feature placement.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::tilemap::MapModel;
use crate::tiles::TileKind;

/// Connector carvings attempted before giving up on full connectivity.
pub const CONNECTOR_ATTEMPTS: u32 = 8;

/// All 4-connected walkable regions, largest first.
pub fn walkable_regions(map: &MapModel) -> Vec<Vec<(usize, usize)>> {
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut regions = Vec::new();

    for (x, y, tile) in map.tiles.iter() {
        if !tile.walkable || seen.contains(&(x, y)) {
            continue;
        }
        let mut region = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back((x, y));
        seen.insert((x, y));
        while let Some((cx, cy)) = queue.pop_front() {
            region.push((cx, cy));
            for (nx, ny) in map.tiles.neighbors(cx, cy) {
                if map.is_walkable(nx, ny) && seen.insert((nx, ny)) {
                    queue.push_back((nx, ny));
                }
            }
        }
        regions.push(region);
    }

    regions.sort_by_key(|r| std::cmp::Reverse(r.len()));
    regions
}

/// BFS distance from `start` to every reachable walkable tile.
pub fn bfs_distances(map: &MapModel, start: (usize, usize)) -> HashMap<(usize, usize), u32> {
    let mut dist = HashMap::new();
    if !map.is_walkable(start.0, start.1) {
        return dist;
    }
    let mut queue = VecDeque::new();
    dist.insert(start, 0);
    queue.push_back(start);
    while let Some((cx, cy)) = queue.pop_front() {
        let d = dist[&(cx, cy)];
        for (nx, ny) in map.tiles.neighbors(cx, cy) {
            if map.is_walkable(nx, ny) && !dist.contains_key(&(nx, ny)) {
                dist.insert((nx, ny), d + 1);
                queue.push_back((nx, ny));
            }
        }
    }
    dist
}

/// Walkable tiles reachable from `start` while treating `blocked` as a wall.
///
/// Used to vet blocking feature placements.
pub fn reachable_without(
    map: &MapModel,
    start: (usize, usize),
    blocked: (usize, usize),
) -> HashSet<(usize, usize)> {
    let mut seen = HashSet::new();
    if start == blocked || !map.is_walkable(start.0, start.1) {
        return seen;
    }
    let mut queue = VecDeque::new();
    seen.insert(start);
    queue.push_back(start);
    while let Some((cx, cy)) = queue.pop_front() {
        for (nx, ny) in map.tiles.neighbors(cx, cy) {
            if (nx, ny) != blocked && map.is_walkable(nx, ny) && seen.insert((nx, ny)) {
                queue.push_back((nx, ny));
            }
        }
    }
    seen
}

/// Merge every walkable region into the entry's region.
///
/// Carves L-shaped floor connectors between the closest cells of the entry
/// region and the largest detached region, up to [`CONNECTOR_ATTEMPTS`]
/// carvings. Regions still detached afterwards go into `map.excluded` and
/// are logged as a generation-quality warning.
pub fn repair(map: &mut MapModel, rng: &mut ChaCha8Rng) {
    map.excluded.clear();

    for _ in 0..CONNECTOR_ATTEMPTS {
        let regions = walkable_regions(map);
        if regions.len() <= 1 {
            return;
        }
        let entry_idx = regions
            .iter()
            .position(|r| r.contains(&map.entry))
            .unwrap_or(0);
        let target_idx = if entry_idx == 0 { 1 } else { 0 };

        let (from, to) = closest_pair(&regions[entry_idx], &regions[target_idx]);
        carve_connector(map, from, to, rng);
    }

    // Budget exhausted: keep the entry's region, exclude the rest.
    let regions = walkable_regions(map);
    if regions.len() > 1 {
        let entry_idx = regions
            .iter()
            .position(|r| r.contains(&map.entry))
            .unwrap_or(0);
        let mut dropped = 0;
        for (i, region) in regions.iter().enumerate() {
            if i != entry_idx {
                dropped += region.len();
                map.excluded.extend(region.iter().copied());
            }
        }
        warn!(
            map = %map.id,
            regions = regions.len() - 1,
            tiles = dropped,
            "connectivity repair exhausted, dropping unreachable regions"
        );
    }
}

/// Closest cell pair between two regions, sampled for large regions.
fn closest_pair(a: &[(usize, usize)], b: &[(usize, usize)]) -> ((usize, usize), (usize, usize)) {
    fn sampled(r: &[(usize, usize)]) -> impl Iterator<Item = (usize, usize)> + '_ {
        let step = (r.len() / 64).max(1);
        r.iter().step_by(step).copied()
    }

    let mut best = (a[0], b[0]);
    let mut best_d = usize::MAX;
    for pa in sampled(a) {
        for pb in sampled(b) {
            let d = pa.0.abs_diff(pb.0) + pa.1.abs_diff(pb.1);
            if d < best_d {
                best_d = d;
                best = (pa, pb);
            }
        }
    }
    best
}

/// Carve an L-shaped floor connector, leg order randomized.
fn carve_connector(
    map: &mut MapModel,
    from: (usize, usize),
    to: (usize, usize),
    rng: &mut ChaCha8Rng,
) {
    let corner = if rng.gen_bool(0.5) {
        (to.0, from.1)
    } else {
        (from.0, to.1)
    };
    carve_line(map, from, corner);
    carve_line(map, corner, to);
}

/// Carve a straight horizontal or vertical floor line, border excluded.
fn carve_line(map: &mut MapModel, from: (usize, usize), to: (usize, usize)) {
    let (w, h) = (map.width(), map.height());
    let xs = from.0.min(to.0)..=from.0.max(to.0);
    for x in xs {
        let y = from.1;
        if x >= 1 && x < w - 1 && y >= 1 && y < h - 1 && !map.is_walkable(x, y) {
            map.set_kind(x, y, TileKind::Floor);
        }
    }
    let ys = from.1.min(to.1)..=from.1.max(to.1);
    for y in ys {
        let x = to.0;
        if x >= 1 && x < w - 1 && y >= 1 && y < h - 1 && !map.is_walkable(x, y) {
            map.set_kind(x, y, TileKind::Floor);
        }
    }
}
