//! Tile grid containers
//!
//! [`Tilemap`] is the generic 2D grid used everywhere; [`MapModel`] wraps a
//! grid of [`TileRecord`]s with the metadata a generated space carries
//! (rooms, entry/exit, placed features). Overworld chunks and dungeon floors
//! both build on these.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::tiles::{TileKind, TileRecord};

/// A 2D grid with bounds-checked access. Row-major storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// 4-connected neighbors, clipped at the edges.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);
        for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if self.in_bounds(nx, ny) {
                result.push((nx as usize, ny as usize));
            }
        }
        result
    }

    /// 8-connected neighbors, clipped at the edges.
    pub fn neighbors_8(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(8);
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if self.in_bounds(nx, ny) {
                    result.push((nx as usize, ny as usize));
                }
            }
        }
        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Raw row-major slice, for snapshot export.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Rebuild from a row-major buffer. Returns `None` on a size mismatch.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }
}

/// Axis-aligned rectangle in tile coordinates (inclusive of x..x+w-1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> (usize, usize) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    /// True if the rectangles overlap when each is grown by `gap` tiles.
    pub fn intersects_with_gap(&self, other: &Rect, gap: usize) -> bool {
        self.x < other.x + other.w + gap
            && other.x < self.x + self.w + gap
            && self.y < other.y + other.h + gap
            && other.y < self.y + self.h + gap
    }
}

/// Purpose tag attached to some generated rooms.
///
/// Consumed by feature placement (rules filter on tags) and by stair
/// placement ("end" rooms host the exit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomTag {
    /// Room chosen to hold the floor exit
    End,
    /// Open-air style courtyard band
    Courtyard,
    Armory,
    Barracks,
    /// Central chamber of a temple
    Sanctum,
    /// Angular wedge of a tower floor
    Wedge,
    /// Innermost keep of a fortress
    Keep,
}

impl RoomTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomTag::End => "end",
            RoomTag::Courtyard => "courtyard",
            RoomTag::Armory => "armory",
            RoomTag::Barracks => "barracks",
            RoomTag::Sanctum => "sanctum",
            RoomTag::Wedge => "wedge",
            RoomTag::Keep => "keep",
        }
    }
}

/// A room or region produced during generation.
///
/// Most algorithms produce plain rectangles; irregular producers (cellular
/// caves, tower wedges) record an explicit tile list and keep `bounds` as
/// the bounding box.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub bounds: Rect,
    /// Explicit tile membership for irregular regions; `None` means the full
    /// rectangle is the room.
    pub tiles: Option<Vec<(usize, usize)>>,
    pub tag: Option<RoomTag>,
}

impl Room {
    pub fn rect(bounds: Rect) -> Self {
        Self {
            bounds,
            tiles: None,
            tag: None,
        }
    }

    pub fn rect_tagged(bounds: Rect, tag: RoomTag) -> Self {
        Self {
            bounds,
            tiles: None,
            tag: Some(tag),
        }
    }

    pub fn irregular(bounds: Rect, tiles: Vec<(usize, usize)>, tag: Option<RoomTag>) -> Self {
        Self {
            bounds,
            tiles: Some(tiles),
            tag,
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        match &self.tiles {
            Some(tiles) => tiles.contains(&(x, y)),
            None => self.bounds.contains(x, y),
        }
    }
}

/// An interactive feature placed by the feature pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedFeature {
    /// Opaque feature id, resolved by the entity spawner
    pub id: String,
    pub x: usize,
    pub y: usize,
    pub blocking: bool,
}

/// A hazard tile marked by the feature pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedHazard {
    /// Opaque hazard id, resolved by collaborators
    pub id: String,
    pub x: usize,
    pub y: usize,
}

/// A fully generated space: tile grid plus generation metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapModel {
    /// Identifier, e.g. `"burial_barrow:3"` or `"chunk:2,-5"`
    pub id: String,
    pub tiles: Tilemap<TileRecord>,
    /// Rooms recorded by the generator, in creation order
    pub rooms: Vec<Room>,
    /// Entry point (stairs up / dungeon entrance)
    pub entry: (usize, usize),
    /// Exit point (stairs down, or up for tower-style dungeons)
    pub exit: (usize, usize),
    /// Floor number within the dungeon, 0 for overworld chunks
    pub floor: u32,
    /// Dungeon type id, `None` for overworld chunks
    pub dungeon_id: Option<String>,
    /// Features placed by the post-generation pass
    pub features: Vec<PlacedFeature>,
    /// Hazards placed by the post-generation pass
    pub hazards: Vec<PlacedHazard>,
    /// Walkable tiles that connectivity repair could not reach from the
    /// entry; excluded from feature/enemy placement
    pub excluded: HashSet<(usize, usize)>,
}

impl MapModel {
    /// Create a model filled with the given tile kind.
    pub fn filled(id: String, width: usize, height: usize, kind: TileKind) -> Self {
        Self {
            id,
            tiles: Tilemap::new_with(width, height, TileRecord::new(kind)),
            rooms: Vec::new(),
            entry: (0, 0),
            exit: (0, 0),
            floor: 0,
            dungeon_id: None,
            features: Vec::new(),
            hazards: Vec::new(),
            excluded: HashSet::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.tiles.width
    }

    pub fn height(&self) -> usize {
        self.tiles.height
    }

    /// Set a tile, rebuilding its derived flags from the kind.
    pub fn set_kind(&mut self, x: usize, y: usize, kind: TileKind) {
        self.tiles.set(x, y, TileRecord::new(kind));
    }

    pub fn kind(&self, x: usize, y: usize) -> TileKind {
        self.tiles.get(x, y).kind
    }

    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        self.tiles.get(x, y).walkable
    }

    /// Carve a rectangle to the given kind, clipped to the map interior
    /// (the outer border is never touched).
    pub fn carve_rect(&mut self, rect: Rect, kind: TileKind) {
        let x1 = rect.x.max(1);
        let y1 = rect.y.max(1);
        let x2 = (rect.x + rect.w).min(self.width().saturating_sub(1));
        let y2 = (rect.y + rect.h).min(self.height().saturating_sub(1));
        for y in y1..y2 {
            for x in x1..x2 {
                self.set_kind(x, y, kind);
            }
        }
    }

    /// Force the outer border to walls.
    pub fn seal_border(&mut self, kind: TileKind) {
        let (w, h) = (self.width(), self.height());
        for x in 0..w {
            self.set_kind(x, 0, kind);
            self.set_kind(x, h - 1, kind);
        }
        for y in 0..h {
            self.set_kind(0, y, kind);
            self.set_kind(w - 1, y, kind);
        }
    }

    /// Count walkable tiles (includes excluded regions).
    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|(_, _, t)| t.walkable).count()
    }

    /// Whether a tile already holds a feature.
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.features.iter().any(|f| f.x == x && f.y == y)
    }
}
