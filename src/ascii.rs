//! ASCII rendering of generated maps
//!
//! Debug/preview output for the CLI: one glyph per tile, with placed
//! features overlaid. Real rendering lives in the game client; this module
//! exists so a generated floor can be eyeballed in a terminal.

use crate::chunks::ChunkStreamer;
use crate::tilemap::MapModel;

/// Render a dungeon floor or any other map model as one string, rows
/// separated by newlines. Blocking features render as `!`, others as `?`.
pub fn render_map(map: &MapModel) -> String {
    let (w, h) = (map.width(), map.height());
    let mut out = String::with_capacity((w + 1) * h);
    for y in 0..h {
        for x in 0..w {
            let glyph = map
                .features
                .iter()
                .find(|f| f.x == x && f.y == y)
                .map(|f| if f.blocking { '!' } else { '?' })
                .unwrap_or_else(|| map.kind(x, y).glyph());
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Render a window of the overworld centered on a world position.
///
/// Out-of-bounds tiles render as spaces.
pub fn render_overworld(
    streamer: &mut ChunkStreamer,
    center_wx: i64,
    center_wy: i64,
    width: usize,
    height: usize,
) -> String {
    let mut out = String::with_capacity((width + 1) * height);
    let x0 = center_wx - width as i64 / 2;
    let y0 = center_wy - height as i64 / 2;
    for row in 0..height as i64 {
        for col in 0..width as i64 {
            let glyph = streamer
                .get_tile(x0 + col, y0 + row)
                .map(|t| t.kind.glyph())
                .unwrap_or(' ');
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::BiomeTable;
    use crate::chunks::StreamerConfig;
    use crate::seeds::WorldSeeds;
    use crate::tilemap::{PlacedFeature, Rect};
    use crate::tiles::TileKind;

    #[test]
    fn test_render_dimensions_and_glyphs() {
        let mut map = MapModel::filled("t".into(), 8, 4, TileKind::Wall);
        map.carve_rect(Rect::new(1, 1, 6, 2), TileKind::Floor);
        let rendered = render_map(&map);

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.chars().count() == 8));
        assert_eq!(lines[0], "########");
        assert_eq!(lines[1], "#......#");
    }

    #[test]
    fn test_features_overlay_tiles() {
        let mut map = MapModel::filled("t".into(), 5, 3, TileKind::Floor);
        map.features.push(PlacedFeature {
            id: "chest".into(),
            x: 2,
            y: 1,
            blocking: false,
        });
        let lines: Vec<String> = render_map(&map).lines().map(str::to_string).collect();
        assert_eq!(lines[1].chars().nth(2), Some('?'));
    }

    #[test]
    fn test_overworld_window_size() {
        let mut streamer = ChunkStreamer::new(
            WorldSeeds::from_master(7),
            BiomeTable::default_table(),
            StreamerConfig::default(),
        );
        let rendered = render_overworld(&mut streamer, 0, 0, 20, 10);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.chars().count() == 20));
    }
}
