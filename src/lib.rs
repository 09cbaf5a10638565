//! Procedural world generation core for a tile-based roguelike.
//!
//! Everything derives from a single master seed: noise-driven overworld
//! terrain streamed in fixed-size chunks, biome classification, and
//! multi-floor dungeons produced by a registry of layout algorithms with a
//! post-generation feature/hazard pass. Generation is pure in (seeds,
//! coordinates), so any evicted map can be regenerated bit-for-bit.

pub mod ascii;
pub mod biomes;
pub mod chunks;
pub mod definitions;
pub mod dungeon;
pub mod features;
pub mod noise_field;
pub mod seeds;
pub mod tilemap;
pub mod tiles;
