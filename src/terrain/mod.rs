//! # Terrain Module
//!
//! The domain root of the engine: block materials and the palette, the
//! procedural generation kernel, chunk storage and the world that owns it
//! all. Everything a host needs to reason about world extents and
//! coordinate conversion is exported from here as constants.

pub mod block;
pub mod chunk;
pub mod generation;
pub mod world;

/// Horizontal extent of the default world, in chunks.
pub const WORLD_WIDTH_CHUNKS: usize = 64;
/// Vertical extent of the default world, in chunks.
pub const WORLD_HEIGHT_CHUNKS: usize = 24;

/// Pixels per world unit; the fixed scale between the continuous space the
/// host simulates in and the discrete pixel grid.
pub const PIXELS_PER_UNIT: f32 = 100.0;

/// Edge length of a chunk in world units.
pub const CHUNK_WORLD_SIZE: f32 = chunk::CHUNK_SIZE as f32 / PIXELS_PER_UNIT;

/// Horizontal extent of the default world, in pixels.
pub const WORLD_WIDTH_PIXELS: usize = WORLD_WIDTH_CHUNKS * chunk::CHUNK_SIZE;
/// Vertical extent of the default world, in pixels.
pub const WORLD_HEIGHT_PIXELS: usize = WORLD_HEIGHT_CHUNKS * chunk::CHUNK_SIZE;

/// Horizontal extent of the default world, in world units.
pub const WORLD_WIDTH_UNITS: f32 = WORLD_WIDTH_CHUNKS as f32 * CHUNK_WORLD_SIZE;
/// Vertical extent of the default world, in world units.
pub const WORLD_HEIGHT_UNITS: f32 = WORLD_HEIGHT_CHUNKS as f32 * CHUNK_WORLD_SIZE;
