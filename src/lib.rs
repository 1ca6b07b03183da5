#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Pixel Terrain
//!
//! A chunked, destructible 2D terrain core. The crate procedurally
//! generates a bounded pixel world from a seed, stores it as block ids
//! partitioned into fixed-size chunks, answers point queries against it,
//! destroys pixels on demand and keeps a renderable color buffer per
//! chunk.
//!
//! ## Key Modules
//!
//! * `core` - the fork-join worker pool behind per-chunk generation
//! * `terrain` - blocks, the generation kernel, chunks and the world
//! * `rendering` - the sprite backend seam towards the host's renderer
//!
//! ## Architecture
//!
//! The world owns everything: the chunk grid, the worker pool, the sprite
//! backend and the recolor queue. Hosts construct one world per session
//! and talk to it through a deliberately narrow surface: `query` for
//! collision checks, `dig` for destruction (reporting whether a reward
//! block came out), `terrain_height` for surface-anchored placement, and
//! the extent constants for coordinate reasoning.
//!
//! ## Usage
//!
//! ```no_run
//! use pixel_terrain::{BlockPalette, HeadlessSprites, World, WorldConfig};
//!
//! let config = WorldConfig::with_seed(World::random_seed());
//! let mut world = World::start(
//!     config,
//!     BlockPalette::builtin(),
//!     Box::new(HeadlessSprites::new()),
//! );
//!
//! // In the per-tick simulation step:
//! if world.dig(12.5, 9.75) {
//!     // a gold pixel came out
//! }
//! world.tick();
//! ```
//!
//! ## Concurrency Model
//!
//! Generation and recoloring are synchronous calls that parallelize
//! internally: each chunk's pixel math is scattered over the worker pool
//! in row bands and joined before the call returns. All queries and digs
//! are expected to come from a single logical simulation thread, so no
//! lock guards any chunk data.

pub mod core;
pub mod rendering;
pub mod terrain;

pub use rendering::{HeadlessSprites, SpriteBackend, SpriteCounters, SpriteHandle};
pub use terrain::block::{
    BlockDescriptor, BlockId, BlockKind, BlockPalette, BlockType, PaletteError, Rgba8,
};
pub use terrain::chunk::{Chunk, ChunkState, CHUNK_SIZE};
pub use terrain::generation::TerrainKernel;
pub use terrain::world::{World, WorldConfig};
pub use terrain::{
    CHUNK_WORLD_SIZE, PIXELS_PER_UNIT, WORLD_HEIGHT_CHUNKS, WORLD_HEIGHT_PIXELS,
    WORLD_HEIGHT_UNITS, WORLD_WIDTH_CHUNKS, WORLD_WIDTH_PIXELS, WORLD_WIDTH_UNITS,
};
