//! # World Module
//!
//! This module provides the `World` struct which owns the chunk grid and is
//! its sole mutator. It serves as the central coordinator for generation,
//! coordinate translation, point queries, digging and the throttled
//! re-render queue.
//!
//! ## Coordinate Spaces
//!
//! Three spaces are in play:
//! * **world units** - continuous `f32` positions the host simulates in
//! * **pixels** - the discrete grid, `PIXELS_PER_UNIT` pixels per unit
//! * **chunk grid** - chunk indices, `CHUNK_WORLD_SIZE` units per chunk
//!
//! All translation lives in `world_to_chunk`; every failure mode of that
//! translation (out of bounds, float rounding landing just outside an
//! index range) collapses to the same answer the callers already handle:
//! the null block for queries, a refused no-op for digs. Nothing in the
//! query/dig path can fail a frame.

use std::collections::VecDeque;
use std::sync::Arc;

use cgmath::Point2;
use log::{debug, info, warn};

use crate::core::WorkerPool;
use crate::rendering::SpriteBackend;
use crate::terrain::block::{BlockDescriptor, BlockKind, BlockPalette, BlockType};
use crate::terrain::chunk::{Chunk, CHUNK_SIZE};
use crate::terrain::generation::TerrainKernel;
use crate::terrain::{
    CHUNK_WORLD_SIZE, PIXELS_PER_UNIT, WORLD_HEIGHT_CHUNKS, WORLD_WIDTH_CHUNKS,
};

/// Start-up parameters of a world.
///
/// The defaults are the fixed session dimensions; tests and tools shrink
/// them to keep generation cheap.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Horizontal extent of the chunk grid.
    pub width_chunks: usize,
    /// Vertical extent of the chunk grid.
    pub height_chunks: usize,
    /// Session seed; fixed for the lifetime of the world.
    pub seed: i32,
    /// Worker thread count for the generation pool, or `None` to use the
    /// machine's available parallelism.
    pub workers: Option<usize>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width_chunks: WORLD_WIDTH_CHUNKS,
            height_chunks: WORLD_HEIGHT_CHUNKS,
            seed: 0,
            workers: None,
        }
    }
}

impl WorldConfig {
    /// The default dimensions with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        WorldConfig {
            seed,
            ..WorldConfig::default()
        }
    }
}

/// The bounded, destructible pixel world.
///
/// Exactly one world is expected to be live per session. The host
/// constructs it with [`World::start`], owns it for the session and drops
/// it at session end; chunk buffers and sprite surfaces are released with
/// it.
pub struct World {
    config: WorldConfig,
    palette: Arc<BlockPalette>,
    kernel: TerrainKernel,
    /// Chunk grid, `width_chunks x height_chunks`, x-major.
    chunks: Vec<Chunk>,
    /// Chunks awaiting a recolor, oldest first, one pending entry each.
    update_queue: VecDeque<Point2<usize>>,
    pool: WorkerPool,
    backend: Box<dyn SpriteBackend>,
    surface_anchor: Point2<f32>,
}

impl World {
    /// Generates a world and renders every non-air chunk.
    ///
    /// Chunks are created in a fixed x-outer, y-inner order so a seed
    /// always reproduces the same world. Each chunk generates internally
    /// parallel but chunks are taken one at a time, which bounds peak
    /// memory to a single chunk's transient buffers.
    ///
    /// # Arguments
    /// * `config` - Grid dimensions, seed and worker count
    /// * `palette` - A validated material table
    /// * `backend` - Receives one sprite per non-air chunk
    pub fn start(config: WorldConfig, palette: BlockPalette, mut backend: Box<dyn SpriteBackend>) -> World {
        info!("Seed: {}", config.seed);

        let palette = Arc::new(palette);
        let height_pixels = (config.height_chunks * CHUNK_SIZE) as i32;
        let kernel = TerrainKernel::new(config.seed, height_pixels);
        let mut pool = match config.workers {
            Some(workers) => WorkerPool::new(workers),
            None => WorkerPool::with_available_parallelism(),
        };

        let mut chunks = Vec::with_capacity(config.width_chunks * config.height_chunks);
        for cx in 0..config.width_chunks {
            for cy in 0..config.height_chunks {
                chunks.push(Chunk::generate(
                    Point2::new(cx as i32, cy as i32),
                    &kernel,
                    &palette,
                    &mut pool,
                    backend.as_mut(),
                ));
            }
        }
        info!("Generated {} chunks", chunks.len());

        // Anchor for the surface building at world-center x.
        let center_x = config.width_chunks as f32 * CHUNK_WORLD_SIZE / 2.0;
        let anchor_y =
            kernel.surface_height((center_x * PIXELS_PER_UNIT) as f64) as f32 / PIXELS_PER_UNIT;

        World {
            config,
            palette,
            kernel,
            chunks,
            update_queue: VecDeque::new(),
            pool,
            backend,
            surface_anchor: Point2::new(center_x, anchor_y),
        }
    }

    /// A session seed in the range the original game rolled at start-up.
    pub fn random_seed() -> i32 {
        fastrand::i32(0..10_000) * 10
    }

    /// Looks up the block at a world position.
    ///
    /// Out-of-world positions (and the rare float rounding that derives an
    /// index just outside a chunk) return the null descriptor, which
    /// callers treat as blocked. This keeps collision checks at the world
    /// edges free of special cases.
    pub fn query(&self, x: f32, y: f32) -> BlockDescriptor {
        match self.block_at(x, y) {
            Some(block) => BlockDescriptor::of(block),
            None => BlockDescriptor::NULL,
        }
    }

    /// The full palette entry at a world position, if it is inside the
    /// world.
    pub fn block_at(&self, x: f32, y: f32) -> Option<&BlockType> {
        let (cx, cy, lx, ly) = self.world_to_chunk(x, y)?;
        let id = self.chunks[self.chunk_index(cx, cy)].get(lx, ly);
        Some(self.palette.lookup(id))
    }

    /// Destroys the pixel at a world position.
    ///
    /// On success the owning chunk is marked for a recolor; the queue holds
    /// at most one pending entry per chunk no matter how many pixels were
    /// dug in it this tick.
    ///
    /// # Returns
    /// `true` iff the removed pixel was a reward block (gold). Out-of-world
    /// digs mutate nothing and return `false`.
    pub fn dig(&mut self, x: f32, y: f32) -> bool {
        let Some((cx, cy, lx, ly)) = self.world_to_chunk(x, y) else {
            debug!("Dig out of world at ({x}, {y})");
            return false;
        };

        let index = self.chunk_index(cx, cy);
        let old = self.chunks[index].dig(lx, ly, &self.palette);

        let pending = Point2::new(cx, cy);
        if !self.update_queue.contains(&pending) {
            self.update_queue.push_back(pending);
        }

        old == BlockKind::Gold.id()
    }

    /// Advances the re-render queue by at most one chunk.
    ///
    /// Called once per simulation tick; recoloring is amortized across
    /// frames so a burst of digs never stalls a single tick.
    pub fn tick(&mut self) {
        let Some(pending) = self.update_queue.pop_front() else {
            return;
        };
        debug!("Recoloring chunk ({}, {})", pending.x, pending.y);
        let index = self.chunk_index(pending.x, pending.y);
        let chunk = &mut self.chunks[index];
        chunk.update_render(&self.kernel, &self.palette, &mut self.pool, self.backend.as_mut());
    }

    /// The walkable surface height above `x`, in world units.
    ///
    /// Recomputes the column profiles directly from the kernel, so it works
    /// for any `x` without touching chunk data.
    pub fn terrain_height(&self, x: f32) -> f32 {
        self.kernel.surface_height((x * PIXELS_PER_UNIT) as f64) as f32 / PIXELS_PER_UNIT
    }

    /// Where the surface building was anchored at start-up.
    pub fn surface_anchor(&self) -> Point2<f32> {
        self.surface_anchor
    }

    /// The top-center position actors drop in from.
    pub fn spawn_position(&self) -> Point2<f32> {
        Point2::new(self.width_units() / 2.0 - 1.0, self.height_units() - 1.0)
    }

    /// A randomized spawn at the left or right world edge.
    ///
    /// # Returns
    /// The spawn position and the direction sign (+1 when spawning at the
    /// left edge walking right, -1 for the opposite).
    pub fn edge_spawn_position(&self) -> (Point2<f32>, f32) {
        let direction = if fastrand::bool() { 1.0f32 } else { -1.0f32 };
        let x = if direction > 0.0 {
            0.0
        } else {
            self.width_units() - 1.0
        };
        (Point2::new(x, self.height_units() - 1.0), direction)
    }

    /// Translates a world position into chunk and local pixel indices.
    ///
    /// # Returns
    /// `(cx, cy, lx, ly)`, or `None` when the position is outside the world
    /// or an index derivation lands outside its range.
    fn world_to_chunk(&self, x: f32, y: f32) -> Option<(usize, usize, usize, usize)> {
        if x < 0.0 || y < 0.0 || x >= self.width_units() || y >= self.height_units() {
            return None;
        }

        let cx = (x / CHUNK_WORLD_SIZE) as usize;
        let cy = (y / CHUNK_WORLD_SIZE) as usize;
        if cx >= self.config.width_chunks || cy >= self.config.height_chunks {
            warn!("Chunk index ({cx}, {cy}) out of grid for position ({x}, {y})");
            return None;
        }

        let gx = (x * PIXELS_PER_UNIT) as i64;
        let gy = (y * PIXELS_PER_UNIT) as i64;
        let lx = gx - (cx * CHUNK_SIZE) as i64;
        let ly = gy - (cy * CHUNK_SIZE) as i64;
        if !(0..CHUNK_SIZE as i64).contains(&lx) || !(0..CHUNK_SIZE as i64).contains(&ly) {
            warn!("Local index ({lx}, {ly}) out of chunk for position ({x}, {y})");
            return None;
        }

        Some((cx, cy, lx as usize, ly as usize))
    }

    #[inline]
    fn chunk_index(&self, cx: usize, cy: usize) -> usize {
        cx * self.config.height_chunks + cy
    }

    /// Borrows the chunk at the given chunk-grid coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the grid.
    pub fn chunk_at(&self, cx: usize, cy: usize) -> &Chunk {
        &self.chunks[self.chunk_index(cx, cy)]
    }

    /// The session seed.
    pub fn seed(&self) -> i32 {
        self.config.seed
    }

    /// The material table.
    pub fn palette(&self) -> &BlockPalette {
        &self.palette
    }

    /// Number of chunks awaiting a recolor.
    pub fn pending_updates(&self) -> usize {
        self.update_queue.len()
    }

    /// Horizontal chunk count.
    pub fn width_chunks(&self) -> usize {
        self.config.width_chunks
    }

    /// Vertical chunk count.
    pub fn height_chunks(&self) -> usize {
        self.config.height_chunks
    }

    /// Horizontal extent in pixels.
    pub fn width_pixels(&self) -> usize {
        self.config.width_chunks * CHUNK_SIZE
    }

    /// Vertical extent in pixels.
    pub fn height_pixels(&self) -> usize {
        self.config.height_chunks * CHUNK_SIZE
    }

    /// Horizontal extent in world units.
    pub fn width_units(&self) -> f32 {
        self.config.width_chunks as f32 * CHUNK_WORLD_SIZE
    }

    /// Vertical extent in world units.
    pub fn height_units(&self) -> f32 {
        self.config.height_chunks as f32 * CHUNK_WORLD_SIZE
    }

    /// Digs at a chunk-grid plus local-pixel address, for callers that
    /// already hold pixel coordinates.
    #[cfg(test)]
    fn dig_local(&mut self, cx: usize, cy: usize, lx: usize, ly: usize) -> bool {
        let x = (cx * CHUNK_SIZE + lx) as f32 / PIXELS_PER_UNIT;
        let y = (cy * CHUNK_SIZE + ly) as f32 / PIXELS_PER_UNIT;
        self.dig(x, y)
    }
}

impl Drop for World {
    fn drop(&mut self) {
        info!("World torn down, releasing {} chunks", self.chunks.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::HeadlessSprites;
    use crate::terrain::block::BlockId;
    use crate::terrain::chunk::ChunkState;

    fn small_world(seed: i32) -> World {
        World::start(
            WorldConfig {
                width_chunks: 3,
                height_chunks: 2,
                seed,
                workers: Some(2),
            },
            BlockPalette::builtin(),
            Box::new(HeadlessSprites::new()),
        )
    }

    /// Plants an id into a chunk and returns the world position of the
    /// planted pixel.
    fn plant(world: &mut World, cx: usize, cy: usize, lx: usize, ly: usize, id: BlockId) -> (f32, f32) {
        let index = world.chunk_index(cx, cy);
        world.chunks[index].plant_id(lx, ly, id);
        (
            (cx * CHUNK_SIZE + lx) as f32 / PIXELS_PER_UNIT,
            (cy * CHUNK_SIZE + ly) as f32 / PIXELS_PER_UNIT,
        )
    }

    #[test]
    fn gold_is_the_only_rewarding_dig() {
        let mut world = small_world(4242);

        let (gx, gy) = plant(&mut world, 1, 0, 5, 5, BlockKind::Gold.id());
        assert!(world.dig(gx, gy), "digging gold must reward");
        assert_eq!(
            world.chunk_at(1, 0).get(5, 5),
            BlockKind::Dirt.id(),
            "gold is hard and degrades to dirt"
        );

        let (rx, ry) = plant(&mut world, 1, 0, 6, 5, BlockKind::Rock.id());
        assert!(!world.dig(rx, ry), "rock is not a reward");
        assert_eq!(world.chunk_at(1, 0).get(6, 5), BlockKind::Dirt.id());

        let (dx, dy) = plant(&mut world, 1, 0, 7, 5, BlockKind::Dirt.id());
        assert!(!world.dig(dx, dy));
        assert_eq!(world.chunk_at(1, 0).get(7, 5), BlockKind::Air.id());
    }

    #[test]
    fn dig_invalidates_the_chunk_state() {
        let mut world = small_world(7);
        world.dig_local(0, 0, 3, 3);
        // The first dig of the session always leaves the chunk Mixed,
        // whatever it was classified as before.
        assert_eq!(world.chunk_at(0, 0).state(), ChunkState::Mixed);
    }

    #[test]
    fn queue_holds_one_entry_per_chunk() {
        let mut world = small_world(99);
        world.dig_local(0, 0, 1, 1);
        world.dig_local(0, 0, 2, 2);
        world.dig_local(0, 0, 3, 3);
        assert_eq!(world.pending_updates(), 1);

        world.dig_local(1, 0, 1, 1);
        assert_eq!(world.pending_updates(), 2);
    }

    #[test]
    fn anchor_sits_on_the_surface_at_world_center() {
        let world = small_world(55);
        let anchor = world.surface_anchor();
        assert_eq!(anchor.x, world.width_units() / 2.0);
        assert_eq!(anchor.y, world.terrain_height(anchor.x));
    }

    #[test]
    fn spawn_positions_are_inside_the_world_extent() {
        // Wide enough that "one unit in from the edge" stays in bounds.
        let world = World::start(
            WorldConfig {
                width_chunks: 4,
                height_chunks: 2,
                seed: 3,
                workers: Some(2),
            },
            BlockPalette::builtin(),
            Box::new(HeadlessSprites::new()),
        );
        let spawn = world.spawn_position();
        assert!(spawn.x >= 0.0 && spawn.x < world.width_units());
        assert!(spawn.y >= 0.0 && spawn.y < world.height_units());

        let (edge, direction) = world.edge_spawn_position();
        assert!(direction == 1.0 || direction == -1.0);
        assert!(edge.x == 0.0 || edge.x == world.width_units() - 1.0);
    }
}
