//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-size square partition
//! of the world's pixel grid and the unit of generation, storage and
//! re-rendering.
//!
//! ## Storage Strategy
//!
//! A chunk stores one byte per pixel (the block id) plus a cached
//! classification. Fully homogeneous chunks of the three common materials
//! answer point reads straight from the classification without touching
//! the array; everything else is `Mixed` and reads the array. Because most
//! of a freshly generated world is solid rock, deep air or uninterrupted
//! dirt, the fast path covers the bulk of collision queries.
//!
//! ## Render Caching
//!
//! A chunk keeps its color buffer and a sprite handle once it has rendered.
//! Air chunks never render: they are fully transparent, so skipping their
//! surface saves both memory and draw work.

use std::ops::Range;
use std::sync::Arc;

use cgmath::Point2;
use num_derive::FromPrimitive;

use crate::core::{Job, WorkerPool};
use crate::rendering::{SpriteBackend, SpriteHandle};
use crate::terrain::block::{BlockId, BlockKind, BlockPalette, Rgba8};
use crate::terrain::generation::TerrainKernel;
use crate::terrain::CHUNK_WORLD_SIZE;

mod band_jobs;

use band_jobs::{PopulateBand, PopulateBandOutput, RecolorBand, RecolorBandOutput};

/// Edge length of a chunk in pixels.
pub const CHUNK_SIZE: usize = 64;
/// Number of pixels in a chunk.
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Flattens local 2D pixel coordinates into a buffer index.
///
/// Shared by every buffer access in the crate: ids, colors and uploads all
/// agree on `x + CHUNK_SIZE * y` row-major order.
#[inline]
pub const fn flat_index(x: usize, y: usize) -> usize {
    x + CHUNK_SIZE * y
}

/// Cached homogeneity classification of a chunk.
///
/// `Air`, `Rock` and `Dirt` assert the chunk is entirely that material,
/// with the variant's discriminant doubling as the block id. `Mixed` means
/// the ids vary, or the chunk is uniform in a material the classification
/// does not model (grass, gold); either way the per-pixel array must be
/// consulted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum ChunkState {
    /// Every pixel is air.
    Air = 0,
    /// Every pixel is rock.
    Rock = 1,
    /// Every pixel is dirt.
    Dirt = 2,
    /// Consult the pixel array.
    Mixed = 3,
}

impl ChunkState {
    /// Classification for a chunk uniformly filled with `id`.
    ///
    /// Only the first three ids have a homogeneous classification; a chunk
    /// uniform in any higher id still classifies as `Mixed`.
    fn from_uniform_id(id: BlockId) -> ChunkState {
        match num::FromPrimitive::from_u8(id) {
            Some(ChunkState::Mixed) | None => ChunkState::Mixed,
            Some(state) => state,
        }
    }
}

/// A square partition of the world's pixel grid.
pub struct Chunk {
    /// Position in chunk-grid coordinates (not pixels).
    origin: Point2<i32>,
    /// Block ids, row-major, `CHUNK_AREA` long.
    ids: Vec<BlockId>,
    /// Cached homogeneity classification.
    state: ChunkState,
    /// Retained color buffer; empty for never-rendered air chunks.
    colors: Vec<Rgba8>,
    /// Sprite surface, created lazily on the first non-air render.
    sprite: Option<SpriteHandle>,
}

impl Chunk {
    /// Generates a chunk from the terrain rules.
    ///
    /// Scatters row bands across the worker pool, joins, assembles the id
    /// and color buffers, classifies the chunk and renders it unless it is
    /// entirely air. Synchronous from the caller's perspective; only the
    /// per-pixel math inside runs in parallel.
    ///
    /// # Arguments
    /// * `origin` - Chunk-grid coordinates of the new chunk
    /// * `kernel` - The seeded generation rules
    /// * `palette` - Shared material table
    /// * `pool` - Worker pool the pixel math is scattered over
    /// * `backend` - Sprite backend for the initial render
    pub fn generate(
        origin: Point2<i32>,
        kernel: &TerrainKernel,
        palette: &Arc<BlockPalette>,
        pool: &mut WorkerPool,
        backend: &mut dyn SpriteBackend,
    ) -> Chunk {
        let jobs: Vec<Box<dyn Job>> = row_bands(pool.worker_count())
            .into_iter()
            .map(|rows| {
                Box::new(PopulateBand {
                    kernel: kernel.clone(),
                    palette: Arc::clone(palette),
                    origin,
                    rows,
                }) as Box<dyn Job>
            })
            .collect();
        let expected_bands = jobs.len();
        let outputs = pool.run_batch(jobs);

        let mut ids = vec![BlockKind::Air.id(); CHUNK_AREA];
        let mut colors = vec![Rgba8::TRANSPARENT; CHUNK_AREA];
        let mut bands_assembled = 0;
        let mut uniform: Option<BlockId> = None;
        let mut mixed = false;

        for output in outputs {
            let Ok(band) = output.downcast::<PopulateBandOutput>() else {
                log::error!("populate batch returned a foreign output type");
                continue;
            };
            let span = band.rows.start * CHUNK_SIZE..band.rows.end * CHUNK_SIZE;
            ids[span.clone()].copy_from_slice(&band.ids);
            colors[span].copy_from_slice(&band.colors);

            match (uniform, band.uniform) {
                (_, None) => mixed = true,
                (Some(seen), Some(band_id)) if seen != band_id => mixed = true,
                (None, Some(band_id)) => uniform = Some(band_id),
                _ => {}
            }
            bands_assembled += 1;
        }

        // A lost band leaves air holes; classifying Mixed keeps reads honest.
        if bands_assembled != expected_bands {
            mixed = true;
        }

        let state = if mixed {
            ChunkState::Mixed
        } else {
            ChunkState::from_uniform_id(uniform.unwrap_or(BlockKind::Air.id()))
        };

        let mut chunk = Chunk {
            origin,
            ids,
            state,
            colors,
            sprite: None,
        };

        if chunk.state == ChunkState::Air {
            // Fully transparent; keep neither a surface nor a color cache.
            chunk.colors = Vec::new();
        } else {
            chunk.render(backend);
        }

        chunk
    }

    /// Chunk-grid coordinates of this chunk.
    pub fn origin(&self) -> Point2<i32> {
        self.origin
    }

    /// The cached homogeneity classification.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// The raw id buffer, row-major.
    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }

    /// Reads the block id at local pixel coordinates.
    ///
    /// Homogeneous chunks answer from the classification alone, which is
    /// valid because the classification invariant guarantees every cell
    /// equals that id.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> BlockId {
        if self.state != ChunkState::Mixed {
            return self.state as BlockId;
        }
        self.ids[flat_index(x, y)]
    }

    /// Destroys the pixel at local coordinates and returns its old id.
    ///
    /// Hard materials (solidity above 1) degrade to dirt; everything else
    /// becomes air. The classification is unconditionally invalidated to
    /// `Mixed`: even a dig that happens to keep the chunk uniform must
    /// force future reads back onto the array.
    pub fn dig(&mut self, x: usize, y: usize, palette: &BlockPalette) -> BlockId {
        let index = flat_index(x, y);
        let old = self.ids[index];

        // Rock and gold turn into dirt, dirt and grass into air.
        let replacement = if palette.lookup(old).is_hard() {
            BlockKind::Dirt.id()
        } else {
            BlockKind::Air.id()
        };
        self.ids[index] = replacement;
        self.state = ChunkState::Mixed;

        old
    }

    /// Recomputes the color buffer from the stored ids and re-renders.
    ///
    /// This is the recolor pass scheduled after digs: ids are taken as-is,
    /// only colors are resampled, and the existing sprite surface receives
    /// the replacement buffer.
    pub fn update_render(
        &mut self,
        kernel: &TerrainKernel,
        palette: &Arc<BlockPalette>,
        pool: &mut WorkerPool,
        backend: &mut dyn SpriteBackend,
    ) {
        let jobs: Vec<Box<dyn Job>> = row_bands(pool.worker_count())
            .into_iter()
            .map(|rows| {
                let span = rows.start * CHUNK_SIZE..rows.end * CHUNK_SIZE;
                Box::new(RecolorBand {
                    kernel: kernel.clone(),
                    palette: Arc::clone(palette),
                    origin: self.origin,
                    rows,
                    ids: self.ids[span].to_vec(),
                }) as Box<dyn Job>
            })
            .collect();
        let outputs = pool.run_batch(jobs);

        let mut colors = vec![Rgba8::TRANSPARENT; CHUNK_AREA];
        for output in outputs {
            let Ok(band) = output.downcast::<RecolorBandOutput>() else {
                log::error!("recolor batch returned a foreign output type");
                continue;
            };
            let span = band.rows.start * CHUNK_SIZE..band.rows.end * CHUNK_SIZE;
            colors[span].copy_from_slice(&band.colors);
        }

        self.colors = colors;
        self.render(backend);
    }

    /// Uploads the color buffer, creating the sprite surface on first use.
    fn render(&mut self, backend: &mut dyn SpriteBackend) {
        let handle = match self.sprite {
            Some(handle) => handle,
            None => {
                let position = Point2::new(
                    self.origin.x as f32 * CHUNK_WORLD_SIZE,
                    self.origin.y as f32 * CHUNK_WORLD_SIZE,
                );
                let handle = backend.create_sprite(position, CHUNK_SIZE as u32);
                self.sprite = Some(handle);
                handle
            }
        };
        backend.upload(handle, &self.colors);
    }

    /// Plants a raw id for tests, forcing the chunk onto the array path.
    #[cfg(test)]
    pub(crate) fn plant_id(&mut self, x: usize, y: usize, id: BlockId) {
        let index = flat_index(x, y);
        self.ids[index] = id;
        self.state = ChunkState::Mixed;
    }
}

/// Splits the chunk's rows into one contiguous band per worker.
fn row_bands(workers: usize) -> Vec<Range<usize>> {
    let bands = workers.clamp(1, CHUNK_SIZE);
    let rows_per_band = CHUNK_SIZE.div_ceil(bands);
    (0..bands)
        .map(|band| band * rows_per_band..((band + 1) * rows_per_band).min(CHUNK_SIZE))
        .filter(|rows| !rows.is_empty())
        .collect()
}
