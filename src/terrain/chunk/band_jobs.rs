//! # Chunk Band Jobs
//!
//! The parallel work units behind chunk generation and recoloring. A chunk
//! splits its pixel rows into contiguous bands, one job per band; each job
//! owns a clone of the kernel, a shared handle to the palette and its own
//! output buffers, so bands never contend while they run.

use std::any::Any;
use std::ops::Range;
use std::sync::Arc;

use cgmath::Point2;

use super::CHUNK_SIZE;
use crate::core::Job;
use crate::terrain::block::{BlockId, BlockPalette, Rgba8};
use crate::terrain::generation::TerrainKernel;

/// Generates ids and colors for a contiguous band of chunk rows.
pub(super) struct PopulateBand {
    /// The seeded rule set, cloned per job.
    pub kernel: TerrainKernel,
    /// Shared read-only material table.
    pub palette: Arc<BlockPalette>,
    /// Chunk-grid coordinates of the owning chunk.
    pub origin: Point2<i32>,
    /// The local rows this band covers.
    pub rows: Range<usize>,
}

/// Output of a [`PopulateBand`] job.
pub(super) struct PopulateBandOutput {
    pub rows: Range<usize>,
    pub ids: Vec<BlockId>,
    pub colors: Vec<Rgba8>,
    /// `Some(id)` when every pixel in the band shares that id.
    pub uniform: Option<BlockId>,
}

impl Job for PopulateBand {
    fn run(self: Box<Self>) -> Box<dyn Any + Send> {
        let base_x = self.origin.x * CHUNK_SIZE as i32;
        let base_y = self.origin.y * CHUNK_SIZE as i32;

        // Column heights depend on x only, so sample them once per band.
        let heights: Vec<(i32, i32)> = (0..CHUNK_SIZE)
            .map(|x| {
                let gx = (base_x + x as i32) as f64;
                (self.kernel.rock_height(gx), self.kernel.dirt_height(gx))
            })
            .collect();

        let mut ids = Vec::with_capacity(self.rows.len() * CHUNK_SIZE);
        let mut colors = Vec::with_capacity(self.rows.len() * CHUNK_SIZE);
        let mut uniform: Option<BlockId> = None;
        let mut mixed = false;

        for y in self.rows.clone() {
            let gy = base_y + y as i32;
            for (x, &(rock, dirt)) in heights.iter().enumerate() {
                let gx = base_x + x as i32;
                let id = self.kernel.block_id(gx, gy, rock, dirt);

                match uniform {
                    Some(seen) if seen != id => mixed = true,
                    None => uniform = Some(id),
                    _ => {}
                }

                ids.push(id);
                colors.push(self.kernel.color(gx, gy, id, &self.palette));
            }
        }

        Box::new(PopulateBandOutput {
            rows: self.rows,
            ids,
            colors,
            uniform: if mixed { None } else { uniform },
        })
    }
}

/// Recomputes colors for a band from already stored ids.
///
/// This is the cheap half of a chunk refresh after digging: no id is
/// recomputed, only the color field is resampled.
pub(super) struct RecolorBand {
    pub kernel: TerrainKernel,
    pub palette: Arc<BlockPalette>,
    pub origin: Point2<i32>,
    pub rows: Range<usize>,
    /// Copy of the band's stored ids at dispatch time.
    pub ids: Vec<BlockId>,
}

/// Output of a [`RecolorBand`] job.
pub(super) struct RecolorBandOutput {
    pub rows: Range<usize>,
    pub colors: Vec<Rgba8>,
}

impl Job for RecolorBand {
    fn run(self: Box<Self>) -> Box<dyn Any + Send> {
        let base_x = self.origin.x * CHUNK_SIZE as i32;
        let base_y = self.origin.y * CHUNK_SIZE as i32;

        let mut colors = Vec::with_capacity(self.ids.len());
        for (i, &id) in self.ids.iter().enumerate() {
            let gx = base_x + (i % CHUNK_SIZE) as i32;
            let gy = base_y + (self.rows.start + i / CHUNK_SIZE) as i32;
            colors.push(self.kernel.color(gx, gy, id, &self.palette));
        }

        Box::new(RecolorBandOutput {
            rows: self.rows,
            colors,
        })
    }
}
