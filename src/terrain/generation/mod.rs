//! # Generation Kernel
//!
//! Pure, deterministic per-pixel terrain rules. Given a seed and a world
//! position the kernel produces a block id and a display color; nothing in
//! here touches chunk storage, so the same kernel value can be cloned into
//! any number of parallel workers.
//!
//! ## Rule Structure
//!
//! Two 1D coherent-noise profiles define the rock and dirt surface heights
//! per column. A height-based pass lays down the base layers (rock, dirt,
//! a thin grass cap), then two independent 2D noise overlays carve rock
//! veins near the surface and embed gold pockets inside rock. A third 2D
//! noise field drives per-pixel color variation between each material's
//! palette endpoints.

use noise::{NoiseFn, Perlin};

use super::block::{BlockId, BlockKind, BlockPalette, Rgba8};

/// Horizontal noise scale of the bedrock profile.
pub const BEDROCK_SCALE: f64 = 1.0;
/// Horizontal noise scale of the dirt profile.
pub const DIRT_SCALE: f64 = 1.0;

/// How far the rock surface sits below its raw noise height, in pixels.
const BEDROCK_DROP: i32 = 32;
/// Rows of grass capping the dirt layer.
const GRASS_DEPTH: i32 = 2;

/// Coordinate offset decorrelating the rock vein field from the others.
const ROCK_OFFSET: i32 = 1000;
const ROCK_SCALE: f64 = 20.0;
const ROCK_THRESHOLD: f64 = 0.5;
/// Veins only appear within this many pixels below/above the dirt surface.
const VEIN_DEPTH: i32 = 8;

/// Coordinate offset decorrelating the gold field from the others.
const GOLD_OFFSET: i32 = 3000;
const GOLD_SCALE: f64 = 40.0;
const GOLD_THRESHOLD: f64 = 0.75;

/// Extra shift applied to the y axis of every overlay sample.
const OVERLAY_Y_SHIFT: i32 = 200;

/// Scale of the color variation field.
const COLOR_SCALE: f64 = 60.0;

/// The seeded, cloneable terrain rule set.
///
/// All methods are pure functions of the constructor arguments and their
/// parameters, which is what makes per-chunk generation safely parallel:
/// each worker gets its own clone and a shared read-only palette.
#[derive(Clone)]
pub struct TerrainKernel {
    perlin: Perlin,
    seed: i32,
    world_height_pixels: i32,
}

impl TerrainKernel {
    /// Creates a kernel for a world of the given pixel height.
    ///
    /// # Arguments
    /// * `seed` - Session seed; both permutes the noise source and offsets
    ///   every sample coordinate
    /// * `world_height_pixels` - Vertical world extent, the normalization
    ///   base of every noise coordinate
    pub fn new(seed: i32, world_height_pixels: i32) -> Self {
        TerrainKernel {
            perlin: Perlin::new(seed as u32),
            seed,
            world_height_pixels,
        }
    }

    /// The seed this kernel was built with.
    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Samples the noise source remapped from `[-1, 1]` to `[0, 1]`.
    #[inline]
    fn perlin01(&self, x: f64, y: f64) -> f64 {
        ((self.perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// 1D profile sample along the horizontal axis.
    #[inline]
    fn perlin01_1d(&self, x: f64) -> f64 {
        self.perlin01(x, 0.0)
    }

    /// Height of the rock surface in the given pixel column.
    pub fn rock_height(&self, x: f64) -> i32 {
        let h = self.world_height_pixels as f64;
        let noise = self.perlin01_1d((x + self.seed as f64) / h * BEDROCK_SCALE);
        (noise * h) as i32 - BEDROCK_DROP
    }

    /// Height of the dirt surface in the given pixel column.
    pub fn dirt_height(&self, x: f64) -> i32 {
        let h = self.world_height_pixels as f64;
        let noise = self.perlin01_1d((x + self.seed as f64) / h * DIRT_SCALE);
        (noise * h) as i32
    }

    /// The walkable surface height of a column, in pixels.
    ///
    /// Recomputes the two column profiles without touching any chunk data,
    /// so surface-anchored objects can be placed before (or without)
    /// generating the column's chunks.
    pub fn surface_height(&self, x: f64) -> i32 {
        let h = self.world_height_pixels as f64;
        let rock = self.perlin01_1d((x + self.seed as f64) / h * BEDROCK_SCALE);
        let dirt = self.perlin01_1d((x + self.seed as f64) / h * DIRT_SCALE);
        if rock > dirt {
            (rock * h) as i32 - BEDROCK_DROP
        } else {
            (dirt * h) as i32
        }
    }

    /// Decides the block id of one pixel.
    ///
    /// # Arguments
    /// * `x`, `y` - Global pixel coordinates
    /// * `rock_height`, `dirt_height` - The column heights, precomputed
    ///   once per column by the caller
    ///
    /// # Returns
    /// An id the block palette is guaranteed to resolve.
    pub fn block_id(&self, x: i32, y: i32, rock_height: i32, dirt_height: i32) -> BlockId {
        let mut id = BlockKind::Air.id();

        // Height-based base layers.
        if rock_height > dirt_height {
            if y < rock_height {
                id = BlockKind::Rock.id();
            }
        } else if y <= dirt_height {
            if y >= dirt_height - GRASS_DEPTH {
                id = BlockKind::Grass.id();
            } else if y < rock_height {
                id = BlockKind::Rock.id();
            } else {
                id = BlockKind::Dirt.id();
            }
        }

        // Rock vein overlay near the surface.
        if id != BlockKind::Rock.id()
            && y < dirt_height + VEIN_DEPTH
            && self.overlay(x, y, ROCK_SCALE, ROCK_OFFSET, ROCK_THRESHOLD)
        {
            id = BlockKind::Rock.id();
        }

        // Gold pockets only form inside rock.
        if id == BlockKind::Rock.id() && self.overlay(x, y, GOLD_SCALE, GOLD_OFFSET, GOLD_THRESHOLD)
        {
            id = BlockKind::Gold.id();
        }

        id
    }

    /// Thresholded 2D overlay sample for the vein rules.
    fn overlay(&self, x: i32, y: i32, scale: f64, offset: i32, threshold: f64) -> bool {
        let h = self.world_height_pixels as f64;
        let sx = (x + offset + self.seed) as f64 / h * scale;
        let sy = (y + offset + OVERLAY_Y_SHIFT + self.seed) as f64 / h * scale;
        self.perlin01(sx, sy) >= threshold
    }

    /// Computes the display color of one pixel.
    ///
    /// Samples the color field at the pixel's normalized position and
    /// interpolates between the resolved material's color endpoints. Used
    /// both during full generation and during recolor passes over already
    /// stored ids.
    pub fn color(&self, x: i32, y: i32, id: BlockId, palette: &BlockPalette) -> Rgba8 {
        let h = self.world_height_pixels as f64;
        let t = self.perlin01(x as f64 / h * COLOR_SCALE, y as f64 / h * COLOR_SCALE);
        let block = palette.lookup(id);
        Rgba8::lerp(block.color_min, block.color_max, t as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::block::PALETTE_LEN;

    const TEST_HEIGHT: i32 = 192;

    #[test]
    fn kernel_is_deterministic_for_a_seed() {
        let a = TerrainKernel::new(420, TEST_HEIGHT);
        let b = TerrainKernel::new(420, TEST_HEIGHT);
        for x in 0..64 {
            assert_eq!(a.rock_height(x as f64), b.rock_height(x as f64));
            assert_eq!(a.dirt_height(x as f64), b.dirt_height(x as f64));
            for y in 0..64 {
                let (rh, dh) = (a.rock_height(x as f64), a.dirt_height(x as f64));
                assert_eq!(a.block_id(x, y, rh, dh), b.block_id(x, y, rh, dh));
            }
        }
    }

    #[test]
    fn emitted_ids_stay_inside_the_palette() {
        let kernel = TerrainKernel::new(1230, TEST_HEIGHT);
        for x in 0..128 {
            let rh = kernel.rock_height(x as f64);
            let dh = kernel.dirt_height(x as f64);
            for y in 0..TEST_HEIGHT {
                let id = kernel.block_id(x, y, rh, dh);
                assert!((id as usize) < PALETTE_LEN, "id {id} out of palette");
            }
        }
    }

    #[test]
    fn far_above_the_dirt_surface_is_always_air() {
        let kernel = TerrainKernel::new(77, TEST_HEIGHT);
        for x in 0..128 {
            let rh = kernel.rock_height(x as f64);
            let dh = kernel.dirt_height(x as f64);
            if rh > dh {
                continue;
            }
            // Beyond vein reach nothing can override the air base layer.
            for y in (dh + 8)..(dh + 24) {
                assert_eq!(kernel.block_id(x, y, rh, dh), BlockKind::Air.id());
            }
        }
    }

    #[test]
    fn rock_column_has_no_dirt_or_grass() {
        let kernel = TerrainKernel::new(9, TEST_HEIGHT);
        // Synthetic heights force the rock-dominant branch.
        let (rh, dh) = (100, 50);
        for y in 0..100 {
            let id = kernel.block_id(0, y, rh, dh);
            assert!(
                id == BlockKind::Rock.id() || id == BlockKind::Gold.id(),
                "unexpected id {id} below a dominant rock surface"
            );
        }
    }

    #[test]
    fn color_stays_between_palette_endpoints() {
        let kernel = TerrainKernel::new(5, TEST_HEIGHT);
        let palette = BlockPalette::builtin();
        let rock = palette.lookup(BlockKind::Rock.id());
        for x in 0..64 {
            for y in 0..64 {
                let c = kernel.color(x, y, BlockKind::Rock.id(), &palette);
                assert!(c.r >= rock.color_min.r && c.r <= rock.color_max.r);
                assert!(c.g >= rock.color_min.g && c.g <= rock.color_max.g);
                assert!(c.b >= rock.color_min.b && c.b <= rock.color_max.b);
                assert_eq!(c.a, 255);
            }
        }
    }

    #[test]
    fn surface_height_matches_the_dominant_profile() {
        let kernel = TerrainKernel::new(31, TEST_HEIGHT);
        for x in 0..256 {
            let h = kernel.surface_height(x as f64);
            let rh = kernel.rock_height(x as f64);
            let dh = kernel.dirt_height(x as f64);
            assert!(h == rh || h == dh, "surface {h} is neither {rh} nor {dh}");
        }
    }
}
