//! # Block Module
//!
//! This module provides the block-level building blocks of the terrain:
//! the compact block id storage type, the `BlockKind` enumeration, the
//! palette entry describing a block's physical and visual properties, and
//! the `BlockPalette` table shared read-only by every generation worker.
//!
//! ## Storage Strategy
//!
//! Pixels are stored as bare `u8` ids inside chunks; the palette resolves an
//! id to its full `BlockType` on demand. This keeps a chunk's pixel grid at
//! one byte per pixel while all per-material data lives in a single small
//! table loaded once at start-up.

use std::fmt;

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The underlying integer type used to represent block ids in memory.
/// This is used for compact storage of chunk pixel grids.
pub type BlockId = u8;

/// Number of entries a valid palette must hold. The generation rules are
/// closed over exactly these five materials.
pub const PALETTE_LEN: usize = 5;

/// Enumerates the block materials the generation rules can emit.
///
/// The discriminants are the on-disk/in-memory block ids; conversion from a
/// raw id goes through `num::FromPrimitive`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockKind {
    /// Empty space. Passable, never rendered.
    Air,

    /// Base rock. Hard: digging it yields dirt, not air.
    Rock,

    /// Loose dirt. Soft: digging it leaves empty space.
    Dirt,

    /// The thin grass cap on top of the dirt layer.
    Grass,

    /// Gold pockets embedded in rock. Hard, and the only reward material.
    Gold,
}

impl BlockKind {
    /// Converts a raw block id to a `BlockKind`.
    ///
    /// # Arguments
    /// * `id` - The block id as stored in a chunk's pixel grid
    ///
    /// # Returns
    /// `Some(BlockKind)` for ids the generation rules emit, `None` otherwise.
    pub fn from_id(id: BlockId) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// The raw id this kind is stored as.
    #[inline]
    pub const fn id(self) -> BlockId {
        self as BlockId
    }
}

/// An RGBA color with 8 bits per channel.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute plus the bytemuck derives make a `&[Rgba8]`
/// color buffer directly uploadable to the GPU as raw texel bytes.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black, the color of air.
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    /// Creates a color from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba8 { r, g, b, a }
    }

    /// Per-channel linear interpolation between `min` and `max`.
    ///
    /// Byte arithmetic truncates: `channel = min + (max - min) * t`, with the
    /// float result cast back down. `t` is expected to be in `[0, 1]`.
    pub fn lerp(min: Rgba8, max: Rgba8, t: f32) -> Rgba8 {
        Rgba8 {
            r: lerp_byte(min.r, max.r, t),
            g: lerp_byte(min.g, max.g, t),
            b: lerp_byte(min.b, max.b, t),
            a: lerp_byte(min.a, max.a, t),
        }
    }
}

#[inline]
fn lerp_byte(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t) as u8
}

/// A palette entry describing one block material.
///
/// Entries are immutable after the palette loads and are indexed by
/// [`BlockId`]. The two colors are the endpoints the generation kernel
/// interpolates between with its color noise field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    /// Human-readable material name, used in logs and palette files.
    pub name: String,
    /// 0 = passable, >0 = blocking, >1 = "hard" (digging yields dirt).
    pub solidity: i32,
    /// Darkest color this material can take.
    pub color_min: Rgba8,
    /// Brightest color this material can take.
    pub color_max: Rgba8,
}

impl BlockType {
    /// Whether this material blocks movement.
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.solidity > 0
    }

    /// Whether digging this material downgrades it to dirt instead of
    /// removing it outright.
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.solidity > 1
    }
}

/// The query result handed to collision-dependent callers.
///
/// Out-of-world queries return the null descriptor; callers treat both
/// `solidity > 0` and `is_null` as "blocked", which makes the edges of the
/// world read as solid without any error handling on their side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Solidity of the resolved material (0 for the null block).
    pub solidity: i32,
    /// True when the queried position was outside the world.
    pub is_null: bool,
}

impl BlockDescriptor {
    /// The sentinel descriptor for out-of-world positions.
    pub const NULL: BlockDescriptor = BlockDescriptor {
        solidity: 0,
        is_null: true,
    };

    /// Builds a descriptor from a resolved palette entry.
    pub fn of(block: &BlockType) -> Self {
        BlockDescriptor {
            solidity: block.solidity,
            is_null: false,
        }
    }

    /// Whether callers should treat this position as impassable.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        self.is_null || self.solidity > 0
    }
}

/// Errors that can occur while loading a palette.
///
/// Palette problems are load-time failures by design: once a palette is
/// constructed, every id the generation rules emit resolves, so the runtime
/// query/dig paths never see a bad id.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// The palette file was not valid JSON for a list of block types.
    #[error("malformed palette definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// The palette did not hold exactly [`PALETTE_LEN`] entries.
    #[error("palette must define exactly {expected} blocks, found {found}")]
    WrongLength {
        /// The required entry count.
        expected: usize,
        /// The entry count actually found.
        found: usize,
    },
}

/// The immutable table of block materials.
///
/// Loaded once at world start and shared read-only across all parallel
/// generation work (the world hands workers an `Arc` of it).
#[derive(Clone, Debug, PartialEq)]
pub struct BlockPalette {
    entries: Vec<BlockType>,
}

impl BlockPalette {
    /// The built-in material table matching the generation rules.
    pub fn builtin() -> Self {
        BlockPalette {
            entries: vec![
                BlockType {
                    name: "air".to_owned(),
                    solidity: 0,
                    color_min: Rgba8::TRANSPARENT,
                    color_max: Rgba8::TRANSPARENT,
                },
                BlockType {
                    name: "rock".to_owned(),
                    solidity: 2,
                    color_min: Rgba8::new(105, 105, 110, 255),
                    color_max: Rgba8::new(150, 150, 155, 255),
                },
                BlockType {
                    name: "dirt".to_owned(),
                    solidity: 1,
                    color_min: Rgba8::new(115, 60, 20, 255),
                    color_max: Rgba8::new(155, 95, 45, 255),
                },
                BlockType {
                    name: "grass".to_owned(),
                    solidity: 1,
                    color_min: Rgba8::new(30, 115, 35, 255),
                    color_max: Rgba8::new(70, 165, 70, 255),
                },
                BlockType {
                    name: "gold".to_owned(),
                    solidity: 2,
                    color_min: Rgba8::new(200, 160, 30, 255),
                    color_max: Rgba8::new(255, 215, 65, 255),
                },
            ],
        }
    }

    /// Loads a palette from a JSON array of block type definitions.
    ///
    /// # Arguments
    /// * `json` - A JSON document holding an array of exactly
    ///   [`PALETTE_LEN`] block type objects
    ///
    /// # Returns
    /// The validated palette, or a [`PaletteError`] describing why the
    /// definition was rejected.
    pub fn from_json_str(json: &str) -> Result<Self, PaletteError> {
        let entries: Vec<BlockType> = serde_json::from_str(json)?;
        if entries.len() != PALETTE_LEN {
            return Err(PaletteError::WrongLength {
                expected: PALETTE_LEN,
                found: entries.len(),
            });
        }
        Ok(BlockPalette { entries })
    }

    /// Resolves a block id to its palette entry.
    ///
    /// # Panics
    /// Panics if `id` is outside the palette. The generation rules never
    /// emit such an id, so hitting this is a programming error, not a
    /// runtime condition.
    #[inline]
    pub fn lookup(&self, id: BlockId) -> &BlockType {
        &self.entries[id as usize]
    }

    /// Fallible lookup for callers that cannot guarantee the id's origin.
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.entries.get(id as usize)
    }

    /// Number of materials in the palette.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette holds no entries. Always false for a validated
    /// palette; present for completeness.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for BlockPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|b| b.name.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
