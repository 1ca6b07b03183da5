//! # Rendering Module
//!
//! The GPU-facing seam of the terrain engine. Chunks produce color buffers;
//! everything past that (surfaces, draw passes, windows) belongs to the
//! host. The [`SpriteBackend`] trait is that boundary: the world owns one
//! backend, chunks ask it for a sprite surface on their first non-air
//! render and push replacement texel buffers at it afterwards.
//!
//! Two backends ship with the crate:
//! * [`texture::WgpuSprites`] - real GPU textures for hosts with a device
//! * [`HeadlessSprites`] - a counting no-op for tests and headless hosts

pub mod texture;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cgmath::Point2;

use crate::terrain::block::Rgba8;

/// Identifies a sprite surface created by a [`SpriteBackend`].
///
/// Handles are never reused within a backend's lifetime; a chunk keeps its
/// handle for the whole session and re-uploads through it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u32);

/// Creates and refreshes the per-chunk sprite surfaces.
///
/// Implementations own every surface they hand out; dropping the backend
/// releases them all, which is exactly the world-teardown lifecycle.
pub trait SpriteBackend {
    /// Creates a sprite surface for one chunk.
    ///
    /// # Arguments
    /// * `position` - Lower-left corner of the chunk in world units
    /// * `size` - Edge length of the square texel grid, in pixels
    fn create_sprite(&mut self, position: Point2<f32>, size: u32) -> SpriteHandle;

    /// Replaces the texel contents of an existing sprite.
    ///
    /// Only the uploaded buffer changes; the surface object itself is
    /// reused, which keeps a recolor pass cheap.
    fn upload(&mut self, sprite: SpriteHandle, texels: &[Rgba8]);
}

/// Shared observation counters for [`HeadlessSprites`].
///
/// Cloning is cheap; tests keep a clone before handing the backend to the
/// world and read the counters afterwards.
#[derive(Clone, Debug, Default)]
pub struct SpriteCounters {
    inner: Arc<CounterCells>,
}

#[derive(Debug, Default)]
struct CounterCells {
    created: AtomicUsize,
    uploads: AtomicUsize,
}

impl SpriteCounters {
    /// Number of sprite surfaces created so far.
    pub fn created(&self) -> usize {
        self.inner.created.load(Ordering::Relaxed)
    }

    /// Number of texel uploads performed so far (including the initial
    /// upload of every created sprite).
    pub fn uploads(&self) -> usize {
        self.inner.uploads.load(Ordering::Relaxed)
    }
}

/// A backend that records activity but touches no GPU.
///
/// Useful for tests asserting on render scheduling (how many chunks were
/// rendered, how many recolors a tick performed) and for running the
/// simulation on machines without a graphics device.
#[derive(Debug, Default)]
pub struct HeadlessSprites {
    counters: SpriteCounters,
    next_handle: u32,
}

impl HeadlessSprites {
    /// Creates an empty headless backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle onto this backend's counters.
    pub fn counters(&self) -> SpriteCounters {
        self.counters.clone()
    }
}

impl SpriteBackend for HeadlessSprites {
    fn create_sprite(&mut self, _position: Point2<f32>, _size: u32) -> SpriteHandle {
        let handle = SpriteHandle(self.next_handle);
        self.next_handle += 1;
        self.counters.inner.created.fetch_add(1, Ordering::Relaxed);
        handle
    }

    fn upload(&mut self, _sprite: SpriteHandle, _texels: &[Rgba8]) {
        self.counters.inner.uploads.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_backend_counts_activity() {
        let mut backend = HeadlessSprites::new();
        let counters = backend.counters();

        let a = backend.create_sprite(Point2::new(0.0, 0.0), 64);
        let b = backend.create_sprite(Point2::new(0.64, 0.0), 64);
        assert_ne!(a, b);

        backend.upload(a, &[]);
        backend.upload(a, &[]);
        backend.upload(b, &[]);

        assert_eq!(counters.created(), 2);
        assert_eq!(counters.uploads(), 3);
    }
}
