//! Texture handling for the chunk sprite backend.
//!
//! This module provides the wgpu implementation of [`SpriteBackend`]: one
//! small RGBA texture per chunk, uploaded with point filtering and clamped
//! addressing so the pixel grid stays crisp at any zoom.

use cgmath::Point2;

use super::{SpriteBackend, SpriteHandle};
use crate::terrain::block::Rgba8;

/// A chunk-sized sprite surface: texture, view and sampler plus the world
/// position the host should draw it at.
pub struct ChunkSprite {
    /// Lower-left corner of the sprite in world units.
    pub position: Point2<f32>,
    /// Edge length of the square texel grid, in pixels.
    pub size: u32,
    /// The underlying texture resource.
    pub texture: wgpu::Texture,
    /// The view used for binding the texture to a pipeline.
    pub view: wgpu::TextureView,
    /// Nearest-neighbor sampler with clamped addressing.
    pub sampler: wgpu::Sampler,
}

/// The texture format chunk color buffers are uploaded as.
pub const SPRITE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// A [`SpriteBackend`] backed by wgpu textures.
///
/// The backend owns every sprite it creates; the host iterates
/// [`WgpuSprites::sprites`] each frame to draw them. Re-uploads go through
/// `Queue::write_texture` and replace only texel data, never the surface.
pub struct WgpuSprites {
    device: wgpu::Device,
    queue: wgpu::Queue,
    sprites: Vec<ChunkSprite>,
}

impl WgpuSprites {
    /// Creates a backend on the given device and queue.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        WgpuSprites {
            device,
            queue,
            sprites: Vec::new(),
        }
    }

    /// All sprites created so far, indexable by [`SpriteHandle`].
    pub fn sprites(&self) -> &[ChunkSprite] {
        &self.sprites
    }
}

impl SpriteBackend for WgpuSprites {
    fn create_sprite(&mut self, position: Point2<f32>, size: u32) -> SpriteHandle {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("chunk sprite"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SPRITE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let handle = SpriteHandle(self.sprites.len() as u32);
        self.sprites.push(ChunkSprite {
            position,
            size,
            texture,
            view,
            sampler,
        });
        handle
    }

    fn upload(&mut self, sprite: SpriteHandle, texels: &[Rgba8]) {
        let Some(sprite) = self.sprites.get(sprite.0 as usize) else {
            log::error!("upload to unknown sprite handle {sprite:?}");
            return;
        };
        debug_assert_eq!(texels.len(), (sprite.size * sprite.size) as usize);

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &sprite.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * sprite.size),
                rows_per_image: Some(sprite.size),
            },
            wgpu::Extent3d {
                width: sprite.size,
                height: sprite.size,
                depth_or_array_layers: 1,
            },
        );
    }
}
