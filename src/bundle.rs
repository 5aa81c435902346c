//! Every GPU resource the two draws need, built once at startup.
//!
//! [`RenderBundle::new`] follows a fixed order: pipelines first (so shader
//! errors surface before any upload), then the three textures and the shared
//! sampler, then the two uniform buffers with their time zero contents, and
//! last the bind groups, which are validated against the pipelines' layouts.

use cgmath::Vector2;
use wgpu::{ShaderStages, util::DeviceExt};

use crate::{
    animation,
    data_structures::{
        texture::{Texture, create_pixel_sampler},
        tilemap::TileMap,
        uniforms::{SpriteUniform, TilemapUniform, centered_anchor},
    },
    error::Result,
    layout::BindGroupBuilder,
    pipelines::{
        Pipeline,
        sprite::{self, mk_sprite_pipeline},
        tilemap::{self, mk_tilemap_pipeline},
    },
    render::Pass,
    settings::Settings,
};

/// The joined results of the startup fetches.
#[derive(Debug)]
pub struct Assets {
    pub map: TileMap,
    pub tilemap_shader: String,
    pub sprite_shader: String,
    pub tileset_png: Vec<u8>,
    pub sprite_png: Vec<u8>,
}

/// Format and size of the colour target the bundle draws into.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderTarget {
    pub format: wgpu::TextureFormat,
    pub size: [u32; 2],
}

#[derive(Debug)]
pub struct RenderBundle {
    pub map: TileMap,
    pub tilemap_pipeline: Pipeline,
    pub sprite_pipeline: Pipeline,
    pub tileset: Texture,
    pub tilemap_texture: Texture,
    pub sprite_texture: Texture,
    pub sampler: wgpu::Sampler,
    pub tilemap_buffer: wgpu::Buffer,
    pub sprite_buffer: wgpu::Buffer,
    pub tilemap_bind_group: wgpu::BindGroup,
    pub sprite_bind_group: wgpu::BindGroup,
    pub tilemap_uniform: TilemapUniform,
    pub sprite_uniform: SpriteUniform,
    pub clear_colour: wgpu::Color,
    pub time_scale_ms: f32,
    anchor: Option<Vector2<f32>>,
}

impl RenderBundle {
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: RenderTarget,
        assets: Assets,
        settings: &Settings,
    ) -> Result<Self> {
        let Assets {
            map,
            tilemap_shader,
            sprite_shader,
            tileset_png,
            sprite_png,
        } = assets;

        let tilemap_pipeline = mk_tilemap_pipeline(device, target.format, &tilemap_shader).await?;
        let sprite_pipeline = mk_sprite_pipeline(device, target.format, &sprite_shader).await?;

        // sizes are checked against the device limits before each upload, so
        // an oversized asset fails here instead of in the driver
        let tileset = Texture::from_bytes(device, queue, &tileset_png, "tileset")?;
        let sprite_texture = Texture::from_bytes(device, queue, &sprite_png, "sprite")?;
        let tilemap_texture = Texture::from_tilemap(device, queue, &map)?;
        let sampler = create_pixel_sampler(device);
        log::info!(
            "uploaded textures: tileset {:?}, tilemap {:?}, sprite {:?}",
            tileset.size(),
            tilemap_texture.size(),
            sprite_texture.size()
        );

        let tilemap_uniform = TilemapUniform::new(&map, target.size);
        let screen = tilemap_uniform.screen();
        let anchor = settings
            .sprite_anchor
            .unwrap_or_else(|| centered_anchor(screen));
        let mut sprite_uniform = SpriteUniform::new(anchor, sprite_texture.size(), target.size);
        sprite_uniform.set_offset(animation::sprite_offset(
            0.0,
            settings.time_scale_ms,
            screen,
            sprite_uniform.sprite_size(),
        ));

        let tilemap_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tilemap Uniform Buffer"),
            contents: bytemuck::cast_slice(&[tilemap_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sprite_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Uniform Buffer"),
            contents: bytemuck::cast_slice(&[sprite_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let tilemap_bind_group = BindGroupBuilder::new(&tilemap_pipeline.layout_spec)
            .uniform(tilemap::UNIFORM_BINDING, ShaderStages::VERTEX_FRAGMENT, &tilemap_buffer)
            .texture(tilemap::TILESET_BINDING, ShaderStages::FRAGMENT, &tileset)
            .texture(tilemap::TILEMAP_BINDING, ShaderStages::FRAGMENT, &tilemap_texture)
            .sampler(tilemap::SAMPLER_BINDING, ShaderStages::FRAGMENT, &sampler)
            .build(device, &tilemap_pipeline.bind_group_layout)?;
        let sprite_bind_group = BindGroupBuilder::new(&sprite_pipeline.layout_spec)
            .uniform(sprite::UNIFORM_BINDING, ShaderStages::VERTEX, &sprite_buffer)
            .texture(sprite::TEXTURE_BINDING, ShaderStages::FRAGMENT, &sprite_texture)
            .sampler(sprite::SAMPLER_BINDING, ShaderStages::FRAGMENT, &sampler)
            .build(device, &sprite_pipeline.bind_group_layout)?;

        Ok(Self {
            map,
            tilemap_pipeline,
            sprite_pipeline,
            tileset,
            tilemap_texture,
            sprite_texture,
            sampler,
            tilemap_buffer,
            sprite_buffer,
            tilemap_bind_group,
            sprite_bind_group,
            tilemap_uniform,
            sprite_uniform,
            clear_colour: settings.clear_colour,
            time_scale_ms: settings.time_scale_ms,
            anchor: settings.sprite_anchor,
        })
    }

    pub fn pipeline(&self, pass: Pass) -> &wgpu::RenderPipeline {
        match pass {
            Pass::Tilemap => &self.tilemap_pipeline.render_pipeline,
            Pass::Sprite => &self.sprite_pipeline.render_pipeline,
        }
    }

    pub fn bind_group(&self, pass: Pass) -> &wgpu::BindGroup {
        match pass {
            Pass::Tilemap => &self.tilemap_bind_group,
            Pass::Sprite => &self.sprite_bind_group,
        }
    }

    /// Advance both host uniforms to `elapsed_ms`.
    pub fn animate(&mut self, elapsed_ms: f64) {
        let map_width_px = f64::from(self.map.width()) * f64::from(self.map.tile_size().0);
        self.tilemap_uniform.elapsed_time = animation::scroll_time_ms(elapsed_ms, map_width_px);
        let offset = animation::sprite_offset(
            elapsed_ms,
            self.time_scale_ms,
            self.sprite_uniform.screen(),
            self.sprite_uniform.sprite_size(),
        );
        self.sprite_uniform.set_offset(offset);
    }

    /// Copy both host uniforms to their buffers. The writes are ordered before
    /// the next `Queue::submit`.
    pub fn write_uniforms(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.tilemap_buffer,
            0,
            bytemuck::cast_slice(&[self.tilemap_uniform]),
        );
        queue.write_buffer(
            &self.sprite_buffer,
            0,
            bytemuck::cast_slice(&[self.sprite_uniform]),
        );
    }

    /// Track a new target size. A centered sprite box follows the screen; an
    /// anchor from the settings stays where it is. Zero sizes are ignored and
    /// return `false`.
    pub fn resize(&mut self, size: [u32; 2]) -> bool {
        if size[0] == 0 || size[1] == 0 {
            return false;
        }
        self.tilemap_uniform.set_screen(size);
        self.sprite_uniform.set_screen(size);
        let anchor = self
            .anchor
            .unwrap_or_else(|| centered_anchor(self.sprite_uniform.screen()));
        self.sprite_uniform.set_anchor(anchor);
        true
    }
}
