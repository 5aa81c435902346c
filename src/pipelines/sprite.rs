//! The overlay pass: one textured quad placed by the sprite uniform.

use wgpu::ShaderStages;

use crate::{
    error::Result,
    layout::{LayoutSpec, SampleKind},
    pipelines::{Pipeline, mk_pipeline},
};

pub const UNIFORM_BINDING: u32 = 0;
pub const TEXTURE_BINDING: u32 = 1;
pub const SAMPLER_BINDING: u32 = 2;

pub fn layout_spec() -> LayoutSpec {
    LayoutSpec::new("sprite_bind_group_layout")
        .uniform(UNIFORM_BINDING, ShaderStages::VERTEX_FRAGMENT)
        .texture(TEXTURE_BINDING, ShaderStages::FRAGMENT, SampleKind::Float)
        .sampler(SAMPLER_BINDING, ShaderStages::FRAGMENT)
}

pub async fn mk_sprite_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    source: &str,
) -> Result<Pipeline> {
    mk_pipeline(device, color_format, layout_spec(), "sprite pipeline", source).await
}
