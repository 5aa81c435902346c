//! The background pass: every map layer, composited back to front in one
//! full screen quad.

use wgpu::ShaderStages;

use crate::{
    error::Result,
    layout::{LayoutSpec, SampleKind},
    pipelines::{Pipeline, mk_pipeline},
};

pub const UNIFORM_BINDING: u32 = 0;
pub const TILESET_BINDING: u32 = 1;
pub const TILEMAP_BINDING: u32 = 2;
pub const SAMPLER_BINDING: u32 = 3;

pub fn layout_spec() -> LayoutSpec {
    LayoutSpec::new("tilemap_bind_group_layout")
        .uniform(UNIFORM_BINDING, ShaderStages::VERTEX_FRAGMENT)
        .texture(TILESET_BINDING, ShaderStages::FRAGMENT, SampleKind::Float)
        .texture(TILEMAP_BINDING, ShaderStages::FRAGMENT, SampleKind::Uint)
        .sampler(SAMPLER_BINDING, ShaderStages::FRAGMENT)
}

pub async fn mk_tilemap_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    source: &str,
) -> Result<Pipeline> {
    mk_pipeline(device, color_format, layout_spec(), "tilemap pipeline", source).await
}
