//! Render pipelines of the two draws.
//!
//! Both pipelines share the same fixed-function setup (see
//! [`mk_render_pipeline`]): no vertex buffers, the quad's six vertices are
//! generated from `@builtin(vertex_index)`, a triangle list without culling and
//! alpha blending onto the single colour target. They differ in their shader
//! and in the [`LayoutSpec`] of `@group(0)`.

use crate::{
    error::{Error, Result},
    layout::LayoutSpec,
};

pub mod sprite;
pub mod tilemap;

/// Vertices of one screen aligned quad drawn as two triangles.
pub const QUAD_VERTICES: u32 = 6;

/// A compiled pipeline with the layout it expects at `@group(0)`.
#[derive(Debug)]
pub struct Pipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub layout_spec: LayoutSpec,
}

/// Compile `source` and build a pipeline for `layout_spec`.
///
/// Shader and pipeline validation errors are caught in an error scope and
/// returned as [`Error::ShaderCompile`] instead of reaching the uncaptured
/// error handler.
pub async fn mk_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    layout_spec: LayoutSpec,
    label: &str,
    source: &str,
) -> Result<Pipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let bind_group_layout = layout_spec.create_layout(device);
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    };
    let render_pipeline = mk_render_pipeline(
        device,
        &render_pipeline_layout,
        color_format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        shader,
        label,
    );

    if let Some(err) = device.pop_error_scope().await {
        log::error!("pipeline `{label}` rejected: {err}");
        return Err(Error::ShaderCompile {
            label: label.to_string(),
            message: err.to_string(),
        });
    }
    log::info!("built pipeline `{label}`");

    Ok(Pipeline {
        render_pipeline,
        bind_group_layout,
        layout_spec,
    })
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    shader: wgpu::ShaderModuleDescriptor,
    label: &str,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
