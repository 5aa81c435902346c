//! Frame composition.
//!
//! A frame is planned on the host as a list of [`DrawCommand`]s and then
//! replayed onto one `wgpu::RenderPass`. Keeping the plan as data lets the
//! draw order be checked without a device, and every submitted frame carries
//! the exact commands it was recorded from.
//!
//! Each frame draws, inside a single pass:
//! 1. the tile map background (all layers, one quad)
//! 2. the sprite overlay on top

use std::ops::Range;

use crate::{bundle::RenderBundle, pipelines::QUAD_VERTICES};

/// The two draws of a frame, in paint order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    Tilemap,
    Sprite,
}

impl Pass {
    pub const ALL: [Pass; 2] = [Pass::Tilemap, Pass::Sprite];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    SetPipeline(Pass),
    /// Always bound at group 0.
    SetBindGroup(Pass),
    Draw { vertices: Range<u32> },
}

/// The command list of one frame: background first, sprite second.
pub fn frame_commands() -> Vec<DrawCommand> {
    Pass::ALL
        .into_iter()
        .flat_map(|pass| {
            [
                DrawCommand::SetPipeline(pass),
                DrawCommand::SetBindGroup(pass),
                DrawCommand::Draw {
                    vertices: 0..QUAD_VERTICES,
                },
            ]
        })
        .collect()
}

/// Vertex ranges of every draw in `commands`.
pub fn draws(commands: &[DrawCommand]) -> Vec<Range<u32>> {
    commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Draw { vertices } => Some(vertices.clone()),
            _ => None,
        })
        .collect()
}

/// Replay `commands` onto an open render pass.
pub fn encode(bundle: &RenderBundle, render_pass: &mut wgpu::RenderPass<'_>, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::SetPipeline(pass) => render_pass.set_pipeline(bundle.pipeline(*pass)),
            DrawCommand::SetBindGroup(pass) => {
                render_pass.set_bind_group(0, bundle.bind_group(*pass), &[])
            }
            DrawCommand::Draw { vertices } => render_pass.draw(vertices.clone(), 0..1),
        }
    }
}

/// Record one cleared pass over `view` running `commands`.
pub fn record_frame(
    device: &wgpu::Device,
    bundle: &RenderBundle,
    view: &wgpu::TextureView,
    commands: &[DrawCommand],
) -> wgpu::CommandBuffer {
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Render Encoder"),
    });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(bundle.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        encode(bundle, &mut render_pass, commands);
    }
    encoder.finish()
}
