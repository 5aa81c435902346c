//! The per-frame update loop.
//!
//! [`FrameScheduler::tick`] is invoked by whatever paces the frames (the
//! window's redraw requests in [`crate::app`]). One tick samples the clock,
//! advances the uniforms, writes them to the device and submits one render
//! pass holding both draws. The stop flag is checked before anything touches
//! the GPU.

use std::{
    iter,
    ops::Range,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use instant::Instant;

use crate::{
    bundle::RenderBundle,
    context::{Context, DeviceHealth},
    error::{Error, Result},
    render::{self, DrawCommand},
};

/// Stops a [`FrameScheduler`] from any thread; the next tick observes it.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A frame that went to the queue.
#[derive(Debug)]
pub struct SubmittedFrame {
    /// Clock value the uniforms were computed from.
    pub elapsed_ms: f64,
    pub commands: Vec<DrawCommand>,
    pub submission: wgpu::SubmissionIndex,
}

impl SubmittedFrame {
    pub fn draws(&self) -> Vec<Range<u32>> {
        render::draws(&self.commands)
    }
}

#[derive(Debug)]
pub enum Tick {
    /// The stop flag was set; nothing was recorded.
    Stopped,
    /// No surface texture was available this time.
    Skipped,
    Presented(SubmittedFrame),
}

/// Fail fast once the device callbacks have reported a loss or an
/// uncaptured error; nothing is recorded on such a device.
pub fn ensure_healthy(health: &DeviceHealth) -> Result<()> {
    if health.is_lost() {
        return Err(Error::Submission(
            "the GPU device is no longer usable".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug)]
pub struct FrameScheduler {
    bundle: RenderBundle,
    start: Instant,
    stop: StopHandle,
    frames: u64,
}

impl FrameScheduler {
    pub fn new(bundle: RenderBundle) -> Self {
        Self {
            bundle,
            start: Instant::now(),
            stop: StopHandle::default(),
            frames: 0,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn bundle(&self) -> &RenderBundle {
        &self.bundle
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Milliseconds since the scheduler was created.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Draw one frame to the window surface and present it.
    pub fn tick(&mut self, ctx: &mut Context) -> Result<Tick> {
        if self.stop.is_stopped() {
            return Ok(Tick::Stopped);
        }
        ensure_healthy(&ctx.health)?;
        if !ctx.is_surface_configured() {
            return Ok(Tick::Skipped);
        }

        let elapsed_ms = self.elapsed_ms();
        self.update(&ctx.queue, elapsed_ms);

        let output = match ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                ctx.reconfigure();
                return Ok(Tick::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out waiting for a surface texture, skipping frame");
                return Ok(Tick::Skipped);
            }
            Err(err) => {
                log::error!("Unable to render {err}");
                return Err(Error::Submission(err.to_string()));
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = self.submit(&ctx.device, &ctx.queue, &view, elapsed_ms);
        ctx.window.pre_present_notify();
        output.present();
        Ok(Tick::Presented(frame))
    }

    /// Draw one frame at `elapsed_ms` into `view` without presenting.
    pub fn render_to(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        elapsed_ms: f64,
    ) -> SubmittedFrame {
        self.update(queue, elapsed_ms);
        self.submit(device, queue, view, elapsed_ms)
    }

    /// Follow a window resize. Zero sizes are ignored; the new screen size
    /// reaches the device with the next tick's uniform write.
    pub fn resize(&mut self, ctx: &mut Context, width: u32, height: u32) {
        if ctx.resize(width, height) {
            self.bundle.resize([width, height]);
        }
    }

    fn update(&mut self, queue: &wgpu::Queue, elapsed_ms: f64) {
        self.bundle.animate(elapsed_ms);
        self.bundle.write_uniforms(queue);
    }

    fn submit(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        elapsed_ms: f64,
    ) -> SubmittedFrame {
        let commands = render::frame_commands();
        let buffer = render::record_frame(device, &self.bundle, view, &commands);
        let submission = queue.submit(iter::once(buffer));
        self.frames += 1;
        log::trace!("frame {} submitted at {elapsed_ms:.1} ms", self.frames);
        SubmittedFrame {
            elapsed_ms,
            commands,
            submission,
        }
    }
}
