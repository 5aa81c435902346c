use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use winit::window::Window;

use crate::error::{ResourceError, Result};

/// Set by the device callbacks when the device can no longer be trusted.
#[derive(Clone, Debug, Default)]
pub struct DeviceHealth(Arc<AtomicBool>);

impl DeviceHealth {
    pub fn mark_lost(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_lost(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Route device loss and uncaptured errors of `device` into this flag.
    pub fn watch(&self, device: &wgpu::Device) {
        let lost = self.clone();
        device.set_device_lost_callback(move |reason, message| {
            log::error!("GPU device lost ({reason:?}): {message}");
            lost.mark_lost();
        });
        let failed = self.clone();
        device.on_uncaptured_error(Box::new(move |err: wgpu::Error| {
            log::error!("uncaptured GPU error: {err}");
            failed.mark_lost();
        }));
    }
}

/// The window, the device and the surface presenting into the window.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub health: DeviceHealth,
    is_surface_configured: bool,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        // physical pixels, already scaled by the device pixel ratio
        let size = window.inner_size();

        log::warn!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(ResourceError::from)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(ResourceError::from)?;
        log::info!("adapter: {:?}", adapter.get_info());

        log::warn!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(ResourceError::from)?;

        let health = DeviceHealth::default();
        health.watch(&device);

        log::warn!("Surface");
        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders output linear colour and rely on an sRGB target for the
        // conversion, otherwise everything comes out too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(ResourceError::UnsupportedSurface)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let mut ctx = Self {
            window,
            surface,
            device,
            queue,
            config,
            health,
            is_surface_configured: false,
        };
        ctx.resize(size.width, size.height);
        Ok(ctx)
    }

    /// Reconfigure the surface. Zero sized requests (minimised windows, a
    /// canvas that is not laid out yet) are ignored and return `false`.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.is_surface_configured = true;
        log::info!("surface configured at {width}x{height}");
        true
    }

    /// Configure the surface again at its current size, after `Lost`/`Outdated`.
    pub fn reconfigure(&mut self) {
        let (width, height) = (self.config.width, self.config.height);
        self.resize(width, height);
    }

    pub fn is_surface_configured(&self) -> bool {
        self.is_surface_configured
    }

    pub fn surface_size(&self) -> [u32; 2] {
        [self.config.width, self.config.height]
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_is_shared_between_clones() {
        let health = DeviceHealth::default();
        let callback_side = health.clone();
        assert!(!health.is_lost());
        callback_side.mark_lost();
        assert!(health.is_lost());
    }
}
