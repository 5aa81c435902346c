//! Application shell and event loop.
//!
//! [`run`] opens a window and drives the renderer from winit's event loop:
//!
//! 1. `resumed` creates the window and starts the startup tasks: device
//!    acquisition, the map, both shaders and both bitmaps are fetched
//!    concurrently and joined in [`startup`]
//! 2. the [`RenderBundle`] is built from the joined assets
//! 3. every `RedrawRequested` runs one [`FrameScheduler::tick`] and requests
//!    the next redraw
//!
//! Natively the startup future is driven to completion on a tokio runtime. On
//! the web it is spawned on the browser's executor and the result comes back
//! to the loop as an [`AppEvent`].

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    bundle::{Assets, RenderBundle, RenderTarget},
    context::Context,
    error::{Error, ResourceError, Result},
    resources::{load_binary, load_map, load_string},
    scheduler::{FrameScheduler, Tick},
    settings::Settings,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// The running renderer: GPU context plus the scheduler owning all resources.
#[derive(Debug)]
pub struct AppState {
    pub ctx: Context,
    pub scheduler: FrameScheduler,
}

/// Join every startup task, then build the render bundle.
///
/// The first failing task aborts the join and its error is returned.
pub async fn startup(window: Arc<Window>, settings: Settings) -> Result<AppState> {
    let root = settings.asset_root.as_str();
    let paths = &settings.assets;
    let (ctx, map, tilemap_shader, sprite_shader, tileset_png, sprite_png) = futures::try_join!(
        Context::new(window),
        load_map(root, &paths.map),
        load_string(root, &paths.tilemap_shader),
        load_string(root, &paths.sprite_shader),
        load_binary(root, &paths.tileset),
        load_binary(root, &paths.sprite),
    )?;
    log::info!("startup tasks joined");

    let [width, height] = ctx.surface_size();
    let target = RenderTarget {
        format: ctx.config.format,
        size: [width.max(1), height.max(1)],
    };
    let assets = Assets {
        map,
        tilemap_shader,
        sprite_shader,
        tileset_png,
        sprite_png,
    };
    let bundle = RenderBundle::new(&ctx.device, &ctx.queue, target, assets, &settings).await?;
    Ok(AppState {
        ctx,
        scheduler: FrameScheduler::new(bundle),
    })
}

#[derive(Debug)]
pub enum AppEvent {
    /// Result of the startup tasks spawned on the web.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Initialized(Result<AppState>),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    settings: Settings,
    state: Option<AppState>,
    started: bool,
    failure: Option<Error>,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, settings: Settings) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            settings,
            state: None,
            started: false,
            failure: None,
        })
    }

    fn on_initialized(&mut self, event_loop: &ActiveEventLoop, result: Result<AppState>) {
        match result {
            Ok(mut state) => {
                // the canvas may only have been laid out after startup began
                let size = state.ctx.window.inner_size();
                state
                    .scheduler
                    .resize(&mut state.ctx, size.width, size.height);
                state.ctx.window.request_redraw();
                log::info!("renderer ready");
                self.state = Some(state);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        log::error!("{err}");
        if let Some(state) = &self.state {
            state.scheduler.stop_handle().stop();
        }
        self.failure = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes()
            .with_title(self.settings.title.as_str())
            .with_inner_size(LogicalSize::new(
                self.settings.window_size[0],
                self.settings.window_size[1],
            ));

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, ResourceError::from(err).into());
                return;
            }
        };

        let init_future = startup(window, self.settings.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let result = self.async_runtime.block_on(init_future);
            self.on_initialized(event_loop, result);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = init_future.await;
                if proxy.send_event(AppEvent::Initialized(result)).is_err() {
                    log::error!("event loop closed before startup finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(result) => self.on_initialized(event_loop, result),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                state.scheduler.stop_handle().stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state
                    .scheduler
                    .resize(&mut state.ctx, size.width, size.height)
            }
            WindowEvent::RedrawRequested => match state.scheduler.tick(&mut state.ctx) {
                Ok(Tick::Stopped) => event_loop.exit(),
                Ok(Tick::Skipped | Tick::Presented(_)) => state.ctx.window.request_redraw(),
                Err(err) => self.fail(event_loop, err),
            },
            _ => {}
        }
    }
}

/// Open a window and render until it is closed.
///
/// Errors from startup or from the frame loop are logged and returned.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, settings)?;

    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
