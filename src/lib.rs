//! nostalgia
//!
//! Renders a layered 2D tile map with a moving sprite composited on top,
//! natively and in the browser (WebGL through wgpu). Each frame is one render
//! pass with two draws into the same colour target: a full screen quad that
//! composites every map layer, then the sprite quad.
//!
//! High-level modules
//! - `app`: winit event loop, startup join and frame pacing
//! - `context`: device, queue and the window surface
//! - `bundle`: every GPU resource of the two draws
//! - `scheduler`: the per-frame update and submit
//! - `render`: the frame's command list and its replay onto a render pass
//! - `pipelines`: the tile map and sprite pipelines
//! - `layout`: host side bind group layouts and their validation
//! - `animation`: sprite movement as a function of time
//! - `data_structures`: tile map, textures and uniforms
//! - `resources`: asset fetching and map loading
//! - `settings`: start-up configuration
//! - `error`: error types
//!

pub mod animation;
pub mod app;
pub mod bundle;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod layout;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scheduler;
pub mod settings;

pub use app::run;
pub use error::{Error, Result};
pub use settings::Settings;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> std::result::Result<(), JsValue> {
    run(Settings::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}
