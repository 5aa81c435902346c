//! Error types for map loading, GPU setup and the frame loop.
//!
//! Library code returns [`Error`]; the application shell converts it into
//! `anyhow::Error` at the boundary.

use crate::layout::LayoutMismatch;

/// Top level error of the renderer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An asset could not be fetched from disk or over the network.
    #[error("could not fetch `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A map description or bitmap is malformed.
    #[error("could not decode asset: {0}")]
    Decode(#[from] DecodeError),
    /// No usable GPU device or surface.
    #[error("GPU setup failed: {0}")]
    Resource(#[from] ResourceError),
    /// The driver rejected a shader module or the pipeline built from it.
    #[error("shader `{label}` failed to compile: {message}")]
    ShaderCompile { label: String, message: String },
    /// A bind group does not match the layout its pipeline declares.
    #[error("bind group does not match pipeline layout: {0}")]
    LayoutMismatch(#[from] LayoutMismatch),
    /// The device was lost or the surface became unusable mid-loop.
    #[error("frame submission failed: {0}")]
    Submission(String),
}

/// Structural problems in a map description or an image blob.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid map JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map has no tile layers")]
    NoLayers,
    #[error("layer {layer} has no width/height and the map declares none")]
    MissingDimensions { layer: usize },
    #[error("layer {layer} is {found:?} tiles but layer 0 is {expected:?}")]
    LayerDimensions {
        layer: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("layer {layer} holds {found} tiles, expected {expected}")]
    LayerData {
        layer: usize,
        expected: usize,
        found: usize,
    },
    #[error("layer {layer} data is not a plain array of tile ids")]
    UnsupportedEncoding { layer: usize },
    #[error("layer {layer} has a zero dimension ({width}x{height})")]
    EmptyLayer { layer: usize, width: u32, height: u32 },
    #[error("map of {width}x{height} tiles with {layers} layers is too large")]
    MapTooLarge { width: u32, height: u32, layers: usize },
    #[error("tile size {width}x{height} must be non-zero")]
    TileSize { width: u32, height: u32 },
    #[error("invalid image: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures while acquiring the GPU device and presentation surface.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("texture `{label}` is {width}x{height}, the device allows 1 to {limit} per side")]
    TextureSize {
        label: String,
        width: u32,
        height: u32,
        limit: u32,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
