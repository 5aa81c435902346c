use serde_json::json;

/// Root of the assets shipped with the crate.
pub const ASSET_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// A Tiled style map whose layers are given as `(width, height, data)`.
pub fn tilemap_json(layers: &[(u32, u32, Vec<u32>)]) -> String {
    let layers: Vec<_> = layers
        .iter()
        .enumerate()
        .map(|(idx, (width, height, data))| {
            json!({
                "name": format!("layer {idx}"),
                "type": "tilelayer",
                "width": width,
                "height": height,
                "data": data,
            })
        })
        .collect();
    json!({ "tilewidth": 16, "tileheight": 16, "layers": layers }).to_string()
}

/// `layers` layers of `width * height` zeros.
pub fn zero_map_json(width: u32, height: u32, layers: usize) -> String {
    let layer = (width, height, vec![0; (width * height) as usize]);
    tilemap_json(&vec![layer; layers])
}

/// A fresh directory below the system temp dir, unique per test name.
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("nostalgia-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(feature = "integration-tests")]
pub use gpu::*;

#[cfg(feature = "integration-tests")]
mod gpu {
    use nostalgia::{
        bundle::Assets,
        data_structures::tilemap::TileMap,
        resources::{load_binary, load_string},
        settings::AssetPaths,
    };

    use super::ASSET_ROOT;

    /// A device without a surface. `None` when the machine has no adapter.
    pub async fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    }

    /// The bundled shaders and bitmaps around `map`.
    pub async fn bundled_assets(map: TileMap) -> Assets {
        let paths = AssetPaths::default();
        Assets {
            map,
            tilemap_shader: load_string(ASSET_ROOT, &paths.tilemap_shader).await.unwrap(),
            sprite_shader: load_string(ASSET_ROOT, &paths.sprite_shader).await.unwrap(),
            tileset_png: load_binary(ASSET_ROOT, &paths.tileset).await.unwrap(),
            sprite_png: load_binary(ASSET_ROOT, &paths.sprite).await.unwrap(),
        }
    }

    /// Copy an RGBA8 texture back to the host. The width must give rows of a
    /// multiple of 256 bytes.
    pub async fn read_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
    ) -> Vec<u8> {
        let (width, height) = (texture.width(), texture.height());
        let bytes_per_row = width * 4;
        assert_eq!(bytes_per_row % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);

        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            size: (bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("readback buffer"),
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            texture.size(),
        );
        queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device.poll(wgpu::PollType::Wait).unwrap();
        rx.receive().await.unwrap().unwrap();

        let pixels = buffer_slice.get_mapped_range().to_vec();
        output_buffer.unmap();
        pixels
    }

    /// RGBA of the pixel at `(x, y)` in a tightly packed image `width` wide.
    pub fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let at = ((y * width + x) * 4) as usize;
        [pixels[at], pixels[at + 1], pixels[at + 2], pixels[at + 3]]
    }
}
