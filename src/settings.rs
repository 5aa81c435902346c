//! Start-up configuration.
//!
//! There are no config files or environment variables; the embedding
//! application builds a [`Settings`] in code. [`Settings::default`] renders the
//! bundled demo map.

use cgmath::Vector2;

use crate::animation::DEFAULT_TIME_SCALE_MS;

/// Paths of every asset, relative to [`Settings::asset_root`].
#[derive(Clone, Debug, PartialEq)]
pub struct AssetPaths {
    pub map: String,
    pub tileset: String,
    pub sprite: String,
    pub tilemap_shader: String,
    pub sprite_shader: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            map: "tilemaps/map.tmj".to_string(),
            tileset: "textures/overworld.png".to_string(),
            sprite: "textures/sprite.png".to_string(),
            tilemap_shader: "shaders/tilemap.wgsl".to_string(),
            sprite_shader: "shaders/sprite.wgsl".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub title: String,
    /// Initial logical window size; the surface is this times the scale factor.
    pub window_size: [u32; 2],
    pub clear_colour: wgpu::Color,
    /// Directory on disk (native) or path below the page origin (web).
    pub asset_root: String,
    pub assets: AssetPaths,
    /// Fixed top left corner of the sprite's movement box. `None` centers the
    /// box and follows window resizes.
    pub sprite_anchor: Option<Vector2<f32>>,
    /// Divisor applied to the elapsed milliseconds before `sin`/`cos`.
    pub time_scale_ms: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "nostalgia".to_string(),
            window_size: [640, 480],
            clear_colour: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.05,
                a: 1.0,
            },
            asset_root: default_asset_root(),
            assets: AssetPaths::default(),
            sprite_anchor: None,
            time_scale_ms: DEFAULT_TIME_SCALE_MS,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_asset_root() -> String {
    std::path::Path::new("./")
        .join("assets")
        .to_string_lossy()
        .into_owned()
}

#[cfg(target_arch = "wasm32")]
fn default_asset_root() -> String {
    "assets".to_string()
}

impl Settings {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = [width, height];
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: wgpu::Color) -> Self {
        self.clear_colour = clear_colour;
        self
    }

    pub fn with_asset_root(mut self, root: &str) -> Self {
        self.asset_root = root.to_string();
        self
    }

    pub fn with_assets(mut self, assets: AssetPaths) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_sprite_anchor(mut self, anchor: Vector2<f32>) -> Self {
        self.sprite_anchor = Some(anchor);
        self
    }

    /// Set the time scale. Values that are not positive and finite would stall
    /// or blank the sprite; they are logged and the current value is kept.
    pub fn with_time_scale_ms(mut self, time_scale_ms: f32) -> Self {
        if time_scale_ms > 0.0 && time_scale_ms.is_finite() {
            self.time_scale_ms = time_scale_ms;
        } else {
            log::warn!("ignoring time scale {time_scale_ms} ms, keeping {}", self.time_scale_ms);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_bundled_assets() {
        let settings = Settings::default();
        assert!(settings.asset_root.ends_with("assets"));
        assert_eq!(settings.assets.map, "tilemaps/map.tmj");
        assert_eq!(settings.time_scale_ms, DEFAULT_TIME_SCALE_MS);
        assert_eq!(settings.sprite_anchor, None);
    }

    #[test]
    fn builders_override_fields() {
        let settings = Settings::default()
            .with_title("demo")
            .with_window_size(800, 600)
            .with_clear_colour(wgpu::Color::WHITE)
            .with_sprite_anchor(Vector2::new(10.0, 20.0));
        assert_eq!(settings.title, "demo");
        assert_eq!(settings.window_size, [800, 600]);
        assert_eq!(settings.clear_colour, wgpu::Color::WHITE);
        assert_eq!(settings.sprite_anchor, Some(Vector2::new(10.0, 20.0)));
    }

    #[test]
    fn time_scale_must_be_positive() {
        let settings = Settings::default().with_time_scale_ms(2500.0);
        assert_eq!(settings.time_scale_ms, 2500.0);

        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let settings = Settings::default().with_time_scale_ms(bad);
            assert_eq!(settings.time_scale_ms, DEFAULT_TIME_SCALE_MS, "time scale {bad}");
        }
    }
}
