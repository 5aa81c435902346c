//! Host mirrors of the two uniform buffers.
//!
//! Both are eight `f32`s (32 bytes), matching the WGSL structs in
//! `assets/shaders`. The host copy is mutated first and then written whole
//! with `Queue::write_buffer` before the submit that draws with it, so a draw
//! never observes a partially written uniform.

use cgmath::Vector2;

use crate::data_structures::tilemap::TileMap;

/// Uniform of the tile map pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TilemapUniform {
    pub map_width: f32,
    pub map_height: f32,
    pub layer_count: f32,
    /// Atlas tile width in pixels, from the map's `tilewidth`.
    pub tile_width: f32,
    /// Milliseconds since the scheduler started, reduced to one scroll cycle.
    pub elapsed_time: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub tile_height: f32,
}

impl TilemapUniform {
    /// The time zero state for `map` drawn onto a `screen` sized target.
    pub fn new(map: &TileMap, screen: [u32; 2]) -> Self {
        let (tile_width, tile_height) = map.tile_size();
        Self {
            map_width: map.width() as f32,
            map_height: map.height() as f32,
            layer_count: map.layer_count() as f32,
            tile_width: tile_width as f32,
            elapsed_time: 0.0,
            screen_width: screen[0] as f32,
            screen_height: screen[1] as f32,
            tile_height: tile_height as f32,
        }
    }

    pub fn screen(&self) -> Vector2<f32> {
        Vector2::new(self.screen_width, self.screen_height)
    }

    pub fn set_screen(&mut self, screen: [u32; 2]) {
        self.screen_width = screen[0] as f32;
        self.screen_height = screen[1] as f32;
    }
}

/// Uniform of the sprite pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteUniform {
    /// Top left corner of the area the sprite moves in, in pixels.
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub sprite_width: f32,
    pub sprite_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// The two trailing slots carry the target size for the pixel to clip
    /// space transform in the vertex stage.
    pub screen_width: f32,
    pub screen_height: f32,
}

impl SpriteUniform {
    pub fn new(anchor: Vector2<f32>, sprite: [u32; 2], screen: [u32; 2]) -> Self {
        Self {
            anchor_x: anchor.x,
            anchor_y: anchor.y,
            sprite_width: sprite[0] as f32,
            sprite_height: sprite[1] as f32,
            offset_x: 0.0,
            offset_y: 0.0,
            screen_width: screen[0] as f32,
            screen_height: screen[1] as f32,
        }
    }

    pub fn screen(&self) -> Vector2<f32> {
        Vector2::new(self.screen_width, self.screen_height)
    }

    pub fn set_screen(&mut self, screen: [u32; 2]) {
        self.screen_width = screen[0] as f32;
        self.screen_height = screen[1] as f32;
    }

    pub fn sprite_size(&self) -> Vector2<f32> {
        Vector2::new(self.sprite_width, self.sprite_height)
    }

    pub fn set_anchor(&mut self, anchor: Vector2<f32>) {
        self.anchor_x = anchor.x;
        self.anchor_y = anchor.y;
    }

    pub fn set_offset(&mut self, offset: Vector2<f32>) {
        self.offset_x = offset.x;
        self.offset_y = offset.y;
    }
}

/// Anchor that centers the sprite's movement box on the screen.
///
/// The sprite moves within `[0, screen/2 - sprite]` of its anchor, so
/// starting a quarter screen in keeps it centered.
pub fn centered_anchor(screen: Vector2<f32>) -> Vector2<f32> {
    screen / 4.0
}
