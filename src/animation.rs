//! The sprite's movement as a pure function of time.
//!
//! No state is accumulated between frames, so any timestamp can be replayed.
//! Time is kept in `f64` milliseconds and only narrowed once it has been
//! reduced to a single period, so the motion stays smooth however long the
//! loop runs.

use std::f64::consts::TAU;

use cgmath::Vector2;

/// Milliseconds by which the time is divided before entering `sin`/`cos`.
pub const DEFAULT_TIME_SCALE_MS: f32 = 5000.0;

/// Milliseconds the background takes to scroll by one pixel. The inverse of
/// `SCROLL_SPEED` in `tilemap.wgsl`.
pub const SCROLL_MS_PER_PX: f64 = 100.0;

/// Full period of the movement for a given time scale, in milliseconds.
pub fn period_ms(time_scale_ms: f32) -> f64 {
    TAU * f64::from(time_scale_ms)
}

/// Offset of the sprite from its anchor at `t_ms` milliseconds.
///
/// `offset_x = (sin(t/scale)+1)/2 * (screen_width/2 - sprite_width)` and
/// `offset_y = (cos(t/scale)+1)/2 * (screen_height/2 - sprite_height)`.
/// A negative span (screen smaller than twice the sprite) is clamped to zero.
/// A time scale that is not a positive number holds the sprite at its time
/// zero position.
pub fn sprite_offset(
    t_ms: f64,
    time_scale_ms: f32,
    screen: Vector2<f32>,
    sprite: Vector2<f32>,
) -> Vector2<f32> {
    let span = movement_span(screen, sprite);
    let scale = f64::from(time_scale_ms);
    let phase = if scale > 0.0 && scale.is_finite() {
        (t_ms / scale) % TAU
    } else {
        0.0
    };
    Vector2::new(
        ((phase.sin() + 1.0) / 2.0) as f32 * span.x,
        ((phase.cos() + 1.0) / 2.0) as f32 * span.y,
    )
}

/// Largest offset the sprite can reach on each axis.
pub fn movement_span(screen: Vector2<f32>, sprite: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(
        (screen.x / 2.0 - sprite.x).max(0.0),
        (screen.y / 2.0 - sprite.y).max(0.0),
    )
}

/// `t_ms` reduced to one scroll cycle of a map `map_width_px` pixels wide.
///
/// The background wraps after scrolling by the map's width, so the shader
/// sees the same picture for the reduced time and the value stays small
/// enough for an `f32` uniform.
pub fn scroll_time_ms(t_ms: f64, map_width_px: f64) -> f32 {
    let cycle = map_width_px * SCROLL_MS_PER_PX;
    if cycle > 0.0 {
        (t_ms % cycle) as f32
    } else {
        t_ms as f32
    }
}
