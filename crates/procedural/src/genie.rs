//! Reference implementation of the genie reveal transition.
//!
//! At `progress = 0` the picture is squeezed into a small frame near the
//! bottom of the plane; at `progress = 1` it fills the plane untouched. The
//! sides of the squeezed frame bow inwards along a sine so the motion reads
//! like a genie leaving a lamp.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::glsl::{mix, smoothstep};

const BOTTOM_POS: f32 = 0.5;
const BOTTOM_THICKNESS: f32 = 0.1;
const MINI_FRAME_THICKNESS: f32 = 0.1;
const MINI_FRAME_POS: Vec2 = Vec2::new(0.5 - MINI_FRAME_THICKNESS * 0.5, 0.1);

const GLINT_LINE_WIDTH: f32 = 0.58;
const GLINT_GRADIENT: f32 = 3.0;
const GLINT_TINT: Vec3 = Vec3::new(0.3, 0.0, 0.0);
const GLINT_WHITE: Vec3 = Vec3::new(0.85, 0.85, 0.85);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenieParams {
    pub progress: f32,
    pub glint_intensity: f32,
    pub glint_progress: f32,
    /// Viewport size in pixels.
    pub resolution: Vec2,
}

impl Default for GenieParams {
    fn default() -> Self {
        Self {
            progress: 0.0,
            glint_intensity: 0.0,
            glint_progress: 0.0,
            resolution: Vec2::new(1280.0, 720.0),
        }
    }
}

/// Maps a plane UV to the UV the picture is read at.
///
/// Coordinates outside `[0, 1]²` fall outside the squeezed frame.
pub fn remap(uv: Vec2, progress: f32) -> Vec2 {
    let f = 1.0 - progress;
    let t = uv.y;
    // sin(π) rounds slightly negative; keep the base of the power in range.
    let bias = ((t * PI).sin() * 0.1).max(0.0).powf(0.9);

    let min_x_curve = mix(BOTTOM_POS - BOTTOM_THICKNESS / 2.0 + bias, 0.0, t);
    let max_x_curve = mix(BOTTOM_POS + BOTTOM_THICKNESS / 2.0 - bias, 1.0, t);
    let min = Vec2::new(
        mix(min_x_curve, MINI_FRAME_POS.x, f),
        mix(0.0, MINI_FRAME_POS.y, f),
    );
    let max = Vec2::new(
        mix(max_x_curve, MINI_FRAME_POS.x + MINI_FRAME_THICKNESS, f),
        mix(1.0, MINI_FRAME_POS.y + MINI_FRAME_THICKNESS, f),
    );

    let squeezed = (uv - min) / (max - min);
    uv * (1.0 - f) + squeezed * f
}

/// Letterboxes a remapped UV so the picture keeps a square aspect.
pub fn texture_uv(final_uv: Vec2, resolution: Vec2) -> Vec2 {
    let aspect = resolution.x / resolution.y;
    let mut uv = final_uv;
    if aspect > 1.0 {
        uv.x = (final_uv.x - 0.5) / aspect + 0.5;
    } else {
        uv.y = (final_uv.y - 0.5) * aspect + 0.5;
    }
    uv
}

/// Diagonal highlight band swept across the plane by `glint_progress`.
pub fn glint(uv: Vec2, glint_progress: f32) -> Vec3 {
    let x = uv.x - (glint_progress * 2.0 - 0.5);
    let y = x * GLINT_GRADIENT;
    let s = smoothstep(y - GLINT_LINE_WIDTH, y, uv.y) - smoothstep(y, y + GLINT_LINE_WIDTH, uv.y);
    GLINT_TINT * s + GLINT_WHITE * s
}

pub fn inside_unit_square(uv: Vec2) -> bool {
    (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
}

/// Shades one plane fragment, reading the picture through `source`.
///
/// `source` receives the aspect-corrected UV; alpha is always 1.
pub fn shade_with(uv: Vec2, params: &GenieParams, source: impl Fn(Vec2) -> Vec3) -> Vec3 {
    let final_uv = remap(uv, params.progress);
    if !inside_unit_square(final_uv) {
        return Vec3::ZERO;
    }
    let base = source(texture_uv(final_uv, params.resolution));
    base + glint(uv, params.glint_progress) * params.glint_intensity
}

/// Shades with the UV debug picture `(u, v, 0)`.
pub fn shade_uv_debug(uv: Vec2, params: &GenieParams) -> Vec3 {
    shade_with(uv, params, |tex| Vec3::new(tex.x, tex.y, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_progress_is_the_identity() {
        for (u, v) in [(0.0, 0.0), (0.13, 0.77), (0.5, 0.5), (1.0, 0.25), (0.9, 1.0)] {
            let uv = Vec2::new(u, v);
            assert!((remap(uv, 1.0) - uv).length() < 1e-6, "{uv:?}");
        }
    }

    #[test]
    fn collapsed_picture_sits_in_the_mini_frame() {
        let centre = remap(Vec2::new(0.5, 0.15), 0.0);
        assert!((centre - Vec2::new(0.5, 0.5)).length() < 1e-5);
        assert!(!inside_unit_square(remap(Vec2::new(0.5, 0.9), 0.0)));
        assert!(!inside_unit_square(remap(Vec2::new(0.1, 0.15), 0.0)));
    }

    #[test]
    fn outside_the_window_is_black_even_with_glint() {
        let params = GenieParams {
            progress: 0.0,
            glint_intensity: 1.0,
            glint_progress: 0.5,
            ..GenieParams::default()
        };
        assert_eq!(shade_uv_debug(Vec2::new(0.05, 0.9), &params), Vec3::ZERO);
    }

    #[test]
    fn landscape_aspect_compresses_u() {
        let uv = texture_uv(Vec2::new(1.0, 1.0), Vec2::new(200.0, 100.0));
        assert!((uv.x - 0.75).abs() < 1e-6);
        assert_eq!(uv.y, 1.0);
        let uv = texture_uv(Vec2::new(1.0, 1.0), Vec2::new(100.0, 200.0));
        assert_eq!(uv.x, 1.0);
        assert!((uv.y - 0.75).abs() < 1e-6);
    }

    #[test]
    fn glint_band_peaks_on_its_line() {
        let on_line = glint(Vec2::new(0.5, 0.0), 0.5);
        assert!(on_line.x > 1.1 && on_line.y > 0.8);
        assert_eq!(glint(Vec2::new(0.0, 1.0), 0.9), Vec3::ZERO);
    }

    #[test]
    fn debug_colour_at_full_progress_follows_uv() {
        let params = GenieParams {
            progress: 1.0,
            resolution: Vec2::new(100.0, 100.0),
            ..GenieParams::default()
        };
        let c = shade_uv_debug(Vec2::new(0.25, 0.75), &params);
        assert!((c - Vec3::new(0.25, 0.75, 0.0)).length() < 1e-6);
    }
}
