//! Reference implementation of the aurora material.

use glam::{Vec2, Vec3, Vec4};

use crate::glsl::{mix3, smoothstep};
use crate::noise::simplex2;

const EDGE_FADE: f32 = 0.1;
const DISPLACEMENT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuroraParams {
    pub time: f32,
    pub noise_scale: f32,
    pub noise_stretch: f32,
    pub noise_speed: f32,
    pub vertical_gradient_strength: f32,
    pub radial_gradient_strength: f32,
    pub green_intensity: f32,
    pub blue_intensity: f32,
    pub purple_intensity: f32,
    pub color_mix_speed1: f32,
    pub color_mix_speed2: f32,
    pub color_mix_frequency1: f32,
    pub color_mix_frequency2: f32,
    pub threshold: f32,
    pub blur: f32,
    pub overall_intensity: f32,
}

impl Default for AuroraParams {
    fn default() -> Self {
        Self {
            time: 0.0,
            noise_scale: 3.0,
            noise_stretch: 0.05,
            noise_speed: 0.5,
            vertical_gradient_strength: 1.0,
            radial_gradient_strength: 1.0,
            green_intensity: 0.8,
            blue_intensity: 1.0,
            purple_intensity: 1.0,
            color_mix_speed1: 0.3,
            color_mix_speed2: 0.5,
            color_mix_frequency1: 3.0,
            color_mix_frequency2: 2.0,
            threshold: 0.6,
            blur: 0.3,
            overall_intensity: 1.0,
        }
    }
}

/// Animated noise at a UV, remapped to `[0, 1]`.
pub fn noise_at(uv: Vec2, params: &AuroraParams) -> f32 {
    let p = Vec2::new(
        uv.x * params.noise_scale + params.time * params.noise_speed,
        uv.y * params.noise_scale * params.noise_stretch,
    );
    (simplex2(p) + 1.0) * 0.5
}

/// Fade towards the UV border and the corners. Zero on every edge.
pub fn edge_gradient(uv: Vec2) -> f32 {
    let sides = smoothstep(0.0, EDGE_FADE, uv.x)
        * smoothstep(0.0, EDGE_FADE, 1.0 - uv.x)
        * smoothstep(0.0, EDGE_FADE, uv.y)
        * smoothstep(0.0, EDGE_FADE, 1.0 - uv.y);
    let corner = smoothstep(0.7, 0.5, (uv - Vec2::splat(0.5)).length());
    sides * corner
}

/// Visibility of the curtain at `uv` for a given normalized noise value.
pub fn intensity_mask(uv: Vec2, noise: f32, params: &AuroraParams) -> f32 {
    let vertical = (1.0 - uv.y).powf(params.vertical_gradient_strength);
    let radial = (1.0 - (uv - Vec2::splat(0.5)).length()).powf(params.radial_gradient_strength);
    let visible = smoothstep(
        params.threshold - params.blur,
        params.threshold + params.blur,
        noise,
    );
    visible * vertical * radial * edge_gradient(uv)
}

/// Three-way palette blend driven by two sine oscillators.
pub fn palette(uv: Vec2, params: &AuroraParams) -> Vec3 {
    let green = Vec3::new(0.0, params.green_intensity, 0.4);
    let blue = Vec3::new(0.2, 0.6, params.blue_intensity);
    let purple = Vec3::new(params.purple_intensity, 0.2, 1.0);

    let m1 = (uv.x * params.color_mix_frequency1 + params.time * params.color_mix_speed1).sin()
        * 0.5
        + 0.5;
    let m2 = (uv.y * params.color_mix_frequency2 + params.time * params.color_mix_speed2).sin()
        * 0.5
        + 0.5;
    mix3(mix3(green, blue, m1), purple, m2)
}

/// Premultiplied colour and alpha for one fragment.
pub fn shade(uv: Vec2, params: &AuroraParams) -> Vec4 {
    let strength = intensity_mask(uv, noise_at(uv, params), params) * params.overall_intensity;
    (palette(uv, params) * strength).extend(strength)
}

/// Vertex ripple: pushes a local-space position along z.
pub fn displace(position: Vec3, params: &AuroraParams) -> Vec3 {
    let offset = params.time * params.noise_speed * 0.6;
    let p = position.truncate() * params.noise_scale * 0.5 + Vec2::splat(offset);
    position + Vec3::Z * simplex2(p) * DISPLACEMENT
}
