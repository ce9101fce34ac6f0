//! Scalar and vector helpers with GLSL semantics.

use glam::{Vec3, Vec4};

/// Hermite interpolation between two edges, identical to GLSL `smoothstep`.
///
/// Reversed edges (`edge0 > edge1`) are allowed and produce a falling ramp.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// `x * (1 - a) + y * a`, the GLSL definition (not `x + (y - x) * a`).
pub fn mix(x: f32, y: f32, a: f32) -> f32 {
    x * (1.0 - a) + y * a
}

pub fn mix3(x: Vec3, y: Vec3, a: f32) -> Vec3 {
    x * (1.0 - a) + y * a
}

pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Decodes one sRGB-encoded channel to linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encodes one linear channel with the approximate sRGB curve the cloud
/// shader uses (exponent 0.41666).
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        c.powf(0.41666) * 1.055 - 0.055
    }
}

/// Applies [`linear_to_srgb`] to the colour channels, leaving alpha alone.
pub fn linear_to_srgb4(value: Vec4) -> Vec4 {
    Vec4::new(
        linear_to_srgb(value.x),
        linear_to_srgb(value.y),
        linear_to_srgb(value.z),
        value.w,
    )
}

/// Converts an 8-bit sRGB hex triple (e.g. `#798aa0`) to linear floats.
pub fn hex_to_linear(rgb: [u8; 3]) -> Vec3 {
    Vec3::new(
        srgb_to_linear(rgb[0] as f32 / 255.0),
        srgb_to_linear(rgb[1] as f32 / 255.0),
        srgb_to_linear(rgb[2] as f32 / 255.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_clamps_and_hits_midpoint() {
        assert_eq!(smoothstep(0.0, 1.0, -3.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 4.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn reversed_smoothstep_falls() {
        assert_eq!(smoothstep(0.7, 0.5, 0.4), 1.0);
        assert_eq!(smoothstep(0.7, 0.5, 0.8), 0.0);
        assert!(smoothstep(0.7, 0.5, 0.55) > smoothstep(0.7, 0.5, 0.65));
    }

    #[test]
    fn mix_with_zero_weight_is_exact() {
        let x = 0.123_456_7;
        assert_eq!(mix(x, 1e6, 0.0), x);
    }

    #[test]
    fn srgb_round_trip_is_close() {
        for step in 0..=20 {
            let c = step as f32 / 20.0;
            let back = srgb_to_linear(linear_to_srgb(c));
            assert!((back - c).abs() < 2e-3, "{c} -> {back}");
        }
    }
}
