//! Reference implementation of the cloud fragment program.
//!
//! `shaders/cloud.frag` runs the same march per pixel on the GPU; the CPU
//! copy here backs still export and pins the behaviour down in tests.

use glam::{Vec3, Vec4};

use crate::glsl::{hex_to_linear, linear_to_srgb4, smoothstep};

/// Radius of the bounding sphere the proxy mesh draws.
pub const SPHERE_RADIUS: f32 = 0.5;

/// Colour the accumulator starts from, sRGB `#798aa0`.
pub const BASE_COLOR_HEX: [u8; 3] = [0x79, 0x8a, 0xa0];

const MAGENTA_TINT: Vec3 = Vec3::new(1.0, 0.2, 0.9);
const DEEP_BLUE: Vec3 = Vec3::new(0.0, 0.0, 0.5);
const SHADING_STEP: f32 = 0.01;
const MIN_BLUR: f32 = 0.1;
const OPAQUE_ENOUGH: f32 = 0.95;

/// Anything the march can read densities from.
pub trait DensityField {
    /// Density in `[0, 1]` at a normalized texture coordinate.
    fn density(&self, p: Vec3) -> f32;

    /// Texels along one edge; sets the jitter and blur tap spacing.
    fn resolution(&self) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudParams {
    pub threshold: f32,
    pub range: f32,
    pub opacity: f32,
    pub steps: f32,
    pub blur_strength: f32,
    pub frame: u32,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            threshold: 0.25,
            range: 0.15,
            opacity: 0.25,
            steps: 87.0,
            blur_strength: 3.1,
            frame: 0,
        }
    }
}

/// One primary ray in the volume's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySetup {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Window pixel the ray belongs to, origin at the top left.
    pub frag_coord: (u32, u32),
}

impl RaySetup {
    /// Ray from the local-space eye through a point on the proxy surface.
    pub fn through(eye: Vec3, surface_point: Vec3, frag_coord: (u32, u32)) -> Self {
        Self {
            origin: eye,
            direction: surface_point - eye,
            frag_coord,
        }
    }
}

/// Both roots of the ray/sphere quadratic, or `None` when the ray misses.
pub fn hit_sphere(origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
    let a = dir.dot(dir);
    let b = 2.0 * origin.dot(dir);
    let c = origin.dot(origin) - SPHERE_RADIUS * SPHERE_RADIUS;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || a == 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    Some(((-b - root) / (2.0 * a), (-b + root) / (2.0 * a)))
}

/// The marched span `[t_near, t_far]`, with `t_near` clamped to the origin.
pub fn ray_bounds(origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
    let (near, far) = hit_sphere(origin, dir)?;
    if near > far || far < 0.0 {
        return None;
    }
    Some((near.max(0.0), far))
}

pub fn wang_hash(seed: u32) -> u32 {
    let mut seed = (seed ^ 61) ^ (seed >> 16);
    seed = seed.wrapping_mul(9);
    seed ^= seed >> 4;
    seed = seed.wrapping_mul(0x27d4_eb2d);
    seed ^ (seed >> 15)
}

/// Per-pixel start offset in `[-1, 1)`, in units of one texel.
pub fn jitter_offset(frag_coord: (u32, u32), frame: u32) -> f32 {
    let seed = frag_coord
        .0
        .wrapping_mul(1973)
        .wrapping_add(frag_coord.1.wrapping_mul(9277))
        .wrapping_add(frame.wrapping_mul(26699));
    (wang_hash(seed) as f64 / 4_294_967_296.0) as f32 * 2.0 - 1.0
}

/// Slow wander of the sampling coordinates.
pub fn drift(frame: u32) -> Vec3 {
    let f = frame as f32;
    Vec3::new(
        (f * 0.01).sin() * 0.1,
        (f * 0.007).cos() * 0.08,
        (f * 0.013).sin() * 0.06,
    )
}

/// Box-filtered density: eight corner taps `texel · blur · 2` away, or a
/// single lookup when the blur is negligible.
pub fn sample_blurred<F: DensityField + ?Sized>(field: &F, p: Vec3, blur: f32) -> f32 {
    if blur < MIN_BLUR {
        return field.density(p);
    }
    let o = blur * 2.0 / field.resolution();
    let mut sum = 0.0;
    for dz in [-o, o] {
        for dy in [-o, o] {
            for dx in [-o, o] {
                sum += field.density(p + Vec3::new(dx, dy, dz));
            }
        }
    }
    sum / 8.0
}

fn shading<F: DensityField + ?Sized>(field: &F, coord: Vec3) -> f32 {
    field.density(coord - Vec3::splat(SHADING_STEP)) - field.density(coord + Vec3::splat(SHADING_STEP))
}

fn zone_color(p: Vec3) -> Vec3 {
    if smoothstep(0.45, 0.5, p.length()) > 0.5 {
        MAGENTA_TINT
    } else {
        DEEP_BLUE
    }
}

/// Front-to-back composite along one ray.
///
/// Returns the sRGB-encoded colour with straight alpha, or `None` where the
/// fragment program discards.
pub fn march<F: DensityField + ?Sized>(
    ray: &RaySetup,
    params: &CloudParams,
    field: &F,
) -> Option<Vec4> {
    let dir = ray.direction.try_normalize()?;
    let (t_near, t_far) = ray_bounds(ray.origin, dir)?;

    let steps = params.steps.max(1.0);
    let delta = dir.abs().recip().min_element() / steps;

    let mut p = ray.origin + dir * t_near;
    p += dir * jitter_offset(ray.frag_coord, params.frame) / field.resolution();

    let offset = drift(params.frame);
    let low = params.threshold - params.range;
    let high = params.threshold + params.range;

    let mut acc = hex_to_linear(BASE_COLOR_HEX).extend(0.0);
    let mut t = t_near;
    while t < t_far {
        let q = p + Vec3::splat(0.5);
        let d = sample_blurred(field, q + offset, params.blur_strength);
        let alpha = smoothstep(low, high, d) * params.opacity;

        let intensity = shading(field, q) * 2.0 + 0.3;
        let color = zone_color(p) * intensity;

        let remaining = 1.0 - acc.w;
        acc += (color * remaining * alpha).extend(remaining * alpha);
        if acc.w >= OPAQUE_ENOUGH {
            break;
        }
        p += dir * delta;
        t += delta;
    }

    let out = linear_to_srgb4(acc);
    (out.w != 0.0).then_some(out)
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::volume::{NoiseVolume, VolumeSpec};

    struct Uniform(f32);

    impl DensityField for Uniform {
        fn density(&self, _: Vec3) -> f32 {
            self.0
        }

        fn resolution(&self) -> f32 {
            128.0
        }
    }

    fn centre_ray() -> RaySetup {
        RaySetup::through(Vec3::new(0.0, 0.0, 1.5), Vec3::new(0.0, 0.0, -0.5), (10, 20))
    }

    #[test]
    fn wang_hash_matches_reference_values() {
        assert_eq!(wang_hash(0), 3_232_319_850);
        assert_eq!(wang_hash(1), 663_891_101);
    }

    #[test]
    fn jitter_stays_in_signed_unit_range() {
        for frame in 0..64 {
            let r = jitter_offset((frame * 7, frame * 13), frame);
            assert!((-1.0..1.0).contains(&r), "{r}");
        }
    }

    #[test]
    fn missing_ray_discards() {
        let ray = RaySetup::through(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 2.0, 2.0), (0, 0));
        assert!(hit_sphere(ray.origin, ray.direction.normalize()).is_none());
        assert!(march(&ray, &CloudParams::default(), &Uniform(1.0)).is_none());
    }

    #[test]
    fn sphere_behind_the_eye_discards() {
        let ray = RaySetup {
            origin: Vec3::new(0.0, 0.0, 2.0),
            direction: Vec3::Z,
            frag_coord: (0, 0),
        };
        assert!(hit_sphere(ray.origin, ray.direction).is_some());
        assert!(ray_bounds(ray.origin, ray.direction).is_none());
        assert!(march(&ray, &CloudParams::default(), &Uniform(1.0)).is_none());
    }

    #[test]
    fn eye_inside_the_volume_still_marches() {
        let (near, far) = ray_bounds(Vec3::ZERO, Vec3::X).expect("inside");
        assert_eq!(near, 0.0);
        assert!((far - 0.5).abs() < 1e-6);
        let ray = RaySetup {
            origin: Vec3::ZERO,
            direction: Vec3::X,
            frag_coord: (3, 4),
        };
        assert!(march(&ray, &CloudParams::default(), &Uniform(1.0)).is_some());
    }

    #[test]
    fn zero_opacity_discards() {
        let params = CloudParams {
            opacity: 0.0,
            ..CloudParams::default()
        };
        assert!(march(&centre_ray(), &params, &Uniform(1.0)).is_none());
    }

    #[test]
    fn empty_field_discards() {
        assert!(march(&centre_ray(), &CloudParams::default(), &Uniform(0.0)).is_none());
    }

    #[test]
    fn dense_field_stops_after_crossing_the_opacity_cutoff() {
        // Density 0.6 saturates the 0.1..0.4 ramp, so every step adds 0.25.
        let out = march(&centre_ray(), &CloudParams::default(), &Uniform(0.6)).expect("hit");
        let expected = 1.0 - 0.75f32.powi(11);
        assert!((out.w - expected).abs() < 1e-5, "{}", out.w);
    }

    #[test]
    fn zero_steps_are_floored() {
        let params = CloudParams {
            steps: 0.0,
            ..CloudParams::default()
        };
        let out = march(&centre_ray(), &params, &Uniform(0.6)).expect("hit");
        assert!(out.w.is_finite() && out.w > 0.0);
    }

    fn default_volume() -> &'static NoiseVolume {
        static VOLUME: OnceLock<NoiseVolume> = OnceLock::new();
        VOLUME.get_or_init(|| NoiseVolume::generate(&VolumeSpec::default()).expect("volume"))
    }

    #[test]
    fn default_scenario_centre_pixel_saturates() {
        let params = CloudParams {
            frame: 42,
            ..CloudParams::default()
        };
        let out = march(&centre_ray(), &params, default_volume()).expect("centre ray hits");
        let expected = Vec4::new(0.478_419, 0.541_846, 0.753_170, 0.957_029);
        assert!(out.abs_diff_eq(expected, 1e-4), "{out:?}");
        assert!(out.w >= OPAQUE_ENOUGH && out.w < 1.0);
    }

    #[test]
    fn default_scenario_thin_edge_runs_to_the_far_side() {
        let ray = RaySetup::through(Vec3::new(0.0, 0.0, 1.5), Vec3::new(0.38, 0.3, 0.0), (5, 5));
        let out = march(&ray, &CloudParams::default(), default_volume()).expect("edge ray hits");
        let expected = Vec4::new(0.479_445, 0.542_022, 0.631_843, 0.020_709);
        assert!(out.abs_diff_eq(expected, 1e-4), "{out:?}");
    }

    #[test]
    fn default_scenario_miss_discards() {
        let ray = RaySetup::through(Vec3::new(0.0, 0.0, 1.5), Vec3::new(0.6, 0.0, 0.0), (0, 0));
        assert!(march(&ray, &CloudParams::default(), default_volume()).is_none());
    }

    #[test]
    fn blur_below_cutoff_is_a_single_lookup() {
        let volume = NoiseVolume::generate(&VolumeSpec::new(16, 0.3)).expect("volume");
        let p = Vec3::splat(0.4);
        assert_eq!(sample_blurred(&volume, p, 0.05), volume.density(p));
        let blurred = sample_blurred(&volume, p, 3.0);
        assert!((0.0..=1.0).contains(&blurred));
    }
}
