//! Baked 3D density volume for the cloud sketch.

use glam::Vec3;

use crate::noise::perlin3;
use crate::raymarch::DensityField;

/// Default cubic resolution of the cloud volume.
pub const DEFAULT_VOLUME_SIZE: u32 = 128;
/// Default noise frequency per cell.
pub const DEFAULT_NOISE_SCALE: f64 = 0.05;
/// Horizontal stretch applied to the x and z noise coordinates.
const HORIZONTAL_STRETCH: f64 = 1.5;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum VolumeError {
    #[error("volume size must be at least 1 (got {0})")]
    EmptySize(u32),
    #[error("volume size {0} exceeds the supported maximum of {max}", max = MAX_VOLUME_SIZE)]
    TooLarge(u32),
    #[error("noise scale must be finite and positive (got {0})")]
    InvalidScale(f64),
}

/// Largest edge length accepted by [`VolumeSpec::validate`]. 3D textures of
/// this size are guaranteed by the wgpu downlevel limits.
pub const MAX_VOLUME_SIZE: u32 = 256;

/// Parameters for [`NoiseVolume::generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSpec {
    pub size: u32,
    pub scale: f64,
}

impl Default for VolumeSpec {
    fn default() -> Self {
        Self {
            size: DEFAULT_VOLUME_SIZE,
            scale: DEFAULT_NOISE_SCALE,
        }
    }
}

impl VolumeSpec {
    pub fn new(size: u32, scale: f64) -> Self {
        Self { size, scale }
    }

    pub fn validate(&self) -> Result<(), VolumeError> {
        if self.size == 0 {
            return Err(VolumeError::EmptySize(self.size));
        }
        if self.size > MAX_VOLUME_SIZE {
            return Err(VolumeError::TooLarge(self.size));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(VolumeError::InvalidScale(self.scale));
        }
        Ok(())
    }
}

/// Radial weight of a cell: `1 - |(cell - size/2) / size|`.
///
/// Equals 1 at the centre cell and falls off linearly with distance; it
/// would reach 0 one full edge length away, so inside the grid the smallest
/// weight is at the corners (`1 - √3/2`).
pub fn falloff(size: u32, x: u32, y: u32, z: u32) -> f64 {
    let half = size as f64 / 2.0;
    let n = size as f64;
    let dx = (x as f64 - half) / n;
    let dy = (y as f64 - half) / n;
    let dz = (z as f64 - half) / n;
    1.0 - (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Density byte of one cell before it is stored.
///
/// The noise term is clamped to the byte range first, then weighted by the
/// squared falloff. The weight never exceeds 1, so the product always fits
/// a byte; it is truncated like a typed-array store.
pub fn cell_value(spec: &VolumeSpec, x: u32, y: u32, z: u32) -> u8 {
    let s = spec.scale;
    let noise = perlin3(
        x as f64 * s / HORIZONTAL_STRETCH,
        y as f64 * s,
        z as f64 * s / HORIZONTAL_STRETCH,
    );
    let base = (128.0 + 128.0 * noise).clamp(0.0, 255.0);
    let weight = falloff(spec.size, x, y, z);
    (base * weight * weight) as u8
}

/// Immutable N×N×N grid of density bytes, x-fastest.
#[derive(Clone)]
pub struct NoiseVolume {
    size: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for NoiseVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseVolume")
            .field("size", &self.size)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl NoiseVolume {
    /// Evaluates the noise at every cell. Runs in O(size³).
    pub fn generate(spec: &VolumeSpec) -> Result<Self, VolumeError> {
        spec.validate()?;
        let size = spec.size;
        let mut data = Vec::with_capacity((size as usize).pow(3));
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    data.push(cell_value(spec, x, y, z));
                }
            }
        }
        Ok(Self { size, data })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Raw bytes in upload order (`x + y·N + z·N²`).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32, z: u32) -> u8 {
        let n = self.size as usize;
        self.data[x as usize + y as usize * n + z as usize * n * n]
    }

    fn texel(&self, x: i64, y: i64, z: i64) -> f32 {
        let max = self.size as i64 - 1;
        self.get(
            x.clamp(0, max) as u32,
            y.clamp(0, max) as u32,
            z.clamp(0, max) as u32,
        ) as f32
            / 255.0
    }

    /// Trilinear lookup at normalized coordinates with clamp-to-edge
    /// addressing, matching a linearly filtered `R8Unorm` 3D texture.
    pub fn sample_linear(&self, p: Vec3) -> f32 {
        let n = self.size as f32;
        let coord = p * n - Vec3::splat(0.5);
        let base = coord.floor();
        let t = coord - base;
        let (x0, y0, z0) = (base.x as i64, base.y as i64, base.z as i64);

        let c000 = self.texel(x0, y0, z0);
        let c100 = self.texel(x0 + 1, y0, z0);
        let c010 = self.texel(x0, y0 + 1, z0);
        let c110 = self.texel(x0 + 1, y0 + 1, z0);
        let c001 = self.texel(x0, y0, z0 + 1);
        let c101 = self.texel(x0 + 1, y0, z0 + 1);
        let c011 = self.texel(x0, y0 + 1, z0 + 1);
        let c111 = self.texel(x0 + 1, y0 + 1, z0 + 1);

        let x00 = c000 + (c100 - c000) * t.x;
        let x10 = c010 + (c110 - c010) * t.x;
        let x01 = c001 + (c101 - c001) * t.x;
        let x11 = c011 + (c111 - c011) * t.x;
        let y0 = x00 + (x10 - x00) * t.y;
        let y1 = x01 + (x11 - x01) * t.y;
        y0 + (y1 - y0) * t.z
    }
}

impl DensityField for NoiseVolume {
    fn density(&self, p: Vec3) -> f32 {
        self.sample_linear(p)
    }

    fn resolution(&self) -> f32 {
        self.size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_specs() {
        assert_eq!(
            VolumeSpec::new(0, 0.05).validate(),
            Err(VolumeError::EmptySize(0))
        );
        assert_eq!(
            VolumeSpec::new(512, 0.05).validate(),
            Err(VolumeError::TooLarge(512))
        );
        assert!(matches!(
            VolumeSpec::new(8, f64::NAN).validate(),
            Err(VolumeError::InvalidScale(_))
        ));
        assert!(VolumeSpec::new(8, -1.0).validate().is_err());
    }

    #[test]
    fn centre_cell_has_full_weight() {
        assert_eq!(falloff(128, 64, 64, 64), 1.0);
        let spec = VolumeSpec::default();
        let noise = perlin3(64.0 * 0.05 / 1.5, 64.0 * 0.05, 64.0 * 0.05 / 1.5);
        let expected = (128.0 + 128.0 * noise).clamp(0.0, 255.0) as u8;
        assert_eq!(cell_value(&spec, 64, 64, 64), expected);
        assert_eq!(expected, 161);
    }

    #[test]
    fn weight_decreases_towards_the_shell() {
        let centre = falloff(128, 64, 64, 64);
        let face = falloff(128, 0, 64, 64);
        let corner = falloff(128, 0, 0, 0);
        assert!((face - 0.5).abs() < 1e-12);
        assert!(centre > face && face > corner);
        assert!((corner - (1.0 - 3f64.sqrt() / 2.0)).abs() < 1e-12);
        // Squared weight drives the outermost cells towards zero density.
        assert!(corner * corner < 0.02);
        let spec = VolumeSpec::default();
        assert!(cell_value(&spec, 0, 0, 0) <= (255.0 * corner * corner) as u8);
    }

    #[test]
    fn every_byte_is_in_range_and_layout_is_x_fastest() {
        let spec = VolumeSpec::new(24, 0.2);
        let volume = NoiseVolume::generate(&spec).expect("volume");
        assert_eq!(volume.as_bytes().len(), 24 * 24 * 24);
        for z in 0..24 {
            for y in 0..24 {
                for x in 0..24 {
                    assert_eq!(volume.get(x, y, z), cell_value(&spec, x, y, z));
                }
            }
        }
        let index = 3 + 5 * 24 + 7 * 24 * 24;
        assert_eq!(volume.as_bytes()[index], volume.get(3, 5, 7));
    }

    #[test]
    fn generation_is_deterministic() {
        let spec = VolumeSpec::new(16, 0.05);
        let a = NoiseVolume::generate(&spec).expect("volume");
        let b = NoiseVolume::generate(&spec).expect("volume");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn linear_sampling_hits_texel_centres() {
        let volume = NoiseVolume::generate(&VolumeSpec::new(16, 0.3)).expect("volume");
        let n = 16.0;
        for (x, y, z) in [(8, 8, 8), (3, 9, 12), (0, 0, 0), (15, 15, 15)] {
            let p = Vec3::new(
                (x as f32 + 0.5) / n,
                (y as f32 + 0.5) / n,
                (z as f32 + 0.5) / n,
            );
            let expected = volume.get(x, y, z) as f32 / 255.0;
            assert!((volume.sample_linear(p) - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn sampling_outside_clamps_to_edge() {
        let volume = NoiseVolume::generate(&VolumeSpec::new(8, 0.3)).expect("volume");
        let inside = volume.sample_linear(Vec3::new(0.5, 0.5, 1.0 - 0.5 / 8.0));
        let outside = volume.sample_linear(Vec3::new(0.5, 0.5, 3.0));
        assert!((inside - outside).abs() < 1e-6);
    }
}
