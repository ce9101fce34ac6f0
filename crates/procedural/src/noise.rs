//! Gradient noise.
//!
//! Two flavours are used by the sketches:
//!
//! * [`perlin3`]: Ken Perlin's 2002 "improved noise" with the reference
//!   permutation table. It is evaluated in `f64` on the CPU only (the cloud
//!   volume is baked once before rendering).
//! * [`simplex2`]: the 2D simplex noise used by the aurora shaders. It is
//!   evaluated in `f32` so the CPU result tracks the GPU one; the GLSL twin
//!   lives in `shaders/simplex2d.glsl`.
//!
//! Both return values in roughly `[-1, 1]` and are fully deterministic.

use glam::{Vec2, Vec3};

use crate::glsl::fract;

const PERMUTATION: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

#[inline]
fn perm(index: usize) -> usize {
    PERMUTATION[index & 255] as usize
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Improved Perlin noise at `(x, y, z)`.
///
/// Returns exactly `0.0` on every integer lattice point.
pub fn perlin3(x: f64, y: f64, z: f64) -> f64 {
    let floor_x = x.floor();
    let floor_y = y.floor();
    let floor_z = z.floor();

    let xi = (floor_x as i64 & 255) as usize;
    let yi = (floor_y as i64 & 255) as usize;
    let zi = (floor_z as i64 & 255) as usize;

    let x = x - floor_x;
    let y = y - floor_y;
    let z = z - floor_z;
    let x1 = x - 1.0;
    let y1 = y - 1.0;
    let z1 = z - 1.0;

    let u = fade(x);
    let v = fade(y);
    let w = fade(z);

    let a = perm(xi) + yi;
    let aa = perm(a) + zi;
    let ab = perm(a + 1) + zi;
    let b = perm(xi + 1) + yi;
    let ba = perm(b) + zi;
    let bb = perm(b + 1) + zi;

    lerp(
        w,
        lerp(
            v,
            lerp(u, grad(perm(aa), x, y, z), grad(perm(ba), x1, y, z)),
            lerp(u, grad(perm(ab), x, y1, z), grad(perm(bb), x1, y1, z)),
        ),
        lerp(
            v,
            lerp(u, grad(perm(aa + 1), x, y, z1), grad(perm(ba + 1), x1, y, z1)),
            lerp(u, grad(perm(ab + 1), x, y1, z1), grad(perm(bb + 1), x1, y1, z1)),
        ),
    )
}

fn mod289_2(x: Vec2) -> Vec2 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec3) -> Vec3 {
    mod289_3((x * 34.0 + Vec3::ONE) * x)
}

/// 2D simplex noise (Ashima Arts / Ian McEwan formulation).
pub fn simplex2(v: Vec2) -> f32 {
    const C_X: f32 = 0.211_324_87;
    const C_Y: f32 = 0.366_025_42;
    const C_Z: f32 = -0.577_350_26;
    const C_W: f32 = 0.024_390_243;

    let mut i = (v + Vec2::splat(v.dot(Vec2::splat(C_Y)))).floor();
    let x0 = v - i + Vec2::splat(i.dot(Vec2::splat(C_X)));
    let i1 = if x0.x > x0.y {
        Vec2::new(1.0, 0.0)
    } else {
        Vec2::new(0.0, 1.0)
    };
    let x12_xy = Vec2::new(x0.x + C_X, x0.y + C_X) - i1;
    let x12_zw = Vec2::new(x0.x + C_Z, x0.y + C_Z);

    i = mod289_2(i);
    let p = permute(
        permute(Vec3::splat(i.y) + Vec3::new(0.0, i1.y, 1.0))
            + Vec3::splat(i.x)
            + Vec3::new(0.0, i1.x, 1.0),
    );

    let mut m = (Vec3::splat(0.5)
        - Vec3::new(x0.dot(x0), x12_xy.dot(x12_xy), x12_zw.dot(x12_zw)))
    .max(Vec3::ZERO);
    m = m * m;
    m = m * m;

    let scaled = p * C_W;
    let x = Vec3::new(fract(scaled.x), fract(scaled.y), fract(scaled.z)) * 2.0 - Vec3::ONE;
    let h = x.abs() - Vec3::splat(0.5);
    let ox = (x + Vec3::splat(0.5)).floor();
    let a0 = x - ox;
    m *= Vec3::splat(1.792_842_9) - (a0 * a0 + h * h) * 0.853_734_7;

    let g = Vec3::new(
        a0.x * x0.x + h.x * x0.y,
        a0.y * x12_xy.x + h.y * x12_xy.y,
        a0.z * x12_zw.x + h.z * x12_zw.y,
    );
    130.0 * m.dot(g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_is_a_permutation() {
        let mut seen = [false; 256];
        for value in PERMUTATION {
            assert!(!seen[value as usize], "duplicate entry {value}");
            seen[value as usize] = true;
        }
    }

    #[test]
    fn perlin_vanishes_on_lattice_points() {
        for (x, y, z) in [(0.0, 0.0, 0.0), (3.0, -7.0, 12.0), (255.0, 256.0, 1.0)] {
            assert_eq!(perlin3(x, y, z), 0.0);
        }
    }

    #[test]
    fn perlin_stays_in_unit_range() {
        let mut max_seen: f64 = 0.0;
        for i in 0..4000 {
            let t = i as f64 * 0.0731;
            let value = perlin3(t * 0.37, t * 0.53 + 1.3, t * 0.11 - 4.2);
            assert!(value.is_finite());
            max_seen = max_seen.max(value.abs());
        }
        assert!(max_seen <= 1.1, "noise escaped range: {max_seen}");
        assert!(max_seen > 0.1, "noise looks flat: {max_seen}");
    }

    #[test]
    fn perlin_is_deterministic_and_tiles_every_256() {
        let a = perlin3(1.25, 2.5, 3.75);
        assert_eq!(a, perlin3(1.25, 2.5, 3.75));
        let wrapped = perlin3(1.25 + 256.0, 2.5, 3.75);
        assert!((a - wrapped).abs() < 1e-9);
    }

    #[test]
    fn simplex_is_zero_at_origin() {
        assert!(simplex2(Vec2::ZERO).abs() < 1e-6);
    }

    #[test]
    fn simplex_stays_in_unit_range() {
        for iy in 0..60 {
            for ix in 0..60 {
                let p = Vec2::new(ix as f32 * 0.173 - 3.0, iy as f32 * 0.219 + 11.0);
                let value = simplex2(p);
                assert!(value.is_finite());
                assert!(value.abs() <= 1.05, "{p:?} -> {value}");
            }
        }
    }

    #[test]
    fn simplex_is_continuous() {
        let base = Vec2::new(0.731, 4.12);
        let nudged = base + Vec2::splat(1e-4);
        assert!((simplex2(base) - simplex2(nudged)).abs() < 1e-2);
    }
}
