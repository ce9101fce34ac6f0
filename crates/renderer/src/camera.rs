//! Orbit camera with the feel of drei's `OrbitControls`.
//!
//! The camera always looks at `target`; its eye sits on a sphere described by
//! a radius, an azimuth around +Y and a polar angle measured from +Y.

use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3};

const POLAR_EPSILON: f32 = 1e-3;
const ZOOM_SCALE: f32 = 0.95;
const MIN_RADIUS: f32 = 1e-2;
const MIN_ZOOM: f32 = 1e-2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective { fov_y_degrees: f32, near: f32, far: f32 },
    /// Pixel-sized frustum centred on the view axis, divided by `zoom`.
    Orthographic { zoom: f32, near: f32, far: f32 },
}

impl Projection {
    /// The R3F default perspective camera.
    pub const fn default_perspective() -> Self {
        Projection::Perspective {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// The R3F default orthographic camera.
    pub const fn default_orthographic() -> Self {
        Projection::Orthographic {
            zoom: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Matrices handed to the frame uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    projection: Projection,
    target: Vec3,
    radius: f32,
    azimuth: f32,
    polar: f32,
}

impl OrbitCamera {
    /// Places the camera at `eye`, looking at the origin.
    pub fn from_eye(eye: Vec3, projection: Projection) -> Self {
        let radius = eye.length().max(MIN_RADIUS);
        let azimuth = eye.x.atan2(eye.z);
        let polar = (eye.y / radius).clamp(-1.0, 1.0).acos();
        Self {
            projection,
            target: Vec3::ZERO,
            radius,
            azimuth,
            polar: polar.clamp(POLAR_EPSILON, PI - POLAR_EPSILON),
        }
    }

    pub fn projection_kind(&self) -> Projection {
        self.projection
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Projection for a viewport in physical pixels.
    pub fn projection(&self, viewport: Vec2) -> Mat4 {
        let viewport = viewport.max(Vec2::ONE);
        match self.projection {
            Projection::Perspective {
                fov_y_degrees,
                near,
                far,
            } => Mat4::perspective_rh(
                fov_y_degrees.to_radians(),
                viewport.x / viewport.y,
                near,
                far,
            ),
            Projection::Orthographic { zoom, near, far } => {
                let half = viewport * 0.5 / zoom;
                Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, near, far)
            }
        }
    }

    pub fn state(&self, viewport: Vec2) -> CameraState {
        CameraState {
            view: self.view(),
            projection: self.projection(viewport),
            eye: self.eye(),
        }
    }

    /// Rotates by a pointer drag; a drag of one viewport height is a full turn.
    pub fn orbit(&mut self, drag: Vec2, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.azimuth -= 2.0 * PI * drag.x / height;
        self.polar = (self.polar - 2.0 * PI * drag.y / height)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
    }

    /// Positive `steps` move closer (dolly in) or magnify (orthographic).
    pub fn zoom(&mut self, steps: f32) {
        let factor = ZOOM_SCALE.powf(steps);
        match &mut self.projection {
            Projection::Perspective { far, .. } => {
                self.radius = (self.radius * factor).clamp(MIN_RADIUS, *far);
            }
            Projection::Orthographic { zoom, .. } => {
                *zoom = (*zoom / factor).max(MIN_ZOOM);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn eye_survives_the_spherical_round_trip() {
        for eye in [
            Vec3::new(0.0, 0.0, 1.5),
            Vec3::new(0.0, 0.0, 8.0),
            Vec3::new(2.0, 1.0, -3.0),
        ] {
            let camera = OrbitCamera::from_eye(eye, Projection::default_perspective());
            assert!(close(camera.eye(), eye), "{eye:?} -> {:?}", camera.eye());
        }
    }

    #[test]
    fn orbit_keeps_distance_and_avoids_the_poles() {
        let mut camera =
            OrbitCamera::from_eye(Vec3::new(0.0, 0.0, 8.0), Projection::default_perspective());
        camera.orbit(Vec2::new(120.0, 0.0), 720.0);
        assert!((camera.eye().length() - 8.0).abs() < 1e-4);
        assert!(camera.eye().x.abs() > 1.0);

        camera.orbit(Vec2::new(0.0, 5000.0), 720.0);
        let eye = camera.eye();
        assert!(eye.y > 7.9 && eye.y < 8.0, "{eye:?}");
    }

    #[test]
    fn wheel_dollies_or_magnifies() {
        let mut camera =
            OrbitCamera::from_eye(Vec3::new(0.0, 0.0, 1.5), Projection::default_perspective());
        camera.zoom(1.0);
        assert!((camera.radius() - 1.425).abs() < 1e-5);
        camera.zoom(-1.0);
        assert!((camera.radius() - 1.5).abs() < 1e-5);

        let mut ortho =
            OrbitCamera::from_eye(Vec3::new(0.0, 0.0, 8.0), Projection::default_orthographic());
        ortho.zoom(2.0);
        match ortho.projection_kind() {
            Projection::Orthographic { zoom, .. } => assert!(zoom > 1.0),
            other => panic!("unexpected projection {other:?}"),
        }
    }

    #[test]
    fn orthographic_frustum_spans_the_viewport_in_pixels() {
        let camera =
            OrbitCamera::from_eye(Vec3::new(0.0, 0.0, 8.0), Projection::default_orthographic());
        let state = camera.state(Vec2::new(800.0, 600.0));
        let corner = state.projection * state.view * Vec4::new(400.0, 300.0, 0.0, 1.0);
        assert!((corner.x / corner.w - 1.0).abs() < 1e-5);
        assert!((corner.y / corner.w - 1.0).abs() < 1e-5);
        assert!((0.0..=1.0).contains(&(corner.z / corner.w)));
    }

    #[test]
    fn perspective_keeps_the_origin_centred() {
        let camera =
            OrbitCamera::from_eye(Vec3::new(0.0, 0.0, 1.5), Projection::default_perspective());
        let state = camera.state(Vec2::new(1280.0, 720.0));
        let clip = state.projection * state.view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-6);
        assert!((clip.y / clip.w).abs() < 1e-6);
        assert!(close(state.eye, Vec3::new(0.0, 0.0, 1.5)));
    }
}
