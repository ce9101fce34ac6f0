use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use procedural::glsl::hex_to_linear;
use procedural::raymarch::BASE_COLOR_HEX;
use procedural::{AuroraParams, CloudParams, GenieParams};

use crate::camera::CameraState;
use crate::runtime::TimeSample;

/// `Frame` block shared by every shader (set 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub frame: u32,
}

impl FrameUniforms {
    pub fn new(camera: &CameraState, resolution: Vec2, time: TimeSample) -> Self {
        Self {
            view: camera.view.to_cols_array_2d(),
            projection: camera.projection.to_cols_array_2d(),
            camera_position: camera.eye.extend(1.0).to_array(),
            resolution: resolution.to_array(),
            time: time.seconds,
            frame: time.frame_u32(),
        }
    }
}

/// `Object` block, one per mesh instance (set 1).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub inverse_model: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub fn from_model(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            inverse_model: model.inverse().to_cols_array_2d(),
        }
    }
}

/// `Cloud` block (set 2, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct CloudUniforms {
    pub threshold: f32,
    pub range: f32,
    pub opacity: f32,
    pub steps: f32,
    pub blur_strength: f32,
    pub volume_size: f32,
    pub _padding: [f32; 2],
    pub base_color: [f32; 4],
}

impl CloudUniforms {
    pub fn new(params: &CloudParams, volume_size: u32) -> Self {
        Self {
            threshold: params.threshold,
            range: params.range,
            opacity: params.opacity,
            steps: params.steps,
            blur_strength: params.blur_strength,
            volume_size: volume_size as f32,
            _padding: [0.0; 2],
            base_color: hex_to_linear(BASE_COLOR_HEX).extend(1.0).to_array(),
        }
    }
}

/// `Genie` block (set 2, binding 0). Resolution comes from the frame block.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct GenieUniforms {
    pub progress: f32,
    pub glint_intensity: f32,
    pub glint_progress: f32,
    /// 1.0 samples the bound image, 0.0 shows the UV ramp.
    pub use_texture: f32,
}

impl GenieUniforms {
    pub fn new(params: &GenieParams, use_texture: bool) -> Self {
        Self {
            progress: params.progress,
            glint_intensity: params.glint_intensity,
            glint_progress: params.glint_progress,
            use_texture: if use_texture { 1.0 } else { 0.0 },
        }
    }
}

/// `Aurora` block (set 2, binding 0), read by both stages.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct AuroraUniforms {
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

impl From<&AuroraParams> for AuroraUniforms {
    fn from(params: &AuroraParams) -> Self {
        Self {
            time: params.time,
            noise_scale: params.noise_scale,
            noise_stretch: params.noise_stretch,
            noise_speed: params.noise_speed,
            vertical_gradient_strength: params.vertical_gradient_strength,
            radial_gradient_strength: params.radial_gradient_strength,
            green_intensity: params.green_intensity,
            blue_intensity: params.blue_intensity,
            purple_intensity: params.purple_intensity,
            color_mix_speed1: params.color_mix_speed1,
            color_mix_speed2: params.color_mix_speed2,
            color_mix_frequency1: params.color_mix_frequency1,
            color_mix_frequency2: params.color_mix_frequency2,
            threshold: params.threshold,
            blur: params.blur,
            overall_intensity: params.overall_intensity,
        }
    }
}
