//! Content components: each sketch owns its geometry, materials and pipelines
//! and is driven by the host once per frame.

mod aurora;
mod cloud;
mod genie;

use anyhow::Result;
use glam::Vec2;
use knobs::{ParameterSet, SketchKind};
use winit::dpi::PhysicalSize;

use crate::camera::{CameraState, OrbitCamera};
use crate::gpu::{SceneLayouts, SurfaceColorSpace, TargetFormat};
use crate::runtime::TimeSample;
use crate::types::SketchOptions;

pub(crate) use aurora::AuroraSketch;
pub(crate) use cloud::CloudSketch;
pub(crate) use genie::GenieSketch;

/// GPU handles a sketch needs while it builds its resources.
pub(crate) struct SketchContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub layouts: &'a SceneLayouts,
    pub target: TargetFormat,
    pub color_space: SurfaceColorSpace,
    pub size: PhysicalSize<u32>,
}

/// Per-frame inputs, sampled once before the frame is encoded.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub time: TimeSample,
    pub size: PhysicalSize<u32>,
    pub camera: CameraState,
}

impl FrameContext {
    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.size.width.max(1) as f32, self.size.height.max(1) as f32)
    }
}

pub(crate) trait Sketch {
    fn kind(&self) -> SketchKind;

    /// Camera the host starts with.
    fn camera(&self) -> OrbitCamera;

    /// Clear colour as an sRGB hex triple.
    fn background(&self) -> [u8; 3];

    fn resize(&mut self, _queue: &wgpu::Queue, _size: PhysicalSize<u32>) {}

    /// Pushes the knob snapshot and clock into the sketch's uniform blocks.
    fn update(&mut self, queue: &wgpu::Queue, frame: &FrameContext, knobs: &ParameterSet);

    /// Records draws; set 0 is already bound by the host.
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// Builds the sketch for `kind`. Runs once, before the first frame.
pub(crate) fn mount(
    kind: SketchKind,
    ctx: &SketchContext<'_>,
    options: &SketchOptions,
) -> Result<Box<dyn Sketch>> {
    let sketch: Box<dyn Sketch> = match kind {
        SketchKind::Cloud => Box::new(CloudSketch::new(ctx, &options.volume)?),
        SketchKind::Genie => Box::new(GenieSketch::new(ctx, &options.genie_source)?),
        SketchKind::Aurora => Box::new(AuroraSketch::new(ctx, options.model.as_deref())?),
    };
    tracing::info!(sketch = %kind, "mounted sketch");
    Ok(sketch)
}
