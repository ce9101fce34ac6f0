use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use knobs::ParameterSet;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::camera::OrbitCamera;
use crate::runtime::TimeSample;
use crate::sketch::{self, FrameContext, Sketch, SketchContext};
use crate::types::{AdapterProfile, RendererConfig};

use super::context::GpuContext;
use super::pipeline::{SceneLayouts, TargetFormat};
use super::targets::RenderTargets;
use super::uniforms::FrameUniforms;

pub(crate) struct GpuState {
    context: GpuContext,
    targets: RenderTargets,
    _layouts: SceneLayouts,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sketch: Box<dyn Sketch>,
    frame_count: u64,
    last_fps_update: Instant,
    frames_since_last_update: u32,
    frames_per_second: f32,
}

impl GpuState {
    /// Sets up the surface and mounts the configured sketch onto it.
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let context = GpuContext::new(window, config.antialiasing, config.color_space)?;
        let layouts = SceneLayouts::new(&context.device);
        let targets = RenderTargets::new(
            &context.device,
            context.surface_format,
            context.size,
            context.sample_count,
        );

        let frame_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("frame uniforms"),
                contents: bytemuck::bytes_of(&<FrameUniforms as bytemuck::Zeroable>::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let frame_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("frame bind group"),
                layout: &layouts.frame,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                }],
            });

        let sketch = sketch::mount(
            config.sketch(),
            &SketchContext {
                device: &context.device,
                queue: &context.queue,
                layouts: &layouts,
                target: TargetFormat {
                    color: context.surface_format,
                    sample_count: context.sample_count,
                },
                color_space: context.color_space,
                size: context.size,
            },
            &config.options,
        )?;

        Ok(Self {
            context,
            targets,
            _layouts: layouts,
            frame_buffer,
            frame_bind_group,
            sketch,
            frame_count: 0,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
            frames_per_second: 60.0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    /// The camera the mounted sketch wants to start from.
    pub(crate) fn initial_camera(&self) -> OrbitCamera {
        self.sketch.camera()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.targets.resize(&self.context.device, new_size);
        self.sketch.resize(&self.context.queue, new_size);
    }

    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Renders one frame: the sketch pulls `knobs`, the frame block gets the
    /// camera and clock, then the pass is submitted and presented.
    pub(crate) fn render(
        &mut self,
        time: TimeSample,
        camera: &OrbitCamera,
        knobs: &ParameterSet,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame_acquisition_start = Instant::now();
        let frame = self.context.surface.get_current_texture()?;
        let frame_acquisition_duration = frame_acquisition_start.elapsed();
        let frame_time_budget = Duration::from_secs_f32(1.0 / self.frames_per_second.max(1.0));
        if frame_acquisition_duration > frame_time_budget {
            warn!(
                "acquiring frame took {}ms, which is over the frame budget of {}ms (at {} FPS)",
                frame_acquisition_duration.as_millis(),
                frame_time_budget.as_millis(),
                self.frames_per_second.round(),
            );
        }

        let now = Instant::now();
        self.frame_count += 1;
        self.frames_since_last_update += 1;
        let elapsed_since_fps_update = now.saturating_duration_since(self.last_fps_update);
        if elapsed_since_fps_update >= Duration::from_secs(1) {
            self.frames_per_second =
                self.frames_since_last_update as f32 / elapsed_since_fps_update.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
            debug!(
                fps = self.frames_per_second.round(),
                frame_count = self.frame_count,
                time = time.seconds,
                sketch = %self.sketch.kind(),
                "render stats"
            );
        }

        let frame_context = FrameContext {
            time,
            size: self.context.size,
            camera: camera.state(glam::Vec2::new(
                self.context.size.width.max(1) as f32,
                self.context.size.height.max(1) as f32,
            )),
        };
        self.sketch
            .update(&self.context.queue, &frame_context, knobs);
        self.context.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(
                &frame_context.camera,
                frame_context.resolution(),
                time,
            )),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        {
            let clear = self
                .context
                .color_space
                .clear_color(self.sketch.background());
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sketch pass"),
                color_attachments: &[Some(self.targets.color_attachment(&view, clear))],
                depth_stencil_attachment: Some(self.targets.depth_attachment()),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            self.sketch.draw(&mut pass);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
