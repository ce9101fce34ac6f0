use std::rc::Rc;

use anyhow::Result;
use glam::{Mat4, Vec3};
use knobs::{ParameterSet, SketchKind};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::assets::load_image;
use crate::camera::{OrbitCamera, Projection};
use crate::compile::{ShaderPair, GENIE_FRAGMENT, GENIE_VERTEX};
use crate::gpu::{
    create_pipeline, material_layout, BlendMode, GenieUniforms, Material, MeshData, MeshInstance,
    RasterState, SampledTexture,
};
use crate::params::genie_params;
use crate::types::GenieSource;

use super::{FrameContext, Sketch, SketchContext};

struct GenieMaterial {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    _picture: SampledTexture,
}

impl Material for GenieMaterial {
    fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(2, &self.bind_group, &[]);
    }
}

/// A viewport-filling plane whose fragment shader plays the genie reveal.
pub(crate) struct GenieSketch {
    material: Rc<GenieMaterial>,
    plane: MeshInstance<GenieMaterial>,
    use_texture: bool,
}

/// Unit plane scaled to cover the pixel frustum of the orthographic camera.
fn plane_transform(size: PhysicalSize<u32>) -> Mat4 {
    Mat4::from_scale(Vec3::new(
        size.width.max(1) as f32,
        size.height.max(1) as f32,
        1.0,
    ))
}

impl GenieSketch {
    pub(crate) fn new(ctx: &SketchContext<'_>, source: &GenieSource) -> Result<Self> {
        let (picture, use_texture) = match source {
            GenieSource::UvDebug => (SampledTexture::placeholder(ctx.device, ctx.queue)?, false),
            GenieSource::Texture(path) => {
                let image = load_image(path)?;
                let picture = SampledTexture::image(
                    ctx.device,
                    ctx.queue,
                    "genie picture",
                    &image,
                    ctx.color_space,
                )?;
                (picture, true)
            }
        };

        let layout = material_layout(
            ctx.device,
            "genie material layout",
            wgpu::ShaderStages::FRAGMENT,
            Some(wgpu::TextureViewDimension::D2),
        );
        let uniforms = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("genie uniforms"),
            contents: bytemuck::bytes_of(&GenieUniforms::new(&Default::default(), use_texture)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("genie material"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&picture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&picture.sampler),
                },
            ],
        });

        let shaders = ShaderPair::compile(ctx.device, "genie", GENIE_VERTEX, GENIE_FRAGMENT)?;
        let pipeline = create_pipeline(
            ctx.device,
            "genie pipeline",
            &shaders,
            &[&ctx.layouts.frame, &ctx.layouts.object, &layout],
            ctx.target,
            RasterState {
                blend: BlendMode::Opaque,
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
            },
        );

        let material = Rc::new(GenieMaterial {
            pipeline,
            uniforms,
            bind_group,
            _picture: picture,
        });
        let plane = MeshInstance::new(
            ctx.device,
            &ctx.layouts.object,
            "genie plane",
            &MeshData::plane(1.0, 1.0),
            plane_transform(ctx.size),
            Rc::clone(&material),
        );

        tracing::debug!(use_texture, "genie picture ready");
        Ok(Self {
            material,
            plane,
            use_texture,
        })
    }
}

impl Sketch for GenieSketch {
    fn kind(&self) -> SketchKind {
        SketchKind::Genie
    }

    fn camera(&self) -> OrbitCamera {
        OrbitCamera::from_eye(Vec3::new(0.0, 0.0, 8.0), Projection::default_orthographic())
    }

    fn background(&self) -> [u8; 3] {
        [0x00, 0x00, 0x00]
    }

    fn resize(&mut self, queue: &wgpu::Queue, size: PhysicalSize<u32>) {
        self.plane.set_transform(queue, plane_transform(size));
    }

    fn update(&mut self, queue: &wgpu::Queue, frame: &FrameContext, knobs: &ParameterSet) {
        let params = genie_params(knobs, frame.resolution());
        queue.write_buffer(
            &self.material.uniforms,
            0,
            bytemuck::bytes_of(&GenieUniforms::new(&params, self.use_texture)),
        );
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.plane.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_covers_the_viewport_in_pixels() {
        let model = plane_transform(PhysicalSize::new(800, 600));
        let corner = model.transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(corner, Vec3::new(400.0, 300.0, 0.0));

        let degenerate = plane_transform(PhysicalSize::new(0, 0));
        assert_eq!(degenerate.transform_point3(Vec3::ONE), Vec3::ONE);
    }
}
