use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use knobs::{ParameterSet, SketchKind};
use procedural::raymarch::SPHERE_RADIUS;
use procedural::{NoiseVolume, VolumeSpec};
use wgpu::util::DeviceExt;

use crate::camera::{OrbitCamera, Projection};
use crate::compile::{ShaderPair, CLOUD_FRAGMENT, CLOUD_VERTEX};
use crate::gpu::{
    create_pipeline, material_layout, BlendMode, CloudUniforms, Material, MeshData, MeshInstance,
    RasterState, SampledTexture,
};
use crate::params::cloud_params;

use super::{FrameContext, Sketch, SketchContext};

const SPHERE_SEGMENTS: u32 = 64;

struct CloudMaterial {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    _volume: SampledTexture,
}

impl Material for CloudMaterial {
    fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(2, &self.bind_group, &[]);
    }
}

/// Raymarched noise volume inside a 0.5-radius proxy sphere.
pub(crate) struct CloudSketch {
    material: Rc<CloudMaterial>,
    proxy: MeshInstance<CloudMaterial>,
    volume_size: u32,
}

impl CloudSketch {
    pub(crate) fn new(ctx: &SketchContext<'_>, spec: &VolumeSpec) -> Result<Self> {
        let started = Instant::now();
        let volume = NoiseVolume::generate(spec).context("invalid noise volume")?;
        tracing::info!(
            size = volume.size(),
            scale = spec.scale,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generated cloud volume"
        );
        let texture = SampledTexture::volume(ctx.device, ctx.queue, &volume)?;

        let layout = material_layout(
            ctx.device,
            "cloud material layout",
            wgpu::ShaderStages::FRAGMENT,
            Some(wgpu::TextureViewDimension::D3),
        );
        let params = cloud_params(&ParameterSet::default(), 0);
        let uniforms = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cloud uniforms"),
            contents: bytemuck::bytes_of(&CloudUniforms::new(&params, volume.size())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cloud material"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        let shaders = ShaderPair::compile(ctx.device, "cloud", CLOUD_VERTEX, CLOUD_FRAGMENT)?;
        // Back faces only, so the march also starts when the camera is inside.
        let pipeline = create_pipeline(
            ctx.device,
            "cloud pipeline",
            &shaders,
            &[&ctx.layouts.frame, &ctx.layouts.object, &layout],
            ctx.target,
            RasterState {
                blend: BlendMode::Alpha,
                cull_mode: Some(wgpu::Face::Front),
                depth_write: false,
            },
        );

        let material = Rc::new(CloudMaterial {
            pipeline,
            uniforms,
            bind_group,
            _volume: texture,
        });
        let proxy = MeshInstance::new(
            ctx.device,
            &ctx.layouts.object,
            "cloud proxy sphere",
            &MeshData::sphere(SPHERE_RADIUS, SPHERE_SEGMENTS, SPHERE_SEGMENTS),
            Mat4::IDENTITY,
            Rc::clone(&material),
        );

        Ok(Self {
            material,
            proxy,
            volume_size: volume.size(),
        })
    }
}

impl Sketch for CloudSketch {
    fn kind(&self) -> SketchKind {
        SketchKind::Cloud
    }

    fn camera(&self) -> OrbitCamera {
        OrbitCamera::from_eye(Vec3::new(0.0, 0.0, 1.5), Projection::default_perspective())
    }

    fn background(&self) -> [u8; 3] {
        [0xff, 0xff, 0xff]
    }

    fn update(&mut self, queue: &wgpu::Queue, frame: &FrameContext, knobs: &ParameterSet) {
        let params = cloud_params(knobs, frame.time.frame_u32());
        queue.write_buffer(
            &self.material.uniforms,
            0,
            bytemuck::bytes_of(&CloudUniforms::new(&params, self.volume_size)),
        );
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.proxy.draw(pass);
    }
}
