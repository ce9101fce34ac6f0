use std::path::Path;
use std::rc::Rc;

use anyhow::Result;
use glam::{Mat4, Vec3};
use knobs::{ParameterSet, SketchKind};
use wgpu::util::DeviceExt;

use crate::assets::{load_aurora_meshes, AURORA_MESH_NAMES};
use crate::camera::{OrbitCamera, Projection};
use crate::compile::{ShaderPair, AURORA_FRAGMENT, AURORA_VERTEX};
use crate::gpu::{
    create_pipeline, material_layout, AuroraUniforms, BlendMode, Material, MeshData, MeshInstance,
    RasterState,
};
use crate::params::aurora_params;

use super::{FrameContext, Sketch, SketchContext};

const PLANE_DEPTH: f32 = 3.0;

/// One material shared by the model meshes and the foreground plane, so one
/// uniform write per frame drives all of them.
struct AuroraMaterial {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Material for AuroraMaterial {
    fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(2, &self.bind_group, &[]);
    }
}

impl AuroraMaterial {
    fn new(ctx: &SketchContext<'_>) -> Result<Self> {
        let layout = material_layout(
            ctx.device,
            "aurora material layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            None,
        );
        let uniforms = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("aurora uniforms"),
            contents: bytemuck::bytes_of(&AuroraUniforms::from(&Default::default())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("aurora material"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        let shaders = ShaderPair::compile(ctx.device, "aurora", AURORA_VERTEX, AURORA_FRAGMENT)?;
        let pipeline = create_pipeline(
            ctx.device,
            "aurora pipeline",
            &shaders,
            &[&ctx.layouts.frame, &ctx.layouts.object, &layout],
            ctx.target,
            RasterState {
                blend: BlendMode::Additive,
                cull_mode: None,
                depth_write: false,
            },
        );
        Ok(Self {
            pipeline,
            uniforms,
            bind_group,
        })
    }
}

/// Aurora curtains from a model (or procedural stand-ins) plus a small
/// plane in front of them, all shaded with the same noise material.
pub(crate) struct AuroraSketch {
    material: Rc<AuroraMaterial>,
    meshes: Vec<MeshInstance<AuroraMaterial>>,
}

impl AuroraSketch {
    pub(crate) fn new(ctx: &SketchContext<'_>, model: Option<&Path>) -> Result<Self> {
        let material = Rc::new(AuroraMaterial::new(ctx)?);

        let geometry = match model {
            Some(path) => load_aurora_meshes(path)?,
            None => {
                tracing::info!("no aurora model given; using procedural curtains");
                (0..AURORA_MESH_NAMES.len()).map(MeshData::curtain).collect()
            }
        };

        let mut meshes: Vec<_> = AURORA_MESH_NAMES
            .iter()
            .zip(&geometry)
            .map(|(name, data)| {
                MeshInstance::new(
                    ctx.device,
                    &ctx.layouts.object,
                    name,
                    data,
                    Mat4::IDENTITY,
                    Rc::clone(&material),
                )
            })
            .collect();
        meshes.push(MeshInstance::new(
            ctx.device,
            &ctx.layouts.object,
            "aurora plane",
            &MeshData::plane(1.0, 1.0),
            Mat4::from_translation(Vec3::new(0.0, 0.0, PLANE_DEPTH)),
            Rc::clone(&material),
        ));

        Ok(Self { material, meshes })
    }
}

impl Sketch for AuroraSketch {
    fn kind(&self) -> SketchKind {
        SketchKind::Aurora
    }

    fn camera(&self) -> OrbitCamera {
        OrbitCamera::from_eye(Vec3::new(0.0, 0.0, 8.0), Projection::default_perspective())
    }

    fn background(&self) -> [u8; 3] {
        [0x17, 0x17, 0x17]
    }

    fn update(&mut self, queue: &wgpu::Queue, frame: &FrameContext, knobs: &ParameterSet) {
        let params = aurora_params(knobs, frame.time.seconds);
        queue.write_buffer(
            &self.material.uniforms,
            0,
            bytemuck::bytes_of(&AuroraUniforms::from(&params)),
        );
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for mesh in &self.meshes {
            mesh.draw(pass);
        }
    }
}
