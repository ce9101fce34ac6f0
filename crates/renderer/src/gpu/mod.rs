//! GPU plumbing shared by every sketch.
//!
//! - `context` owns the wgpu instance, device and surface and rebuilds the
//!   swapchain when the window resizes.
//! - `targets` keeps the MSAA and depth attachments in step with the surface.
//! - `pipeline` holds the bind group layout conventions (set 0 frame, set 1
//!   object, set 2 material) and builds render pipelines from GLSL pairs.
//! - `mesh` uploads geometry and pairs it with a transform and a material.
//! - `uniforms` mirrors the std140 blocks declared in `shaders/`.
//! - `state` glues it together into the `GpuState` the window drives.

mod context;
mod mesh;
mod pipeline;
mod state;
mod targets;
mod textures;
mod uniforms;

pub use mesh::{MeshData, Vertex};

pub(crate) use context::SurfaceColorSpace;
pub(crate) use mesh::{Material, MeshInstance};
pub(crate) use pipeline::{
    create_pipeline, material_layout, BlendMode, RasterState, SceneLayouts, TargetFormat,
};
pub(crate) use state::GpuState;
pub(crate) use textures::SampledTexture;
pub(crate) use uniforms::{AuroraUniforms, CloudUniforms, GenieUniforms};
