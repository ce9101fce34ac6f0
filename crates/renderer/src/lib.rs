//! Renderer crate for sketchbook.
//!
//! Glues the winit window, the `wgpu` pipelines and the three sketches
//! (cloud, genie, aurora) together. The overall flow is:
//!
//! ```text
//!   CLI / sketchbook
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                          │                                   │
//!                     KnobPanel ── snapshot() ──▶ Sketch::update ─▶ GPU UBOs
//! ```
//!
//! `GpuState` owns every GPU resource and the mounted sketch; the window
//! owns the knob panel and the orbit camera and feeds both into each frame.
//! Shaders are Vulkan-flavoured GLSL compiled through naga.

pub mod assets;
pub mod camera;
mod compile;
mod gpu;
pub mod params;
pub mod runtime;
mod sketch;
mod types;
mod window;

use anyhow::Result;

pub use assets::AssetError;
pub use compile::{assemble_source, IncludeError};
pub use gpu::{MeshData, Vertex};
pub use runtime::{FixedTimeSource, SystemTimeSource, TimeSample, TimeSource};
pub use sketch::FrameContext;
pub use types::{
    AdapterProfile, Antialiasing, ColorSpaceMode, GenieSource, RendererConfig, SketchOptions,
};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the sketch window and blocks until it closes.
    ///
    /// Fails if the window, the GPU device or the sketch's assets cannot be
    /// set up.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(
            sketch = %self.config.sketch(),
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            "starting renderer"
        );
        window::run_window(self.config.clone())
    }
}
