use std::path::PathBuf;

use knobs::{KnobPanel, SketchKind};
use procedural::VolumeSpec;

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Gamma-encoded swapchain; the sketches write display-ready values.
    #[default]
    Auto,
    /// Treat shader outputs as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and let an sRGB swapchain encode them.
    Linear,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// What the genie plane shows before the transition warps it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenieSource {
    /// `(u, v, 0)` colour ramp.
    #[default]
    UvDebug,
    /// A 2D image loaded from disk.
    Texture(PathBuf),
}

/// Per-sketch inputs that are fixed for the lifetime of the window.
#[derive(Debug, Clone, Default)]
pub struct SketchOptions {
    /// Noise volume parameters for the cloud sketch.
    pub volume: VolumeSpec,
    /// Picture source for the genie sketch.
    pub genie_source: GenieSource,
    /// glTF/GLB file with the `aurora1`..`aurora4` meshes. Procedural
    /// curtains stand in when absent.
    pub model: Option<PathBuf>,
}

/// Summary of the adapter wgpu picked, kept for logging and policy decisions.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension_3d: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension_3d: limits.max_texture_dimension_3d,
        }
    }

    /// True for CPU rasterizers such as llvmpipe, lavapipe or SwiftShader.
    pub fn is_software(&self) -> bool {
        if self.device_type == wgpu::DeviceType::Cpu {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["llvmpipe", "lavapipe", "softpipe", "swiftshader"]
            .iter()
            .any(|needle| name.contains(needle))
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags: which sketch to mount (taken from the
/// panel's schema), how large the window should be, and how to set up the
/// surface.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Knob values the sketch starts from; its schema selects the sketch.
    pub panel: KnobPanel,
    /// Optional FPS cap; None = render every redraw.
    pub target_fps: Option<f32>,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Desired color handling for the swapchain.
    pub color_space: ColorSpaceMode,
    pub options: SketchOptions,
}

impl RendererConfig {
    /// A 1280x720 window with the sketch's default knob values.
    pub fn new(sketch: SketchKind) -> Self {
        Self {
            surface_size: (1280, 720),
            panel: KnobPanel::new(sketch.schema()),
            target_fps: None,
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
            options: SketchOptions::default(),
        }
    }

    pub fn sketch(&self) -> SketchKind {
        self.panel.schema().sketch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, device_type: wgpu::DeviceType) -> AdapterProfile {
        AdapterProfile {
            name: name.to_string(),
            backend: wgpu::Backend::Vulkan,
            device_type,
            max_texture_dimension_3d: 2048,
        }
    }

    #[test]
    fn detects_software_rasterizers() {
        assert!(profile("llvmpipe (LLVM 17.0.6, 256 bits)", wgpu::DeviceType::Cpu).is_software());
        assert!(profile("SwiftShader Device", wgpu::DeviceType::Other).is_software());
        assert!(!profile("AMD Radeon RX 7800", wgpu::DeviceType::DiscreteGpu).is_software());
    }

    #[test]
    fn config_sketch_follows_the_panel() {
        let config = RendererConfig::new(SketchKind::Aurora);
        assert_eq!(config.sketch(), SketchKind::Aurora);
        assert_eq!(config.panel.schema().len(), 15);
        assert_eq!(config.options.genie_source, GenieSource::UvDebug);
    }
}
