//! Still frames drawn with the CPU reference programs.
//!
//! Each pixel goes through the same math as the fragment shader and is
//! composited over the sketch background the way the GPU blend state does,
//! in gamma-encoded space.

use std::time::Instant;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};
use knobs::{ParameterSet, ParameterSource, SketchKind};
use procedural::{aurora, genie, raymarch, NoiseVolume, RaySetup, VolumeSpec};
use renderer::assets::load_image;
use renderer::camera::{OrbitCamera, Projection};
use renderer::params::{aurora_params, cloud_params, genie_params};
use renderer::{FixedTimeSource, TimeSample, TimeSource};

use crate::cli::RenderArgs;
use crate::run::{build_panel, volume_spec};

const CLOUD_EYE: Vec3 = Vec3::new(0.0, 0.0, 1.5);
const CLOUD_BACKGROUND: Vec3 = Vec3::ONE;
const AURORA_BACKGROUND: Vec3 = Vec3::splat(0x17 as f32 / 255.0);

/// Everything one still depends on.
#[derive(Debug, Clone)]
pub struct Still {
    pub sketch: SketchKind,
    pub size: (u32, u32),
    pub time: TimeSample,
    pub knobs: ParameterSet,
    pub volume: VolumeSpec,
    /// Genie picture, already flipped so row 0 is the bottom.
    pub picture: Option<RgbaImage>,
}

pub fn export(args: RenderArgs) -> Result<()> {
    let panel = build_panel(args.sketch, &args.knobs)?;
    let picture = match (&args.image, args.sketch) {
        (Some(path), SketchKind::Genie) => Some(load_image(path)?),
        (Some(path), sketch) => {
            tracing::warn!(
                path = %path.display(),
                %sketch,
                "--image only applies to genie; ignoring"
            );
            None
        }
        (None, _) => None,
    };
    let still = Still {
        sketch: args.sketch,
        size: args.size,
        time: FixedTimeSource::new(args.time, u64::from(args.frame)).sample(),
        knobs: panel.snapshot(),
        volume: volume_spec(args.volume_size)?,
        picture,
    };

    let started = Instant::now();
    let image = render_still(&still)?;
    image
        .save(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    tracing::info!(
        sketch = %still.sketch,
        width = still.size.0,
        height = still.size.1,
        elapsed_ms = started.elapsed().as_millis() as u64,
        path = %args.out.display(),
        "wrote still"
    );
    Ok(())
}

pub fn render_still(still: &Still) -> Result<RgbaImage> {
    let (width, height) = still.size;
    let resolution = Vec2::new(width as f32, height as f32);
    let image = match still.sketch {
        SketchKind::Cloud => {
            let volume = NoiseVolume::generate(&still.volume).context("invalid noise volume")?;
            let params = cloud_params(&still.knobs, still.time.frame_u32());
            let camera = OrbitCamera::from_eye(CLOUD_EYE, Projection::default_perspective())
                .state(resolution);
            let unproject = (camera.projection * camera.view).inverse();
            RgbaImage::from_fn(width, height, |x, y| {
                let ndc = Vec3::new(
                    (x as f32 + 0.5) / resolution.x * 2.0 - 1.0,
                    1.0 - (y as f32 + 0.5) / resolution.y * 2.0,
                    1.0,
                );
                let far = unproject.project_point3(ndc);
                let ray = RaySetup::through(camera.eye, far, (x, y));
                let color = match raymarch::march(&ray, &params, &volume) {
                    Some(sample) => over(sample, CLOUD_BACKGROUND),
                    None => CLOUD_BACKGROUND,
                };
                to_pixel(color)
            })
        }
        SketchKind::Genie => {
            let params = genie_params(&still.knobs, resolution);
            RgbaImage::from_fn(width, height, |x, y| {
                let uv = plane_uv(x, y, resolution);
                let color = match &still.picture {
                    Some(picture) => {
                        genie::shade_with(uv, &params, |tex| sample_picture(picture, tex))
                    }
                    None => genie::shade_uv_debug(uv, &params),
                };
                to_pixel(color)
            })
        }
        SketchKind::Aurora => {
            let params = aurora_params(&still.knobs, still.time.seconds);
            RgbaImage::from_fn(width, height, |x, y| {
                let sample = aurora::shade(plane_uv(x, y, resolution), &params);
                to_pixel(AURORA_BACKGROUND + sample.truncate() * sample.w)
            })
        }
    };
    Ok(image)
}

/// UV of a viewport-filling plane at a pixel centre, v pointing up.
fn plane_uv(x: u32, y: u32, resolution: Vec2) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / resolution.x,
        1.0 - (y as f32 + 0.5) / resolution.y,
    )
}

/// Bilinear, clamp-to-edge read of raw bytes, as the gamma-mode sampler does.
fn sample_picture(picture: &RgbaImage, uv: Vec2) -> Vec3 {
    let (width, height) = picture.dimensions();
    if width == 0 || height == 0 {
        return Vec3::ZERO;
    }
    let texel = |x: i64, y: i64| {
        let x = x.clamp(0, width as i64 - 1) as u32;
        let y = y.clamp(0, height as i64 - 1) as u32;
        let [r, g, b, _] = picture.get_pixel(x, y).0;
        Vec3::new(r as f32, g as f32, b as f32) / 255.0
    };
    let coord = uv * Vec2::new(width as f32, height as f32) - Vec2::splat(0.5);
    let base = coord.floor();
    let t = coord - base;
    let (x0, y0) = (base.x as i64, base.y as i64);
    let bottom = texel(x0, y0).lerp(texel(x0 + 1, y0), t.x);
    let top = texel(x0, y0 + 1).lerp(texel(x0 + 1, y0 + 1), t.x);
    bottom.lerp(top, t.y)
}

/// Straight-alpha "over" onto an opaque background.
fn over(sample: Vec4, background: Vec3) -> Vec3 {
    sample.truncate() * sample.w + background * (1.0 - sample.w)
}

fn to_pixel(color: Vec3) -> Rgba<u8> {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([channel(color.x), channel(color.y), channel(color.z), 255])
}
