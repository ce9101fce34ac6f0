use anyhow::{bail, Result};
use image::RgbaImage;
use procedural::NoiseVolume;
use wgpu::util::{DeviceExt, TextureDataOrder};

use super::context::SurfaceColorSpace;

/// A sampled texture bound next to a material's uniform block.
pub(crate) struct SampledTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

fn linear_clamp_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Rejects textures the device cannot allocate before wgpu validation does.
fn check_extent(kind: &str, width: u32, height: u32, max: u32) -> Result<()> {
    if width > max || height > max {
        bail!("{kind} of {width}x{height} exceeds the GPU texture limit of {max}");
    }
    Ok(())
}

/// Picture format for a surface colour space.
///
/// A gamma surface is written with display values, so the bytes have to reach
/// the shader untouched. A linear (sRGB) surface re-encodes on write, so the
/// sampler decodes here.
pub(crate) fn picture_format(color_space: SurfaceColorSpace) -> wgpu::TextureFormat {
    match color_space {
        SurfaceColorSpace::Gamma => wgpu::TextureFormat::Rgba8Unorm,
        SurfaceColorSpace::Linear => wgpu::TextureFormat::Rgba8UnormSrgb,
    }
}

impl SampledTexture {
    /// Uploads the noise volume once as an `R8Unorm` 3D texture.
    pub(crate) fn volume(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        volume: &NoiseVolume,
    ) -> Result<Self> {
        let size = volume.size();
        check_extent(
            "noise volume",
            size,
            size,
            device.limits().max_texture_dimension_3d,
        )?;
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("cloud noise volume"),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: size,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D3,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            volume.as_bytes(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            _texture: texture,
            view,
            sampler: linear_clamp_sampler(device, "cloud volume sampler"),
        })
    }

    /// Uploads an already flipped image in the format `color_space` samples correctly.
    pub(crate) fn image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &RgbaImage,
        color_space: SurfaceColorSpace,
    ) -> Result<Self> {
        check_extent(
            label,
            image.width(),
            image.height(),
            device.limits().max_texture_dimension_2d,
        )?;
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width().max(1),
                    height: image.height().max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: picture_format(color_space),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            _texture: texture,
            view,
            sampler: linear_clamp_sampler(device, &format!("{label} sampler")),
        })
    }

    /// 1×1 white stand-in for a binding the shader ignores.
    pub(crate) fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self> {
        let pixel = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        Self::image(
            device,
            queue,
            "placeholder texture",
            &pixel,
            SurfaceColorSpace::Gamma,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_surfaces_sample_raw_bytes() {
        assert_eq!(
            picture_format(SurfaceColorSpace::Gamma),
            wgpu::TextureFormat::Rgba8Unorm
        );
        assert_eq!(
            picture_format(SurfaceColorSpace::Linear),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert!(!picture_format(SurfaceColorSpace::Gamma).is_srgb());
    }

    #[test]
    fn oversized_textures_are_rejected() {
        assert!(check_extent("genie picture", 8192, 4096, 8192).is_ok());
        let err = check_extent("genie picture", 8193, 16, 8192).expect_err("too wide");
        assert!(err.to_string().contains("8193x16"));
        assert!(check_extent("genie picture", 16, 9000, 8192).is_err());
        assert!(check_extent("noise volume", 256, 256, 2048).is_ok());
    }
}
