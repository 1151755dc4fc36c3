use std::path::Path;

use futures::executor::block_on;

use crate::error::ResourceError;

/// An image uploaded to the GPU together with the bind group that samples it.
///
/// Dropping it releases the texture.
#[derive(Debug)]
pub struct GpuTexture {
    _texture: wgpu::Texture,
    pub(crate) bind_group: wgpu::BindGroup,
}

/// Decoded RGBA8 pixels, row zero first.
pub(crate) struct Pixels {
    pub data: Vec<u8>,
    pub dimensions: (u32, u32),
}

pub(crate) fn decode_rgba(path: &Path) -> Result<Pixels, ResourceError> {
    let image = image::open(path)
        .map_err(|source| ResourceError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let dimensions = image.dimensions();
    if dimensions.0 == 0 || dimensions.1 == 0 {
        return Err(ResourceError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(Pixels {
        data: image.into_raw(),
        dimensions,
    })
}

/// Rejects images the device cannot hold in a single 2D texture.
pub(crate) fn check_dimensions(
    path: &Path,
    dimensions: (u32, u32),
    max: u32,
) -> Result<(), ResourceError> {
    if dimensions.0 > max || dimensions.1 > max {
        return Err(ResourceError::TooLarge {
            path: path.to_path_buf(),
            dimensions,
            max,
        });
    }
    Ok(())
}

pub(crate) fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Shared state needed to turn pixels into a bindable texture.
pub(crate) struct TextureUploader<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
}

impl TextureUploader<'_> {
    /// Uploads decoded pixels. Validation errors raised by the device are returned instead of
    /// reaching wgpu's uncaptured error handler, which panics.
    pub fn upload(&self, path: &Path, pixels: &Pixels) -> Result<GpuTexture, ResourceError> {
        check_dimensions(
            path,
            pixels.dimensions,
            self.device.limits().max_texture_dimension_2d,
        )?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let (texture, bind_group) = self.create(pixels, "image_texture");
        if let Some(error) = block_on(self.device.pop_error_scope()) {
            return Err(ResourceError::Upload {
                path: path.to_path_buf(),
                message: error.to_string(),
            });
        }

        Ok(GpuTexture {
            _texture: texture,
            bind_group,
        })
    }

    /// A 1x1 opaque white texture bound for draws without an image.
    pub fn default_bind_group(&self) -> (wgpu::Texture, wgpu::BindGroup) {
        let pixels = Pixels {
            data: vec![255; 4],
            dimensions: (1, 1),
        };
        self.create(&pixels, "default_white_texture")
    }

    fn create(&self, pixels: &Pixels, label: &str) -> (wgpu::Texture, wgpu::BindGroup) {
        let (width, height) = pixels.dimensions;
        let texture_extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: texture_extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            texture_extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.sampler),
                },
            ],
            label: Some(label),
        });

        (texture, bind_group)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("oscscene-{}-{name}", std::process::id()))
    }

    #[test]
    fn decodes_to_rgba8() {
        let path = scratch_path("decode.png");
        let mut image = image::RgbImage::new(3, 2);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        image.save(&path).unwrap();

        let pixels = decode_rgba(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(pixels.dimensions, (3, 2));
        assert_eq!(pixels.data.len(), 3 * 2 * 4);
        assert_eq!(&pixels.data[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let path = scratch_path("does-not-exist.png");
        assert!(matches!(
            decode_rgba(&path),
            Err(ResourceError::Image { .. })
        ));
    }

    #[test]
    fn images_beyond_the_device_limit_are_rejected() {
        let path = Path::new("wide.png");
        assert!(check_dimensions(path, (8192, 8192), 8192).is_ok());
        assert!(matches!(
            check_dimensions(path, (9000, 1), 8192),
            Err(ResourceError::TooLarge {
                dimensions: (9000, 1),
                max: 8192,
                ..
            })
        ));
        assert!(matches!(
            check_dimensions(path, (1, 8193), 8192),
            Err(ResourceError::TooLarge { .. })
        ));
    }
}
