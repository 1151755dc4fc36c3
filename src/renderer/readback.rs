use super::*;

fn padded_bytes_per_row(width: u32) -> (u32, u32) {
    let unpadded = width * 4;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (unpadded, unpadded.div_ceil(alignment) * alignment)
}

fn copy_padded_readback_rows(
    data: &[u8],
    height: u32,
    unpadded_bytes_per_row: u32,
    padded_bytes_per_row: u32,
    output: &mut Vec<u8>,
) {
    let output_size = (unpadded_bytes_per_row * height) as usize;
    output.resize(output_size, 0);

    if padded_bytes_per_row == unpadded_bytes_per_row {
        output.copy_from_slice(&data[..output_size]);
        return;
    }

    for row in 0..height {
        let padded_offset = (row * padded_bytes_per_row) as usize;
        let unpadded_offset = (row * unpadded_bytes_per_row) as usize;
        let row_data = &data[padded_offset..padded_offset + unpadded_bytes_per_row as usize];
        output[unpadded_offset..unpadded_offset + unpadded_bytes_per_row as usize]
            .copy_from_slice(row_data);
    }
}

impl Renderer<'_> {
    fn map_readback_buffer(&self, buffer: &wgpu::Buffer) -> Option<Vec<u8>> {
        let buffer_slice = buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            if sender.send(result).is_err() {
                tracing::warn!("Failed to send map_async result from callback");
            }
        });

        let _ = self.device.poll(wgpu::MaintainBase::Wait);

        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::warn!("Failed to map readback buffer: {error:?}");
                return None;
            }
            Err(error) => {
                tracing::warn!("Failed to receive mapped buffer result: {error}");
                return None;
            }
        }

        let mapped_range = buffer_slice.get_mapped_range();
        let bytes = mapped_range.to_vec();
        drop(mapped_range);
        buffer.unmap();
        Some(bytes)
    }

    /// Copies the last presented frame of a headless renderer into `output` as tightly packed
    /// RGBA8 rows, top row first.
    ///
    /// Returns false, leaving `output` untouched, for windowed renderers or when the GPU
    /// readback fails.
    pub fn read_pixels(&self, output: &mut Vec<u8>) -> bool {
        let Some(target) = &self.offscreen_target else {
            tracing::warn!("read_pixels needs a headless renderer");
            return false;
        };

        let (width, height) = self.physical_size;
        let (unpadded_bytes_per_row, padded_bytes_per_row) = padded_bytes_per_row(width);
        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback_buffer"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let Some(bytes) = self.map_readback_buffer(&readback_buffer) else {
            return false;
        };
        copy_padded_readback_rows(
            &bytes,
            height,
            unpadded_bytes_per_row,
            padded_bytes_per_row,
            output,
        );

        if matches!(
            self.config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            for pixel in output.chunks_exact_mut(4) {
                pixel.swap(0, 2);
            }
        }
        true
    }
}
