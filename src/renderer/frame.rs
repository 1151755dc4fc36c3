use std::path::Path;

use super::*;
use crate::backend::{Backend, DrawCall, VertexLayout};
use crate::color::Color;
use crate::error::ResourceError;
use crate::pipeline::{create_shape_uniforms, Globals};
use crate::texture::{decode_rgba, GpuTexture};

impl Backend for Renderer<'_> {
    type Buffer = GpuBuffer;
    type Texture = GpuTexture;

    fn create_buffer(&mut self, layout: VertexLayout, vertex_count: usize) -> GpuBuffer {
        let vertices = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shape_vertex_buffer"),
            size: vertex_count.max(1) as u64 * layout.stride(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let (uniforms, bind_group) = create_shape_uniforms(&self.device, &self.shape_bind_group_layout);

        GpuBuffer {
            vertices,
            uniforms,
            bind_group,
            layout,
            capacity: vertex_count,
        }
    }

    fn load_texture(&mut self, path: &Path) -> Result<GpuTexture, ResourceError> {
        let pixels = decode_rgba(path)?;
        let texture = self.uploader().upload(path, &pixels)?;
        tracing::debug!(path = %path.display(), dimensions = ?pixels.dimensions, "Loaded image");
        Ok(texture)
    }

    fn begin_frame(
        &mut self,
        clear_color: Color,
        projection: &Projection,
    ) -> Result<(), RenderError> {
        if self.frame.is_some() {
            return Err(RenderError::FrameInProgress);
        }

        let (view, output) = match (&self.surface, &self.offscreen_target) {
            (Some(surface), _) => {
                let output = surface.get_current_texture()?;
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                (view, Some(output))
            }
            (None, Some(target)) => (
                target.create_view(&wgpu::TextureViewDescriptor::default()),
                None,
            ),
            (None, None) => return Err(RenderError::NoTarget),
        };

        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[Globals::new(projection)]),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        let mut pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shape_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();
        pass.set_bind_group(0, &self.globals_bind_group, &[]);

        self.frame = Some(ActiveFrame {
            pass,
            encoder,
            output,
        });
        Ok(())
    }

    fn draw(&mut self, buffer: &mut GpuBuffer, call: DrawCall<'_, GpuTexture>) {
        let Some(frame) = self.frame.as_mut() else {
            tracing::warn!("Draw issued outside of a frame, skipping");
            return;
        };
        let vertex_count = call.vertex_count();
        if vertex_count == 0 {
            return;
        }
        if vertex_count as usize > buffer.capacity || call.layout != buffer.layout {
            tracing::warn!(
                vertex_count,
                capacity = buffer.capacity,
                "Geometry does not fit its buffer, skipping draw"
            );
            return;
        }

        // Staged writes land before the frame's command buffer executes.
        self.queue
            .write_buffer(&buffer.vertices, 0, bytemuck::cast_slice(call.vertices));
        self.queue
            .write_buffer(&buffer.uniforms, 0, bytemuck::bytes_of(&call.uniforms));

        let texture_bind_group = call
            .texture
            .map_or(&self.default_texture_bind_group, |texture| &texture.bind_group);

        let pass = &mut frame.pass;
        pass.set_pipeline(self.pipelines.get(call.primitive, call.layout));
        pass.set_bind_group(1, &buffer.bind_group, &[]);
        pass.set_bind_group(2, texture_bind_group, &[]);
        pass.set_vertex_buffer(0, buffer.vertices.slice(..));
        pass.draw(0..vertex_count, 0..1);
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let ActiveFrame {
            pass,
            encoder,
            output,
        } = self.frame.take().ok_or(RenderError::NoFrame)?;
        drop(pass);

        self.queue.submit(std::iter::once(encoder.finish()));
        if let Some(output) = output {
            output.present();
        }
        self.frames_presented += 1;
        Ok(())
    }
}
