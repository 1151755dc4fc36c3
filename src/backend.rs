//! The graphics seam between shapes and whatever actually puts pixels on screen.
//!
//! Shapes own their per-instance resources as the backend's associated types and release them
//! by dropping them. Two implementations ship with the crate: the wgpu [`Renderer`] and the
//! in-memory [`RecordingBackend`].
//!
//! [`Renderer`]: crate::Renderer

mod recording;

pub use recording::{DrawRecord, FrameRecord, RecordedBuffer, RecordedTexture, RecordingBackend};

use std::path::Path;

use crate::color::Color;
use crate::error::{RenderError, ResourceError};
use crate::projection::Projection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Lines,
    Triangles,
}

/// How the 2D points of a geometry buffer map to vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    /// One point per vertex.
    Position,
    /// Two points per vertex: position followed by texture coordinate.
    PositionTexCoord,
}

impl VertexLayout {
    pub fn points_per_vertex(self) -> usize {
        match self {
            VertexLayout::Position => 1,
            VertexLayout::PositionTexCoord => 2,
        }
    }

    /// Size in bytes of one vertex.
    pub fn stride(self) -> u64 {
        (self.points_per_vertex() * std::mem::size_of::<[f32; 2]>()) as u64
    }
}

/// Per-draw effect inputs: base color and the texture-offset flag.
///
/// A tex offset of all ones ignores the bound texture, all zeros modulates the color by it.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShapeUniforms {
    pub color: [f32; 4],
    pub tex_offset: [f32; 4],
}

impl ShapeUniforms {
    pub fn untextured(color: Color) -> Self {
        Self {
            color: color.to_array(),
            tex_offset: [1.0; 4],
        }
    }

    pub fn textured(color: Color) -> Self {
        Self {
            color: color.to_array(),
            tex_offset: [0.0; 4],
        }
    }
}

/// Everything a backend needs to draw one shape.
pub struct DrawCall<'a, T> {
    pub primitive: Primitive,
    pub layout: VertexLayout,
    pub vertices: &'a [[f32; 2]],
    pub uniforms: ShapeUniforms,
    pub texture: Option<&'a T>,
}

impl<T> DrawCall<'_, T> {
    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / self.layout.points_per_vertex()) as u32
    }
}

/// Graphics services consumed by the shape model and the frame scheduler.
///
/// All methods are called from the render thread only.
pub trait Backend {
    /// Per-shape GPU buffer. Dropping it releases the resource.
    type Buffer;
    /// Bound image texture. Dropping it releases the resource.
    type Texture;

    /// Allocates a buffer large enough for `vertex_count` vertices of `layout`.
    fn create_buffer(&mut self, layout: VertexLayout, vertex_count: usize) -> Self::Buffer;

    /// Decodes the image at `path` and uploads it as a texture.
    fn load_texture(&mut self, path: &Path) -> Result<Self::Texture, ResourceError>;

    /// Clears the target and sets the projection for the draws that follow.
    fn begin_frame(&mut self, clear_color: Color, projection: &Projection)
        -> Result<(), RenderError>;

    /// Uploads `call.vertices` into `buffer`, replacing its contents, then draws it.
    fn draw(&mut self, buffer: &mut Self::Buffer, call: DrawCall<'_, Self::Texture>);

    /// Submits and presents the frame started by [`Backend::begin_frame`].
    fn end_frame(&mut self) -> Result<(), RenderError>;
}
