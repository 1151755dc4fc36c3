use std::cell::Cell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{Backend, DrawCall, Primitive, ShapeUniforms, VertexLayout};
use crate::color::Color;
use crate::error::{RenderError, ResourceError};
use crate::projection::Projection;

/// One draw issued during a recorded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub buffer_id: u64,
    pub primitive: Primitive,
    pub layout: VertexLayout,
    pub vertex_count: u32,
    /// The vertices uploaded for this draw.
    pub vertices: Vec<[f32; 2]>,
    pub uniforms: ShapeUniforms,
    /// Source path of the bound texture, if any.
    pub texture: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub clear_color: Color,
    pub projection: Projection,
    pub draws: Vec<DrawRecord>,
}

/// Buffer handle of the recording backend. Tracks how many uploads it received.
#[derive(Debug)]
pub struct RecordedBuffer {
    id: u64,
    layout: VertexLayout,
    capacity: usize,
    uploads: usize,
    live: Rc<Cell<usize>>,
}

impl RecordedBuffer {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Capacity in vertices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn uploads(&self) -> usize {
        self.uploads
    }
}

impl Drop for RecordedBuffer {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

#[derive(Debug)]
pub struct RecordedTexture {
    path: PathBuf,
    live: Rc<Cell<usize>>,
}

impl RecordedTexture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RecordedTexture {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

/// A backend that records frames in memory instead of drawing them.
///
/// Resource handles count themselves, so tests can observe that removing a shape releases its
/// buffer and texture. Texture loads succeed unless the path was marked unavailable.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_buffer_id: u64,
    live_buffers: Rc<Cell<usize>>,
    live_textures: Rc<Cell<usize>>,
    unavailable: HashSet<PathBuf>,
    frames: Vec<FrameRecord>,
    current: Option<FrameRecord>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later [`Backend::load_texture`] for `path` fail.
    pub fn mark_unavailable(&mut self, path: impl Into<PathBuf>) {
        self.unavailable.insert(path.into());
    }

    /// Completed frames, oldest first.
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }

    pub fn in_frame(&self) -> bool {
        self.current.is_some()
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers.get()
    }

    pub fn live_textures(&self) -> usize {
        self.live_textures.get()
    }
}

impl Backend for RecordingBackend {
    type Buffer = RecordedBuffer;
    type Texture = RecordedTexture;

    fn create_buffer(&mut self, layout: VertexLayout, vertex_count: usize) -> RecordedBuffer {
        self.next_buffer_id += 1;
        self.live_buffers.set(self.live_buffers.get() + 1);
        RecordedBuffer {
            id: self.next_buffer_id,
            layout,
            capacity: vertex_count,
            uploads: 0,
            live: self.live_buffers.clone(),
        }
    }

    fn load_texture(&mut self, path: &Path) -> Result<RecordedTexture, ResourceError> {
        if self.unavailable.contains(path) {
            return Err(ResourceError::Unavailable {
                path: path.to_path_buf(),
            });
        }
        self.live_textures.set(self.live_textures.get() + 1);
        Ok(RecordedTexture {
            path: path.to_path_buf(),
            live: self.live_textures.clone(),
        })
    }

    fn begin_frame(
        &mut self,
        clear_color: Color,
        projection: &Projection,
    ) -> Result<(), RenderError> {
        if self.current.is_some() {
            return Err(RenderError::FrameInProgress);
        }
        self.current = Some(FrameRecord {
            clear_color,
            projection: *projection,
            draws: Vec::new(),
        });
        Ok(())
    }

    fn draw(&mut self, buffer: &mut RecordedBuffer, call: DrawCall<'_, RecordedTexture>) {
        let Some(frame) = self.current.as_mut() else {
            tracing::warn!("Draw issued outside of a frame, skipping");
            return;
        };
        let vertex_count = call.vertex_count();
        if vertex_count as usize > buffer.capacity {
            tracing::warn!(
                vertex_count,
                capacity = buffer.capacity,
                "Geometry larger than its buffer, skipping draw"
            );
            return;
        }

        buffer.uploads += 1;
        frame.draws.push(DrawRecord {
            buffer_id: buffer.id,
            primitive: call.primitive,
            layout: call.layout,
            vertex_count,
            vertices: call.vertices.to_vec(),
            uniforms: call.uniforms,
            texture: call.texture.map(|texture| texture.path.clone()),
        });
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let frame = self.current.take().ok_or(RenderError::NoFrame)?;
        self.frames.push(frame);
        Ok(())
    }
}
