//! The `shape` module holds the live, renderable objects addressed by drawing commands.
//!
//! A [`Shape`] has one fixed variant (line, rectangle, ellipse or image), a color, and an owned
//! geometry buffer that is recomputed whenever its position or size changes. Every variant
//! shares the same two operations: [`Shape::apply`] mutates it from a [`Command`] and
//! [`Shape::draw`] uploads its geometry and issues one draw call.
//!
//! Coordinate conventions per variant:
//!
//! - **Line**: `position` is the start point and `size` is taken as the end point, so a size
//!   command moves the end of the line rather than its thickness.
//! - **Rect** and **Image**: `position` is the centre and `size` is (width, height).
//! - **Ellipse**: `position` is the centre and `size` is the bounding box.
//!
//! # Examples
//!
//! ```rust
//! use oscscene::{Color, Command, RecordingBackend, Shape, ShapeKind};
//!
//! let mut backend = RecordingBackend::new();
//! let create = Command::create(ShapeKind::Rect, "r1", (0.0, 0.0), (10.0, 10.0), Color::WHITE);
//! let mut rect = Shape::new(&create, &mut backend).unwrap();
//!
//! rect.apply(&Command::new(oscscene::CommandKind::SetPosition, "r1").with_position(5.0, 5.0));
//! assert_eq!(rect.vertices()[0], [0.0, 0.0]);
//! assert_eq!(rect.vertices()[5], [10.0, 10.0]);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::backend::{Backend, DrawCall, Primitive, ShapeUniforms, VertexLayout};
use crate::color::Color;
use crate::command::{Command, CommandKind, Point, ShapeKind};
use crate::geometry;

enum Variant<T> {
    Line,
    Rect,
    Ellipse,
    Image {
        source: PathBuf,
        /// `None` when the image failed to load; the shape then draws nothing.
        texture: Option<T>,
    },
}

/// A live shape instance owned by the registry.
pub struct Shape<B: Backend> {
    variant: Variant<B::Texture>,
    position: Point,
    size: Point,
    color: Color,
    vertices: Vec<[f32; 2]>,
    buffer: B::Buffer,
}

impl<B: Backend> Shape<B> {
    /// Builds the variant a creation command names and applies the command to it.
    ///
    /// Returns `None` for commands that are not creation kinds. Image sources are loaded here,
    /// once; a load failure is logged and yields an image that draws nothing.
    pub fn new(command: &Command, backend: &mut B) -> Option<Self> {
        let kind = command.kind.creates()?;
        let (variant, layout, vertex_count) = match kind {
            ShapeKind::Line => (
                Variant::Line,
                VertexLayout::Position,
                geometry::LINE_VERTICES,
            ),
            ShapeKind::Rect => (
                Variant::Rect,
                VertexLayout::Position,
                geometry::QUAD_VERTICES,
            ),
            ShapeKind::Ellipse => (
                Variant::Ellipse,
                VertexLayout::Position,
                geometry::ELLIPSE_VERTICES,
            ),
            ShapeKind::Image => {
                let source = PathBuf::from(command.payload.as_deref().unwrap_or_default());
                let texture = match backend.load_texture(&source) {
                    Ok(texture) => Some(texture),
                    Err(error) => {
                        tracing::warn!(
                            object_id = %command.object_id,
                            "Image will not be drawn: {error}"
                        );
                        None
                    }
                };
                (
                    Variant::Image { source, texture },
                    VertexLayout::PositionTexCoord,
                    geometry::QUAD_VERTICES,
                )
            }
        };

        let buffer = backend.create_buffer(layout, vertex_count);
        let mut shape = Self {
            variant,
            position: command.position,
            size: command.size,
            color: command.color,
            vertices: Vec::with_capacity(vertex_count * layout.points_per_vertex()),
            buffer,
        };
        shape.apply(command);
        Some(shape)
    }

    pub fn kind(&self) -> ShapeKind {
        match self.variant {
            Variant::Line => ShapeKind::Line,
            Variant::Rect => ShapeKind::Rect,
            Variant::Ellipse => ShapeKind::Ellipse,
            Variant::Image { .. } => ShapeKind::Image,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Current geometry. For images, positions and texture coordinates are interleaved.
    pub fn vertices(&self) -> &[[f32; 2]] {
        &self.vertices
    }

    pub fn buffer(&self) -> &B::Buffer {
        &self.buffer
    }

    /// The path an image was created from.
    pub fn image_source(&self) -> Option<&Path> {
        match &self.variant {
            Variant::Image { source, .. } => Some(source),
            _ => None,
        }
    }

    /// False for images whose source failed to load.
    pub fn is_drawable(&self) -> bool {
        !self.vertices.is_empty()
            && !matches!(self.variant, Variant::Image { texture: None, .. })
    }

    /// Mutates the shape from a command addressed to it.
    ///
    /// A creation command of this shape's own variant redefines position, size and color. A
    /// creation command for another variant only replaces the color, since the variant is
    /// fixed. `Remove` is handled by the registry and is a no-op here.
    pub fn apply(&mut self, command: &Command) {
        if let Some(kind) = command.kind.creates() {
            self.color = command.color;
            if kind == self.kind() {
                self.position = command.position;
                self.size = command.size;
                self.rebuild();
            } else {
                tracing::debug!(
                    object_id = %command.object_id,
                    registered = ?self.kind(),
                    requested = ?kind,
                    "Variant mismatch, only the color was applied"
                );
            }
            return;
        }

        if let Some(channel) = command.kind.channel() {
            self.color.set_channel(channel, command.color.channel(channel));
            return;
        }

        match command.kind {
            CommandKind::SetPosition => {
                self.position = command.position;
                self.rebuild();
            }
            CommandKind::SetSize => {
                self.size = command.size;
                self.rebuild();
            }
            CommandKind::SetColor => self.color = command.color,
            _ => {}
        }
    }

    fn rebuild(&mut self) {
        match self.variant {
            Variant::Line => geometry::line(&mut self.vertices, self.position, self.size),
            Variant::Rect => geometry::centered_quad(&mut self.vertices, self.position, self.size),
            Variant::Ellipse => geometry::ellipse_fan(&mut self.vertices, self.position, self.size),
            Variant::Image { .. } => {
                geometry::textured_quad(&mut self.vertices, self.position, self.size)
            }
        }
    }

    /// Uploads the current geometry and draws it. No-op when there is nothing to draw.
    pub fn draw(&mut self, backend: &mut B) {
        if self.vertices.is_empty() {
            return;
        }

        let (primitive, layout, uniforms, texture) = match &self.variant {
            Variant::Line => (
                Primitive::Lines,
                VertexLayout::Position,
                ShapeUniforms::untextured(self.color),
                None,
            ),
            Variant::Rect | Variant::Ellipse => (
                Primitive::Triangles,
                VertexLayout::Position,
                ShapeUniforms::untextured(self.color),
                None,
            ),
            Variant::Image {
                texture: Some(texture),
                ..
            } => (
                Primitive::Triangles,
                VertexLayout::PositionTexCoord,
                ShapeUniforms::textured(self.color),
                Some(texture),
            ),
            Variant::Image { texture: None, .. } => return,
        };

        backend.draw(
            &mut self.buffer,
            DrawCall {
                primitive,
                layout,
                vertices: &self.vertices,
                uniforms,
                texture,
            },
        );
    }
}

impl<B: Backend> fmt::Debug for Shape<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("kind", &self.kind())
            .field("position", &self.position)
            .field("size", &self.size)
            .field("color", &self.color)
            .field("image_source", &self.image_source())
            .finish()
    }
}
