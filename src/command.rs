//! The decoded, typed form of one inbound drawing message.
//!
//! A [`Command`] is shape-agnostic: every record carries position, size, color and payload
//! slots, and only the ones relevant to its [`CommandKind`] are meaningful. The rest stay
//! zero-initialized and consumers ignore them.

use crate::color::{Channel, Color};
use crate::id::ObjectId;

/// A point in the shared 2D scene space. Also used for width/height pairs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// The four shape variants a creation command can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rect,
    Ellipse,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreateOrUpdateLine,
    CreateOrUpdateRect,
    CreateOrUpdateEllipse,
    CreateOrUpdateImage,
    SetPosition,
    SetSize,
    SetColor,
    SetChannelRed,
    SetChannelGreen,
    SetChannelBlue,
    SetChannelAlpha,
    Remove,
}

impl CommandKind {
    /// The shape variant this kind creates, if it is a creation kind.
    pub fn creates(self) -> Option<ShapeKind> {
        match self {
            CommandKind::CreateOrUpdateLine => Some(ShapeKind::Line),
            CommandKind::CreateOrUpdateRect => Some(ShapeKind::Rect),
            CommandKind::CreateOrUpdateEllipse => Some(ShapeKind::Ellipse),
            CommandKind::CreateOrUpdateImage => Some(ShapeKind::Image),
            _ => None,
        }
    }

    pub fn is_creation(self) -> bool {
        self.creates().is_some()
    }

    /// The channel a single-channel color command replaces.
    pub fn channel(self) -> Option<Channel> {
        match self {
            CommandKind::SetChannelRed => Some(Channel::Red),
            CommandKind::SetChannelGreen => Some(Channel::Green),
            CommandKind::SetChannelBlue => Some(Channel::Blue),
            CommandKind::SetChannelAlpha => Some(Channel::Alpha),
            _ => None,
        }
    }

    /// True for kinds that replace all four color channels at once.
    pub fn sets_full_color(self) -> bool {
        self.is_creation() || self == CommandKind::SetColor
    }
}

/// One decoded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub object_id: ObjectId,
    pub position: Point,
    pub size: Point,
    pub color: Color,
    /// Image source path, only set by image creation commands.
    pub payload: Option<String>,
}

impl Command {
    /// Creates a record with every field other than kind and id zeroed.
    pub fn new(kind: CommandKind, object_id: impl Into<ObjectId>) -> Self {
        Self {
            kind,
            object_id: object_id.into(),
            position: Point::ZERO,
            size: Point::ZERO,
            color: Color::TRANSPARENT,
            payload: None,
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Point::new(width, height);
        self
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Shorthand for a creation command of the given variant.
    pub fn create(
        shape: ShapeKind,
        object_id: impl Into<ObjectId>,
        position: (f32, f32),
        size: (f32, f32),
        color: impl Into<Color>,
    ) -> Self {
        let kind = match shape {
            ShapeKind::Line => CommandKind::CreateOrUpdateLine,
            ShapeKind::Rect => CommandKind::CreateOrUpdateRect,
            ShapeKind::Ellipse => CommandKind::CreateOrUpdateEllipse,
            ShapeKind::Image => CommandKind::CreateOrUpdateImage,
        };
        Self::new(kind, object_id)
            .with_position(position.0, position.1)
            .with_size(size.0, size.1)
            .with_color(color)
    }
}
