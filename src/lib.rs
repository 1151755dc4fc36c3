//! Live 2D shape rendering driven by OSC drawing commands.
//!
//! A network thread receives OSC messages such as `/sg/rect "box" 0 0 0.2 0.2 1 0 0 1`, decodes
//! them into [`Command`]s and pushes them onto a bounded [`queue`]. The render thread runs a
//! [`FrameScheduler`] that drains the queue into a [`Registry`] of live [`Shape`]s once per frame
//! and draws them through a [`Backend`], normally the wgpu [`Renderer`].
//!
//! ```rust
//! use oscscene::{queue, CommandDecoder, FrameScheduler, RecordingBackend, DEFAULT_NAMESPACE};
//! use rosc::{OscMessage, OscPacket, OscType};
//!
//! let (producer, consumer) = queue::bounded(50);
//! let mut decoder = CommandDecoder::new(DEFAULT_NAMESPACE, producer);
//! let mut scheduler = FrameScheduler::new(consumer, 640, 480);
//! let mut backend = RecordingBackend::new();
//!
//! decoder.handle_packet(OscPacket::Message(OscMessage {
//!     addr: "/sg/ellipse".into(),
//!     args: vec![
//!         OscType::String("dot".into()),
//!         OscType::Float(0.0),
//!         OscType::Float(0.0),
//!         OscType::Float(0.1),
//!         OscType::Float(0.1),
//!         OscType::Float(1.0),
//!         OscType::Float(1.0),
//!         OscType::Float(1.0),
//!         OscType::Float(1.0),
//!     ],
//! }));
//!
//! let stats = scheduler.frame(&mut backend).unwrap();
//! assert_eq!(stats.drawn, 1);
//! ```

pub use wgpu;

mod backend;
mod color;
mod command;
mod config;
pub mod decoder;
mod error;
pub mod geometry;
mod id;
mod listener;
mod pipeline;
mod projection;
pub mod queue;
mod registry;
mod renderer;
mod scheduler;
mod shape;
mod texture;
mod vertex;

pub use backend::{
    Backend, DrawCall, DrawRecord, FrameRecord, Primitive, RecordedBuffer, RecordedTexture,
    RecordingBackend, ShapeUniforms, VertexLayout,
};
pub use color::{Channel, Color};
pub use command::{Command, CommandKind, Point, ShapeKind};
pub use config::Config;
pub use decoder::{CommandDecoder, DEFAULT_NAMESPACE};
pub use error::{
    ConfigError, DecodeError, Error, RenderError, ResourceError, Result, TransportError,
};
pub use id::ObjectId;
pub use listener::{ListenerHandle, OscListener};
pub use projection::Projection;
pub use registry::{Dispatch, Registry};
pub use renderer::{GpuBuffer, Renderer};
pub use scheduler::{FramePacer, FrameScheduler, FrameStats, Pace};
pub use shape::Shape;
pub use texture::GpuTexture;
