use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for startup paths: configuration, socket binding, windowing and GPU
/// bootstrap.
///
/// Nothing on the per-frame path returns this; commands and shapes degrade to no-ops instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// A protocol message that does not match the schema of its address.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("malformed OSC packet: {0}")]
    Packet(String),
    #[error("{address}: missing object id")]
    MissingId { address: String },
    #[error("{address}: object id must be a string, int or float, got {found}")]
    InvalidId {
        address: String,
        found: &'static str,
    },
    #[error("{address}: object id is empty")]
    EmptyId { address: String },
    #[error("{address}: expected {expected} arguments after the id, got {found}")]
    Arity {
        address: String,
        expected: usize,
        found: usize,
    },
    #[error("{address}: argument {index} must be {expected}, got {found}")]
    ArgumentType {
        address: String,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {path:?} has zero width or height")]
    EmptyImage { path: PathBuf },
    #[error("image {path:?} is {}x{}, larger than the GPU limit of {max}", .dimensions.0, .dimensions.1)]
    TooLarge {
        path: PathBuf,
        dimensions: (u32, u32),
        max: u32,
    },
    #[error("failed to upload image {path:?}: {message}")]
    Upload { path: PathBuf, message: String },
    #[error("image {path:?} not available")]
    Unavailable { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("a frame is already in progress")]
    FrameInProgress,
    #[error("no frame in progress")]
    NoFrame,
    #[error("renderer has no surface or offscreen target")]
    NoTarget,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to configure UDP socket: {0}")]
    Configure(#[source] std::io::Error),
    #[error("failed to receive from UDP socket: {0}")]
    Receive(#[source] std::io::Error),
    #[error("failed to spawn listener thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("listener thread panicked")]
    Panicked,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid value {value:?} for {option}")]
    InvalidValue {
        option: &'static str,
        value: String,
    },
    #[error("unexpected argument {0:?}")]
    UnexpectedArgument(String),
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
    #[error("frame rate must be at least 1")]
    ZeroFrameRate,
    #[error("window size must be non-zero, got {0}x{1}")]
    ZeroWindowSize(u32, u32),
    #[error("namespace {0:?} must start with '/' and not end with one")]
    InvalidNamespace(String),
}
