//! The wgpu implementation of [`Backend`](crate::Backend).
//!
//! A [`Renderer`] owns the device, the surface (or an offscreen target when headless) and the
//! shape pipelines. Every live shape gets its own vertex buffer and uniform buffer; both are
//! rewritten on every draw.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures::executor::block_on;
//! use winit::application::ApplicationHandler;
//! use winit::event_loop::{ActiveEventLoop, EventLoop};
//! use winit::window::Window;
//! use oscscene::Renderer;
//!
//! struct App;
//!
//! impl ApplicationHandler for App {
//!     fn resumed(&mut self, event_loop: &ActiveEventLoop) {
//!         let window = Arc::new(
//!             event_loop.create_window(Window::default_attributes()).unwrap(),
//!         );
//!         let size = window.inner_size();
//!         let renderer = block_on(Renderer::new(window, (size.width, size.height), true));
//!         // hand `renderer` to a FrameScheduler
//!     }
//!
//!     fn window_event(
//!         &mut self,
//!         _: &ActiveEventLoop,
//!         _: winit::window::WindowId,
//!         _: winit::event::WindowEvent,
//!     ) {
//!     }
//! }
//! ```

mod construction;
mod frame;
mod readback;
mod surface;
mod types;

use wgpu::{CompositeAlphaMode, InstanceDescriptor, SurfaceTarget};

use crate::error::RenderError;
use crate::pipeline::{
    create_globals, create_globals_bind_group_layout, create_shape_bind_group_layout,
    create_texture_bind_group_layout, ShapePipelines,
};
use crate::projection::Projection;
use crate::texture::{create_sampler, TextureUploader};

pub use types::GpuBuffer;
use types::ActiveFrame;

pub struct Renderer<'a> {
    _instance: wgpu::Instance,
    /// `None` for headless renderers, which draw into `offscreen_target` instead.
    surface: Option<wgpu::Surface<'a>>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    physical_size: (u32, u32),

    pipelines: ShapePipelines,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shape_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    _default_texture: wgpu::Texture,
    default_texture_bind_group: wgpu::BindGroup,

    offscreen_target: Option<wgpu::Texture>,
    frame: Option<ActiveFrame>,
    frames_presented: u64,
}

impl Renderer<'_> {
    fn uploader(&self) -> TextureUploader<'_> {
        TextureUploader {
            device: &self.device,
            queue: &self.queue,
            layout: &self.texture_bind_group_layout,
            sampler: &self.sampler,
        }
    }

    /// Number of frames submitted since construction.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// The largest image width or height the device accepts.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    pub fn is_headless(&self) -> bool {
        self.surface.is_none()
    }
}
