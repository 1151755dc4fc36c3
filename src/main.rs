use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use futures::executor::block_on;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use oscscene::{
    queue, CommandDecoder, Config, FramePacer, FrameScheduler, ListenerHandle, OscListener,
    RenderError, Renderer,
};

struct App {
    config: Config,
    scheduler: FrameScheduler<Renderer<'static>>,
    pacer: FramePacer,
    listener: Option<ListenerHandle>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer<'static>>,
    failure: Option<oscscene::Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: impl Into<oscscene::Error>) {
        self.failure = Some(error.into());
        event_loop.exit();
    }

    fn stop_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            if let Err(error) = listener.stop() {
                tracing::error!("OSC listener failed: {error}");
            }
        }
    }

    /// The listener only exits on its own after a receive error. Rendering carries on with the
    /// last known state.
    fn check_listener(&mut self) {
        if self.listener.as_ref().is_some_and(ListenerHandle::is_finished) {
            self.stop_listener();
            tracing::warn!("No longer receiving commands, showing the last state");
        }
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match self.scheduler.frame(renderer) {
            Ok(stats) => {
                tracing::trace!(
                    commands = stats.commands,
                    shapes = stats.shapes,
                    drawn = stats.drawn,
                    "Frame presented"
                );
            }
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                tracing::debug!("Surface lost or outdated, reconfiguring");
                renderer.reconfigure();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                tracing::error!("GPU out of memory");
                self.fail(event_loop, RenderError::Surface(wgpu::SurfaceError::OutOfMemory));
            }
            Err(error) => tracing::warn!("Frame skipped: {error}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_title("oscscene");
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(error) => return self.fail(event_loop, error),
        };

        let size = window.inner_size();
        let physical_size = (size.width, size.height);
        let renderer = match block_on(Renderer::new(
            window.clone(),
            physical_size,
            self.config.vsync,
        )) {
            Ok(renderer) => renderer,
            Err(error) => return self.fail(event_loop, error),
        };

        self.scheduler.resize(physical_size.0, physical_size.1);
        self.renderer = Some(renderer);
        self.window = Some(window.clone());
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.stop_listener();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize((size.width, size.height));
                    self.scheduler.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.check_listener();

        let pace = self.pacer.poll(Instant::now());
        if pace.due {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(pace.deadline));
    }
}

fn run() -> oscscene::Result<()> {
    let config = Config::from_args(std::env::args().skip(1))?;

    let (producer, consumer) = queue::bounded(config.queue_capacity);
    let decoder = CommandDecoder::new(config.namespace.clone(), producer);
    let listener = OscListener::spawn(config.socket_addr(), decoder)?;

    let scheduler = FrameScheduler::new(consumer, config.width, config.height)
        .with_clear_color(config.clear_color);

    let mut app = App {
        pacer: FramePacer::new(config.frame_interval()),
        config,
        scheduler,
        listener: Some(listener),
        window: None,
        renderer: None,
        failure: None,
    };

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    app.stop_listener();

    match app.failure.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
