use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use impulse_playground::{
    config::PlaygroundConfig,
    controller::{FrameLoop, InputEvent, LoopState},
    logging,
    view::{GpuContext, RectRenderer},
    PlaygroundError,
};

/// Counts presented frames and logs the rate once per second
struct FpsCounter {
    frame_count: u32,
    since: Instant,
}

impl FpsCounter {
    fn new() -> Self {
        Self { frame_count: 0, since: Instant::now() }
    }

    fn tick(&mut self) {
        self.frame_count += 1;
        let elapsed = self.since.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frame_count as f32 / elapsed;
            tracing::debug!(fps = fps.round() as u32, "frame rate");
            self.frame_count = 0;
            self.since = Instant::now();
        }
    }
}

struct App {
    config: PlaygroundConfig,
    window: Option<Arc<Window>>,
    renderer: Option<RectRenderer>,
    frame_loop: FrameLoop,
    fps: FpsCounter,
    error: Option<PlaygroundError>,
}

impl App {
    fn new(config: PlaygroundConfig) -> Self {
        let frame_loop = FrameLoop::new(&config);
        Self {
            config,
            window: None,
            renderer: None,
            frame_loop,
            fps: FpsCounter::new(),
            error: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PlaygroundError> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.window.width, self.config.window.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        // Pixel view stays at the configured size; resizing stretches it
        let view_size = Vec2::new(self.config.window.width as f32, self.config.window.height as f32);
        self.renderer = Some(RectRenderer::new(gpu, view_size));
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: PlaygroundError) {
        tracing::error!(error = %error, "fatal error, shutting down");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = self.renderer.as_mut() else {
                    return;
                };
                match self.frame_loop.run_frame(renderer) {
                    Ok(LoopState::Running) => self.fps.tick(),
                    Ok(LoopState::Terminated) => event_loop.exit(),
                    Err(e) => self.fail(event_loop, e.into()),
                }
            }
            WindowEvent::CloseRequested => {
                // redraws may never arrive for a minimized window
                self.frame_loop.push_event(InputEvent::CloseRequested);
                self.frame_loop.request_quit();
                event_loop.exit();
            }
            other => {
                if let Some(input) = InputEvent::from_window_event(&other) {
                    self.frame_loop.push_event(input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.frame_loop.teardown();
    }
}

fn main() -> Result<(), PlaygroundError> {
    logging::init();

    let config = PlaygroundConfig::load().inspect_err(|e| tracing::error!(error = %e, "failed to load config"))?;
    tracing::info!(
        width = config.window.width,
        height = config.window.height,
        pieces = config.level.pieces.len(),
        "starting playground"
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    tracing::info!(frames = app.frame_loop.frames(), "playground closed");
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
