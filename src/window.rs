//! Windowed host and the showcase application.
//!
//! [`WindowHost`] turns frame registrations into winit redraw requests and
//! hands [`PixelCanvas`] surfaces to components. The showcase mounts a
//! sparkle field and a beam glow on it and presents them through the
//! [`Presenter`], tilting the sparkle panel under the cursor.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use tracing::{info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::beams::{BeamConfig, BeamGlow};
use crate::color::Color;
use crate::config::SparklesConfig;
use crate::error::ShowcaseError;
use crate::gpu::{Presenter, Scene};
use crate::host::{EventKind, EventSource, FrameHandle, FrameScheduler, ListenerHandle, Size, SurfaceProvider};
use crate::particle::SeededSource;
use crate::raster::PixelCanvas;
use crate::sparkles::Sparkles;
use crate::tilt::{CardTilt, DEFAULT_PERSPECTIVE};
use crate::time::FrameClock;

#[derive(Debug, Default)]
struct WindowState {
    window: Option<Arc<Window>>,
    size: Size,
    background: Color,
    next_id: u64,
    pending_frames: BTreeSet<FrameHandle>,
    listeners: HashMap<ListenerHandle, EventKind>,
    attached: Vec<String>,
}

/// Host backed by a winit window. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct WindowHost {
    state: Rc<RefCell<WindowState>>,
}

impl WindowHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_window(&self, window: Arc<Window>) {
        let size = window.inner_size();
        let mut state = self.state.borrow_mut();
        state.size = Size::new(size.width, size.height);
        state.window = Some(window);
    }

    pub fn set_size(&self, size: Size) {
        self.state.borrow_mut().size = size;
    }

    pub fn background(&self) -> Color {
        self.state.borrow().background
    }

    /// Take every frame registration pending at redraw time.
    pub fn take_frames(&self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.state.borrow_mut().pending_frames)
            .into_iter()
            .collect()
    }

    pub fn has_pending_frames(&self) -> bool {
        !self.state.borrow().pending_frames.is_empty()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|k| **k == kind)
            .count()
    }

    fn next_id(state: &mut WindowState) -> u64 {
        state.next_id += 1;
        state.next_id
    }
}

impl SurfaceProvider for WindowHost {
    type Surface = PixelCanvas;

    fn measure(&self) -> Size {
        self.state.borrow().size
    }

    fn set_background(&mut self, background: Color) {
        self.state.borrow_mut().background = background;
    }

    fn create_surface(&mut self, id: &str, size: Size) -> Option<PixelCanvas> {
        self.state.borrow_mut().attached.push(id.to_string());
        Some(PixelCanvas::new(id, size.width, size.height))
    }

    fn detach_surface(&mut self, surface: PixelCanvas) {
        let mut state = self.state.borrow_mut();
        state.attached.retain(|id| id != surface.id());
    }
}

impl FrameScheduler for WindowHost {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        let handle = FrameHandle(Self::next_id(&mut state));
        state.pending_frames.insert(handle);
        if let Some(window) = &state.window {
            window.request_redraw();
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.state.borrow_mut().pending_frames.remove(&handle);
    }
}

impl EventSource for WindowHost {
    fn listen(&mut self, kind: EventKind) -> ListenerHandle {
        let mut state = self.state.borrow_mut();
        let handle = ListenerHandle(Self::next_id(&mut state));
        state.listeners.insert(handle, kind);
        handle
    }

    fn unlisten(&mut self, handle: ListenerHandle) {
        self.state.borrow_mut().listeners.remove(&handle);
    }
}

struct Showcase {
    window: Arc<Window>,
    presenter: Presenter,
    sparkles: Sparkles<WindowHost>,
    beams: BeamGlow<WindowHost>,
    tilt: CardTilt,
}

struct App {
    config: SparklesConfig,
    beam_config: BeamConfig,
    seed: Option<u64>,
    host: WindowHost,
    clock: FrameClock,
    last_redraw: Duration,
    showcase: Option<Showcase>,
    error: Option<ShowcaseError>,
}

impl App {
    fn new(config: SparklesConfig, beam_config: BeamConfig, seed: Option<u64>) -> Self {
        Self {
            config,
            beam_config,
            seed,
            host: WindowHost::new(),
            clock: FrameClock::new(),
            last_redraw: Duration::ZERO,
            showcase: None,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Showcase, ShowcaseError> {
        let window_attrs = Window::default_attributes()
            .with_title("sparkfield")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let presenter = pollster::block_on(Presenter::new(window.clone()))?;
        self.host.attach_window(window.clone());

        let mut source = match self.seed {
            Some(seed) => SeededSource::new(seed),
            None => SeededSource::from_time(),
        };
        let sparkles = Sparkles::mount_with_source(self.host.clone(), self.config.clone(), &mut source)?;
        let beams = BeamGlow::mount(self.host.clone(), self.beam_config.clone());

        Ok(Showcase {
            window,
            presenter,
            sparkles,
            beams,
            tilt: CardTilt::new(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ShowcaseError) {
        self.error = Some(error);
        self.showcase = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.showcase.is_none() && self.error.is_none() {
            match self.start(event_loop) {
                Ok(showcase) => {
                    info!("showcase started");
                    showcase.window.request_redraw();
                    self.showcase = Some(showcase);
                }
                Err(e) => self.fail(event_loop, e),
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let now = self.clock.now();
        let Some(showcase) = self.showcase.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                if let Some(showcase) = self.showcase.take() {
                    showcase.sparkles.unmount();
                    showcase.beams.unmount();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.host.set_size(Size::new(physical_size.width, physical_size.height));
                showcase.presenter.resize(physical_size);
                showcase.sparkles.on_resize(now);
                showcase.beams.on_resize(now);
            }
            WindowEvent::CursorEntered { .. } => showcase.tilt.enter(),
            WindowEvent::CursorLeft { .. } => {
                showcase.tilt.leave();
                showcase.window.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let point = Vec2::new(position.x as f32, position.y as f32);
                let size = self.host.measure();
                showcase.beams.on_pointer_move(point, now);
                showcase
                    .tilt
                    .pointer_move(Vec2::ZERO, Vec2::new(size.width as f32, size.height as f32), point);
                showcase.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let now = self.clock.tick();
                showcase.tilt.advance(now.saturating_sub(self.last_redraw));
                self.last_redraw = now;

                for frame in self.host.take_frames() {
                    showcase.sparkles.on_frame(frame, now);
                    showcase.beams.on_frame(frame);
                }

                let beams = &showcase.beams;
                let scene = Scene {
                    background: self.host.background(),
                    glow_center: beams.center(),
                    glow_radius: beams.radius(),
                    glow_opacity: beams.config().opacity,
                    palette: beams.config().palette,
                    panel: showcase.tilt.transform(DEFAULT_PERSPECTIVE),
                    time: now.as_secs_f32(),
                };

                match showcase.presenter.render(&scene, showcase.sparkles.surface()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => showcase.presenter.reconfigure(),
                    Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                    Err(e) => warn!("render error: {:?}", e),
                }

                if self.clock.frames() % 30 == 0 {
                    showcase
                        .window
                        .set_title(&format!("sparkfield - {:.0} fps", self.clock.fps()));
                }
                if !showcase.tilt.is_settled() {
                    showcase.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let now = self.clock.now();
        if let Some(showcase) = self.showcase.as_mut() {
            let resized = showcase.sparkles.poll(now);
            let moved = showcase.beams.poll(now);
            if resized || moved {
                showcase.window.request_redraw();
            }
        }
    }
}

/// Open the showcase window and run until it is closed.
pub fn run_showcase(config: SparklesConfig, beam_config: BeamConfig, seed: Option<u64>) -> Result<(), ShowcaseError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    // Debounce deadlines are polled between events.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, beam_config, seed);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
