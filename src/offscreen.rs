//! A headless host with a manual clock.
//!
//! Nothing happens on its own: [`OffscreenHost::advance`] moves the clock
//! and hands back the frame registrations that fired, and the caller
//! delivers them to its components. That makes it the host for snapshot
//! rendering and for tests that need to count registrations.
//!
//! ```ignore
//! let host = OffscreenHost::new(Size::new(640, 360));
//! let mut sparkles = Sparkles::mount(host.clone(), SparklesConfig::default())?;
//! for _ in 0..120 {
//!     for frame in host.tick() {
//!         sparkles.on_frame(frame, host.now());
//!     }
//! }
//! ```

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::time::Duration;

use crate::color::Color;
use crate::config::SparklesConfig;
use crate::error::ConfigError;
use crate::host::{EventKind, EventSource, FrameHandle, FrameScheduler, ListenerHandle, Size, SurfaceProvider};
use crate::particle::ParticleSource;
use crate::raster::PixelCanvas;
use crate::sparkles::Sparkles;

/// Default host frame cadence (60 Hz).
pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_micros(16_667);

#[derive(Debug)]
struct OffscreenState {
    size: Size,
    background: Color,
    context_available: bool,
    now: Duration,
    frame_period: Duration,
    next_id: u64,
    pending_frames: BTreeSet<FrameHandle>,
    listeners: HashMap<ListenerHandle, EventKind>,
    attached: Vec<String>,
    frames_requested: u64,
    frames_canceled: u64,
    surfaces_created: u64,
    surfaces_detached: u64,
}

/// Headless host. Clones share the same state.
#[derive(Debug, Clone)]
pub struct OffscreenHost {
    state: Rc<RefCell<OffscreenState>>,
}

impl OffscreenHost {
    pub fn new(size: Size) -> Self {
        Self {
            state: Rc::new(RefCell::new(OffscreenState {
                size,
                background: Color::TRANSPARENT,
                context_available: true,
                now: Duration::ZERO,
                frame_period: DEFAULT_FRAME_PERIOD,
                next_id: 1,
                pending_frames: BTreeSet::new(),
                listeners: HashMap::new(),
                attached: Vec::new(),
                frames_requested: 0,
                frames_canceled: 0,
                surfaces_created: 0,
                surfaces_detached: 0,
            })),
        }
    }

    /// A host whose environment has no 2D drawing context.
    pub fn without_context(size: Size) -> Self {
        let host = Self::new(size);
        host.state.borrow_mut().context_available = false;
        host
    }

    pub fn with_frame_period(self, period: Duration) -> Self {
        self.state.borrow_mut().frame_period = period;
        self
    }

    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Change the container size. Listeners are not notified; deliver the
    /// resize to components yourself.
    pub fn set_size(&self, size: Size) {
        self.state.borrow_mut().size = size;
    }

    /// Move the clock forward without firing frames.
    pub fn sleep(&self, dt: Duration) {
        self.state.borrow_mut().now += dt;
    }

    /// Move the clock forward and fire every pending frame.
    ///
    /// Returns the handles that fired, in registration order.
    pub fn advance(&self, dt: Duration) -> Vec<FrameHandle> {
        let mut state = self.state.borrow_mut();
        state.now += dt;
        std::mem::take(&mut state.pending_frames).into_iter().collect()
    }

    /// Advance by one host frame period.
    pub fn tick(&self) -> Vec<FrameHandle> {
        let period = self.state.borrow().frame_period;
        self.advance(period)
    }

    pub fn background(&self) -> Color {
        self.state.borrow().background
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().pending_frames.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.state.borrow().pending_frames.contains(&handle)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|k| **k == kind)
            .count()
    }

    /// Ids of the surfaces currently injected into the container.
    pub fn attached_surfaces(&self) -> Vec<String> {
        self.state.borrow().attached.clone()
    }

    pub fn frames_requested(&self) -> u64 {
        self.state.borrow().frames_requested
    }

    pub fn frames_canceled(&self) -> u64 {
        self.state.borrow().frames_canceled
    }

    pub fn surfaces_created(&self) -> u64 {
        self.state.borrow().surfaces_created
    }

    pub fn surfaces_detached(&self) -> u64 {
        self.state.borrow().surfaces_detached
    }

    fn next_id(state: &mut OffscreenState) -> u64 {
        let id = state.next_id;
        state.next_id += 1;
        id
    }
}

impl SurfaceProvider for OffscreenHost {
    type Surface = PixelCanvas;

    fn measure(&self) -> Size {
        self.state.borrow().size
    }

    fn set_background(&mut self, background: Color) {
        self.state.borrow_mut().background = background;
    }

    fn create_surface(&mut self, id: &str, size: Size) -> Option<PixelCanvas> {
        let mut state = self.state.borrow_mut();
        if !state.context_available {
            return None;
        }
        state.attached.push(id.to_string());
        state.surfaces_created += 1;
        Some(PixelCanvas::new(id, size.width, size.height))
    }

    fn detach_surface(&mut self, surface: PixelCanvas) {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.attached.iter().position(|id| id == surface.id()) {
            state.attached.remove(pos);
            state.surfaces_detached += 1;
        }
    }
}

impl FrameScheduler for OffscreenHost {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        let handle = FrameHandle(Self::next_id(&mut state));
        state.pending_frames.insert(handle);
        state.frames_requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.pending_frames.remove(&handle) {
            state.frames_canceled += 1;
        }
    }
}

impl EventSource for OffscreenHost {
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

/// Mount a field on a fresh host, run it for `frames` host frames and
/// return a copy of its surface together with the container background.
pub fn render_frames(
    config: SparklesConfig,
    size: Size,
    frames: u32,
    source: &mut impl ParticleSource,
) -> Result<(PixelCanvas, Color), ConfigError> {
    let host = OffscreenHost::new(size);
    let id = config.id.clone();
    let mut sparkles = Sparkles::mount_with_source(host.clone(), config, source)?;

    for _ in 0..frames {
        for frame in host.tick() {
            sparkles.on_frame(frame, host.now());
        }
    }

    let canvas = sparkles
        .surface()
        .cloned()
        .unwrap_or_else(|| PixelCanvas::new(id, 0, 0));
    Ok((canvas, host.background()))
}
